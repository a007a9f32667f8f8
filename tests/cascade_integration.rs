/*
 *  Copyright 2026 Callboard Maintainers
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! End-to-end cascade tests against a live PostgreSQL instance.
//!
//! These run only when `CALLBOARD_TEST_DB_URL` points at a reachable
//! database (see README for a docker one-liner); without it each test is
//! a silent no-op so the suite still passes in environments without
//! PostgreSQL. Tests share one database and run serially.

use chrono::NaiveDate;
use diesel::prelude::*;
use serial_test::serial;
use uuid::Uuid;

use callboard::database::schema::{
    crew_list_members, crew_lists, crew_members, job_positions, jobs,
};
use callboard::{
    CascadeOutcome, Database, EngineConfig, InboundRouter, MessageKind, OfferEngine, OfferEvent,
    OfferStatus, ResponseChannel, DAL,
};

struct Fixture {
    dal: DAL,
    engine: OfferEngine,
    router: InboundRouter,
}

async fn fixture() -> Option<Fixture> {
    dotenvy::dotenv().ok();
    let url = std::env::var("CALLBOARD_TEST_DB_URL").ok()?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let database = Database::new(&url, "callboard_test", 5);
    database
        .run_migrations()
        .await
        .expect("Failed to run migrations");

    let config = EngineConfig::default();
    let dal = DAL::new(database.clone());
    let engine = OfferEngine::new(database, config.clone());
    let router = InboundRouter::new(dal.clone(), engine.clone(), config);
    Some(Fixture {
        dal,
        engine,
        router,
    })
}

fn unique_phone(tag: u32) -> String {
    // UNIQUE(phone) spans test runs, so salt with randomness.
    format!("+1999{:03}{:04}", rand::random::<u32>() % 1000, tag % 10_000)
}

/// Candidates are given as (priority_rank, sms_confirmed, opted_out).
async fn seed_position(
    dal: &DAL,
    candidates: &[(i32, bool, bool)],
) -> (Uuid, Uuid, Vec<(Uuid, String)>) {
    let candidates = candidates.to_vec();
    let conn = dal.database.get_connection().await.unwrap();
    conn.interact(move |conn| -> Result<_, diesel::result::Error> {
        let job_id: Uuid = diesel::insert_into(jobs::table)
            .values((
                jobs::hirer_name.eq("Harbor Light Productions"),
                jobs::job_name.eq("Dockside Shoot"),
                jobs::work_start_date.eq(NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()),
                jobs::work_end_date.eq(NaiveDate::from_ymd_opt(2026, 9, 16).unwrap()),
                jobs::day_rate.eq(400),
                jobs::location.eq("Pier 12, Brooklyn"),
            ))
            .returning(jobs::id)
            .get_result(conn)?;

        let list_id: Uuid = diesel::insert_into(crew_lists::table)
            .values(crew_lists::name.eq("Grips A-list"))
            .returning(crew_lists::id)
            .get_result(conn)?;

        let mut members = Vec::new();
        for (i, (rank, confirmed, opted_out)) in candidates.iter().enumerate() {
            let phone = unique_phone(i as u32);
            let member_id: Uuid = diesel::insert_into(crew_members::table)
                .values((
                    crew_members::name.eq(format!("Crew {}", i + 1)),
                    crew_members::phone.eq(&phone),
                    crew_members::web_consent.eq(true),
                    crew_members::sms_confirmed.eq(*confirmed),
                    crew_members::opted_out.eq(*opted_out),
                ))
                .returning(crew_members::id)
                .get_result(conn)?;
            diesel::insert_into(crew_list_members::table)
                .values((
                    crew_list_members::crew_list_id.eq(list_id),
                    crew_list_members::crew_member_id.eq(member_id),
                    crew_list_members::priority_rank.eq(rank),
                ))
                .execute(conn)?;
            members.push((member_id, phone));
        }

        let position_id: Uuid = diesel::insert_into(job_positions::table)
            .values((
                job_positions::job_id.eq(job_id),
                job_positions::role_name.eq("Grip"),
                job_positions::quantity_needed.eq(1),
                job_positions::response_window_minutes.eq(240),
                job_positions::crew_list_id.eq(list_id),
            ))
            .returning(job_positions::id)
            .get_result(conn)?;

        Ok((job_id, position_id, members))
    })
    .await
    .unwrap()
    .unwrap()
}

#[tokio::test]
#[serial]
async fn opening_a_position_sends_to_lowest_rank() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, members) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, false)]).await;

    let outcome = fx.engine.begin_position(position_id).await.unwrap();
    let CascadeOutcome::Sent { offer_id } = outcome else {
        panic!("expected Sent, got {:?}", outcome);
    };

    let offer = fx.dal.offers().get_by_id(offer_id).await.unwrap();
    assert_eq!(offer.crew_member_id, members[0].0);
    assert_eq!(offer.offer_status().unwrap(), OfferStatus::Sent);
    assert!(offer.deadline_at.is_some());

    // Exactly one active offer, and one queued message for it
    let offers = fx.dal.offers().for_position(position_id).await.unwrap();
    let active = offers
        .iter()
        .filter(|o| o.offer_status().unwrap() == OfferStatus::Sent)
        .count();
    assert_eq!(active, 1);

    let soon = chrono::Utc::now().naive_utc() + chrono::Duration::minutes(1);
    let due = fx.dal.message_queue().due_batch(soon, 50).await.unwrap();
    assert!(due.iter().any(|m| m.offer_id == Some(offer_id)));
}

#[tokio::test]
#[serial]
async fn declining_cascades_to_next_rank() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, members) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, false), (3, true, false)]).await;

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };

    let outcome = fx
        .engine
        .transition(offer_id, OfferEvent::Decline, Some(ResponseChannel::Sms))
        .await
        .unwrap();
    let CascadeOutcome::Cascaded {
        terminated,
        next_offer_id,
    } = outcome
    else {
        panic!("expected Cascaded, got {:?}", outcome);
    };
    assert_eq!(terminated, offer_id);

    // Rank 2, never rank 3
    let next = fx.dal.offers().get_by_id(next_offer_id).await.unwrap();
    assert_eq!(next.crew_member_id, members[1].0);
    assert_eq!(next.offer_status().unwrap(), OfferStatus::Sent);
}

#[tokio::test]
#[serial]
async fn cascade_skips_ineligible_candidates() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, members) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, true), (3, true, false)]).await;

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };

    let CascadeOutcome::Cascaded { next_offer_id, .. } = fx
        .engine
        .transition(offer_id, OfferEvent::Decline, Some(ResponseChannel::Sms))
        .await
        .unwrap()
    else {
        panic!("expected Cascaded");
    };

    // Rank 2 is opted out, so rank 3 gets the offer
    let next = fx.dal.offers().get_by_id(next_offer_id).await.unwrap();
    assert_eq!(next.crew_member_id, members[2].0);
}

#[tokio::test]
#[serial]
async fn exhausting_the_list_is_not_an_error() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, _) = seed_position(&fx.dal, &[(1, true, false)]).await;

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };

    let outcome = fx
        .engine
        .transition(offer_id, OfferEvent::Decline, Some(ResponseChannel::Sms))
        .await
        .unwrap();
    assert_eq!(outcome, CascadeOutcome::Exhausted);

    let offers = fx.dal.offers().for_position(position_id).await.unwrap();
    assert!(offers
        .iter()
        .all(|o| o.offer_status().unwrap() != OfferStatus::Sent));
}

#[tokio::test]
#[serial]
async fn expiring_twice_resolves_once() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, _) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, false)]).await;

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };

    let first = fx
        .engine
        .transition(offer_id, OfferEvent::Expire, None)
        .await
        .unwrap();
    assert!(matches!(first, CascadeOutcome::Cascaded { .. }));

    let second = fx
        .engine
        .transition(offer_id, OfferEvent::Expire, None)
        .await
        .unwrap();
    assert_eq!(second, CascadeOutcome::AlreadyResolved);
}

#[tokio::test]
#[serial]
async fn yes_after_stop_stays_opted_out() {
    let Some(fx) = fixture().await else { return };
    let (_, _, members) = seed_position(&fx.dal, &[(1, true, false)]).await;
    let (member_id, phone) = members[0].clone();

    fx.router.handle(&phone, "STOP").await.unwrap();
    let member = fx.dal.crew_members().get_by_id(member_id).await.unwrap();
    assert!(member.opted_out);

    // A later YES is a no-op: still opted out, no opt-in notice queued
    fx.router.handle(&phone, "YES").await.unwrap();
    let member = fx.dal.crew_members().get_by_id(member_id).await.unwrap();
    assert!(member.opted_out);
    assert!(member.sms_confirmed);

    let soon = chrono::Utc::now().naive_utc() + chrono::Duration::minutes(1);
    let due = fx.dal.message_queue().due_batch(soon, 100).await.unwrap();
    assert!(!due.iter().any(|m| {
        m.crew_member_id == Some(member_id) && m.kind == MessageKind::OptInConfirm.as_str()
    }));
}

#[tokio::test]
#[serial]
async fn stop_excludes_member_from_later_cascades() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, members) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, false), (3, true, false)]).await;

    // Rank 2 opts out before the position opens
    fx.router.handle(&members[1].1, "STOP").await.unwrap();
    let second = fx.dal.crew_members().get_by_id(members[1].0).await.unwrap();
    assert!(second.opted_out);

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };
    let first = fx.dal.offers().get_by_id(offer_id).await.unwrap();
    assert_eq!(first.crew_member_id, members[0].0);

    // Rank 1 declines by SMS; the cascade must land on rank 3
    fx.router.handle(&members[0].1, "2").await.unwrap();
    let offers = fx.dal.offers().for_position(position_id).await.unwrap();
    let active: Vec<_> = offers
        .iter()
        .filter(|o| o.offer_status().unwrap() == OfferStatus::Sent)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].crew_member_id, members[2].0);
}

#[tokio::test]
#[serial]
async fn accepting_fills_the_position_and_job() {
    let Some(fx) = fixture().await else { return };
    let (_, position_id, _) =
        seed_position(&fx.dal, &[(1, true, false), (2, true, false)]).await;

    let CascadeOutcome::Sent { offer_id } = fx.engine.begin_position(position_id).await.unwrap()
    else {
        panic!("expected Sent");
    };

    let outcome = fx
        .engine
        .transition(offer_id, OfferEvent::Accept, Some(ResponseChannel::Sms))
        .await
        .unwrap();
    assert_eq!(outcome, CascadeOutcome::Accepted { job_filled: true });

    let position = fx.dal.positions().get_by_id(position_id).await.unwrap();
    assert_eq!(position.filled_count, 1);
    assert!(!position.needs_crew());

    // A stale decline from the loser of the race is a no-op
    let late = fx
        .engine
        .transition(offer_id, OfferEvent::Decline, Some(ResponseChannel::Sms))
        .await
        .unwrap();
    assert_eq!(late, CascadeOutcome::AlreadyResolved);
}
