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

//! Transactional transition + cascade operations.
//!
//! Every function here runs inside a single database transaction started
//! by the engine and takes the position row lock (`SELECT ... FOR UPDATE`)
//! before reading or mutating offer state. The lock is the critical
//! section guard: the sweeper and the router can race to terminate the
//! same offer, and only the lock holder's view of the offer's status is
//! authoritative. The loser re-reads the offer, observes the terminal
//! state, and returns [`CascadeOutcome::AlreadyResolved`].

use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::selection::{self, CascadeCandidate};
use super::CascadeOutcome;
use crate::composer::OfferMessage;
use crate::database::schema::{crew_list_members, crew_members, job_offers, job_positions, jobs};
use crate::error::{EngineError, StoreError};
use crate::models::{
    Job, JobOffer, JobPosition, JobStatus, MessageKind, NewJobOffer, NewQueuedMessage, OfferEvent,
    OfferStatus, ResponseChannel,
};

/// Marks an offer terminal (declined or expired) and advances the cascade.
///
/// Atomic with the cascade lookup: position lock, terminal update, next
/// candidate selection, message enqueue and the next offer's `sent`
/// transition all commit or roll back together.
pub(super) fn resolve_terminal(
    conn: &mut PgConnection,
    offer_id: Uuid,
    event: OfferEvent,
    channel: Option<ResponseChannel>,
    accept_base_url: &str,
) -> Result<CascadeOutcome, EngineError> {
    debug_assert!(event.cascades());
    let now = Utc::now().naive_utc();

    let offer = load_offer(conn, offer_id)?;
    let position = lock_position(conn, offer.position_id, offer_id)?;

    // Authoritative re-read under the position lock
    let offer = load_offer(conn, offer_id)?;
    let status = offer.offer_status()?;
    let Some(next_status) = status.apply(event) else {
        if status.is_terminal() {
            debug!(
                offer_id = %offer_id,
                status = status.as_str(),
                "Offer already resolved, skipping {}",
                event.as_str()
            );
            return Ok(CascadeOutcome::AlreadyResolved);
        }
        return Err(EngineError::InvalidTransition {
            offer_id,
            status: status.as_str(),
            event: event.as_str(),
        });
    };

    diesel::update(job_offers::table.find(offer_id))
        .set((
            job_offers::status.eq(next_status.as_str()),
            job_offers::response_at.eq(channel.map(|_| now)),
            job_offers::response_channel.eq(channel.map(|c| c.as_str())),
            job_offers::updated_at.eq(now),
        ))
        .execute(conn)?;

    info!(
        offer_id = %offer_id,
        position_id = %position.id,
        "Offer state change: sent -> {}",
        next_status.as_str()
    );

    if !position.needs_crew() {
        debug!(position_id = %position.id, "Position already filled, skipping cascade");
        return Ok(CascadeOutcome::PositionFilled);
    }

    let candidates = load_candidates(conn, position.id)?;
    match selection::next_eligible(&candidates, offer.priority_rank) {
        Some(next) => {
            let next = next.clone();
            let job = load_job(conn, offer.job_id, position.id)?;
            send_offer(conn, &job, &position, &next, now, accept_base_url)?;
            Ok(CascadeOutcome::Cascaded {
                terminated: offer_id,
                next_offer_id: next.offer_id,
            })
        }
        None => {
            info!(
                position_id = %position.id,
                job_id = %offer.job_id,
                "No more eligible crew members for cascade"
            );
            Ok(CascadeOutcome::Exhausted)
        }
    }
}

/// Marks an offer accepted and updates position/job fill accounting.
///
/// No cascade is triggered on accept.
pub(super) fn accept(
    conn: &mut PgConnection,
    offer_id: Uuid,
    channel: ResponseChannel,
) -> Result<CascadeOutcome, EngineError> {
    let now = Utc::now().naive_utc();

    let offer = load_offer(conn, offer_id)?;
    let position = lock_position(conn, offer.position_id, offer_id)?;

    let offer = load_offer(conn, offer_id)?;
    let status = offer.offer_status()?;
    if status.apply(OfferEvent::Accept).is_none() {
        if status.is_terminal() {
            debug!(offer_id = %offer_id, status = status.as_str(), "Offer already resolved, skipping accept");
            return Ok(CascadeOutcome::AlreadyResolved);
        }
        return Err(EngineError::InvalidTransition {
            offer_id,
            status: status.as_str(),
            event: OfferEvent::Accept.as_str(),
        });
    }

    diesel::update(job_offers::table.find(offer_id))
        .set((
            job_offers::status.eq(OfferStatus::Accepted.as_str()),
            job_offers::response_at.eq(Some(now)),
            job_offers::response_channel.eq(Some(channel.as_str())),
            job_offers::updated_at.eq(now),
        ))
        .execute(conn)?;

    diesel::update(job_positions::table.find(position.id))
        .set((
            job_positions::filled_count.eq(job_positions::filled_count + 1),
            job_positions::updated_at.eq(now),
        ))
        .execute(conn)?;

    info!(
        offer_id = %offer_id,
        position_id = %position.id,
        "Offer accepted ({} of {} filled)",
        position.filled_count + 1,
        position.quantity_needed
    );

    // Re-check aggregate fill across all of the job's positions
    let positions: Vec<JobPosition> = job_positions::table
        .filter(job_positions::job_id.eq(offer.job_id))
        .load(conn)?;
    let job_filled = positions.iter().all(|p| !p.needs_crew());
    if job_filled {
        diesel::update(jobs::table.find(offer.job_id))
            .set((
                jobs::status.eq(JobStatus::Filled.as_str()),
                jobs::updated_at.eq(now),
            ))
            .execute(conn)?;
        info!(job_id = %offer.job_id, "Job is now fully crewed");
    }

    Ok(CascadeOutcome::Accepted { job_filled })
}

/// Opens a position: seeds pending offers from the position's active list
/// and sends to the lowest-ranked eligible candidate.
///
/// Idempotent: existing offers for (position, candidate) pairs are kept,
/// and if the position already has an active `sent` offer nothing more is
/// sent.
pub(super) fn begin_position(
    conn: &mut PgConnection,
    position_id: Uuid,
    accept_base_url: &str,
) -> Result<CascadeOutcome, EngineError> {
    let now = Utc::now().naive_utc();

    let position = lock_position_direct(conn, position_id)?;
    if !position.needs_crew() {
        return Ok(CascadeOutcome::PositionFilled);
    }

    seed_offers(conn, &position, now)?;

    // Single-active-offer invariant: never open a second window
    let active: i64 = job_offers::table
        .filter(job_offers::position_id.eq(position_id))
        .filter(job_offers::status.eq(OfferStatus::Sent.as_str()))
        .count()
        .get_result(conn)?;
    if active > 0 {
        debug!(position_id = %position_id, "Position already has an active offer");
        return Ok(CascadeOutcome::AlreadyResolved);
    }

    let candidates = load_candidates(conn, position_id)?;
    match selection::first_eligible(&candidates) {
        Some(first) => {
            let first = first.clone();
            let job = load_job(conn, position.job_id, position_id)?;
            send_offer(conn, &job, &position, &first, now, accept_base_url)?;
            Ok(CascadeOutcome::Sent {
                offer_id: first.offer_id,
            })
        }
        None => {
            warn!(position_id = %position_id, "No eligible crew members to open position with");
            Ok(CascadeOutcome::Exhausted)
        }
    }
}

/// Sends a specific pending offer (the `Send` event).
///
/// Guarded by the same position lock and the single-active-offer check as
/// the cascade path.
pub(super) fn send_pending(
    conn: &mut PgConnection,
    offer_id: Uuid,
    accept_base_url: &str,
) -> Result<CascadeOutcome, EngineError> {
    let now = Utc::now().naive_utc();

    let offer = load_offer(conn, offer_id)?;
    let position = lock_position(conn, offer.position_id, offer_id)?;

    let offer = load_offer(conn, offer_id)?;
    let status = offer.offer_status()?;
    if status.apply(OfferEvent::Send).is_none() {
        if status.is_terminal() || status == OfferStatus::Sent {
            return Ok(CascadeOutcome::AlreadyResolved);
        }
        return Err(EngineError::InvalidTransition {
            offer_id,
            status: status.as_str(),
            event: OfferEvent::Send.as_str(),
        });
    }

    if !position.needs_crew() {
        return Ok(CascadeOutcome::PositionFilled);
    }

    let active: i64 = job_offers::table
        .filter(job_offers::position_id.eq(position.id))
        .filter(job_offers::status.eq(OfferStatus::Sent.as_str()))
        .count()
        .get_result(conn)?;
    if active > 0 {
        debug!(position_id = %position.id, "Position already has an active offer");
        return Ok(CascadeOutcome::AlreadyResolved);
    }

    let candidate = load_candidate(conn, offer_id)?;
    if !candidate.eligible() {
        return Err(EngineError::InvalidTransition {
            offer_id,
            status: status.as_str(),
            event: OfferEvent::Send.as_str(),
        });
    }

    let job = load_job(conn, offer.job_id, position.id)?;
    send_offer(conn, &job, &position, &candidate, now, accept_base_url)?;
    Ok(CascadeOutcome::Sent { offer_id })
}

/// Queues the offer message and opens the response window.
///
/// The deadline is computed at send time, never at offer creation.
fn send_offer(
    conn: &mut PgConnection,
    job: &Job,
    position: &JobPosition,
    candidate: &CascadeCandidate,
    now: NaiveDateTime,
    accept_base_url: &str,
) -> Result<(), EngineError> {
    let deadline = now + Duration::minutes(position.response_window_minutes as i64);

    let body = OfferMessage {
        hirer_name: &job.hirer_name,
        role_name: &position.role_name,
        job_name: &job.job_name,
        work_start_date: job.work_start_date,
        work_end_date: job.work_end_date,
        day_rate: job.day_rate,
        location: &job.location,
        response_token: &candidate.response_token,
        window_minutes: position.response_window_minutes,
    }
    .body(accept_base_url);

    let message = NewQueuedMessage::immediate(
        Some(candidate.offer_id),
        Some(candidate.crew_member_id),
        candidate.phone.clone(),
        body,
        MessageKind::JobOffer,
        now,
    );
    diesel::insert_into(crate::database::schema::sms_queue::table)
        .values(&message)
        .execute(conn)?;

    diesel::update(job_offers::table.find(candidate.offer_id))
        .set((
            job_offers::status.eq(OfferStatus::Sent.as_str()),
            job_offers::sent_at.eq(Some(now)),
            job_offers::deadline_at.eq(Some(deadline)),
            job_offers::updated_at.eq(now),
        ))
        .execute(conn)?;

    info!(
        offer_id = %candidate.offer_id,
        position_id = %position.id,
        crew_member_id = %candidate.crew_member_id,
        deadline = %deadline,
        "Offer sent"
    );
    Ok(())
}

/// Creates pending offers for list members that do not yet have one for
/// this position, copying each member's priority rank.
fn seed_offers(
    conn: &mut PgConnection,
    position: &JobPosition,
    _now: NaiveDateTime,
) -> Result<(), EngineError> {
    let ranked: Vec<(Uuid, i32)> = crew_list_members::table
        .filter(crew_list_members::crew_list_id.eq(position.crew_list_id))
        .select((crew_list_members::crew_member_id, crew_list_members::priority_rank))
        .order(crew_list_members::priority_rank.asc())
        .load(conn)?;

    let existing: Vec<Uuid> = job_offers::table
        .filter(job_offers::position_id.eq(position.id))
        .select(job_offers::crew_member_id)
        .load(conn)?;

    let new_offers: Vec<NewJobOffer> = ranked
        .into_iter()
        .filter(|(member_id, _)| !existing.contains(member_id))
        .map(|(member_id, rank)| {
            NewJobOffer::pending(position.job_id, position.id, member_id, rank)
        })
        .collect();

    if !new_offers.is_empty() {
        diesel::insert_into(job_offers::table)
            .values(&new_offers)
            .execute(conn)?;
        debug!(
            position_id = %position.id,
            count = new_offers.len(),
            "Seeded pending offers from crew list"
        );
    }
    Ok(())
}

fn load_offer(conn: &mut PgConnection, offer_id: Uuid) -> Result<JobOffer, EngineError> {
    job_offers::table
        .find(offer_id)
        .first(conn)
        .optional()?
        .ok_or(EngineError::Store(StoreError::NotFound {
            entity: "job_offer",
            id: offer_id,
        }))
}

/// Takes the position row lock that serializes all cascades for a position.
fn lock_position(
    conn: &mut PgConnection,
    position_id: Uuid,
    offer_id: Uuid,
) -> Result<JobPosition, EngineError> {
    job_positions::table
        .find(position_id)
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(EngineError::MissingPosition {
            offer_id,
            position_id,
        })
}

fn lock_position_direct(
    conn: &mut PgConnection,
    position_id: Uuid,
) -> Result<JobPosition, EngineError> {
    job_positions::table
        .find(position_id)
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(EngineError::Store(StoreError::NotFound {
            entity: "job_position",
            id: position_id,
        }))
}

fn load_job(
    conn: &mut PgConnection,
    job_id: Uuid,
    position_id: Uuid,
) -> Result<Job, EngineError> {
    jobs::table
        .find(job_id)
        .first(conn)
        .optional()?
        .ok_or(EngineError::MissingJob {
            job_id,
            position_id,
        })
}

/// Loads every pending offer for the position joined with its candidate's
/// consent flags.
fn load_candidates(
    conn: &mut PgConnection,
    position_id: Uuid,
) -> Result<Vec<CascadeCandidate>, EngineError> {
    let rows: Vec<(Uuid, Uuid, i32, bool, bool, String, String)> = job_offers::table
        .inner_join(crew_members::table)
        .filter(job_offers::position_id.eq(position_id))
        .filter(job_offers::status.eq(OfferStatus::Pending.as_str()))
        .select((
            job_offers::id,
            job_offers::crew_member_id,
            job_offers::priority_rank,
            crew_members::sms_confirmed,
            crew_members::opted_out,
            crew_members::phone,
            job_offers::response_token,
        ))
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(
            |(offer_id, crew_member_id, priority_rank, sms_confirmed, opted_out, phone, token)| {
                CascadeCandidate {
                    offer_id,
                    crew_member_id,
                    priority_rank,
                    sms_confirmed,
                    opted_out,
                    phone,
                    response_token: token,
                }
            },
        )
        .collect())
}

/// Loads a single pending offer as a cascade candidate.
fn load_candidate(
    conn: &mut PgConnection,
    offer_id: Uuid,
) -> Result<CascadeCandidate, EngineError> {
    let (id, crew_member_id, priority_rank, sms_confirmed, opted_out, phone, token): (
        Uuid,
        Uuid,
        i32,
        bool,
        bool,
        String,
        String,
    ) = job_offers::table
        .inner_join(crew_members::table)
        .filter(job_offers::id.eq(offer_id))
        .select((
            job_offers::id,
            job_offers::crew_member_id,
            job_offers::priority_rank,
            crew_members::sms_confirmed,
            crew_members::opted_out,
            crew_members::phone,
            job_offers::response_token,
        ))
        .first(conn)
        .optional()?
        .ok_or(EngineError::Store(StoreError::NotFound {
            entity: "job_offer",
            id: offer_id,
        }))?;

    Ok(CascadeCandidate {
        offer_id: id,
        crew_member_id,
        priority_rank,
        sms_confirmed,
        opted_out,
        phone,
        response_token: token,
    })
}
