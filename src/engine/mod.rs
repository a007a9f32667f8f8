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

//! Offer State Machine
//!
//! Owns offer lifecycle transitions and the cascade decision. Every
//! transition that can race (the sweeper's `expire` against the router's
//! `decline`/`accept`) runs inside a single transaction holding the
//! position row lock, so exactly one cascade proceeds per position per
//! event, and the race loser observes the already-terminal offer and
//! returns [`CascadeOutcome::AlreadyResolved`].
//!
//! Ordering guarantee: for a given position, offers reach `sent` in
//! strictly increasing priority-rank order, skipping only ineligible
//! (opted-out or unconfirmed) candidates.

mod cascade;
pub mod selection;

use diesel::Connection;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::database::Database;
use crate::error::{EngineError, StoreError};
use crate::models::{OfferEvent, ResponseChannel};

/// What a transition resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// A pending offer was sent (window opened, message queued)
    Sent {
        /// The offer now in `sent` status
        offer_id: Uuid,
    },
    /// The offer was accepted; `job_filled` reports whether the whole job
    /// is now satisfied
    Accepted {
        /// Every position of the job is filled
        job_filled: bool,
    },
    /// The offer was terminated and the next candidate was contacted
    Cascaded {
        /// The offer that was declined or expired
        terminated: Uuid,
        /// The next offer, now in `sent` status
        next_offer_id: Uuid,
    },
    /// The offer was terminated and no eligible candidate remains
    Exhausted,
    /// The position no longer needs crew; no cascade was attempted
    PositionFilled,
    /// Benign no-op: another actor already resolved this offer
    AlreadyResolved,
}

/// The offer state machine.
///
/// `Clone` is cheap; every clone shares the same connection pool.
#[derive(Clone)]
pub struct OfferEngine {
    database: Database,
    config: EngineConfig,
}

impl OfferEngine {
    /// Creates a new engine over a shared database.
    pub fn new(database: Database, config: EngineConfig) -> Self {
        Self { database, config }
    }

    /// Applies `event` to the offer and resolves the cascade decision.
    ///
    /// `channel` records how a response arrived and applies to `Accept`
    /// and `Decline`; it is ignored for `Send` and `Expire`.
    pub async fn transition(
        &self,
        offer_id: Uuid,
        event: OfferEvent,
        channel: Option<ResponseChannel>,
    ) -> Result<CascadeOutcome, EngineError> {
        let accept_base_url = self.config.accept_base_url().to_string();
        let conn = self.database.get_connection().await?;

        conn.interact(move |conn| {
            conn.transaction::<_, EngineError, _>(|conn| match event {
                OfferEvent::Send => cascade::send_pending(conn, offer_id, &accept_base_url),
                OfferEvent::Accept => {
                    cascade::accept(conn, offer_id, channel.unwrap_or(ResponseChannel::Sms))
                }
                OfferEvent::Decline | OfferEvent::Expire => {
                    cascade::resolve_terminal(conn, offer_id, event, channel, &accept_base_url)
                }
            })
        })
        .await
        .map_err(|e| EngineError::Store(StoreError::ConnectionPool(e.to_string())))?
    }

    /// Opens a position: seeds pending offers from the position's active
    /// crew list and sends to the lowest-ranked eligible candidate.
    pub async fn begin_position(&self, position_id: Uuid) -> Result<CascadeOutcome, EngineError> {
        let accept_base_url = self.config.accept_base_url().to_string();
        let conn = self.database.get_connection().await?;

        conn.interact(move |conn| {
            conn.transaction::<_, EngineError, _>(|conn| {
                cascade::begin_position(conn, position_id, &accept_base_url)
            })
        })
        .await
        .map_err(|e| EngineError::Store(StoreError::ConnectionPool(e.to_string())))?
    }
}
