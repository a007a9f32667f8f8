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

//! Error types for the offer cascade and delivery engine.
//!
//! The taxonomy follows the engine's failure model:
//!
//! - [`StoreError`]: database access failures (pool, query, missing rows,
//!   unparseable status text)
//! - [`EngineError`]: offer state machine failures, including
//!   data-integrity problems discovered mid-cascade
//! - [`RouterError`]: inbound response handling failures
//! - [`TransportError`]: SMS provider call failures, split into transient
//!   (retried with backoff) and permanent rejections
//!
//! Race losses (an offer already terminal when a transition is attempted)
//! are deliberately *not* errors; they surface as
//! [`CascadeOutcome::AlreadyResolved`](crate::engine::CascadeOutcome).

use thiserror::Error;
use uuid::Uuid;

/// Errors arising from the store gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to get a connection from the pool or run the interact closure
    #[error("Database connection pool error: {0}")]
    ConnectionPool(String),

    /// A Diesel query failed
    #[error("Database query error: {0}")]
    Query(#[from] diesel::result::Error),

    /// A row the engine depends on does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name, e.g. "job_offer"
        entity: &'static str,
        /// Row id that was looked up
        id: Uuid,
    },

    /// A status column held text outside the closed enumeration
    #[error("Invalid {field} value in row {id}: {value:?}")]
    InvalidStatus {
        /// Column name
        field: &'static str,
        /// Row id
        id: Uuid,
        /// The offending stored text
        value: String,
    },
}

/// Errors arising from offer state machine transitions.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The event is not legal from the offer's current state.
    ///
    /// Race losses are not reported this way; this covers genuinely
    /// malformed requests such as accepting an offer that was never sent.
    #[error("Offer {offer_id}: event {event} is not valid from status {status}")]
    InvalidTransition {
        /// Offer being transitioned
        offer_id: Uuid,
        /// Stored status at the time of the attempt
        status: &'static str,
        /// The rejected event
        event: &'static str,
    },

    /// The offer's position row is missing (data integrity; not retried)
    #[error("Position {position_id} not found while processing offer {offer_id}")]
    MissingPosition {
        /// Offer being processed
        offer_id: Uuid,
        /// The dangling position reference
        position_id: Uuid,
    },

    /// The position's job row is missing (data integrity; not retried)
    #[error("Job {job_id} not found while cascading position {position_id}")]
    MissingJob {
        /// The dangling job reference
        job_id: Uuid,
        /// Position being cascaded
        position_id: Uuid,
    },
}

impl From<diesel::result::Error> for EngineError {
    fn from(e: diesel::result::Error) -> Self {
        EngineError::Store(StoreError::Query(e))
    }
}

/// Errors arising from inbound response routing.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Underlying store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A transition triggered by the inbound reply failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors returned by the SMS transport provider.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level failure reaching the provider (transient)
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider rejected the send
    #[error("Provider rejected send (status {status}): {message}")]
    Rejected {
        /// HTTP status code from the provider
        status: u16,
        /// Provider-supplied error text
        message: String,
    },
}
