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

//! Job Offer Model
//!
//! The offer is the system's central record: one (position, candidate)
//! pairing carrying the status lifecycle, the priority rank copied from the
//! list at creation, and the opaque response token used in web acceptance
//! links.
//!
//! Lifecycle (terminal states marked `*`):
//!
//! ```text
//! pending  -> sent        (deadline set, message queued)
//! sent     -> accepted*
//! sent     -> declined*   -> triggers cascade
//! sent     -> expired*    -> triggers cascade
//! ```

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Closed status enumeration for job offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Created from the list, not yet contacted
    Pending,
    /// Message queued, response window open
    Sent,
    /// Candidate accepted (terminal)
    Accepted,
    /// Candidate declined (terminal)
    Declined,
    /// Response window lapsed (terminal)
    Expired,
}

impl OfferStatus {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Sent => "sent",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
            OfferStatus::Expired => "expired",
        }
    }

    /// Parses stored text, rejecting anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OfferStatus::Pending),
            "sent" => Some(OfferStatus::Sent),
            "accepted" => Some(OfferStatus::Accepted),
            "declined" => Some(OfferStatus::Declined),
            "expired" => Some(OfferStatus::Expired),
            _ => None,
        }
    }

    /// Whether no further transition is possible from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OfferStatus::Accepted | OfferStatus::Declined | OfferStatus::Expired
        )
    }

    /// The state reached by applying `event`, or `None` if the event is not
    /// legal from this state. Race losers (event against an already
    /// terminal offer) get `None` and are treated as benign no-ops by the
    /// engine.
    pub fn apply(&self, event: OfferEvent) -> Option<OfferStatus> {
        match (self, event) {
            (OfferStatus::Pending, OfferEvent::Send) => Some(OfferStatus::Sent),
            (OfferStatus::Sent, OfferEvent::Accept) => Some(OfferStatus::Accepted),
            (OfferStatus::Sent, OfferEvent::Decline) => Some(OfferStatus::Declined),
            (OfferStatus::Sent, OfferEvent::Expire) => Some(OfferStatus::Expired),
            _ => None,
        }
    }
}

/// Events accepted by the offer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferEvent {
    /// Queue the offer message and open the response window
    Send,
    /// Candidate replied affirmatively
    Accept,
    /// Candidate replied negatively; cascades
    Decline,
    /// Deadline lapsed with no reply; cascades
    Expire,
}

impl OfferEvent {
    /// Event name for logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferEvent::Send => "send",
            OfferEvent::Accept => "accept",
            OfferEvent::Decline => "decline",
            OfferEvent::Expire => "expire",
        }
    }

    /// Whether this event terminates the offer and triggers a cascade.
    pub fn cascades(&self) -> bool {
        matches!(self, OfferEvent::Decline | OfferEvent::Expire)
    }
}

/// Channel a response arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseChannel {
    /// Inbound SMS reply
    Sms,
    /// Candidate-facing acceptance link
    Web,
}

impl ResponseChannel {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseChannel::Sms => "sms",
            ResponseChannel::Web => "web",
        }
    }
}

/// A job offer row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::job_offers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobOffer {
    /// Unique identifier
    pub id: Uuid,
    /// Owning job
    pub job_id: Uuid,
    /// Owning position
    pub position_id: Uuid,
    /// Candidate this offer targets
    pub crew_member_id: Uuid,
    /// Stored status text; use [`JobOffer::offer_status`] for the typed view
    pub status: String,
    /// Priority rank copied from the list at creation; lower contacted first
    pub priority_rank: i32,
    /// Opaque unguessable token for web acceptance links, never reused
    pub response_token: String,
    /// When the offer message was queued and the window opened
    pub sent_at: Option<NaiveDateTime>,
    /// End of the response window
    pub deadline_at: Option<NaiveDateTime>,
    /// When the candidate responded
    pub response_at: Option<NaiveDateTime>,
    /// Channel the response arrived on
    pub response_channel: Option<String>,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

impl JobOffer {
    /// Parses the stored status into the closed enumeration.
    pub fn offer_status(&self) -> Result<OfferStatus, StoreError> {
        OfferStatus::parse(&self.status).ok_or_else(|| StoreError::InvalidStatus {
            field: "job_offers.status",
            id: self.id,
            value: self.status.clone(),
        })
    }
}

/// A new job offer to be inserted.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::job_offers)]
pub struct NewJobOffer {
    /// Owning job
    pub job_id: Uuid,
    /// Owning position
    pub position_id: Uuid,
    /// Candidate this offer targets
    pub crew_member_id: Uuid,
    /// Initial status, always `pending`
    pub status: String,
    /// Priority rank copied from the list
    pub priority_rank: i32,
    /// Freshly generated response token
    pub response_token: String,
}

impl NewJobOffer {
    /// Creates a pending offer with a fresh response token.
    pub fn pending(job_id: Uuid, position_id: Uuid, crew_member_id: Uuid, rank: i32) -> Self {
        Self {
            job_id,
            position_id,
            crew_member_id,
            status: OfferStatus::Pending.as_str().to_string(),
            priority_rank: rank,
            response_token: generate_response_token(),
        }
    }
}

/// Length of generated response tokens.
const RESPONSE_TOKEN_LEN: usize = 32;

/// Generates an opaque alphanumeric response token.
///
/// Tokens are generated once per offer and never reused; uniqueness is
/// additionally enforced by the database.
pub fn generate_response_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESPONSE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OfferStatus::Pending,
            OfferStatus::Sent,
            OfferStatus::Accepted,
            OfferStatus::Declined,
            OfferStatus::Expired,
        ] {
            assert_eq!(OfferStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(OfferStatus::parse("cancelled"), None);
        assert_eq!(OfferStatus::parse("SENT"), None);
    }

    #[test]
    fn test_legal_transitions() {
        assert_eq!(
            OfferStatus::Pending.apply(OfferEvent::Send),
            Some(OfferStatus::Sent)
        );
        assert_eq!(
            OfferStatus::Sent.apply(OfferEvent::Accept),
            Some(OfferStatus::Accepted)
        );
        assert_eq!(
            OfferStatus::Sent.apply(OfferEvent::Decline),
            Some(OfferStatus::Declined)
        );
        assert_eq!(
            OfferStatus::Sent.apply(OfferEvent::Expire),
            Some(OfferStatus::Expired)
        );
    }

    #[test]
    fn test_terminal_states_reject_all_events() {
        for status in [
            OfferStatus::Accepted,
            OfferStatus::Declined,
            OfferStatus::Expired,
        ] {
            assert!(status.is_terminal());
            for event in [
                OfferEvent::Send,
                OfferEvent::Accept,
                OfferEvent::Decline,
                OfferEvent::Expire,
            ] {
                assert_eq!(status.apply(event), None);
            }
        }
    }

    #[test]
    fn test_pending_cannot_skip_sent() {
        assert_eq!(OfferStatus::Pending.apply(OfferEvent::Accept), None);
        assert_eq!(OfferStatus::Pending.apply(OfferEvent::Decline), None);
        assert_eq!(OfferStatus::Pending.apply(OfferEvent::Expire), None);
    }

    #[test]
    fn test_cascading_events() {
        assert!(OfferEvent::Decline.cascades());
        assert!(OfferEvent::Expire.cascades());
        assert!(!OfferEvent::Accept.cascades());
        assert!(!OfferEvent::Send.cascades());
    }

    #[test]
    fn test_response_token_shape() {
        let a = generate_response_token();
        let b = generate_response_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
