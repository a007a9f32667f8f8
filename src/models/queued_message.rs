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

//! Queued Message Model
//!
//! One outbound SMS awaiting delivery. Messages reference their offer
//! weakly (nullable) and carry attempt accounting for the dispatcher's
//! bounded retry with backoff. Once attempts reach the configured maximum
//! the status becomes terminal `failed` and is never retried automatically.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Closed status enumeration for queued messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// Awaiting delivery (possibly rescheduled after a transient failure)
    Pending,
    /// Delivered to the provider
    Sent,
    /// Attempt cap reached; terminal, surfaced for manual inspection
    Failed,
}

impl MessageStatus {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
        }
    }

    /// Parses stored text, rejecting anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MessageStatus::Pending),
            "sent" => Some(MessageStatus::Sent),
            "failed" => Some(MessageStatus::Failed),
            _ => None,
        }
    }
}

/// What a queued message is about; drives nothing at delivery time but
/// keeps the queue auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A job offer with response instructions
    JobOffer,
    /// Opt-in (double opt-in completion) confirmation
    OptInConfirm,
    /// Opt-out confirmation
    OptOutConfirm,
    /// Static help text
    Help,
    /// Acceptance confirmation
    AcceptedConfirm,
    /// Decline confirmation
    DeclinedConfirm,
    /// Link to full job details
    InfoLink,
    /// "Invalid response" guidance
    InvalidReply,
}

impl MessageKind {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::JobOffer => "job_offer",
            MessageKind::OptInConfirm => "opt_in_confirm",
            MessageKind::OptOutConfirm => "opt_out_confirm",
            MessageKind::Help => "help",
            MessageKind::AcceptedConfirm => "accepted_confirm",
            MessageKind::DeclinedConfirm => "declined_confirm",
            MessageKind::InfoLink => "info_link",
            MessageKind::InvalidReply => "invalid_reply",
        }
    }
}

/// A queued message row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::sms_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QueuedMessage {
    /// Unique identifier
    pub id: Uuid,
    /// Weak reference to the offer this message is about, if any
    pub offer_id: Option<Uuid>,
    /// Recipient crew member, if known
    pub crew_member_id: Option<Uuid>,
    /// Recipient phone as stored; normalized to E.164 at send time
    pub phone: String,
    /// Message body
    pub body: String,
    /// Message kind text
    pub kind: String,
    /// Stored status text; use [`QueuedMessage::message_status`]
    pub status: String,
    /// Delivery attempts made so far
    pub attempts: i32,
    /// Next-eligible-send time; pushed forward on transient failures
    pub scheduled_for: NaiveDateTime,
    /// When delivery succeeded
    pub sent_at: Option<NaiveDateTime>,
    /// Provider message id recorded on success
    pub provider_message_id: Option<String>,
    /// Most recent delivery error
    pub last_error: Option<String>,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

impl QueuedMessage {
    /// Parses the stored status into the closed enumeration.
    pub fn message_status(&self) -> Result<MessageStatus, StoreError> {
        MessageStatus::parse(&self.status).ok_or_else(|| StoreError::InvalidStatus {
            field: "sms_queue.status",
            id: self.id,
            value: self.status.clone(),
        })
    }
}

/// A new queued message to be inserted.
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::database::schema::sms_queue)]
pub struct NewQueuedMessage {
    /// Weak reference to the offer this message is about, if any
    pub offer_id: Option<Uuid>,
    /// Recipient crew member, if known
    pub crew_member_id: Option<Uuid>,
    /// Recipient phone
    pub phone: String,
    /// Message body
    pub body: String,
    /// Message kind text
    pub kind: String,
    /// Initial status, always `pending`
    pub status: String,
    /// Eligible to send from this time
    pub scheduled_for: NaiveDateTime,
}

impl NewQueuedMessage {
    /// Creates a message eligible to send immediately.
    pub fn immediate(
        offer_id: Option<Uuid>,
        crew_member_id: Option<Uuid>,
        phone: impl Into<String>,
        body: impl Into<String>,
        kind: MessageKind,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            offer_id,
            crew_member_id,
            phone: phone.into(),
            body: body.into(),
            kind: kind.as_str().to_string(),
            status: MessageStatus::Pending.as_str().to_string(),
            scheduled_for: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            MessageStatus::Pending,
            MessageStatus::Sent,
            MessageStatus::Failed,
        ] {
            assert_eq!(MessageStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MessageStatus::parse("sending"), None);
    }
}
