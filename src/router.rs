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

//! Inbound response router.
//!
//! Turns raw SMS replies into consent changes and offer transitions.
//! Keyword matching is exact after trimming and uppercasing; anything
//! else earns a short "invalid reply" nudge. Replies from numbers we do
//! not know are logged and dropped, never answered.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::composer;
use crate::config::EngineConfig;
use crate::dal::DAL;
use crate::engine::{CascadeOutcome, OfferEngine};
use crate::error::RouterError;
use crate::models::{
    CrewMember, MessageKind, NewQueuedMessage, OfferEvent, ResponseChannel,
};

/// A recognized inbound keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `YES`: confirm SMS consent
    OptIn,
    /// `STOP`: opt out of all SMS
    OptOut,
    /// `HELP`: support information
    Help,
    /// `1`: accept the active offer
    Accept,
    /// `2`: decline the active offer
    Decline,
    /// `3`: request the offer details link
    InfoLink,
    /// Anything else (original text preserved for logging)
    Unrecognized(String),
}

impl Command {
    /// Parses a raw reply body. Matching is case-insensitive and ignores
    /// surrounding whitespace, but is otherwise exact: `YES PLEASE` is
    /// unrecognized, not an opt-in.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "YES" => Command::OptIn,
            "STOP" => Command::OptOut,
            "HELP" => Command::Help,
            "1" => Command::Accept,
            "2" => Command::Decline,
            "3" => Command::InfoLink,
            _ => Command::Unrecognized(raw.trim().to_string()),
        }
    }
}

/// Webhook payload delivered by the SMS provider for an inbound message.
#[derive(Debug, Deserialize)]
pub struct InboundSms {
    /// Sender's phone number in E.164
    #[serde(rename = "originationNumber")]
    pub origination_number: String,
    /// Raw reply body
    #[serde(rename = "messageBody")]
    pub message_body: String,
}

/// Routes inbound replies to consent updates and offer transitions.
#[derive(Clone)]
pub struct InboundRouter {
    dal: DAL,
    engine: OfferEngine,
    config: EngineConfig,
}

impl InboundRouter {
    /// Creates a new router.
    pub fn new(dal: DAL, engine: OfferEngine, config: EngineConfig) -> Self {
        Self {
            dal,
            engine,
            config,
        }
    }

    /// Handles a raw provider webhook body. A payload that does not parse
    /// is logged and dropped; the provider still gets a success so it does
    /// not redeliver garbage.
    pub async fn handle_webhook(&self, payload: &str) -> Result<(), RouterError> {
        let inbound: InboundSms = match serde_json::from_str(payload) {
            Ok(inbound) => inbound,
            Err(e) => {
                warn!("Dropping unparseable inbound webhook: {}", e);
                return Ok(());
            }
        };
        self.handle(&inbound.origination_number, &inbound.message_body)
            .await
    }

    /// Handles one inbound reply from `from_phone`.
    pub async fn handle(&self, from_phone: &str, raw_text: &str) -> Result<(), RouterError> {
        let member = match self.dal.crew_members().find_by_phone(from_phone).await? {
            Some(member) => member,
            None => {
                info!("Ignoring reply from unknown number");
                return Ok(());
            }
        };

        let command = Command::parse(raw_text);
        debug!(crew_member_id = %member.id, command = ?command, "Routing inbound reply");
        let now = chrono::Utc::now().naive_utc();

        match command {
            Command::OptIn => {
                // Gate on confirmation alone: a YES after STOP must not
                // clear the opt-out.
                if member.sms_confirmed {
                    debug!(crew_member_id = %member.id, "Redundant opt-in, ignoring");
                } else {
                    self.dal.crew_members().confirm_sms_consent(member.id, now).await?;
                    self.reply(&member, composer::OPT_IN_CONFIRMED, MessageKind::OptInConfirm, now)
                        .await?;
                }
            }
            Command::OptOut => {
                self.dal.crew_members().opt_out(member.id, now).await?;
                // Carriers require a final confirmation of the opt-out.
                self.reply(&member, composer::OPTED_OUT, MessageKind::OptOutConfirm, now)
                    .await?;
            }
            Command::Help => {
                self.reply(&member, composer::HELP, MessageKind::Help, now)
                    .await?;
            }
            Command::Accept => self.resolve_offer(&member, OfferEvent::Accept, now).await?,
            Command::Decline => self.resolve_offer(&member, OfferEvent::Decline, now).await?,
            Command::InfoLink => {
                match self.dal.offers().latest_sent_for_member(member.id).await? {
                    Some(offer) => {
                        let body = composer::info_link_body(
                            self.config.accept_base_url(),
                            &offer.response_token,
                        );
                        self.reply(&member, &body, MessageKind::InfoLink, now).await?;
                    }
                    None => {
                        info!(crew_member_id = %member.id, "No active job offer found");
                    }
                }
            }
            Command::Unrecognized(text) => {
                debug!(crew_member_id = %member.id, text = %text, "Unrecognized reply");
                self.reply(&member, composer::INVALID_REPLY, MessageKind::InvalidReply, now)
                    .await?;
            }
        }

        Ok(())
    }

    /// Applies an accept/decline to the member's active offer and queues
    /// the appropriate confirmation.
    async fn resolve_offer(
        &self,
        member: &CrewMember,
        event: OfferEvent,
        now: NaiveDateTime,
    ) -> Result<(), RouterError> {
        let offer = match self.dal.offers().latest_sent_for_member(member.id).await? {
            Some(offer) => offer,
            None => {
                // A reply with nothing to act on earns no nudge.
                info!(crew_member_id = %member.id, "No active job offer found");
                return Ok(());
            }
        };

        let outcome = self
            .engine
            .transition(offer.id, event, Some(ResponseChannel::Sms))
            .await?;

        match outcome {
            CascadeOutcome::AlreadyResolved => {
                // The window closed (or someone raced us) before the reply
                // landed. Stale, same as no active offer.
                info!(offer_id = %offer.id, "Reply to an already-resolved offer");
                Ok(())
            }
            _ => {
                let (body, kind) = match event {
                    OfferEvent::Accept => (composer::JOB_ACCEPTED, MessageKind::AcceptedConfirm),
                    _ => (composer::JOB_DECLINED, MessageKind::DeclinedConfirm),
                };
                self.reply_for_offer(member, offer.id, body, kind, now).await
            }
        }
    }

    async fn reply(
        &self,
        member: &CrewMember,
        body: &str,
        kind: MessageKind,
        now: NaiveDateTime,
    ) -> Result<(), RouterError> {
        self.dal
            .message_queue()
            .enqueue(NewQueuedMessage::immediate(
                None,
                Some(member.id),
                member.phone.clone(),
                body,
                kind,
                now,
            ))
            .await?;
        Ok(())
    }

    async fn reply_for_offer(
        &self,
        member: &CrewMember,
        offer_id: uuid::Uuid,
        body: &str,
        kind: MessageKind,
        now: NaiveDateTime,
    ) -> Result<(), RouterError> {
        self.dal
            .message_queue()
            .enqueue(NewQueuedMessage::immediate(
                Some(offer_id),
                Some(member.id),
                member.phone.clone(),
                body,
                kind,
                now,
            ))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Command::parse("YES"), Command::OptIn);
        assert_eq!(Command::parse("STOP"), Command::OptOut);
        assert_eq!(Command::parse("HELP"), Command::Help);
        assert_eq!(Command::parse("1"), Command::Accept);
        assert_eq!(Command::parse("2"), Command::Decline);
        assert_eq!(Command::parse("3"), Command::InfoLink);
    }

    #[test]
    fn test_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Command::parse("  yes "), Command::OptIn);
        assert_eq!(Command::parse("Stop\n"), Command::OptOut);
        assert_eq!(Command::parse(" 1 "), Command::Accept);
    }

    #[test]
    fn test_parse_rejects_inexact_matches() {
        assert_eq!(
            Command::parse("YES PLEASE"),
            Command::Unrecognized("YES PLEASE".to_string())
        );
        assert_eq!(
            Command::parse("11"),
            Command::Unrecognized("11".to_string())
        );
        assert_eq!(Command::parse(""), Command::Unrecognized(String::new()));
    }

    #[test]
    fn test_webhook_payload_parses() {
        let payload = r#"{"originationNumber":"+15551234567","messageBody":"1"}"#;
        let inbound: InboundSms = serde_json::from_str(payload).unwrap();
        assert_eq!(inbound.origination_number, "+15551234567");
        assert_eq!(inbound.message_body, "1");
    }
}
