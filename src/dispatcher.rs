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

//! Outbound queue dispatcher.
//!
//! Periodically drains due messages from the SMS queue and hands them to
//! the configured [`SmsTransport`]. A failed send either reschedules the
//! message with a linear backoff or, once the attempt budget is spent,
//! parks it in the terminal `failed` state. One bad message never stalls
//! the rest of the batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::dal::DAL;
use crate::models::QueuedMessage;
use crate::transport::SmsTransport;

/// Outcome of a single dispatch pass.
#[derive(Debug, Default, Serialize)]
pub struct DispatchSummary {
    /// Messages picked up by this pass.
    pub processed: usize,
    /// Messages handed to the provider successfully.
    pub succeeded: usize,
    /// Messages that failed this pass (retryable or terminal).
    pub failed: usize,
    /// Per-message error descriptions.
    pub errors: Vec<String>,
}

/// What to do with a message after a failed send attempt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RetryDecision {
    /// Try again no earlier than the given time.
    Retry { next_scheduled: NaiveDateTime },
    /// Attempt budget exhausted; park the message as failed.
    GiveUp,
}

/// Decides whether a message that just failed its `new_attempts`-th send
/// should be retried. The backoff grows linearly with the attempt count,
/// so successive retries are strictly further apart.
pub(crate) fn retry_decision(
    new_attempts: i32,
    max_attempts: i32,
    backoff: Duration,
    now: NaiveDateTime,
) -> RetryDecision {
    if new_attempts >= max_attempts {
        return RetryDecision::GiveUp;
    }
    let delay = chrono::Duration::seconds(backoff.as_secs() as i64 * i64::from(new_attempts));
    RetryDecision::Retry {
        next_scheduled: now + delay,
    }
}

/// Normalizes a stored phone number to E.164 for the provider.
///
/// Numbers already carrying a `+` prefix pass through unchanged; anything
/// else is stripped to digits and treated as a North American number.
pub fn normalize_e164(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("+1{}", digits)
}

/// Drains the SMS queue on an interval.
pub struct QueueDispatcher {
    dal: DAL,
    transport: Arc<dyn SmsTransport>,
    config: EngineConfig,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl QueueDispatcher {
    /// Creates a new dispatcher over the given queue and transport.
    pub fn new(dal: DAL, transport: Arc<dyn SmsTransport>, config: EngineConfig) -> Self {
        Self {
            dal,
            transport,
            config,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals the dispatch loop to stop after its current pass.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    /// Runs the dispatch loop until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        let mut interval = tokio::time::interval(self.config.dispatch_interval());
        info!(
            interval_secs = self.config.dispatch_interval().as_secs(),
            "Queue dispatcher started"
        );

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(summary) if summary.processed > 0 => {
                            info!(
                                processed = summary.processed,
                                succeeded = summary.succeeded,
                                failed = summary.failed,
                                "Dispatch pass complete"
                            );
                        }
                        Ok(_) => debug!("Dispatch pass found no due messages"),
                        Err(e) => error!("Dispatch pass failed: {}", e),
                    }
                }
                _ = self.shutdown.notified() => {
                    break;
                }
            }
        }

        info!("Queue dispatcher stopped");
    }

    /// Performs a single dispatch pass over the due messages.
    pub async fn run_once(&self) -> Result<DispatchSummary, crate::error::StoreError> {
        let now = chrono::Utc::now().naive_utc();
        let batch = self
            .dal
            .message_queue()
            .due_batch(now, self.config.dispatch_batch_size())
            .await?;

        let mut summary = DispatchSummary {
            processed: batch.len(),
            ..Default::default()
        };

        for message in batch {
            let message_id = message.id;
            match self.dispatch_one(message).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", message_id, e));
                }
            }
        }

        Ok(summary)
    }

    /// Sends one message and records the result. Returns `Err` only when
    /// the send failed; bookkeeping errors are surfaced directly.
    async fn dispatch_one(&self, message: QueuedMessage) -> Result<(), DispatchError> {
        let to = normalize_e164(&message.phone);
        let now = chrono::Utc::now().naive_utc();

        match self.transport.send(&to, &message.body).await {
            Ok(provider_message_id) => {
                debug!(
                    message_id = %message.id,
                    provider_message_id = %provider_message_id,
                    "Message sent"
                );
                self.dal
                    .message_queue()
                    .mark_sent(message.id, provider_message_id, now)
                    .await?;
                Ok(())
            }
            Err(send_error) => {
                let new_attempts = message.attempts + 1;
                let decision = retry_decision(
                    new_attempts,
                    self.config.max_send_attempts(),
                    self.config.retry_backoff(),
                    now,
                );
                let (terminal, next_scheduled) = match decision {
                    RetryDecision::Retry { next_scheduled } => {
                        warn!(
                            message_id = %message.id,
                            attempts = new_attempts,
                            "Send failed, retrying later: {}",
                            send_error
                        );
                        (false, next_scheduled)
                    }
                    RetryDecision::GiveUp => {
                        error!(
                            message_id = %message.id,
                            attempts = new_attempts,
                            "Send failed permanently: {}",
                            send_error
                        );
                        (true, message.scheduled_for)
                    }
                };
                self.dal
                    .message_queue()
                    .record_failure(
                        message.id,
                        send_error.to_string(),
                        new_attempts,
                        terminal,
                        next_scheduled,
                        now,
                    )
                    .await?;
                Err(DispatchError::Send(send_error))
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum DispatchError {
    #[error("send failed: {0}")]
    Send(#[from] crate::error::TransportError),
    #[error(transparent)]
    Store(#[from] crate::error::StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn normalize_passes_through_plus_prefixed_numbers() {
        assert_eq!(normalize_e164("+15551234567"), "+15551234567");
        assert_eq!(normalize_e164("  +447700900123 "), "+447700900123");
    }

    #[test]
    fn normalize_strips_punctuation_and_adds_country_code() {
        assert_eq!(normalize_e164("5551234567"), "+15551234567");
        assert_eq!(normalize_e164("(555) 123-4567"), "+15551234567");
        assert_eq!(normalize_e164("555.123.4567"), "+15551234567");
    }

    #[test]
    fn retry_backoff_grows_with_attempts() {
        let backoff = Duration::from_secs(120);
        let now = at(12, 0);

        let first = retry_decision(1, 3, backoff, now);
        let second = retry_decision(2, 3, backoff, now);

        let RetryDecision::Retry { next_scheduled: a } = first else {
            panic!("first failure should retry");
        };
        let RetryDecision::Retry { next_scheduled: b } = second else {
            panic!("second failure should retry");
        };
        assert_eq!(a, at(12, 2));
        assert_eq!(b, at(12, 4));
        assert!(b > a);
    }

    #[test]
    fn retry_gives_up_at_attempt_budget() {
        let backoff = Duration::from_secs(120);
        assert_eq!(
            retry_decision(3, 3, backoff, at(12, 0)),
            RetryDecision::GiveUp
        );
        assert_eq!(
            retry_decision(5, 3, backoff, at(12, 0)),
            RetryDecision::GiveUp
        );
    }

    #[tokio::test]
    async fn mock_transport_fails_then_succeeds() {
        use crate::transport::testing::MockTransport;
        use crate::transport::SmsTransport;

        let transport = MockTransport::failing(1);
        assert!(transport.send("+15551234567", "hello").await.is_err());
        let id = transport.send("+15551234567", "hello").await.unwrap();
        assert_eq!(id, "mock-1");
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }
}
