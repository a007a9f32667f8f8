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

//! Deadline sweeper.
//!
//! Periodically expires sent offers whose response window has closed and
//! lets the engine cascade to the next candidate. The sweep is idempotent:
//! an offer another actor resolved between the scan and the transition
//! comes back as [`CascadeOutcome::AlreadyResolved`] and is simply skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::dal::DAL;
use crate::engine::{CascadeOutcome, OfferEngine};
use crate::error::StoreError;
use crate::models::OfferEvent;

/// Outcome of a single sweep pass.
#[derive(Debug, Default, Serialize)]
pub struct SweepSummary {
    /// Overdue offers the scan picked up.
    pub processed: usize,
    /// Offers moved to `expired` by this pass.
    pub expired: usize,
    /// Expirations that sent a follow-up offer to the next candidate.
    pub cascaded: usize,
    /// Offers whose expiration failed; they stay due and are retried on
    /// the next pass.
    pub failed: usize,
    /// Per-offer error descriptions.
    pub errors: Vec<String>,
}

/// Expires overdue offers on an interval.
pub struct DeadlineSweeper {
    dal: DAL,
    engine: OfferEngine,
    config: EngineConfig,
    shutdown: Arc<Notify>,
    running: Arc<AtomicBool>,
}

impl DeadlineSweeper {
    /// Creates a new sweeper over the given store and engine.
    pub fn new(dal: DAL, engine: OfferEngine, config: EngineConfig) -> Self {
        Self {
            dal,
            engine,
            config,
            shutdown: Arc::new(Notify::new()),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals the sweep loop to stop after its current pass.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    /// Runs the sweep loop until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        let mut interval = tokio::time::interval(self.config.sweep_interval());
        info!(
            interval_secs = self.config.sweep_interval().as_secs(),
            "Deadline sweeper started"
        );

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once().await {
                        Ok(summary) if summary.processed > 0 => {
                            info!(
                                processed = summary.processed,
                                expired = summary.expired,
                                cascaded = summary.cascaded,
                                failed = summary.failed,
                                "Sweep pass complete"
                            );
                        }
                        Ok(_) => debug!("Sweep pass found no overdue offers"),
                        Err(e) => error!("Sweep pass failed: {}", e),
                    }
                }
                _ = self.shutdown.notified() => {
                    break;
                }
            }
        }

        info!("Deadline sweeper stopped");
    }

    /// Performs a single sweep over every overdue offer. Each offer is
    /// expired independently so one failure cannot block the rest.
    pub async fn run_once(&self) -> Result<SweepSummary, StoreError> {
        let now = chrono::Utc::now().naive_utc();
        let overdue = self.dal.offers().find_expired(now).await?;

        let mut summary = SweepSummary {
            processed: overdue.len(),
            ..Default::default()
        };

        for offer in overdue {
            match self
                .engine
                .transition(offer.id, OfferEvent::Expire, None)
                .await
            {
                Ok(CascadeOutcome::Cascaded { next_offer_id, .. }) => {
                    debug!(offer_id = %offer.id, next_offer_id = %next_offer_id, "Offer expired, cascaded");
                    summary.expired += 1;
                    summary.cascaded += 1;
                }
                Ok(CascadeOutcome::Exhausted) => {
                    debug!(offer_id = %offer.id, "Offer expired, candidate list exhausted");
                    summary.expired += 1;
                }
                Ok(CascadeOutcome::PositionFilled) => {
                    debug!(offer_id = %offer.id, "Offer expired, position already filled");
                    summary.expired += 1;
                }
                Ok(CascadeOutcome::AlreadyResolved) => {
                    debug!(offer_id = %offer.id, "Offer resolved by another actor, skipping");
                }
                Ok(other) => {
                    debug!(offer_id = %offer.id, outcome = ?other, "Unexpected expire outcome");
                }
                Err(e) => {
                    error!(offer_id = %offer.id, "Failed to expire offer: {}", e);
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", offer.id, e));
                }
            }
        }

        Ok(summary)
    }
}
