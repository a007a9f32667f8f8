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

//! Engine configuration.
//!
//! [`EngineConfig`] collects the tunables shared by the sweeper, router and
//! dispatcher. Construct one with [`EngineConfig::builder()`]:
//!
//! ```rust
//! use callboard::config::EngineConfig;
//! use std::time::Duration;
//!
//! let config = EngineConfig::builder()
//!     .dispatch_batch_size(25)
//!     .max_send_attempts(5)
//!     .accept_base_url("https://callboard.example/accept")
//!     .build();
//! assert_eq!(config.dispatch_batch_size(), 25);
//! assert_eq!(config.sweep_interval(), Duration::from_secs(60));
//! ```

use std::time::Duration;

/// Configuration for the offer cascade and delivery engine.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EngineConfig {
    db_pool_size: u32,
    sweep_interval: Duration,
    dispatch_interval: Duration,
    dispatch_batch_size: i64,
    max_send_attempts: i32,
    retry_backoff: Duration,
    accept_base_url: String,
}

impl EngineConfig {
    /// Creates a new configuration builder with default values.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Number of database connections in the pool.
    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size
    }

    /// How often the deadline sweeper scans for lapsed offers.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// How often the queue dispatcher drains due messages.
    pub fn dispatch_interval(&self) -> Duration {
        self.dispatch_interval
    }

    /// Maximum number of queued messages processed per dispatcher pass.
    pub fn dispatch_batch_size(&self) -> i64 {
        self.dispatch_batch_size
    }

    /// Delivery attempts before a queued message becomes terminally failed.
    pub fn max_send_attempts(&self) -> i32 {
        self.max_send_attempts
    }

    /// Base delay multiplied by the attempt count when rescheduling a
    /// failed send.
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Base URL for candidate-facing acceptance links; the offer's response
    /// token is appended as a path segment.
    pub fn accept_base_url(&self) -> &str {
        &self.accept_base_url
    }

}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfigBuilder::default().build()
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone)]
pub struct EngineConfigBuilder {
    db_pool_size: u32,
    sweep_interval: Duration,
    dispatch_interval: Duration,
    dispatch_batch_size: i64,
    max_send_attempts: i32,
    retry_backoff: Duration,
    accept_base_url: String,
}

impl Default for EngineConfigBuilder {
    fn default() -> Self {
        Self {
            db_pool_size: 10,
            sweep_interval: Duration::from_secs(60),
            dispatch_interval: Duration::from_secs(60),
            dispatch_batch_size: 50,
            max_send_attempts: 3,
            retry_backoff: Duration::from_secs(120),
            accept_base_url: "https://callboard.example/accept".to_string(),
        }
    }
}

impl EngineConfigBuilder {
    /// Sets the database pool size.
    pub fn db_pool_size(mut self, size: u32) -> Self {
        self.db_pool_size = size;
        self
    }

    /// Sets the deadline sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the queue dispatch interval.
    pub fn dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    /// Sets the per-pass dispatch batch size.
    pub fn dispatch_batch_size(mut self, size: i64) -> Self {
        self.dispatch_batch_size = size;
        self
    }

    /// Sets the maximum delivery attempts per queued message.
    pub fn max_send_attempts(mut self, attempts: i32) -> Self {
        self.max_send_attempts = attempts;
        self
    }

    /// Sets the retry backoff base delay.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Sets the acceptance link base URL.
    pub fn accept_base_url(mut self, url: impl Into<String>) -> Self {
        self.accept_base_url = url.into();
        self
    }


    /// Builds the configuration.
    pub fn build(self) -> EngineConfig {
        EngineConfig {
            db_pool_size: self.db_pool_size,
            sweep_interval: self.sweep_interval,
            dispatch_interval: self.dispatch_interval,
            dispatch_batch_size: self.dispatch_batch_size,
            max_send_attempts: self.max_send_attempts,
            retry_backoff: self.retry_backoff,
            accept_base_url: self.accept_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.db_pool_size(), 10);
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.dispatch_interval(), Duration::from_secs(60));
        assert_eq!(config.dispatch_batch_size(), 50);
        assert_eq!(config.max_send_attempts(), 3);
        assert_eq!(config.retry_backoff(), Duration::from_secs(120));
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::builder()
            .dispatch_batch_size(10)
            .max_send_attempts(5)
            .retry_backoff(Duration::from_secs(30))
            .accept_base_url("https://example.org/a")
            .build();
        assert_eq!(config.dispatch_batch_size(), 10);
        assert_eq!(config.max_send_attempts(), 5);
        assert_eq!(config.retry_backoff(), Duration::from_secs(30));
        assert_eq!(config.accept_base_url(), "https://example.org/a");
    }
}
