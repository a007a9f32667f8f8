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

//! SMS delivery transports.
//!
//! The dispatcher talks to the outside world through [`SmsTransport`],
//! which keeps provider specifics (and test doubles) out of the queue
//! logic. The production implementation is a thin HTTP client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Delivers a single SMS and returns the provider's message id.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Sends `body` to `to_e164`, an E.164 formatted phone number.
    async fn send(&self, to_e164: &str, body: &str) -> Result<String, TransportError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    destination_number: &'a str,
    message_body: &'a str,
    sender_id: &'a str,
    /// Transactional traffic is exempt from promotional quiet hours.
    message_type: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    message_id: String,
}

/// HTTP-backed SMS transport.
pub struct HttpSmsTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender_id: String,
}

impl HttpSmsTransport {
    /// Creates a transport that POSTs send requests to `endpoint`,
    /// authenticating with `api_key`.
    pub fn new(endpoint: String, api_key: String, sender_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            sender_id,
        }
    }
}

#[async_trait]
impl SmsTransport for HttpSmsTransport {
    async fn send(&self, to_e164: &str, body: &str) -> Result<String, TransportError> {
        let request = SendRequest {
            destination_number: to_e164,
            message_body: body,
            sender_id: &self.sender_id,
            message_type: "TRANSACTIONAL",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SendResponse = response.json().await?;
        Ok(parsed.message_id)
    }
}

#[cfg(test)]
pub mod testing {
    //! Transport doubles shared by queue and router tests.

    use std::sync::Mutex;

    use super::*;

    /// Records sent messages; fails the first `fail_first` sends.
    pub struct MockTransport {
        pub sent: Mutex<Vec<(String, String)>>,
        fail_first: Mutex<usize>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_first: Mutex::new(0),
            }
        }

        pub fn failing(times: usize) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_first: Mutex::new(times),
            }
        }
    }

    #[async_trait]
    impl SmsTransport for MockTransport {
        async fn send(&self, to_e164: &str, body: &str) -> Result<String, TransportError> {
            {
                let mut remaining = self.fail_first.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TransportError::Rejected {
                        status: 500,
                        message: "provider unavailable".to_string(),
                    });
                }
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push((to_e164.to_string(), body.to_string()));
            Ok(format!("mock-{}", sent.len()))
        }
    }
}
