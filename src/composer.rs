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

//! Message composition.
//!
//! Pure functions turning a (job, position, candidate, deadline) tuple into
//! outbound message text, plus the static confirmation/help variants. No
//! I/O happens here; the engine and router call into this module and queue
//! the results.

use chrono::NaiveDate;

/// Opt-in completion confirmation (double opt-in second step done).
pub const OPT_IN_CONFIRMED: &str = "Callboard: You're confirmed! You'll receive job opportunity \
     alerts from department heads. Message frequency varies by job availability. Msg & data rates \
     may apply. Reply HELP for help or STOP to opt out.";

/// Opt-out confirmation.
pub const OPTED_OUT: &str = "Callboard: You've unsubscribed and will no longer receive job \
     alerts. To opt back in, visit the opt-in link from your department head. Contact \
     info@callboard.example with questions.";

/// Static help text.
pub const HELP: &str = "Callboard Help: For support contact info@callboard.example. You receive \
     job alerts from dept heads. Msg & data rates may apply. Reply STOP to cancel.";

/// Acceptance confirmation.
pub const JOB_ACCEPTED: &str = "Callboard: Confirmed! You've accepted the position. You'll \
     receive details via email. Reply STOP to opt out.";

/// Decline confirmation.
pub const JOB_DECLINED: &str = "Callboard: Thanks for letting us know. We'll reach out about \
     future opportunities. Reply STOP to opt out.";

/// Guidance for unrecognized replies.
pub const INVALID_REPLY: &str = "Callboard: Invalid response. Reply 1 for YES, 2 for NO, or 3 \
     for MORE INFO. Reply HELP for support or STOP to opt out.";

/// Everything needed to compose one job-offer message.
#[derive(Debug, Clone)]
pub struct OfferMessage<'a> {
    /// Department head posting the job
    pub hirer_name: &'a str,
    /// Role title, e.g. "Gaffer"
    pub role_name: &'a str,
    /// Job title
    pub job_name: &'a str,
    /// First work day
    pub work_start_date: NaiveDate,
    /// Last work day
    pub work_end_date: NaiveDate,
    /// Daily rate in whole dollars
    pub day_rate: i32,
    /// Work location
    pub location: &'a str,
    /// The offer's response token
    pub response_token: &'a str,
    /// Response window in minutes
    pub window_minutes: i32,
}

impl<'a> OfferMessage<'a> {
    /// Renders the outbound offer body.
    pub fn body(&self, accept_base_url: &str) -> String {
        format!(
            "Callboard: {} has a {} position for \"{}\" {}-{}. Rate: ${}/day. Location: {}. \
             Reply 1 for YES, 2 for NO, or visit {}. You have {} to respond.",
            self.hirer_name,
            self.role_name,
            self.job_name,
            format_short_date(self.work_start_date),
            format_short_date(self.work_end_date),
            self.day_rate,
            self.location,
            accept_link(accept_base_url, self.response_token),
            window_text(self.window_minutes),
        )
    }
}

/// Builds the candidate-facing acceptance link for a response token.
pub fn accept_link(accept_base_url: &str, token: &str) -> String {
    format!("{}/{}", accept_base_url.trim_end_matches('/'), token)
}

/// Body for the "more info" reply: a link to the full job details.
pub fn info_link_body(accept_base_url: &str, token: &str) -> String {
    format!(
        "Callboard: View full job details and respond here: {}",
        accept_link(accept_base_url, token)
    )
}

/// Human-readable response window: whole hours when possible, minutes
/// otherwise.
pub fn window_text(minutes: i32) -> String {
    let hours = minutes / 60;
    if hours > 0 {
        format!("{} hour{}", hours, if hours > 1 { "s" } else { "" })
    } else {
        format!("{} minutes", minutes)
    }
}

/// MM/DD date rendering used in offer messages.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%m/%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer<'a>() -> OfferMessage<'a> {
        OfferMessage {
            hirer_name: "Dana Reyes",
            role_name: "Gaffer",
            job_name: "Night Shoot",
            work_start_date: NaiveDate::from_ymd_opt(2026, 9, 3).unwrap(),
            work_end_date: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
            day_rate: 450,
            location: "Austin, TX",
            response_token: "tok123",
            window_minutes: 240,
        }
    }

    #[test]
    fn test_offer_body() {
        let body = offer().body("https://callboard.example/accept");
        assert_eq!(
            body,
            "Callboard: Dana Reyes has a Gaffer position for \"Night Shoot\" 09/03-09/05. \
             Rate: $450/day. Location: Austin, TX. Reply 1 for YES, 2 for NO, or visit \
             https://callboard.example/accept/tok123. You have 4 hours to respond."
        );
    }

    #[test]
    fn test_window_text() {
        assert_eq!(window_text(240), "4 hours");
        assert_eq!(window_text(60), "1 hour");
        assert_eq!(window_text(45), "45 minutes");
        assert_eq!(window_text(90), "1 hour");
    }

    #[test]
    fn test_accept_link_trailing_slash() {
        assert_eq!(
            accept_link("https://callboard.example/accept/", "t"),
            "https://callboard.example/accept/t"
        );
        assert_eq!(
            accept_link("https://callboard.example/accept", "t"),
            "https://callboard.example/accept/t"
        );
    }

    #[test]
    fn test_info_link_body() {
        assert_eq!(
            info_link_body("https://callboard.example/accept", "abc"),
            "Callboard: View full job details and respond here: \
             https://callboard.example/accept/abc"
        );
    }

    #[test]
    fn test_short_date_zero_pads() {
        assert_eq!(
            format_short_date(NaiveDate::from_ymd_opt(2026, 1, 9).unwrap()),
            "01/09"
        );
    }
}
