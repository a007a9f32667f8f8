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

//! Crew Member Model
//!
//! Consent state gates offer eligibility: a candidate only receives
//! job-offer messages after double opt-in (web form + SMS `YES` reply) and
//! while not opted out.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A crew member row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::crew_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CrewMember {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Phone number as entered; normalized to E.164 at send time
    pub phone: String,
    /// Web-form consent given
    pub web_consent: bool,
    /// SMS `YES` confirmation received
    pub sms_confirmed: bool,
    /// When SMS consent was confirmed
    pub sms_confirmed_at: Option<NaiveDateTime>,
    /// Candidate replied STOP
    pub opted_out: bool,
    /// When the candidate opted out
    pub opted_out_at: Option<NaiveDateTime>,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

impl CrewMember {
    /// Whether this candidate may receive job-offer messages.
    pub fn eligible(&self) -> bool {
        self.sms_confirmed && !self.opted_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(sms_confirmed: bool, opted_out: bool) -> CrewMember {
        let now = Utc::now().naive_utc();
        CrewMember {
            id: Uuid::new_v4(),
            name: "Sam".to_string(),
            phone: "5551234567".to_string(),
            web_consent: true,
            sms_confirmed,
            sms_confirmed_at: sms_confirmed.then_some(now),
            opted_out,
            opted_out_at: opted_out.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_eligibility_requires_confirmation_and_no_opt_out() {
        assert!(member(true, false).eligible());
        assert!(!member(false, false).eligible());
        assert!(!member(true, true).eligible());
        assert!(!member(false, true).eligible());
    }
}
