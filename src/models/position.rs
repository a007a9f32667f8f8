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

//! Job Position Model
//!
//! A single crew slot within a job. The position row is the locking
//! granularity for the cascade: `filled_count` never exceeds
//! `quantity_needed`, and the response-window duration lives here.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A job position row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::job_positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobPosition {
    /// Unique identifier
    pub id: Uuid,
    /// Owning job
    pub job_id: Uuid,
    /// Role title shown in offer messages, e.g. "Gaffer"
    pub role_name: String,
    /// Crew members needed for this slot
    pub quantity_needed: i32,
    /// Crew members confirmed so far
    pub filled_count: i32,
    /// Response window applied to each offer's deadline
    pub response_window_minutes: i32,
    /// The position's single active candidate list
    pub crew_list_id: Uuid,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

impl JobPosition {
    /// Whether this position still needs crew.
    pub fn needs_crew(&self) -> bool {
        self.filled_count < self.quantity_needed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn position(filled: i32, needed: i32) -> JobPosition {
        let now = Utc::now().naive_utc();
        JobPosition {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            role_name: "Gaffer".to_string(),
            quantity_needed: needed,
            filled_count: filled,
            response_window_minutes: 240,
            crew_list_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_needs_crew() {
        assert!(position(0, 1).needs_crew());
        assert!(position(1, 2).needs_crew());
        assert!(!position(2, 2).needs_crew());
    }
}
