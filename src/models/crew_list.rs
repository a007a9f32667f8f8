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

//! Crew List Models
//!
//! An ordered ranking of candidates for one open position. Priority ranks
//! are strictly increasing within a list but not required to be contiguous.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A crew list row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::crew_lists)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CrewList {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

/// A list membership row: one candidate's rank within one list.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::crew_list_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CrewListMember {
    /// Unique identifier
    pub id: Uuid,
    /// Owning list
    pub crew_list_id: Uuid,
    /// The ranked candidate
    pub crew_member_id: Uuid,
    /// Lower values are contacted first
    pub priority_rank: i32,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}
