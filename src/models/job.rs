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

//! Job Model
//!
//! A job aggregates positions. Once every position's `filled_count`
//! reaches its `quantity_needed`, the job transitions to `filled`.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Closed status enumeration for jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// At least one position still needs crew
    Open,
    /// Every position is satisfied
    Filled,
}

impl JobStatus {
    /// Stored text representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Filled => "filled",
        }
    }

    /// Parses stored text, rejecting anything outside the enumeration.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(JobStatus::Open),
            "filled" => Some(JobStatus::Filled),
            _ => None,
        }
    }
}

/// A job row.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Job {
    /// Unique identifier
    pub id: Uuid,
    /// Department head posting the job
    pub hirer_name: String,
    /// Job title shown in offer messages
    pub job_name: String,
    /// First work day
    pub work_start_date: NaiveDate,
    /// Last work day
    pub work_end_date: NaiveDate,
    /// Daily rate in whole dollars
    pub day_rate: i32,
    /// Work location
    pub location: String,
    /// Stored status text; use [`Job::job_status`] for the typed view
    pub status: String,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last update time
    pub updated_at: NaiveDateTime,
}

impl Job {
    /// Parses the stored status into the closed enumeration.
    pub fn job_status(&self) -> Result<JobStatus, StoreError> {
        JobStatus::parse(&self.status).ok_or_else(|| StoreError::InvalidStatus {
            field: "jobs.status",
            id: self.id,
            value: self.status.clone(),
        })
    }
}
