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

//! Job accessors.

use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::jobs;
use crate::error::StoreError;
use crate::models::Job;

/// Data access for jobs.
#[derive(Clone)]
pub struct JobDAL<'a> {
    dal: &'a DAL,
}

impl<'a> JobDAL<'a> {
    /// Creates a new JobDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Retrieves a job by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Job, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let job: Option<Job> = conn
            .interact(move |conn| jobs::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        job.ok_or(StoreError::NotFound { entity: "job", id })
    }
}
