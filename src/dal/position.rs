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

//! Job position accessors.

use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::job_positions;
use crate::error::StoreError;
use crate::models::JobPosition;

/// Data access for job positions.
#[derive(Clone)]
pub struct PositionDAL<'a> {
    dal: &'a DAL,
}

impl<'a> PositionDAL<'a> {
    /// Creates a new PositionDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Retrieves a position by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<JobPosition, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let position: Option<JobPosition> = conn
            .interact(move |conn| job_positions::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        position.ok_or(StoreError::NotFound {
            entity: "job_position",
            id,
        })
    }

    /// Lists all positions belonging to a job.
    pub async fn for_job(&self, job_id: Uuid) -> Result<Vec<JobPosition>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let positions = conn
            .interact(move |conn| {
                job_positions::table
                    .filter(job_positions::job_id.eq(job_id))
                    .load(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;
        Ok(positions)
    }
}
