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

//! Crew list accessors.

use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::{crew_list_members, crew_lists};
use crate::error::StoreError;
use crate::models::{CrewList, CrewListMember};

/// Data access for crew lists and their ranked memberships.
#[derive(Clone)]
pub struct CrewListDAL<'a> {
    dal: &'a DAL,
}

impl<'a> CrewListDAL<'a> {
    /// Creates a new CrewListDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Retrieves a crew list by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<CrewList, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let list: Option<CrewList> = conn
            .interact(move |conn| crew_lists::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        list.ok_or(StoreError::NotFound {
            entity: "crew_list",
            id,
        })
    }

    /// Returns a list's memberships ordered by priority rank, lowest
    /// (most preferred) first. Ties break on membership id so the order
    /// is stable across reads.
    pub async fn members_ranked(&self, list_id: Uuid) -> Result<Vec<CrewListMember>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let members = conn
            .interact(move |conn| {
                crew_list_members::table
                    .filter(crew_list_members::crew_list_id.eq(list_id))
                    .order((
                        crew_list_members::priority_rank.asc(),
                        crew_list_members::id.asc(),
                    ))
                    .load::<CrewListMember>(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(members)
    }
}
