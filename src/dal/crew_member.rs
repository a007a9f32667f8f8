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

//! Crew member accessors, including the consent flags driven by inbound
//! keyword replies.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::crew_members;
use crate::error::StoreError;
use crate::models::CrewMember;

/// Data access for crew members.
#[derive(Clone)]
pub struct CrewMemberDAL<'a> {
    dal: &'a DAL,
}

impl<'a> CrewMemberDAL<'a> {
    /// Creates a new CrewMemberDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Retrieves a crew member by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<CrewMember, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let member: Option<CrewMember> = conn
            .interact(move |conn| crew_members::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        member.ok_or(StoreError::NotFound {
            entity: "crew_member",
            id,
        })
    }

    /// Looks up a crew member by their normalized phone number. Returns
    /// `None` when the number is unknown, which callers treat as a reply
    /// from an unrecognized sender.
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<CrewMember>, StoreError> {
        let phone = phone.to_string();
        let conn = self.dal.database.get_connection().await?;
        let member = conn
            .interact(move |conn| {
                crew_members::table
                    .filter(crew_members::phone.eq(phone))
                    .first::<CrewMember>(conn)
                    .optional()
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(member)
    }

    /// Records SMS consent for a member. Never touches the opt-out flag:
    /// a prior `STOP` stays in force regardless of later replies.
    pub async fn confirm_sms_consent(
        &self,
        id: Uuid,
        now: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        conn.interact(move |conn| {
            diesel::update(crew_members::table.find(id))
                .set((
                    crew_members::sms_confirmed.eq(true),
                    crew_members::sms_confirmed_at.eq(Some(now)),
                    crew_members::updated_at.eq(now),
                ))
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Marks a member as opted out of SMS delivery.
    pub async fn opt_out(&self, id: Uuid, now: NaiveDateTime) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        conn.interact(move |conn| {
            diesel::update(crew_members::table.find(id))
                .set((
                    crew_members::opted_out.eq(true),
                    crew_members::opted_out_at.eq(Some(now)),
                    crew_members::updated_at.eq(now),
                ))
                .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }
}
