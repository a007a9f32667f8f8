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

//! Job offer accessors.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::job_offers;
use crate::error::StoreError;
use crate::models::{JobOffer, OfferStatus};

/// Data access for job offers.
#[derive(Clone)]
pub struct OfferDAL<'a> {
    dal: &'a DAL,
}

impl<'a> OfferDAL<'a> {
    /// Creates a new OfferDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Retrieves an offer by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<JobOffer, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let offer: Option<JobOffer> = conn
            .interact(move |conn| job_offers::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        offer.ok_or(StoreError::NotFound {
            entity: "job_offer",
            id,
        })
    }

    /// Retrieves an offer by its response token (web acceptance link).
    pub async fn get_by_token(&self, token: &str) -> Result<Option<JobOffer>, StoreError> {
        let token = token.to_string();
        let conn = self.dal.database.get_connection().await?;
        let offer = conn
            .interact(move |conn| {
                job_offers::table
                    .filter(job_offers::response_token.eq(token))
                    .first(conn)
                    .optional()
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;
        Ok(offer)
    }

    /// Finds every `sent` offer whose deadline has lapsed, ordered by
    /// deadline ascending.
    pub async fn find_expired(&self, now: NaiveDateTime) -> Result<Vec<JobOffer>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let offers = conn
            .interact(move |conn| {
                job_offers::table
                    .filter(job_offers::status.eq(OfferStatus::Sent.as_str()))
                    .filter(job_offers::deadline_at.le(now))
                    .order(job_offers::deadline_at.asc())
                    .load(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;
        Ok(offers)
    }

    /// Resolves a candidate's most recently sent offer: status `sent`,
    /// latest `sent_at` across all positions.
    pub async fn latest_sent_for_member(
        &self,
        crew_member_id: Uuid,
    ) -> Result<Option<JobOffer>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let offer = conn
            .interact(move |conn| {
                job_offers::table
                    .filter(job_offers::crew_member_id.eq(crew_member_id))
                    .filter(job_offers::status.eq(OfferStatus::Sent.as_str()))
                    .order(job_offers::sent_at.desc())
                    .first(conn)
                    .optional()
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;
        Ok(offer)
    }

    /// Lists a position's offers ordered by `(priority_rank, id)`.
    pub async fn for_position(&self, position_id: Uuid) -> Result<Vec<JobOffer>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let offers = conn
            .interact(move |conn| {
                job_offers::table
                    .filter(job_offers::position_id.eq(position_id))
                    .order((job_offers::priority_rank.asc(), job_offers::id.asc()))
                    .load(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;
        Ok(offers)
    }
}
