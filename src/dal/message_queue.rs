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

//! Outbound message queue accessors.
//!
//! The queue is claim-free: the dispatcher is the only writer that moves
//! messages out of `pending`, and every status update is guarded on the
//! current status so a concurrent sweep cannot double-send.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use super::DAL;
use crate::database::schema::sms_queue;
use crate::error::StoreError;
use crate::models::{MessageStatus, NewQueuedMessage, QueuedMessage};

/// Data access for the outbound SMS queue.
#[derive(Clone)]
pub struct MessageQueueDAL<'a> {
    dal: &'a DAL,
}

impl<'a> MessageQueueDAL<'a> {
    /// Creates a new MessageQueueDAL instance.
    pub fn new(dal: &'a DAL) -> Self {
        Self { dal }
    }

    /// Inserts a new message into the queue and returns the stored row.
    pub async fn enqueue(&self, message: NewQueuedMessage) -> Result<QueuedMessage, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let row = conn
            .interact(move |conn| {
                diesel::insert_into(sms_queue::table)
                    .values(&message)
                    .get_result::<QueuedMessage>(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(row)
    }

    /// Retrieves a queued message by id.
    pub async fn get_by_id(&self, id: Uuid) -> Result<QueuedMessage, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let row: Option<QueuedMessage> = conn
            .interact(move |conn| sms_queue::table.find(id).first(conn).optional())
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        row.ok_or(StoreError::NotFound {
            entity: "queued_message",
            id,
        })
    }

    /// Returns the next batch of due pending messages, oldest scheduled
    /// first. Messages scheduled in the future are left for a later pass.
    pub async fn due_batch(
        &self,
        now: NaiveDateTime,
        limit: i64,
    ) -> Result<Vec<QueuedMessage>, StoreError> {
        let conn = self.dal.database.get_connection().await?;
        let rows = conn
            .interact(move |conn| {
                sms_queue::table
                    .filter(sms_queue::status.eq(MessageStatus::Pending.as_str()))
                    .filter(sms_queue::scheduled_for.le(now))
                    .order(sms_queue::scheduled_for.asc())
                    .limit(limit)
                    .load::<QueuedMessage>(conn)
            })
            .await
            .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(rows)
    }

    /// Marks a message as sent, recording the provider's message id.
    /// Guarded on `pending` so a message that raced to a terminal state
    /// is left untouched.
    pub async fn mark_sent(
        &self,
        id: Uuid,
        provider_message_id: String,
        now: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let conn = self.dal.database.get_connection().await?;
        conn.interact(move |conn| {
            diesel::update(
                sms_queue::table
                    .find(id)
                    .filter(sms_queue::status.eq(MessageStatus::Pending.as_str())),
            )
            .set((
                sms_queue::status.eq(MessageStatus::Sent.as_str()),
                sms_queue::provider_message_id.eq(provider_message_id),
                sms_queue::sent_at.eq(Some(now)),
                sms_queue::updated_at.eq(now),
            ))
            .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }

    /// Records a failed send attempt. When `terminal` is true the message
    /// is moved to `failed`; otherwise it stays `pending` and is pushed
    /// back to `next_scheduled` for a retry.
    pub async fn record_failure(
        &self,
        id: Uuid,
        error: String,
        new_attempts: i32,
        terminal: bool,
        next_scheduled: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let status = if terminal {
            MessageStatus::Failed
        } else {
            MessageStatus::Pending
        };
        let conn = self.dal.database.get_connection().await?;
        conn.interact(move |conn| {
            diesel::update(
                sms_queue::table
                    .find(id)
                    .filter(sms_queue::status.eq(MessageStatus::Pending.as_str())),
            )
            .set((
                sms_queue::status.eq(status.as_str()),
                sms_queue::attempts.eq(new_attempts),
                sms_queue::last_error.eq(error),
                sms_queue::scheduled_for.eq(next_scheduled),
                sms_queue::updated_at.eq(now),
            ))
            .execute(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionPool(e.to_string()))??;

        Ok(())
    }
}
