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

//! Diesel schema for the engine's persisted entities.
//!
//! Status columns are stored as text and surfaced as closed enums in the
//! model layer; see `crate::models`.

diesel::table! {
    jobs (id) {
        id -> Uuid,
        hirer_name -> Text,
        job_name -> Text,
        work_start_date -> Date,
        work_end_date -> Date,
        day_rate -> Int4,
        location -> Text,
        status -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    job_positions (id) {
        id -> Uuid,
        job_id -> Uuid,
        role_name -> Text,
        quantity_needed -> Int4,
        filled_count -> Int4,
        response_window_minutes -> Int4,
        crew_list_id -> Uuid,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    crew_members (id) {
        id -> Uuid,
        name -> Text,
        phone -> Text,
        web_consent -> Bool,
        sms_confirmed -> Bool,
        sms_confirmed_at -> Nullable<Timestamp>,
        opted_out -> Bool,
        opted_out_at -> Nullable<Timestamp>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    crew_lists (id) {
        id -> Uuid,
        name -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    crew_list_members (id) {
        id -> Uuid,
        crew_list_id -> Uuid,
        crew_member_id -> Uuid,
        priority_rank -> Int4,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    job_offers (id) {
        id -> Uuid,
        job_id -> Uuid,
        position_id -> Uuid,
        crew_member_id -> Uuid,
        status -> Text,
        priority_rank -> Int4,
        response_token -> Text,
        sent_at -> Nullable<Timestamp>,
        deadline_at -> Nullable<Timestamp>,
        response_at -> Nullable<Timestamp>,
        response_channel -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    sms_queue (id) {
        id -> Uuid,
        offer_id -> Nullable<Uuid>,
        crew_member_id -> Nullable<Uuid>,
        phone -> Text,
        body -> Text,
        kind -> Text,
        status -> Text,
        attempts -> Int4,
        scheduled_for -> Timestamp,
        sent_at -> Nullable<Timestamp>,
        provider_message_id -> Nullable<Text>,
        last_error -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(job_positions -> jobs (job_id));
diesel::joinable!(job_positions -> crew_lists (crew_list_id));
diesel::joinable!(crew_list_members -> crew_lists (crew_list_id));
diesel::joinable!(crew_list_members -> crew_members (crew_member_id));
diesel::joinable!(job_offers -> jobs (job_id));
diesel::joinable!(job_offers -> job_positions (position_id));
diesel::joinable!(job_offers -> crew_members (crew_member_id));

diesel::allow_tables_to_appear_in_same_query!(
    jobs,
    job_positions,
    crew_members,
    crew_lists,
    crew_list_members,
    job_offers,
    sms_queue,
);
