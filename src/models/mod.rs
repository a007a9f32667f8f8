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

//! Data models for the engine's persisted entities.
//!
//! Status columns are stored as text. Each model exposes a typed accessor
//! that parses the stored text into a closed enum (`OfferStatus`,
//! `MessageStatus`, `JobStatus`), so business logic never compares raw
//! strings and illegal transitions are rejected by the enum's transition
//! functions.

pub mod crew_list;
pub mod crew_member;
pub mod job;
pub mod offer;
pub mod position;
pub mod queued_message;

pub use crew_list::{CrewList, CrewListMember};
pub use crew_member::CrewMember;
pub use job::{Job, JobStatus};
pub use offer::{JobOffer, NewJobOffer, OfferEvent, OfferStatus, ResponseChannel};
pub use position::JobPosition;
pub use queued_message::{MessageKind, MessageStatus, NewQueuedMessage, QueuedMessage};
