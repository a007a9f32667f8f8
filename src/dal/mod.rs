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

//! Data Access Layer
//!
//! Typed accessors over the persisted entities. No business logic lives
//! here; the state machine, sweeper, router and dispatcher compose these
//! operations. The cascade's multi-row critical section is the exception
//! and lives with the state machine (`crate::engine`), where the
//! transaction boundary is owned.
//!
//! # Example
//!
//! ```rust,ignore
//! use callboard::dal::DAL;
//! use callboard::database::Database;
//!
//! let dal = DAL::new(database);
//! let expired = dal.offers().find_expired(now).await?;
//! ```

pub mod crew_list;
pub mod crew_member;
pub mod job;
pub mod message_queue;
pub mod offer;
pub mod position;

pub use crew_list::CrewListDAL;
pub use crew_member::CrewMemberDAL;
pub use job::JobDAL;
pub use message_queue::MessageQueueDAL;
pub use offer::OfferDAL;
pub use position::PositionDAL;

use crate::database::Database;

/// The root Data Access Layer.
///
/// `Clone` is cheap; every clone shares the same connection pool.
#[derive(Clone, Debug)]
pub struct DAL {
    /// The database instance with connection pool
    pub database: Database,
}

impl DAL {
    /// Creates a new DAL instance.
    pub fn new(database: Database) -> Self {
        DAL { database }
    }

    /// Returns an offer DAL for job offer operations.
    pub fn offers(&self) -> OfferDAL {
        OfferDAL::new(self)
    }

    /// Returns a position DAL for job position operations.
    pub fn positions(&self) -> PositionDAL {
        PositionDAL::new(self)
    }

    /// Returns a job DAL for job operations.
    pub fn jobs(&self) -> JobDAL {
        JobDAL::new(self)
    }

    /// Returns a crew member DAL for candidate operations.
    pub fn crew_members(&self) -> CrewMemberDAL {
        CrewMemberDAL::new(self)
    }

    /// Returns a crew list DAL for ranking operations.
    pub fn crew_lists(&self) -> CrewListDAL {
        CrewListDAL::new(self)
    }

    /// Returns a message queue DAL for outbound SMS operations.
    pub fn message_queue(&self) -> MessageQueueDAL {
        MessageQueueDAL::new(self)
    }
}
