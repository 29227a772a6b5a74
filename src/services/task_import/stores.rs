//! Persistence seams consumed by the importer.
//!
//! The importer never talks to sea-orm directly. Production wiring hands it
//! the entity services (see [`super::TaskImportService`]); tests may hand it
//! anything implementing these traits.

use async_trait::async_trait;

use crate::database::entities::{divisions, goals, tasks, users};
use crate::errors::ServiceResult;
use crate::services::task_service::NewTask;

#[async_trait]
pub trait DivisionStore: Send + Sync {
    /// Divisions whose name contains `text` (case-sensitive), ascending id
    async fn find_by_name_contains(&self, text: &str) -> ServiceResult<Vec<divisions::Model>>;

    /// Insert when the id is unset, update otherwise
    async fn save(&self, division: divisions::ActiveModel) -> ServiceResult<divisions::Model>;
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    async fn find_by_division_id(&self, division_id: i32) -> ServiceResult<Vec<goals::Model>>;

    /// Raw persist, no business validation
    async fn save(&self, goal: goals::ActiveModel) -> ServiceResult<goals::Model>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_division_id(&self, division_id: i32) -> ServiceResult<Vec<users::Model>>;
}

#[async_trait]
pub trait TaskCreator: Send + Sync {
    /// Validates, persists and refreshes the owning goal's progress
    async fn create(&self, task: NewTask) -> ServiceResult<tasks::Model>;
}
