//! Store ports for the Projects domain
//!
//! The engine talks to persistence through these traits so that services can
//! be exercised against the in-memory adapter in tests and against Postgres
//! in production.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use fundline_common::StoreError;

use crate::domain::entities::{Project, ProjectMilestone, ProjectStatus};

pub use memory::{InMemoryMilestoneStore, InMemoryProjectStore};
pub use postgres::{PgMilestoneStore, PgProjectStore};

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable storage for [`Project`] records
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Find a project by id; `None` when the project does not exist
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>>;

    /// Insert the project when it has no id yet, update it otherwise.
    /// Returns the persisted record with its id assigned.
    async fn save(&self, project: &Project) -> StoreResult<Project>;

    /// Check whether a project with the given id exists
    async fn exists_by_id(&self, id: i64) -> StoreResult<bool>;

    /// All projects whose final date equals `date` and whose status is not in
    /// `excluded_statuses`
    async fn find_ending_on(
        &self,
        date: NaiveDate,
        excluded_statuses: &[ProjectStatus],
    ) -> StoreResult<Vec<Project>>;

    /// Persist a batch of already-existing projects in one call
    async fn save_all(&self, projects: &[Project]) -> StoreResult<()>;
}

/// Durable storage for [`ProjectMilestone`] records
///
/// Implementations must enforce uniqueness of `(project_id, sequence)` and
/// report a violation as [`StoreError::UniqueViolation`]; this is the backstop
/// for concurrent allocations racing on the same next sequence.
#[async_trait]
pub trait MilestoneStore: Send + Sync {
    /// Find a milestone by id; `None` when the milestone does not exist
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<ProjectMilestone>>;

    /// Insert the milestone when it has no id yet, update it otherwise.
    /// Returns the persisted record with its id assigned.
    async fn save(&self, milestone: &ProjectMilestone) -> StoreResult<ProjectMilestone>;

    /// Delete a milestone by id.
    ///
    /// Fails with [`StoreError::ForeignKeyViolation`] when a spend record
    /// still references the milestone.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;

    /// All milestones of a project, ascending by sequence
    async fn find_by_project(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>>;

    /// Highest sequence currently used within a project, if any
    async fn find_max_sequence(&self, project_id: i64) -> StoreResult<Option<i32>>;

    /// The milestone of a project holding `sequence`, excluding `excluding_id`
    /// when given (a milestone never conflicts with itself on edit)
    async fn find_by_sequence(
        &self,
        project_id: i64,
        sequence: i32,
        excluding_id: Option<i64>,
    ) -> StoreResult<Option<ProjectMilestone>>;

    /// Incomplete milestones of a project with a sequence strictly below
    /// `sequence`
    async fn find_incomplete_below(
        &self,
        project_id: i64,
        sequence: i32,
    ) -> StoreResult<Vec<ProjectMilestone>>;

    /// Completed milestones of a project, ascending by sequence
    async fn find_completed(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>>;
}
