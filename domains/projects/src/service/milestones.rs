//! Milestone lifecycle orchestration
//!
//! Mutations resolve the milestone and its owning project, check creator
//! permission and project editability, let the allocator resolve the
//! sequence and the order validator enforce ordered completion, then persist.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use fundline_common::{Error, Result, StoreError};

use crate::auth::AuthorizationContext;
use crate::domain::entities::{MilestonePatch, ProjectMilestone};
use crate::domain::lifecycle::LifecycleGuard;
use crate::domain::ordering::OrderConstraintValidator;
use crate::domain::sequence::SequenceAllocator;
use crate::service::projects::ProjectLifecycleService;
use crate::store::MilestoneStore;

const NOT_FOUND_MESSAGE: &str = "project milestone not found";

/// Fields required to create a new milestone
#[derive(Debug, Clone)]
pub struct NewMilestone {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub sequence: Option<i32>,
    pub completed: Option<bool>,
    pub contribution_goal: Option<Decimal>,
}

/// Orchestrates milestone mutation operations
pub struct MilestoneLifecycleService {
    milestones: Arc<dyn MilestoneStore>,
    projects: Arc<ProjectLifecycleService>,
    guard: LifecycleGuard,
    allocator: SequenceAllocator,
    ordering: OrderConstraintValidator,
}

impl MilestoneLifecycleService {
    pub fn new(milestones: Arc<dyn MilestoneStore>, projects: Arc<ProjectLifecycleService>) -> Self {
        let allocator = SequenceAllocator::new(milestones.clone());
        let ordering = OrderConstraintValidator::new(milestones.clone());
        Self {
            milestones,
            projects,
            guard: LifecycleGuard,
            allocator,
            ordering,
        }
    }

    /// Resolve a milestone by id
    pub async fn find_by_id(&self, milestone_id: i64) -> Result<ProjectMilestone> {
        if milestone_id < 1 {
            return Err(Error::InvalidParameters("id must be valid".to_string()));
        }

        self.milestones
            .find_by_id(milestone_id)
            .await?
            .ok_or_else(|| Error::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    /// All milestones of a project, ascending by sequence
    pub async fn find_by_project(&self, project_id: i64) -> Result<Vec<ProjectMilestone>> {
        self.projects.find_by_id(project_id).await?;

        Ok(self.milestones.find_by_project(project_id).await?)
    }

    /// Completed milestones of a project, ascending by sequence
    pub async fn find_completed(&self, project_id: i64) -> Result<Vec<ProjectMilestone>> {
        self.projects.find_by_id(project_id).await?;

        Ok(self.milestones.find_completed(project_id).await?)
    }

    /// Create a milestone against an existing, editable project
    pub async fn create(&self, draft: NewMilestone) -> Result<ProjectMilestone> {
        let sequence = self
            .allocator
            .allocate(draft.project_id, draft.sequence, None)
            .await?;

        let milestone = ProjectMilestone {
            id: None,
            project_id: draft.project_id,
            title: draft.title,
            description: draft.description,
            sequence,
            completed: draft.completed.unwrap_or(false),
            contribution_goal: draft.contribution_goal.unwrap_or(Decimal::ZERO),
        };
        milestone.validate()?;

        let project = self.projects.find_by_id(draft.project_id).await?;
        self.guard.assert_editable(&project)?;
        self.ordering
            .assert_order_respected(&project, &milestone)
            .await?;

        let saved = self.save(&milestone).await?;
        info!(milestone_id = ?saved.id, project_id = saved.project_id, "milestone created");
        Ok(saved)
    }

    /// Apply a partial update to a milestone
    pub async fn edit(
        &self,
        auth: &dyn AuthorizationContext,
        milestone_id: i64,
        patch: MilestonePatch,
    ) -> Result<ProjectMilestone> {
        let mut milestone = self.find_by_id(milestone_id).await?;

        let project = self.projects.find_by_id(milestone.project_id).await?;
        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        milestone.apply(&patch);
        milestone.sequence = self
            .allocator
            .allocate(milestone.project_id, patch.sequence, Some(&milestone))
            .await?;
        milestone.validate()?;

        self.ordering
            .assert_order_respected(&project, &milestone)
            .await?;

        self.save(&milestone).await
    }

    /// Delete a milestone unless a spend record still references it
    pub async fn delete(&self, auth: &dyn AuthorizationContext, milestone_id: i64) -> Result<()> {
        let milestone = self.find_by_id(milestone_id).await?;

        let project = self.projects.find_by_id(milestone.project_id).await?;
        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        match self.milestones.delete_by_id(milestone_id).await {
            Ok(()) => {
                info!(milestone_id, project_id = milestone.project_id, "milestone deleted");
                Ok(())
            }
            Err(StoreError::ForeignKeyViolation(_)) => Err(Error::DataIntegrity(
                "this milestone of the project has a linked expense, impossible to exclude"
                    .to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Mark a milestone completed.
    ///
    /// Permission is checked but project editability is not: milestones stay
    /// completable even when the owning project restricts other edits. The
    /// ordering check runs after the completion flag is set, so concluding
    /// out of required order fails.
    pub async fn conclude(
        &self,
        auth: &dyn AuthorizationContext,
        milestone_id: i64,
    ) -> Result<ProjectMilestone> {
        let mut milestone = self.find_by_id(milestone_id).await?;

        let project = self.projects.find_by_id(milestone.project_id).await?;
        auth.assert_is_creator(project.creator_id)?;

        milestone.completed = true;
        self.ordering
            .assert_order_respected(&project, &milestone)
            .await?;

        let saved = self.save(&milestone).await?;
        info!(milestone_id, project_id = saved.project_id, "milestone concluded");
        Ok(saved)
    }

    /// Persist, translating the unique-sequence backstop into the same error
    /// the explicit duplicate check produces
    async fn save(&self, milestone: &ProjectMilestone) -> Result<ProjectMilestone> {
        match self.milestones.save(milestone).await {
            Ok(saved) => Ok(saved),
            Err(StoreError::UniqueViolation(_)) => Err(Error::InvalidParameters(
                "this sequence number already exists in this project".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
