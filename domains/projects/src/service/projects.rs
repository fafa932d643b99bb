//! Project lifecycle orchestration
//!
//! Every mutation resolves the project, checks creator permission, consults
//! the lifecycle guard and, where the ordered-completion flag is involved,
//! re-validates the milestone history before persisting.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use fundline_common::{Error, Result};

use crate::auth::AuthorizationContext;
use crate::domain::entities::{Project, ProjectPatch, ProjectStatus};
use crate::domain::lifecycle::LifecycleGuard;
use crate::domain::ordering::OrderConstraintValidator;
use crate::image::ImageCodec;
use crate::store::{MilestoneStore, ProjectStore};

/// Fields required to create a new project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub status: ProjectStatus,
    pub need_to_follow_order: Option<bool>,
    pub initial_date: Option<NaiveDate>,
    pub final_date: NaiveDate,
}

/// Orchestrates project mutation operations
pub struct ProjectLifecycleService {
    projects: Arc<dyn ProjectStore>,
    milestones: Arc<dyn MilestoneStore>,
    guard: LifecycleGuard,
    ordering: OrderConstraintValidator,
    images: Arc<dyn ImageCodec>,
}

impl ProjectLifecycleService {
    pub fn new(
        projects: Arc<dyn ProjectStore>,
        milestones: Arc<dyn MilestoneStore>,
        images: Arc<dyn ImageCodec>,
    ) -> Self {
        let ordering = OrderConstraintValidator::new(milestones.clone());
        Self {
            projects,
            milestones,
            guard: LifecycleGuard,
            ordering,
            images,
        }
    }

    /// Resolve a project by id
    pub async fn find_by_id(&self, project_id: i64) -> Result<Project> {
        if project_id < 1 {
            return Err(Error::InvalidParameters("id must be valid".to_string()));
        }

        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| Error::NotFound("project not found".to_string()))
    }

    /// Existence probe used by dependent services
    pub async fn exists_by_id(&self, project_id: i64) -> Result<bool> {
        if project_id < 1 {
            return Err(Error::InvalidParameters("id must be valid".to_string()));
        }

        Ok(self.projects.exists_by_id(project_id).await?)
    }

    /// Create a new project owned by the current actor
    pub async fn create(
        &self,
        auth: &dyn AuthorizationContext,
        draft: NewProject,
    ) -> Result<Project> {
        let project = Project {
            id: None,
            title: draft.title,
            description: draft.description,
            creator_id: auth.current_user_id(),
            category_id: draft.category_id,
            status: draft.status,
            need_to_follow_order: draft.need_to_follow_order.unwrap_or(false),
            creation_date: Utc::now(),
            initial_date: draft.initial_date.unwrap_or_else(|| Utc::now().date_naive()),
            final_date: draft.final_date,
            cover_image: None,
        };

        project.validate()?;

        let saved = self.projects.save(&project).await?;
        info!(project_id = ?saved.id, "project created");
        Ok(saved)
    }

    /// Apply a partial update to a project.
    ///
    /// When the resulting project requires ordered completion, the existing
    /// milestone history is re-validated and the edit is rejected if any
    /// milestone was already completed out of order.
    pub async fn edit(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
        patch: ProjectPatch,
    ) -> Result<Project> {
        let mut project = self.find_by_id(project_id).await?;

        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        project.apply(patch);
        project.validate()?;

        if project.need_to_follow_order {
            let milestones = self.milestones.find_by_project(project_id).await?;
            self.ordering
                .assert_no_existing_violation(&project, &milestones)?;
        }

        Ok(self.projects.save(&project).await?)
    }

    /// Attach a validated cover image to a project
    pub async fn add_cover_image(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<Project> {
        let mut project = self.find_by_id(project_id).await?;

        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        project.cover_image = Some(self.images.validate_and_compress(file_name, bytes)?);

        Ok(self.projects.save(&project).await?)
    }

    /// Clear a project's cover image
    pub async fn remove_cover_image(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
    ) -> Result<Project> {
        let mut project = self.find_by_id(project_id).await?;

        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        project.cover_image = None;

        Ok(self.projects.save(&project).await?)
    }

    /// Move a project to the terminal `done` status
    pub async fn conclude(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
    ) -> Result<Project> {
        let saved = self.finish(auth, project_id, ProjectStatus::Done).await?;
        info!(project_id, "project concluded");
        Ok(saved)
    }

    /// Move a project to the terminal `canceled` status
    pub async fn cancel(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
    ) -> Result<Project> {
        let saved = self.finish(auth, project_id, ProjectStatus::Canceled).await?;
        info!(project_id, "project canceled");
        Ok(saved)
    }

    async fn finish(
        &self,
        auth: &dyn AuthorizationContext,
        project_id: i64,
        status: ProjectStatus,
    ) -> Result<Project> {
        let mut project = self.find_by_id(project_id).await?;

        auth.assert_is_creator(project.creator_id)?;
        self.guard.assert_editable(&project)?;

        project.status = status;

        Ok(self.projects.save(&project).await?)
    }
}
