//! Postgres store adapters
//!
//! Thin sqlx-backed implementations of the store ports. Constraint
//! violations surface as typed [`StoreError`] variants; in particular the
//! unique index on `(project_id, sequence)` backs the sequence allocator
//! against concurrent creations.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use fundline_common::StoreError;

use crate::domain::entities::{Project, ProjectMilestone, ProjectStatus};
use crate::store::{MilestoneStore, ProjectStore, StoreResult};

const PROJECT_COLUMNS: &str = "id, title, description, creator_id, category_id, status, \
     need_to_follow_order, creation_date, initial_date, final_date, cover_image";

const MILESTONE_COLUMNS: &str =
    "id, project_id, title, description, sequence, completed, contribution_goal";

/// Postgres-backed [`ProjectStore`]
#[derive(Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, project: &Project) -> StoreResult<Project> {
        let sql = format!(
            "INSERT INTO project \
                 (title, description, creator_id, category_id, status, \
                  need_to_follow_order, creation_date, initial_date, final_date, cover_image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PROJECT_COLUMNS}"
        );

        let saved = sqlx::query_as::<_, Project>(&sql)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.creator_id)
            .bind(project.category_id)
            .bind(project.status)
            .bind(project.need_to_follow_order)
            .bind(project.creation_date)
            .bind(project.initial_date)
            .bind(project.final_date)
            .bind(&project.cover_image)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn update(&self, id: i64, project: &Project) -> StoreResult<Project> {
        // creator_id, creation_date and initial_date are immutable after creation
        let sql = format!(
            "UPDATE project \
             SET title = $2, description = $3, category_id = $4, status = $5, \
                 need_to_follow_order = $6, final_date = $7, cover_image = $8 \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );

        let saved = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.category_id)
            .bind(project.status)
            .bind(project.need_to_follow_order)
            .bind(project.final_date)
            .bind(&project.cover_image)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM project WHERE id = $1");

        let project = sqlx::query_as::<_, Project>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(project)
    }

    async fn save(&self, project: &Project) -> StoreResult<Project> {
        match project.id {
            None => self.insert(project).await,
            Some(id) => self.update(id, project).await,
        }
    }

    async fn exists_by_id(&self, id: i64) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM project WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn find_ending_on(
        &self,
        date: NaiveDate,
        excluded_statuses: &[ProjectStatus],
    ) -> StoreResult<Vec<Project>> {
        let excluded: Vec<i16> = excluded_statuses.iter().map(|s| s.id()).collect();
        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM project \
             WHERE final_date = $1 AND status <> ALL($2)"
        );

        let projects = sqlx::query_as::<_, Project>(&sql)
            .bind(date)
            .bind(excluded)
            .fetch_all(&self.pool)
            .await?;

        Ok(projects)
    }

    async fn save_all(&self, projects: &[Project]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for project in projects {
            let Some(id) = project.id else {
                return Err(StoreError::InvalidData(
                    "cannot batch-save an unsaved project".to_string(),
                ));
            };

            sqlx::query(
                "UPDATE project \
                 SET title = $2, description = $3, category_id = $4, status = $5, \
                     need_to_follow_order = $6, final_date = $7, cover_image = $8 \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(&project.title)
            .bind(&project.description)
            .bind(project.category_id)
            .bind(project.status)
            .bind(project.need_to_follow_order)
            .bind(project.final_date)
            .bind(&project.cover_image)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Postgres-backed [`MilestoneStore`]
#[derive(Clone)]
pub struct PgMilestoneStore {
    pool: PgPool,
}

impl PgMilestoneStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, milestone: &ProjectMilestone) -> StoreResult<ProjectMilestone> {
        let sql = format!(
            "INSERT INTO project_milestone \
                 (project_id, title, description, sequence, completed, contribution_goal) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {MILESTONE_COLUMNS}"
        );

        let saved = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(milestone.project_id)
            .bind(&milestone.title)
            .bind(&milestone.description)
            .bind(milestone.sequence)
            .bind(milestone.completed)
            .bind(milestone.contribution_goal)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn update(&self, id: i64, milestone: &ProjectMilestone) -> StoreResult<ProjectMilestone> {
        let sql = format!(
            "UPDATE project_milestone \
             SET title = $2, description = $3, sequence = $4, completed = $5, \
                 contribution_goal = $6 \
             WHERE id = $1 \
             RETURNING {MILESTONE_COLUMNS}"
        );

        let saved = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(id)
            .bind(&milestone.title)
            .bind(&milestone.description)
            .bind(milestone.sequence)
            .bind(milestone.completed)
            .bind(milestone.contribution_goal)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }
}

#[async_trait]
impl MilestoneStore for PgMilestoneStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<ProjectMilestone>> {
        let sql = format!("SELECT {MILESTONE_COLUMNS} FROM project_milestone WHERE id = $1");

        let milestone = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(milestone)
    }

    async fn save(&self, milestone: &ProjectMilestone) -> StoreResult<ProjectMilestone> {
        match milestone.id {
            None => self.insert(milestone).await,
            Some(id) => self.update(id, milestone).await,
        }
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM project_milestone WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn find_by_project(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>> {
        let sql = format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_milestone \
             WHERE project_id = $1 \
             ORDER BY sequence ASC"
        );

        let milestones = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(milestones)
    }

    async fn find_max_sequence(&self, project_id: i64) -> StoreResult<Option<i32>> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sequence) FROM project_milestone WHERE project_id = $1")
                .bind(project_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(max)
    }

    async fn find_by_sequence(
        &self,
        project_id: i64,
        sequence: i32,
        excluding_id: Option<i64>,
    ) -> StoreResult<Option<ProjectMilestone>> {
        let sql = format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_milestone \
             WHERE project_id = $1 \
               AND sequence = $2 \
               AND ($3::BIGINT IS NULL OR id <> $3) \
             LIMIT 1"
        );

        let milestone = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(project_id)
            .bind(sequence)
            .bind(excluding_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(milestone)
    }

    async fn find_incomplete_below(
        &self,
        project_id: i64,
        sequence: i32,
    ) -> StoreResult<Vec<ProjectMilestone>> {
        let sql = format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_milestone \
             WHERE project_id = $1 \
               AND sequence < $2 \
               AND completed IS FALSE"
        );

        let milestones = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(project_id)
            .bind(sequence)
            .fetch_all(&self.pool)
            .await?;

        Ok(milestones)
    }

    async fn find_completed(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>> {
        let sql = format!(
            "SELECT {MILESTONE_COLUMNS} FROM project_milestone \
             WHERE project_id = $1 \
               AND completed IS TRUE \
             ORDER BY sequence ASC"
        );

        let milestones = sqlx::query_as::<_, ProjectMilestone>(&sql)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(milestones)
    }
}
