//! Milestone API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use fundline_common::{Error, Result};

use crate::api::middleware::{AuthUser, ProjectsState};
use crate::domain::entities::{MilestonePatch, ProjectMilestone};
use crate::service::NewMilestone;

/// Request for creating a new milestone
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMilestoneRequest {
    #[validate(range(min = 1))]
    pub project_id: i64,

    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    /// Position within the project; allocated automatically when omitted
    #[validate(range(min = 1, max = 32_767))]
    pub sequence: Option<i32>,

    pub completed: Option<bool>,

    pub contribution_goal: Option<Decimal>,
}

/// Request for updating a milestone
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMilestoneRequest {
    #[validate(length(max = 80))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1, max = 32_767))]
    pub sequence: Option<i32>,

    pub completed: Option<bool>,

    pub contribution_goal: Option<Decimal>,
}

impl From<UpdateMilestoneRequest> for MilestonePatch {
    fn from(request: UpdateMilestoneRequest) -> Self {
        MilestonePatch {
            title: request.title,
            description: request.description,
            sequence: request.sequence,
            completed: request.completed,
            contribution_goal: request.contribution_goal,
        }
    }
}

/// Create a new milestone
///
/// **POST /v1/milestones**
pub async fn create_milestone(
    _auth: AuthUser,
    State(state): State<ProjectsState>,
    Json(request): Json<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<ProjectMilestone>)> {
    request
        .validate()
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;

    let draft = NewMilestone {
        project_id: request.project_id,
        title: request.title,
        description: request.description,
        sequence: request.sequence,
        completed: request.completed,
        contribution_goal: request.contribution_goal,
    };

    let milestone = state.milestones.create(draft).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// Get a milestone by id
///
/// **GET /v1/milestones/{id}**
pub async fn get_milestone(
    _auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectMilestone>> {
    let milestone = state.milestones.find_by_id(id).await?;
    Ok(Json(milestone))
}

/// List the milestones of a project, ordered by sequence
///
/// **GET /v1/projects/{project_id}/milestones**
pub async fn list_milestones(
    _auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<ProjectMilestone>>> {
    let milestones = state.milestones.find_by_project(project_id).await?;
    Ok(Json(milestones))
}

/// List the completed milestones of a project
///
/// **GET /v1/projects/{project_id}/milestones/completed**
pub async fn list_completed_milestones(
    _auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<ProjectMilestone>>> {
    let milestones = state.milestones.find_completed(project_id).await?;
    Ok(Json(milestones))
}

/// Update a milestone
///
/// **PATCH /v1/milestones/{id}**
pub async fn update_milestone(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateMilestoneRequest>,
) -> Result<Json<ProjectMilestone>> {
    request
        .validate()
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;

    let milestone = state.milestones.edit(&auth.0, id, request.into()).await?;
    Ok(Json(milestone))
}

/// Delete a milestone
///
/// **DELETE /v1/milestones/{id}**
pub async fn delete_milestone(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.milestones.delete(&auth.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Conclude a milestone
///
/// **PATCH /v1/milestones/{id}/conclude**
pub async fn conclude_milestone(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectMilestone>> {
    let milestone = state.milestones.conclude(&auth.0, id).await?;
    Ok(Json(milestone))
}
