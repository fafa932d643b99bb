//! Project API handlers
//!
//! Thin HTTP layer over [`ProjectLifecycleService`]; all lifecycle rules live
//! in the service.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use fundline_common::{Error, Result};

use crate::api::middleware::{AuthUser, ProjectsState};
use crate::domain::entities::{Project, ProjectPatch, ProjectStatus};
use crate::service::NewProject;

/// Request for creating a new project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 80))]
    pub title: String,

    #[validate(length(min = 1))]
    pub description: String,

    #[validate(range(min = 1))]
    pub category_id: i64,

    pub status: ProjectStatus,

    /// Whether milestones must be completed in sequence order
    pub need_to_follow_order: Option<bool>,

    pub initial_date: Option<NaiveDate>,

    pub final_date: NaiveDate,
}

/// Request for updating a project
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(max = 80))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub category_id: Option<i64>,

    pub status: Option<ProjectStatus>,

    pub need_to_follow_order: Option<bool>,

    pub final_date: Option<NaiveDate>,
}

impl From<UpdateProjectRequest> for ProjectPatch {
    fn from(request: UpdateProjectRequest) -> Self {
        ProjectPatch {
            title: request.title,
            description: request.description,
            category_id: request.category_id,
            status: request.status,
            need_to_follow_order: request.need_to_follow_order,
            final_date: request.final_date,
        }
    }
}

/// Create a new project
///
/// **POST /v1/projects**
///
/// The authenticated user becomes the project creator.
pub async fn create_project(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>)> {
    request
        .validate()
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;

    let draft = NewProject {
        title: request.title,
        description: request.description,
        category_id: request.category_id,
        status: request.status,
        need_to_follow_order: request.need_to_follow_order,
        initial_date: request.initial_date,
        final_date: request.final_date,
    };

    let project = state.projects.create(&auth.0, draft).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Get a project by id
///
/// **GET /v1/projects/{id}**
pub async fn get_project(
    _auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>> {
    let project = state.projects.find_by_id(id).await?;
    Ok(Json(project))
}

/// Update a project
///
/// **PATCH /v1/projects/{id}**
///
/// Only the creator (or an administrator) may edit, and only while the
/// project is not in a terminal status.
pub async fn update_project(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<Project>> {
    request
        .validate()
        .map_err(|e| Error::InvalidParameters(e.to_string()))?;

    let project = state.projects.edit(&auth.0, id, request.into()).await?;
    Ok(Json(project))
}

/// Conclude a project
///
/// **PATCH /v1/projects/{id}/conclude**
pub async fn conclude_project(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>> {
    let project = state.projects.conclude(&auth.0, id).await?;
    Ok(Json(project))
}

/// Cancel a project
///
/// **PATCH /v1/projects/{id}/cancel**
pub async fn cancel_project(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>> {
    let project = state.projects.cancel(&auth.0, id).await?;
    Ok(Json(project))
}

/// Upload a project cover image
///
/// **PUT /v1/projects/{id}/cover-image**
///
/// Expects a multipart form with a single `file` part.
pub async fn add_cover_image(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<StatusCode> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidParameters(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::InvalidParameters(e.to_string()))?;
        file = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) =
        file.ok_or_else(|| Error::InvalidParameters("file cannot be null".to_string()))?;

    state
        .projects
        .add_cover_image(&auth.0, id, &file_name, &bytes)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a project cover image
///
/// **DELETE /v1/projects/{id}/cover-image**
pub async fn remove_cover_image(
    auth: AuthUser,
    State(state): State<ProjectsState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.projects.remove_cover_image(&auth.0, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
