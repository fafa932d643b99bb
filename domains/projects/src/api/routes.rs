//! Route definitions for the Projects domain API

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use super::handlers::{milestones, projects};
use super::middleware::ProjectsState;

/// Create project lifecycle routes
fn project_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/projects", post(projects::create_project))
        .route(
            "/v1/projects/{id}",
            get(projects::get_project).patch(projects::update_project),
        )
        .route("/v1/projects/{id}/conclude", patch(projects::conclude_project))
        .route("/v1/projects/{id}/cancel", patch(projects::cancel_project))
        .route(
            "/v1/projects/{id}/cover-image",
            put(projects::add_cover_image).delete(projects::remove_cover_image),
        )
}

/// Create milestone lifecycle routes
fn milestone_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/milestones", post(milestones::create_milestone))
        .route(
            "/v1/milestones/{id}",
            get(milestones::get_milestone)
                .patch(milestones::update_milestone)
                .delete(milestones::delete_milestone),
        )
        .route(
            "/v1/milestones/{id}/conclude",
            patch(milestones::conclude_milestone),
        )
        .route(
            "/v1/projects/{project_id}/milestones",
            get(milestones::list_milestones),
        )
        .route(
            "/v1/projects/{project_id}/milestones/completed",
            get(milestones::list_completed_milestones),
        )
}

/// Create all Projects domain API routes
pub fn routes() -> Router<ProjectsState> {
    Router::new().merge(project_routes()).merge(milestone_routes())
}
