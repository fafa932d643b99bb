//! Fundline application composition root
//!
//! Composes the Projects domain router, stores and background jobs into a
//! single application.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use fundline_common::Config;
use fundline_projects::{
    AuthConfig, ExpirationSweep, ExtensionImageCodec, MilestoneLifecycleService,
    PgMilestoneStore, PgProjectStore, ProjectLifecycleService, ProjectsState,
};

/// Create the main application router with all routes and middleware
pub async fn create_app(config: &Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    // Create stores
    let project_store = Arc::new(PgProjectStore::new(pool.clone()));
    let milestone_store = Arc::new(PgMilestoneStore::new(pool));

    // Create services
    let projects = Arc::new(ProjectLifecycleService::new(
        project_store.clone(),
        milestone_store.clone(),
        Arc::new(ExtensionImageCodec),
    ));
    let milestones = Arc::new(MilestoneLifecycleService::new(
        milestone_store,
        projects.clone(),
    ));

    // Schedule the daily expiration sweep
    Arc::new(ExpirationSweep::new(project_store)).spawn_daily();

    let state = ProjectsState {
        projects,
        milestones,
        auth_config: AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
        },
    };

    // Build router — compose the domain router with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route(
            "/",
            axum::routing::get(|| async { "Fundline API v0.1.0" }),
        )
        .merge(fundline_projects::routes().with_state(state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
