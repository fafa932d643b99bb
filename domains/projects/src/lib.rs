//! Projects domain: projects, milestones, ordering rules, expiration sweep

pub mod api;
pub mod auth;
pub mod domain;
pub mod image;
pub mod service;
pub mod store;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    MilestonePatch, Project, ProjectMilestone, ProjectPatch, ProjectStatus, MAX_TITLE_LEN,
};
pub use domain::lifecycle::LifecycleGuard;
pub use domain::ordering::OrderConstraintValidator;
pub use domain::sequence::{SequenceAllocator, MAX_SEQUENCE};

// Re-export collaborator ports
pub use auth::{AuthorizationContext, CurrentUser};
pub use image::{ExtensionImageCodec, ImageCodec, MAX_FILE_SIZE};

// Re-export store types
pub use store::{
    InMemoryMilestoneStore, InMemoryProjectStore, MilestoneStore, PgMilestoneStore, PgProjectStore,
    ProjectStore,
};

// Re-export services
pub use service::{
    ExpirationSweep, MilestoneLifecycleService, NewMilestone, NewProject, ProjectLifecycleService,
};

// Re-export API types
pub use api::routes;
pub use api::{AuthConfig, ProjectsState};
