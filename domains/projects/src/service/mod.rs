//! Service layer for the Projects domain

pub mod milestones;
pub mod projects;
pub mod sweep;

pub use milestones::{MilestoneLifecycleService, NewMilestone};
pub use projects::{NewProject, ProjectLifecycleService};
pub use sweep::ExpirationSweep;
