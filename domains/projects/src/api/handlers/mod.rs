//! API handlers for the Projects domain

pub mod milestones;
pub mod projects;
