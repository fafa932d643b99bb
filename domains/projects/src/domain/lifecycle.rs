//! Project lifecycle guard
//!
//! Decides whether a project in a given status may be mutated. `Done` and
//! `Canceled` are terminal; the five remaining statuses are all editable and
//! no transition rules exist between them.

use fundline_common::{Error, Result};

use crate::domain::entities::{Project, ProjectStatus};

/// Guard rejecting mutation of projects in a terminal status
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleGuard;

impl LifecycleGuard {
    /// Raise `ProjectEditability` if the project can no longer be mutated
    pub fn assert_editable(&self, project: &Project) -> Result<()> {
        match project.status {
            ProjectStatus::Done => Err(Error::ProjectEditability(
                "this project has already been concluded and cannot be edited".to_string(),
            )),
            ProjectStatus::Canceled => Err(Error::ProjectEditability(
                "this project has already been cancelled and cannot be edited".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
