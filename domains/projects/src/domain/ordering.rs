//! Ordered-completion constraint
//!
//! When a project opts into `need_to_follow_order`, milestones must be marked
//! completed in ascending sequence order. This module enforces the rule on
//! milestone mutation and re-checks it when a project edit turns the flag on.

use std::sync::Arc;

use fundline_common::{Error, Result};

use crate::domain::entities::{Project, ProjectMilestone};
use crate::store::MilestoneStore;

/// Enforces and re-validates the ordered-completion rule
#[derive(Clone)]
pub struct OrderConstraintValidator {
    milestones: Arc<dyn MilestoneStore>,
}

impl OrderConstraintValidator {
    pub fn new(milestones: Arc<dyn MilestoneStore>) -> Self {
        Self { milestones }
    }

    /// Reject a completed milestone while a lower-sequence milestone of the
    /// same project is still incomplete.
    ///
    /// No-op unless the project requires ordered completion and the milestone
    /// being validated is completed.
    pub async fn assert_order_respected(
        &self,
        project: &Project,
        milestone: &ProjectMilestone,
    ) -> Result<()> {
        if !project.need_to_follow_order || !milestone.completed {
            return Ok(());
        }

        let pending = self
            .milestones
            .find_incomplete_below(milestone.project_id, milestone.sequence)
            .await?;

        if !pending.is_empty() {
            return Err(Error::MilestoneSequence(
                "the milestones of this project need to be completed in the sequence".to_string(),
            ));
        }

        Ok(())
    }

    /// Detect completions that already violate the order before the flag was
    /// turned on.
    ///
    /// `ordered` must be the project's milestones sorted ascending by
    /// sequence. Rejects the edit; it never attempts to repair state.
    pub fn assert_no_existing_violation(
        &self,
        project: &Project,
        ordered: &[ProjectMilestone],
    ) -> Result<()> {
        if !project.need_to_follow_order {
            return Ok(());
        }

        for pair in ordered.windows(2) {
            if pair[1].completed && !pair[0].completed {
                return Err(Error::MilestoneSequence(
                    "there are steps that have already been completed out of order".to_string(),
                ));
            }
        }

        Ok(())
    }
}
