//! Milestone sequence allocation
//!
//! Assigns and validates a milestone's position within its project. Sequences
//! are unique per project; gaps are allowed after deletions. The allocator
//! performs no locking around the max+1 read; the store's unique constraint
//! on `(project_id, sequence)` rejects the loser of a concurrent allocation.

use std::sync::Arc;

use fundline_common::{Error, Result};

use crate::domain::entities::ProjectMilestone;
use crate::store::MilestoneStore;

/// Highest sequence number a milestone may hold
pub const MAX_SEQUENCE: i32 = 32_767;

/// Resolves the sequence number for a milestone being created or edited
#[derive(Clone)]
pub struct SequenceAllocator {
    milestones: Arc<dyn MilestoneStore>,
}

impl SequenceAllocator {
    pub fn new(milestones: Arc<dyn MilestoneStore>) -> Self {
        Self { milestones }
    }

    /// Resolve the sequence for a milestone.
    ///
    /// - No requested sequence on a new milestone: next free position,
    ///   `max(existing) + 1`, or `1` for the project's first milestone. The
    ///   next position must still lie within the valid range.
    /// - No requested sequence on an existing milestone: the current value is
    ///   kept untouched.
    /// - An explicitly requested sequence is accepted unchanged unless another
    ///   milestone of the same project already holds it (the milestone's own
    ///   id is excluded from the check on edit).
    pub async fn allocate(
        &self,
        project_id: i64,
        requested: Option<i32>,
        existing: Option<&ProjectMilestone>,
    ) -> Result<i32> {
        let Some(sequence) = requested else {
            if let Some(milestone) = existing {
                return Ok(milestone.sequence);
            }

            let next = self
                .milestones
                .find_max_sequence(project_id)
                .await?
                .map_or(1, |max| max + 1);
            if next > MAX_SEQUENCE {
                return Err(Error::InvalidParameters(
                    "sequence out of valid range".to_string(),
                ));
            }
            return Ok(next);
        };

        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(Error::InvalidParameters(
                "sequence out of valid range".to_string(),
            ));
        }

        let excluding_id = existing.and_then(|milestone| milestone.id);
        let holder = self
            .milestones
            .find_by_sequence(project_id, sequence, excluding_id)
            .await?;

        if holder.is_some() {
            return Err(Error::InvalidParameters(
                "this sequence number already exists in this project".to_string(),
            ));
        }

        Ok(sequence)
    }
}
