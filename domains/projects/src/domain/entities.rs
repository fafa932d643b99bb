//! Domain entities for the Projects domain
//!
//! This module contains the crowdfunding project and milestone entities.
//! Each entity includes proper validation, serialization, and business rules.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fundline_common::{Error, Result};

/// Maximum length of a project or milestone title
pub const MAX_TITLE_LEN: usize = 80;

/// Project status
///
/// Seven ordinal values persisted by id. `Done` and `Canceled` are terminal:
/// a project in either status rejects every further mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[repr(i16)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    InPlanning = 1,
    AwaitingFunding = 2,
    InProgress = 3,
    Paused = 4,
    InReview = 5,
    Done = 6,
    Canceled = 7,
}

impl ProjectStatus {
    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }

    /// Ordinal id of this status as stored in the database
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Resolve a status from its stored ordinal id
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Self::InPlanning),
            2 => Some(Self::AwaitingFunding),
            3 => Some(Self::InProgress),
            4 => Some(Self::Paused),
            5 => Some(Self::InReview),
            6 => Some(Self::Done),
            7 => Some(Self::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InPlanning => write!(f, "in_planning"),
            Self::AwaitingFunding => write!(f, "awaiting_funding"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Paused => write!(f, "paused"),
            Self::InReview => write!(f, "in_review"),
            Self::Done => write!(f, "done"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

/// Project entity
///
/// `creator_id` and `creation_date` are set once at creation and never change.
/// The id is assigned by the store on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub category_id: i64,
    pub status: ProjectStatus,
    pub need_to_follow_order: bool,
    pub creation_date: DateTime<Utc>,
    pub initial_date: NaiveDate,
    pub final_date: NaiveDate,
    /// Cover image bytes; never serialized in API responses
    #[serde(skip)]
    pub cover_image: Option<Vec<u8>>,
}

/// Partial update for a project
///
/// Absent fields leave the current value unchanged. Blank or whitespace-only
/// strings are also treated as "no change", matching observed API behavior.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ProjectStatus>,
    pub need_to_follow_order: Option<bool>,
    pub final_date: Option<NaiveDate>,
}

/// Treat blank strings as absent when applying partial updates
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Project {
    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidParameters("title is required".to_string()));
        }

        if self.title.len() > MAX_TITLE_LEN {
            return Err(Error::InvalidParameters(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        if self.description.trim().is_empty() {
            return Err(Error::InvalidParameters(
                "description is required".to_string(),
            ));
        }

        if self.creator_id < 1 {
            return Err(Error::InvalidParameters(
                "creator id must be valid".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply a partial update, leaving absent and blank fields unchanged
    pub fn apply(&mut self, patch: ProjectPatch) {
        if let Some(title) = non_blank(patch.title) {
            self.title = title;
        }

        if let Some(description) = non_blank(patch.description) {
            self.description = description;
        }

        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }

        if let Some(status) = patch.status {
            self.status = status;
        }

        if let Some(need_to_follow_order) = patch.need_to_follow_order {
            self.need_to_follow_order = need_to_follow_order;
        }

        if let Some(final_date) = patch.final_date {
            self.final_date = final_date;
        }
    }
}

/// Project milestone entity
///
/// `sequence` positions the milestone within its project and is unique per
/// project. The id is assigned by the store on first save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMilestone {
    pub id: Option<i64>,
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub sequence: i32,
    pub completed: bool,
    pub contribution_goal: Decimal,
}

/// Partial update for a milestone
///
/// Same semantics as [`ProjectPatch`]: absent and blank fields are left
/// unchanged. The sequence is resolved separately by the allocator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MilestonePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sequence: Option<i32>,
    pub completed: Option<bool>,
    pub contribution_goal: Option<Decimal>,
}

impl ProjectMilestone {
    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidParameters("title is required".to_string()));
        }

        if self.title.len() > MAX_TITLE_LEN {
            return Err(Error::InvalidParameters(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        if self.description.trim().is_empty() {
            return Err(Error::InvalidParameters(
                "description is required".to_string(),
            ));
        }

        if self.project_id < 1 {
            return Err(Error::InvalidParameters(
                "project id must be valid".to_string(),
            ));
        }

        if self.contribution_goal < Decimal::ZERO {
            return Err(Error::InvalidParameters(
                "contribution goal must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply a partial update, leaving absent and blank fields unchanged
    pub fn apply(&mut self, patch: &MilestonePatch) {
        if let Some(title) = non_blank(patch.title.clone()) {
            self.title = title;
        }

        if let Some(description) = non_blank(patch.description.clone()) {
            self.description = description;
        }

        if let Some(completed) = patch.completed {
            self.completed = completed;
        }

        if let Some(contribution_goal) = patch.contribution_goal {
            self.contribution_goal = contribution_goal;
        }
    }
}
