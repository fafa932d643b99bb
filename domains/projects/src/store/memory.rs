//! In-memory store adapters
//!
//! Mutex-guarded maps with a monotonic id counter, enforcing the same
//! constraints as the Postgres schema: unique `(project_id, sequence)` and
//! deletion blocked while a spend record references the milestone. Used by
//! unit and integration tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use fundline_common::StoreError;

use crate::domain::entities::{Project, ProjectMilestone, ProjectStatus};
use crate::store::{MilestoneStore, ProjectStore, StoreResult};

/// In-memory [`ProjectStore`]
#[derive(Default)]
pub struct InMemoryProjectStore {
    records: Mutex<BTreeMap<i64, Project>>,
    next_id: AtomicI64,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<i64, Project>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn save(&self, project: &Project) -> StoreResult<Project> {
        let mut records = self.lock();
        let mut persisted = project.clone();

        let id = match persisted.id {
            Some(id) => {
                if !records.contains_key(&id) {
                    return Err(StoreError::NotFound);
                }
                id
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                persisted.id = Some(id);
                id
            }
        };

        records.insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn exists_by_id(&self, id: i64) -> StoreResult<bool> {
        Ok(self.lock().contains_key(&id))
    }

    async fn find_ending_on(
        &self,
        date: NaiveDate,
        excluded_statuses: &[ProjectStatus],
    ) -> StoreResult<Vec<Project>> {
        Ok(self
            .lock()
            .values()
            .filter(|p| p.final_date == date && !excluded_statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    async fn save_all(&self, projects: &[Project]) -> StoreResult<()> {
        let mut records = self.lock();
        for project in projects {
            let Some(id) = project.id else {
                return Err(StoreError::InvalidData(
                    "cannot batch-save an unsaved project".to_string(),
                ));
            };
            records.insert(id, project.clone());
        }
        Ok(())
    }
}

/// In-memory [`MilestoneStore`]
#[derive(Default)]
pub struct InMemoryMilestoneStore {
    records: Mutex<BTreeMap<i64, ProjectMilestone>>,
    spend_links: Mutex<HashSet<i64>>,
    next_id: AtomicI64,
}

impl InMemoryMilestoneStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            spend_links: Mutex::new(HashSet::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<i64, ProjectMilestone>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a spend record referencing a milestone, blocking its deletion
    /// the way the foreign key does in Postgres
    pub fn link_spend(&self, milestone_id: i64) {
        self.spend_links
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(milestone_id);
    }

    fn has_spend_link(&self, milestone_id: i64) -> bool {
        self.spend_links
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&milestone_id)
    }
}

#[async_trait]
impl MilestoneStore for InMemoryMilestoneStore {
    async fn find_by_id(&self, id: i64) -> StoreResult<Option<ProjectMilestone>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn save(&self, milestone: &ProjectMilestone) -> StoreResult<ProjectMilestone> {
        let mut records = self.lock();

        let duplicate = records.values().any(|m| {
            m.project_id == milestone.project_id
                && m.sequence == milestone.sequence
                && m.id != milestone.id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(format!(
                "sequence {} already used in project {}",
                milestone.sequence, milestone.project_id
            )));
        }

        let mut persisted = milestone.clone();
        let id = match persisted.id {
            Some(id) => {
                if !records.contains_key(&id) {
                    return Err(StoreError::NotFound);
                }
                id
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                persisted.id = Some(id);
                id
            }
        };

        records.insert(id, persisted.clone());
        Ok(persisted)
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        if self.has_spend_link(id) {
            return Err(StoreError::ForeignKeyViolation(format!(
                "milestone {} is referenced by a project spend",
                id
            )));
        }

        match self.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }

    async fn find_by_project(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>> {
        let mut milestones: Vec<_> = self
            .lock()
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.sequence);
        Ok(milestones)
    }

    async fn find_max_sequence(&self, project_id: i64) -> StoreResult<Option<i32>> {
        Ok(self
            .lock()
            .values()
            .filter(|m| m.project_id == project_id)
            .map(|m| m.sequence)
            .max())
    }

    async fn find_by_sequence(
        &self,
        project_id: i64,
        sequence: i32,
        excluding_id: Option<i64>,
    ) -> StoreResult<Option<ProjectMilestone>> {
        Ok(self
            .lock()
            .values()
            .find(|m| {
                m.project_id == project_id
                    && m.sequence == sequence
                    && (excluding_id.is_none() || m.id != excluding_id)
            })
            .cloned())
    }

    async fn find_incomplete_below(
        &self,
        project_id: i64,
        sequence: i32,
    ) -> StoreResult<Vec<ProjectMilestone>> {
        Ok(self
            .lock()
            .values()
            .filter(|m| m.project_id == project_id && m.sequence < sequence && !m.completed)
            .cloned()
            .collect())
    }

    async fn find_completed(&self, project_id: i64) -> StoreResult<Vec<ProjectMilestone>> {
        let mut milestones: Vec<_> = self
            .lock()
            .values()
            .filter(|m| m.project_id == project_id && m.completed)
            .cloned()
            .collect();
        milestones.sort_by_key(|m| m.sequence);
        Ok(milestones)
    }
}
