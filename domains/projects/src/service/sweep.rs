//! Expiration sweep
//!
//! Daily batch that concludes projects whose final date passed yesterday and
//! that are not already in a terminal status. System-initiated: no per-project
//! permission check, and the batch is persisted in a single store call.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use fundline_common::Result;

use crate::domain::entities::ProjectStatus;
use crate::store::ProjectStore;

/// Minutes past midnight UTC at which the daily sweep runs
const RUN_MINUTE: i64 = 1;

/// Concludes expired, non-terminal projects
pub struct ExpirationSweep {
    projects: Arc<dyn ProjectStore>,
}

impl ExpirationSweep {
    pub fn new(projects: Arc<dyn ProjectStore>) -> Self {
        Self { projects }
    }

    /// Run one sweep; returns the number of projects concluded
    pub async fn run(&self) -> Result<usize> {
        let yesterday = Utc::now().date_naive() - Days::new(1);

        let mut expired = self
            .projects
            .find_ending_on(yesterday, &[ProjectStatus::Done, ProjectStatus::Canceled])
            .await?;

        if expired.is_empty() {
            return Ok(0);
        }

        for project in &mut expired {
            project.status = ProjectStatus::Done;
        }

        self.projects.save_all(&expired).await?;
        Ok(expired.len())
    }

    /// Spawn a background task running the sweep at 00:01 UTC every day
    #[mutants::skip] // Infinite scheduling loop, not reachable from tests
    pub fn spawn_daily(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let wait = duration_until_next_run(Utc::now());
                tokio::time::sleep(wait).await;

                match self.run().await {
                    Ok(count) => info!(count, "expiration sweep completed"),
                    Err(err) => error!(error = %err, "expiration sweep failed"),
                }
            }
        })
    }
}

/// Time remaining until the next 00:01 UTC
fn duration_until_next_run(now: DateTime<Utc>) -> Duration {
    let todays_run =
        now.date_naive().and_time(NaiveTime::MIN).and_utc() + chrono::Duration::minutes(RUN_MINUTE);

    let next_run = if todays_run > now {
        todays_run
    } else {
        todays_run + chrono::Duration::days(1)
    };

    (next_run - now).to_std().unwrap_or(Duration::from_secs(60))
}
