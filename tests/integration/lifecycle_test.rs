//! Cross-service lifecycle tests
//!
//! Exercises the project and milestone services together over in-memory
//! stores: ordering history re-validation, sequence allocation across
//! deletes and the daily expiration sweep.

mod common;

use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use fundline_common::Error;
use fundline_projects::{
    CurrentUser, ExpirationSweep, NewMilestone, NewProject, ProjectStatus,
};

use crate::common::TestApp;

fn new_project(ordered: bool, initial: NaiveDate, r#final: NaiveDate) -> NewProject {
    NewProject {
        title: "Neighborhood Bakery".to_string(),
        description: "Open a community bakery".to_string(),
        category_id: 3,
        status: ProjectStatus::InProgress,
        need_to_follow_order: Some(ordered),
        initial_date: Some(initial),
        final_date: r#final,
    }
}

fn new_milestone(project_id: i64, title: &str) -> NewMilestone {
    NewMilestone {
        project_id,
        title: title.to_string(),
        description: "A milestone".to_string(),
        sequence: None,
        completed: None,
        contribution_goal: Some(Decimal::new(500_00, 2)),
    }
}

#[tokio::test]
async fn test_enabling_order_rejected_over_broken_history() {
    let app = TestApp::new();
    let user = CurrentUser::new(1);
    let today = Utc::now().date_naive();

    let project = app
        .projects
        .create(&user, new_project(false, today, today + Days::new(60)))
        .await
        .unwrap();
    let project_id = project.id.unwrap();

    let first = app
        .milestones
        .create(new_milestone(project_id, "Find a venue"))
        .await
        .unwrap();
    let second = app
        .milestones
        .create(new_milestone(project_id, "Buy the oven"))
        .await
        .unwrap();

    // Unordered project: completing the second milestone first is fine
    app.milestones
        .conclude(&user, second.id.unwrap())
        .await
        .unwrap();

    // History now violates the ordering rule, so the flag cannot be enabled
    let patch = fundline_projects::ProjectPatch {
        need_to_follow_order: Some(true),
        ..Default::default()
    };
    let err = app.projects.edit(&user, project_id, patch).await.unwrap_err();
    assert!(matches!(err, Error::MilestoneSequence(_)));
    assert_eq!(
        err.message(),
        "there are steps that have already been completed out of order"
    );

    // The rejected edit must not be persisted
    let stored = app.projects.find_by_id(project_id).await.unwrap();
    assert!(!stored.need_to_follow_order);

    // Once the history is consistent the flag can be enabled
    app.milestones
        .conclude(&user, first.id.unwrap())
        .await
        .unwrap();

    let patch = fundline_projects::ProjectPatch {
        need_to_follow_order: Some(true),
        ..Default::default()
    };
    let stored = app.projects.edit(&user, project_id, patch).await.unwrap();
    assert!(stored.need_to_follow_order);
}

#[tokio::test]
async fn test_sequence_allocation_skips_deleted_slots() {
    let app = TestApp::new();
    let user = CurrentUser::new(1);
    let today = Utc::now().date_naive();

    let project = app
        .projects
        .create(&user, new_project(false, today, today + Days::new(60)))
        .await
        .unwrap();
    let project_id = project.id.unwrap();

    for title in ["First", "Second", "Third"] {
        app.milestones
            .create(new_milestone(project_id, title))
            .await
            .unwrap();
    }

    let listed = app.milestones.find_by_project(project_id).await.unwrap();
    let sequences: Vec<i32> = listed.iter().map(|m| m.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);

    // Deleting the middle milestone leaves a gap; allocation continues
    // past the highest sequence rather than filling it
    let middle = listed[1].id.unwrap();
    app.milestones.delete(&user, middle).await.unwrap();

    let fourth = app
        .milestones
        .create(new_milestone(project_id, "Fourth"))
        .await
        .unwrap();
    assert_eq!(fourth.sequence, 4);
}

#[tokio::test]
async fn test_sweep_concludes_only_expired_active_projects() {
    let app = TestApp::new();
    let user = CurrentUser::new(1);
    let today = Utc::now().date_naive();
    let yesterday = today - Days::new(1);

    let expired = app
        .projects
        .create(&user, new_project(false, yesterday, yesterday))
        .await
        .unwrap();
    let running = app
        .projects
        .create(&user, new_project(false, today, today + Days::new(10)))
        .await
        .unwrap();
    let canceled = app
        .projects
        .create(&user, new_project(false, yesterday, yesterday))
        .await
        .unwrap();
    app.projects
        .cancel(&user, canceled.id.unwrap())
        .await
        .unwrap();

    let sweep = ExpirationSweep::new(app.project_store.clone());
    let count = sweep.run().await.unwrap();
    assert_eq!(count, 1);

    let stored = app
        .projects
        .find_by_id(expired.id.unwrap())
        .await
        .unwrap();
    assert_eq!(stored.status, ProjectStatus::Done);

    let stored = app
        .projects
        .find_by_id(running.id.unwrap())
        .await
        .unwrap();
    assert_eq!(stored.status, ProjectStatus::InProgress);

    let stored = app
        .projects
        .find_by_id(canceled.id.unwrap())
        .await
        .unwrap();
    assert_eq!(stored.status, ProjectStatus::Canceled);
}

#[tokio::test]
async fn test_concluding_twice_is_rejected() {
    let app = TestApp::new();
    let user = CurrentUser::new(1);
    let today = Utc::now().date_naive();

    let project = app
        .projects
        .create(&user, new_project(false, today, today + Days::new(5)))
        .await
        .unwrap();
    let project_id = project.id.unwrap();

    app.projects.conclude(&user, project_id).await.unwrap();

    let err = app.projects.conclude(&user, project_id).await.unwrap_err();
    assert!(matches!(err, Error::ProjectEditability(_)));
}
