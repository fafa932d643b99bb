//! HTTP API integration tests
//!
//! Drives the Projects domain router end to end over in-memory stores:
//! authentication, project lifecycle, milestone ordering and cover images.

mod common;

use chrono::{Days, Utc};
use serde_json::{json, Value};

use crate::common::{error_message, TestApp};

fn future_date() -> String {
    (Utc::now().date_naive() + Days::new(30)).to_string()
}

fn project_body(ordered: bool) -> Value {
    json!({
        "title": "Community Garden",
        "description": "Build a garden in the old lot",
        "category_id": 2,
        "status": "in_progress",
        "need_to_follow_order": ordered,
        "final_date": future_date(),
    })
}

fn milestone_body(project_id: i64, title: &str, sequence: Option<i32>) -> Value {
    json!({
        "project_id": project_id,
        "title": title,
        "description": "A milestone",
        "sequence": sequence,
        "contribution_goal": "150.00",
    })
}

#[tokio::test]
async fn test_requests_require_authentication() {
    let app = TestApp::new();

    let (status, body) = app.request("GET", "/v1/projects/1", None, None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], "MISSING_AUTHORIZATION");

    let (status, _) = app
        .request("GET", "/v1/projects/1", Some("not-a-token"), None)
        .await;
    assert_eq!(status, 401);
}

#[test_log::test(tokio::test)]
async fn test_project_crud_flow() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let (status, created) = app
        .request("POST", "/v1/projects", Some(&token), Some(project_body(false)))
        .await;
    assert_eq!(status, 201);
    assert_eq!(created["id"], 1);
    assert_eq!(created["status"], "in_progress");
    assert_eq!(created["creator_id"], 1);

    let (status, fetched) = app
        .request("GET", "/v1/projects/1", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(fetched["title"], "Community Garden");

    let (status, updated) = app
        .request(
            "PATCH",
            "/v1/projects/1",
            Some(&token),
            Some(json!({"title": "Community Garden II", "status": "paused"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["title"], "Community Garden II");
    assert_eq!(updated["status"], "paused");

    let (status, concluded) = app
        .request("PATCH", "/v1/projects/1/conclude", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(concluded["status"], "done");

    // Terminal projects reject any further edit
    let (status, body) = app
        .request(
            "PATCH",
            "/v1/projects/1",
            Some(&token),
            Some(json!({"title": "Too late"})),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(
        error_message(&body),
        "this project has already been concluded and cannot be edited"
    );
}

#[tokio::test]
async fn test_canceled_project_cannot_be_edited() {
    let app = TestApp::new();
    let token = app.token_for(1);

    app.request("POST", "/v1/projects", Some(&token), Some(project_body(false)))
        .await;

    let (status, canceled) = app
        .request("PATCH", "/v1/projects/1/cancel", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(canceled["status"], "canceled");

    let (status, body) = app
        .request(
            "PATCH",
            "/v1/projects/1",
            Some(&token),
            Some(json!({"description": "Too late"})),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(
        error_message(&body),
        "this project has already been cancelled and cannot be edited"
    );
}

#[tokio::test]
async fn test_only_creator_or_admin_can_edit() {
    let app = TestApp::new();
    let creator = app.token_for(1);
    let stranger = app.token_for(2);
    let admin = app.admin_token(99);

    app.request("POST", "/v1/projects", Some(&creator), Some(project_body(false)))
        .await;

    let (status, body) = app
        .request(
            "PATCH",
            "/v1/projects/1",
            Some(&stranger),
            Some(json!({"title": "Hijacked"})),
        )
        .await;
    assert_eq!(status, 403);
    assert_eq!(
        error_message(&body),
        "without permission to perform this action"
    );

    let (status, updated) = app
        .request(
            "PATCH",
            "/v1/projects/1",
            Some(&admin),
            Some(json!({"title": "Moderated"})),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(updated["title"], "Moderated");
}

#[tokio::test]
async fn test_lookup_rejects_invalid_and_unknown_ids() {
    let app = TestApp::new();
    let token = app.token_for(1);

    let (status, body) = app
        .request("GET", "/v1/projects/0", Some(&token), None)
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_message(&body), "id must be valid");

    let (status, body) = app
        .request("GET", "/v1/projects/999", Some(&token), None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(error_message(&body), "project not found");

    let (status, body) = app
        .request("GET", "/v1/milestones/999", Some(&token), None)
        .await;
    assert_eq!(status, 404);
    assert_eq!(error_message(&body), "project milestone not found");
}

#[test_log::test(tokio::test)]
async fn test_milestone_flow_with_ordering() {
    let app = TestApp::new();
    let token = app.token_for(1);

    app.request("POST", "/v1/projects", Some(&token), Some(project_body(true)))
        .await;

    // Sequences are allocated automatically when omitted
    let (status, first) = app
        .request(
            "POST",
            "/v1/milestones",
            Some(&token),
            Some(milestone_body(1, "Clear the lot", None)),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(first["sequence"], 1);

    let (status, second) = app
        .request(
            "POST",
            "/v1/milestones",
            Some(&token),
            Some(milestone_body(1, "Build the beds", None)),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(second["sequence"], 2);

    // Requesting a taken sequence is rejected
    let (status, body) = app
        .request(
            "POST",
            "/v1/milestones",
            Some(&token),
            Some(milestone_body(1, "Duplicate", Some(2))),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(
        error_message(&body),
        "this sequence number already exists in this project"
    );

    // Ordered projects require milestones to be completed in sequence
    let (status, body) = app
        .request("PATCH", "/v1/milestones/2/conclude", Some(&token), None)
        .await;
    assert_eq!(status, 409);
    assert_eq!(
        error_message(&body),
        "the milestones of this project need to be completed in the sequence"
    );

    let (status, done) = app
        .request("PATCH", "/v1/milestones/1/conclude", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(done["completed"], true);

    let (status, done) = app
        .request("PATCH", "/v1/milestones/2/conclude", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(done["completed"], true);

    let (status, listed) = app
        .request("GET", "/v1/projects/1/milestones", Some(&token), None)
        .await;
    assert_eq!(status, 200);
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (status, completed) = app
        .request(
            "GET",
            "/v1/projects/1/milestones/completed",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(completed.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_milestone_with_linked_spend_cannot_be_deleted() {
    let app = TestApp::new();
    let token = app.token_for(1);

    app.request("POST", "/v1/projects", Some(&token), Some(project_body(false)))
        .await;
    app.request(
        "POST",
        "/v1/milestones",
        Some(&token),
        Some(milestone_body(1, "Funded milestone", None)),
    )
    .await;

    app.request(
        "POST",
        "/v1/milestones",
        Some(&token),
        Some(milestone_body(1, "Unfunded milestone", None)),
    )
    .await;

    app.milestone_store.link_spend(1);

    let (status, body) = app
        .request("DELETE", "/v1/milestones/1", Some(&token), None)
        .await;
    assert_eq!(status, 409);
    assert_eq!(
        error_message(&body),
        "this milestone of the project has a linked expense, impossible to exclude"
    );

    // Without the spend the delete goes through
    let (status, _) = app
        .request("DELETE", "/v1/milestones/2", Some(&token), None)
        .await;
    assert_eq!(status, 204);

    let (status, _) = app
        .request("GET", "/v1/milestones/2", Some(&token), None)
        .await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_cover_image_upload_and_validation() {
    let app = TestApp::new();
    let token = app.token_for(1);

    app.request("POST", "/v1/projects", Some(&token), Some(project_body(false)))
        .await;

    let (status, _) = app
        .upload("/v1/projects/1/cover-image", &token, Some("cover.png"), b"png-bytes")
        .await;
    assert_eq!(status, 204);

    let (status, body) = app
        .upload("/v1/projects/1/cover-image", &token, Some("cover.gif"), b"gif-bytes")
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_message(&body), "invalid file extension");

    let (status, body) = app
        .upload("/v1/projects/1/cover-image", &token, Some("noextension"), b"bytes")
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_message(&body), "invalid file name");

    let (status, body) = app
        .upload("/v1/projects/1/cover-image", &token, None, b"")
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_message(&body), "file cannot be null");

    let (status, _) = app
        .request("DELETE", "/v1/projects/1/cover-image", Some(&token), None)
        .await;
    assert_eq!(status, 204);
}
