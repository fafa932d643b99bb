//! Shared test harness for integration tests
//!
//! Builds the Projects domain router on top of in-memory stores so full
//! HTTP flows can be exercised without a database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use tower::ServiceExt;

use fundline_projects::{
    AuthConfig, ExtensionImageCodec, InMemoryMilestoneStore, InMemoryProjectStore,
    MilestoneLifecycleService, ProjectLifecycleService, ProjectsState,
};

const TEST_JWT_SECRET: &str = "integration-test-secret";

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: u64,
    role: String,
}

/// In-process application wired against in-memory stores
pub struct TestApp {
    pub router: Router,
    pub project_store: Arc<InMemoryProjectStore>,
    pub milestone_store: Arc<InMemoryMilestoneStore>,
    pub projects: Arc<ProjectLifecycleService>,
    pub milestones: Arc<MilestoneLifecycleService>,
}

impl TestApp {
    pub fn new() -> Self {
        let project_store = Arc::new(InMemoryProjectStore::new());
        let milestone_store = Arc::new(InMemoryMilestoneStore::new());

        let projects = Arc::new(ProjectLifecycleService::new(
            project_store.clone(),
            milestone_store.clone(),
            Arc::new(ExtensionImageCodec),
        ));
        let milestones = Arc::new(MilestoneLifecycleService::new(
            milestone_store.clone(),
            projects.clone(),
        ));

        let state = ProjectsState {
            projects: projects.clone(),
            milestones: milestones.clone(),
            auth_config: AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let router = fundline_projects::routes().with_state(state);

        Self {
            router,
            project_store,
            milestone_store,
            projects,
            milestones,
        }
    }

    /// Issue a bearer token for a regular user
    pub fn token_for(&self, user_id: i64) -> String {
        sign_token(user_id, "")
    }

    /// Issue a bearer token carrying the administrator role
    pub fn admin_token(&self, user_id: i64) -> String {
        sign_token(user_id, "adm")
    }

    /// Send a JSON request through the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Upload a multipart file to the given uri; `file_name: None` sends a
    /// form without the expected `file` part
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "fundline-test-boundary";

        let mut body = Vec::new();
        match file_name {
            Some(name) => {
                body.extend_from_slice(
                    format!(
                        "--{boundary}\r\nContent-Disposition: form-data; \
                         name=\"file\"; filename=\"{name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "--{boundary}\r\nContent-Disposition: form-data; \
                         name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
                    )
                    .as_bytes(),
                );
            }
        }

        let request = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }
}

fn sign_token(user_id: i64, role: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() as u64) + 3600,
        role: role.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Extract the error message from an error response body
pub fn error_message(body: &Value) -> &str {
    body["error"]["message"].as_str().unwrap_or_default()
}
