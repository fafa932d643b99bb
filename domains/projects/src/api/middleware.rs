//! Projects domain state and authentication middleware
//!
//! Bearer-token validation producing the request-scoped [`CurrentUser`] the
//! services authorize against.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::CurrentUser;
use crate::service::{MilestoneLifecycleService, ProjectLifecycleService};

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Application state for the Projects domain
#[derive(Clone)]
pub struct ProjectsState {
    pub projects: Arc<ProjectLifecycleService>,
    pub milestones: Arc<MilestoneLifecycleService>,
    pub auth_config: AuthConfig,
}

impl FromRef<ProjectsState> for AuthConfig {
    fn from_ref(state: &ProjectsState) -> Self {
        state.auth_config.clone()
    }
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    MissingAuthorization,
    InvalidAuthorizationFormat,
    InvalidToken,
    InvalidUserId,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingAuthorization => {
                ("MISSING_AUTHORIZATION", "Authorization header required")
            }
            AuthError::InvalidAuthorizationFormat => (
                "INVALID_AUTHORIZATION",
                "Invalid authorization header format",
            ),
            AuthError::InvalidToken => ("INVALID_TOKEN", "Invalid or expired token"),
            AuthError::InvalidUserId => ("INVALID_TOKEN", "Invalid user ID in token"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// JWT claims carried by Fundline access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expires at
    pub exp: u64,
    /// User role; administrators bypass creator checks
    #[serde(default)]
    pub role: String,
}

/// Authenticated user extractor
#[derive(Debug)]
pub struct AuthUser(pub CurrentUser);

impl FromRequestParts<ProjectsState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ProjectsState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;

        let token = extract_bearer_token(auth_header)?;
        let claims = validate_token(token, &state.auth_config)?;

        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidUserId)?;
        if user_id < 1 {
            return Err(AuthError::InvalidUserId);
        }

        let user = if claims.role == "adm" {
            CurrentUser::admin(user_id)
        } else {
            CurrentUser::new(user_id)
        };

        Ok(AuthUser(user))
    }
}

fn extract_bearer_token(header: &HeaderValue) -> std::result::Result<&str, AuthError> {
    let value = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorizationFormat)
}

fn validate_token(token: &str, config: &AuthConfig) -> std::result::Result<Claims, AuthError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AuthError::InvalidToken)?;

    Ok(decoded.claims)
}
