//! Authorization port
//!
//! Resolves the current actor and enforces creator-only mutation. The API
//! middleware builds a [`CurrentUser`] per request from the bearer token;
//! tests construct one directly.

use fundline_common::{Error, Result};

/// Resolves the acting user and enforces ownership
pub trait AuthorizationContext: Send + Sync {
    /// Id of the authenticated actor
    fn current_user_id(&self) -> i64;

    /// Whether the actor holds the administrator role
    fn is_admin(&self) -> bool {
        false
    }

    /// Raise `WithoutPermission` unless the actor is the creator (admins
    /// bypass the check)
    fn assert_is_creator(&self, creator_id: i64) -> Result<()> {
        if self.is_admin() || self.current_user_id() == creator_id {
            Ok(())
        } else {
            Err(Error::without_permission())
        }
    }
}

/// Request-scoped authenticated actor
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i64,
    pub admin: bool,
}

impl CurrentUser {
    pub fn new(id: i64) -> Self {
        Self { id, admin: false }
    }

    pub fn admin(id: i64) -> Self {
        Self { id, admin: true }
    }
}

impl AuthorizationContext for CurrentUser {
    fn current_user_id(&self) -> i64 {
        self.id
    }

    fn is_admin(&self) -> bool {
        self.admin
    }
}
