//! Identity: who is signed in, and whether a protected route may render.

pub mod firebase;
pub mod handlers;
pub mod middleware;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::User;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Missing FIREBASE_API_KEY environment variable")]
    MissingConfiguration,

    /// The provider refused the credentials or token; message is the provider's.
    #[error("{0}")]
    Rejected(String),

    #[error("{0} is not supported by this server")]
    Unsupported(&'static str),

    #[error("Identity request failed: {0}")]
    RequestFailed(String),
}

/// Tokens returned by a successful sign-in or sign-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id_token: String,
    pub refresh_token: String,
    /// Seconds until `id_token` expires.
    pub expires_in: u64,
    pub user: User,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    async fn sign_out(&self, id_token: &str) -> Result<(), IdentityError>;

    /// Popup-based federated sign-in.
    async fn sign_in_with_federated(&self) -> Result<Session, IdentityError> {
        Err(IdentityError::Unsupported("Federated sign-in"))
    }

    async fn current_user(&self, id_token: &str) -> Result<User, IdentityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAccess {
    Loading,
    RedirectToSignIn,
    Allow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthState {
    pub user: Option<User>,
    pub loading: bool,
}

impl AuthState {
    /// State before the provider has answered.
    pub fn pending() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }

    pub fn resolved(user: Option<User>) -> Self {
        Self {
            user,
            loading: false,
        }
    }

    pub fn route_access(&self) -> RouteAccess {
        match (&self.user, self.loading) {
            (_, true) => RouteAccess::Loading,
            (None, false) => RouteAccess::RedirectToSignIn,
            (Some(_), false) => RouteAccess::Allow,
        }
    }
}
