//! Axum route handlers for the Auth API.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::middleware::{bearer_token, BearerToken};
use super::{AuthState, IdentityError, RouteAccess, Session};
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AuthStateResponse {
    #[serde(flatten)]
    pub auth: AuthState,
    pub access: RouteAccess,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Session>, AppError> {
    request.validate()?;
    let session = state
        .identity
        .sign_in(request.email.trim(), &request.password)
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Json<Session>, AppError> {
    request.validate()?;
    let session = state
        .identity
        .sign_up(request.email.trim(), &request.password)
        .await?;
    Ok(Json(session))
}

/// POST /api/v1/auth/federated
pub async fn handle_federated(State(state): State<AppState>) -> Result<Json<Session>, AppError> {
    Ok(Json(state.identity.sign_in_with_federated().await?))
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<StatusCode, AppError> {
    state.identity.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// GET /api/v1/auth/state
///
/// Public. Tells the front end whether a protected view may render for the
/// token it holds (if any). A rejected token reads as signed out.
pub async fn handle_auth_state(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthStateResponse>, AppError> {
    let user = match bearer_token(&headers) {
        None => None,
        Some(token) => match state.identity.current_user(&token).await {
            Ok(user) => Some(user),
            Err(IdentityError::Rejected(_)) => None,
            Err(e) => return Err(e.into()),
        },
    };
    let auth = AuthState::resolved(user);
    let access = auth.route_access();
    Ok(Json(AuthStateResponse { auth, access }))
}
