/// Member authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/member/join` - register and sign in
/// - `POST /auth/member/login` - authenticate
/// - `POST /auth/member/refresh` - rotate the token pair
/// - `PUT  /auth/member/password/update` - change password (authenticated)
/// - `POST /auth/member/password/reset/request` - start reset handshake
/// - `PUT  /auth/member/password/reset/complete` - finish reset handshake
/// - `DELETE /auth/member` - decommission the account (authenticated)
///
/// Join and login take the same `{email, password_hash}` body; the
/// credential is an opaque string hashed server-side. Login and reset
/// requests never reveal whether an email is registered.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use ticklist_shared::auth::{AuthorizedSession, Principal};
use ticklist_shared::models::MemberView;

use crate::{
    app::AppState,
    error::{validate_request, ApiResult},
};

/// Join request
#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Opaque credential string
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password_hash: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Opaque credential string
    pub password_hash: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from a previous join/login/refresh response
    pub refresh_token: String,
}

/// Password update request
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    /// Current credential, verified before anything changes
    pub current_password_hash: String,

    /// Replacement credential
    pub new_password_hash: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    /// Email address to start the handshake for
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset response: always echoes the submitted email
#[derive(Debug, Serialize)]
pub struct ResetInitiatedResponse {
    /// Email as submitted
    pub email: String,
}

/// Password reset completion request
#[derive(Debug, Deserialize)]
pub struct ResetCompleteRequest {
    /// Single-use reset token delivered out of band
    pub reset_token: String,

    /// Replacement credential
    pub new_password_hash: String,
}

/// Registers a new member and returns a signed-in session.
///
/// # Errors
///
/// - `409 Conflict`: email already registered to a live account
/// - `422 Unprocessable Entity`: validation failed
pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> ApiResult<Json<AuthorizedSession>> {
    validate_request(&req)?;

    let session = state.credentials.join(&req.email, &req.password_hash).await?;
    Ok(Json(session))
}

/// Authenticates a member.
///
/// Unknown email and wrong credential produce the identical 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthorizedSession>> {
    validate_request(&req)?;

    let session = state
        .credentials
        .login(&req.email, &req.password_hash)
        .await?;
    Ok(Json(session))
}

/// Exchanges a refresh token for a new access+refresh pair.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AuthorizedSession>> {
    let session = state.credentials.refresh(&req.refresh_token).await?;
    Ok(Json(session))
}

/// Replaces the caller's password after verifying the current one.
pub async fn update_password(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<MemberView>> {
    let view = state
        .credentials
        .update_password(&principal, &req.current_password_hash, &req.new_password_hash)
        .await?;
    Ok(Json(view))
}

/// Starts the password-reset handshake.
///
/// Responds identically whether or not the email is registered; the reset
/// token, when one was minted, travels out of band and never appears here.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<Json<ResetInitiatedResponse>> {
    validate_request(&req)?;

    let outcome = state.credentials.request_password_reset(&req.email).await?;
    Ok(Json(ResetInitiatedResponse {
        email: outcome.email,
    }))
}

/// Completes the password-reset handshake and signs the member in.
pub async fn complete_password_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetCompleteRequest>,
) -> ApiResult<Json<AuthorizedSession>> {
    let session = state
        .credentials
        .complete_password_reset(&req.reset_token, &req.new_password_hash)
        .await?;
    Ok(Json(session))
}

/// Decommissions the caller's account.
pub async fn decommission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<StatusCode> {
    state.credentials.decommission(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
