/// Anonymous session endpoints
///
/// The `user` role has no accounts and no request bodies. Join mints a
/// fresh session context; login re-issues a pair for an existing one;
/// refresh rotates the pair while preserving the subject. All three return
/// the same `{id, token}` shape as the member endpoints.
///
/// # Endpoints
///
/// - `POST /auth/user/join` - public
/// - `POST /auth/user/login` - requires a user access token
/// - `POST /auth/user/refresh` - requires a refresh token in the
///   `Authorization` header (these endpoints carry no body)

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Extension, Json,
};

use ticklist_shared::auth::resolver::bearer_token;
use ticklist_shared::auth::{AuthorizedSession, Principal};

use crate::{app::AppState, error::ApiResult};

/// Mints a brand new anonymous session.
pub async fn join(State(state): State<AppState>) -> ApiResult<Json<AuthorizedSession>> {
    let session = state.sessions.join()?;
    Ok(Json(session))
}

/// Re-issues a token pair for the resolved user principal.
pub async fn login(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<AuthorizedSession>> {
    let session = state.sessions.login(&principal)?;
    Ok(Json(session))
}

/// Rotates the pair carried in the `Authorization` header.
///
/// The subject id is preserved; the old pair simply stops being the one the
/// client holds.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthorizedSession>> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = bearer_token(header).map_err(crate::error::ApiError::from)?;

    let session = state.sessions.refresh(token).await?;
    Ok(Json(session))
}
