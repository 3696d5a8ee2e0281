/// Error handling for the API server
///
/// A unified error type that maps every domain failure to an HTTP response
/// with a stable `{error, message, details?}` JSON body. Handlers return
/// `Result<T, ApiError>`; the `From` impls below encode the status policy:
///
/// - ownership denials arrive as the services' not-found errors and are
///   served as 404, indistinguishable from a genuinely missing record;
/// - login failures are one generic 401 regardless of which part was wrong;
/// - validation failures are 422 and happen before any lookup or mutation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use ticklist_shared::auth::{AuthError, CredentialError, SessionError};
use ticklist_shared::tasks::TaskError;
use ticklist_shared::todos::TodoError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. duplicate email
    Conflict(String),

    /// Unprocessable entity (422), validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "not_found", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Runs `validator` checks and converts failures to the 422 shape.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), ApiError> {
    req.validate().map_err(|e| {
        let errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::ValidationError(errors)
    })
}

fn body_validation(message: String) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: "body".to_string(),
        message,
    }])
}

/// Identity resolution failures
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::Token(e) => ApiError::Unauthorized(e.to_string()),
            AuthError::WrongRole { .. } => ApiError::Forbidden(err.to_string()),
            AuthError::NotEnrolled => ApiError::Forbidden(err.to_string()),
            AuthError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Credential manager failures
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmailTaken => ApiError::Conflict(err.to_string()),
            CredentialError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            CredentialError::InvalidToken => ApiError::Unauthorized(err.to_string()),
            CredentialError::NotEnrolled => ApiError::Forbidden(err.to_string()),
            CredentialError::Validation(msg) => body_validation(msg),
            CredentialError::Password(e) => ApiError::InternalError(e.to_string()),
            CredentialError::Issue(e) => ApiError::InternalError(e.to_string()),
            CredentialError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Anonymous session failures
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidToken => ApiError::Unauthorized(err.to_string()),
            SessionError::NotEnrolled => ApiError::Forbidden(err.to_string()),
            SessionError::Issue(e) => ApiError::InternalError(e.to_string()),
            SessionError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Todo service failures.
///
/// `NotFound` covers both missing records and ownership denials; the two
/// must stay indistinguishable on the wire.
impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::NotFound => ApiError::NotFound("Todo not found".to_string()),
            TodoError::TitleLocked => ApiError::Forbidden(err.to_string()),
            TodoError::Validation(msg) => body_validation(msg),
            TodoError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Task service failures
impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound => ApiError::NotFound("Task not found".to_string()),
            TaskError::Validation(msg) => body_validation(msg),
            TaskError::Store(e) => ApiError::InternalError(e.to_string()),
        }
    }
}
