/// Identity resolver
///
/// Turns the raw `Authorization` header of an inbound request into a typed
/// [`Principal`]. Resolution verifies the token through the codec, checks
/// the role claim against the role the endpoint expects, and confirms the
/// identity is still live:
///
/// - a **member** subject must resolve to a non-deleted account row;
/// - a **user** subject is live only while an anonymous task row bearing the
///   subject id exists (the token-only context has no account table, so the
///   task table doubles as its existence check).
///
/// A successfully resolved principal is safe to hand to the ownership guard
/// without re-verifying signature or expiry.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::token::{Role, TokenCodec, TokenError};
use crate::store::{MemberStore, StoreError, TaskStore};

/// Resolved, typed identity of the caller for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    /// Credentialed account
    Member {
        /// Account id
        id: Uuid,
    },

    /// Anonymous token-only session
    User {
        /// Ephemeral subject id
        id: Uuid,
    },
}

impl Principal {
    /// Subject id regardless of kind.
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Member { id } | Principal::User { id } => *id,
        }
    }

    /// Account id when this is a member principal.
    pub fn member_id(&self) -> Option<Uuid> {
        match self {
            Principal::Member { id } => Some(*id),
            Principal::User { .. } => None,
        }
    }

    /// Role this principal was resolved under.
    pub fn role(&self) -> Role {
        match self {
            Principal::Member { .. } => Role::Member,
            Principal::User { .. } => Role::User,
        }
    }
}

/// Error type for identity resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable bearer credential on the request
    #[error("missing credentials")]
    Unauthenticated,

    /// Token verification failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token is valid but carries a different role than the endpoint expects
    #[error("you're not {}", .expected.as_str())]
    WrongRole {
        /// Role the endpoint requires
        expected: Role,
    },

    /// Token is valid but the identity behind it no longer exists
    #[error("you're not enrolled")]
    NotEnrolled,

    /// Storage failure during the liveness lookup
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Extracts the token value from an `Authorization: Bearer <token>` header.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::Unauthenticated)
}

/// Resolves a member principal from a request's authorization header.
pub async fn resolve_member(
    codec: &TokenCodec,
    members: &dyn MemberStore,
    header: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = bearer_token(header)?;
    let claims = codec.verify_access(token)?;

    match claims.role {
        Some(Role::Member) => {}
        _ => {
            return Err(AuthError::WrongRole {
                expected: Role::Member,
            })
        }
    }

    let member = members
        .find_active_by_id(claims.user_id)
        .await?
        .ok_or(AuthError::NotEnrolled)?;

    Ok(Principal::Member { id: member.id })
}

/// Resolves an anonymous user principal from a request's authorization
/// header.
pub async fn resolve_user(
    codec: &TokenCodec,
    tasks: &dyn TaskStore,
    header: Option<&str>,
) -> Result<Principal, AuthError> {
    let token = bearer_token(header)?;
    let claims = codec.verify_access(token)?;

    match claims.role {
        Some(Role::User) => {}
        _ => {
            return Err(AuthError::WrongRole {
                expected: Role::User,
            })
        }
    }

    if !tasks.exists(claims.user_id).await? {
        return Err(AuthError::NotEnrolled);
    }

    Ok(Principal::User { id: claims.user_id })
}
