/// Anonymous session manager
///
/// The token-only `user` context has no account table. Joining mints a fresh
/// subject id and a token pair; nothing is persisted. The identity becomes
/// "live" once an anonymous task row bearing the subject id exists, and
/// refresh re-checks that liveness on every rotation.
///
/// Refresh preserves the subject id: rotating credentials must never change
/// who the caller is.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::resolver::Principal;
use crate::auth::token::{AuthorizedSession, Role, TokenCodec, TokenError};
use crate::store::{StoreError, TaskStore};

/// Error type for anonymous session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Refresh credential did not check out
    #[error("invalid token")]
    InvalidToken,

    /// No task row anchors this subject id
    #[error("you're not enrolled")]
    NotEnrolled,

    /// Token signing failed
    #[error("failed to issue tokens: {0}")]
    Issue(#[source] TokenError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Anonymous session lifecycle service
#[derive(Clone)]
pub struct SessionManager {
    tasks: Arc<dyn TaskStore>,
    codec: TokenCodec,
}

impl SessionManager {
    /// Creates a manager over its collaborators.
    pub fn new(tasks: Arc<dyn TaskStore>, codec: TokenCodec) -> Self {
        Self { tasks, codec }
    }

    /// Mints a brand new session context: fresh subject id, fresh pair.
    pub fn join(&self) -> Result<AuthorizedSession, SessionError> {
        self.authorize(Uuid::new_v4())
    }

    /// Re-issues a pair for an already-resolved user principal.
    pub fn login(&self, principal: &Principal) -> Result<AuthorizedSession, SessionError> {
        self.authorize(principal.id())
    }

    /// Exchanges a refresh token for a new pair with the same subject.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthorizedSession, SessionError> {
        let claims = self
            .codec
            .verify_refresh(refresh_token)
            .map_err(|_| SessionError::InvalidToken)?;

        if !self.tasks.exists(claims.user_id).await? {
            return Err(SessionError::NotEnrolled);
        }

        self.authorize(claims.user_id)
    }

    fn authorize(&self, subject: Uuid) -> Result<AuthorizedSession, SessionError> {
        let token = self
            .codec
            .issue_pair(subject, Role::User)
            .map_err(SessionError::Issue)?;

        Ok(AuthorizedSession { id: subject, token })
    }
}
