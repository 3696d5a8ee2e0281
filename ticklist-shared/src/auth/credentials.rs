/// Credential manager
///
/// State machine for the member credential lifecycle: join, login, token
/// refresh, password update, and the password-reset handshake. The manager
/// is purely functional over its collaborators - the member store, the token
/// codec, and the Argon2id password module - and keeps no session state of
/// its own.
///
/// # Anti-enumeration
///
/// Two rules are load-bearing here and covered by tests:
///
/// - `login` returns the same [`CredentialError::InvalidCredentials`] for an
///   unknown email and for a wrong credential on a known email;
/// - `request_password_reset` reports success and echoes the submitted email
///   whether or not an account exists.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::password::{self, PasswordError};
use crate::auth::resolver::Principal;
use crate::auth::token::{AuthorizedSession, Role, TokenCodec, TokenError};
use crate::models::{MemberView, NewMember};
use crate::store::{MemberStore, StoreError};

/// How long a password-reset credential stays valid
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Email is already registered to a live account
    #[error("email already registered")]
    EmailTaken,

    /// Login failed; deliberately does not say which part was wrong
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Refresh or reset credential did not check out
    #[error("invalid token")]
    InvalidToken,

    /// The acting principal has no live account behind it
    #[error("you're not enrolled")]
    NotEnrolled,

    /// Input rejected before any lookup
    #[error("{0}")]
    Validation(String),

    /// Password hashing collaborator failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failed
    #[error("failed to issue tokens: {0}")]
    Issue(#[source] TokenError),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a password-reset request.
///
/// The email is echoed to the caller no matter what. The token is present
/// only when an account exists; it goes to the out-of-band delivery channel
/// and must never be serialized into the API response.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    /// Email as submitted
    pub email: String,

    /// Plaintext reset token for delivery, absent for unknown emails
    pub token: Option<String>,
}

/// Member credential lifecycle service
#[derive(Clone)]
pub struct CredentialManager {
    members: Arc<dyn MemberStore>,
    codec: TokenCodec,
}

impl CredentialManager {
    /// Creates a manager over its collaborators.
    pub fn new(members: Arc<dyn MemberStore>, codec: TokenCodec) -> Self {
        Self { members, codec }
    }

    /// Registers a new member account and signs it in.
    ///
    /// Fails with [`CredentialError::EmailTaken`] when a live account holds
    /// the email. A decommissioned account does not block re-registration.
    pub async fn join(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AuthorizedSession, CredentialError> {
        if self.members.find_active_by_email(email).await?.is_some() {
            return Err(CredentialError::EmailTaken);
        }

        let stored = password::hash_password(password_hash)?;
        let member = self
            .members
            .insert(NewMember {
                id: Uuid::new_v4(),
                email: email.to_string(),
                password_hash: stored,
            })
            .await?;

        tracing::info!(member_id = %member.id, "member joined");
        self.authorize(member.id)
    }

    /// Authenticates a member by email and credential.
    pub async fn login(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AuthorizedSession, CredentialError> {
        let member = self
            .members
            .find_active_by_email(email)
            .await?
            .ok_or(CredentialError::InvalidCredentials)?;

        if !password::verify_password(password_hash, &member.password_hash)? {
            return Err(CredentialError::InvalidCredentials);
        }

        self.authorize(member.id)
    }

    /// Exchanges a refresh token for a brand new access+refresh pair.
    ///
    /// The old pair is not revoked (stateless token model), but every call
    /// re-resolves the account so a decommissioned member cannot keep
    /// refreshing.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthorizedSession, CredentialError> {
        let claims = self
            .codec
            .verify_refresh(refresh_token)
            .map_err(|_| CredentialError::InvalidToken)?;

        let member = self
            .members
            .find_active_by_id(claims.user_id)
            .await?
            .ok_or(CredentialError::InvalidToken)?;

        self.authorize(member.id)
    }

    /// Replaces the caller's password after verifying the current one.
    pub async fn update_password(
        &self,
        principal: &Principal,
        current_password_hash: &str,
        new_password_hash: &str,
    ) -> Result<MemberView, CredentialError> {
        let id = principal.member_id().ok_or(CredentialError::NotEnrolled)?;
        let member = self
            .members
            .find_active_by_id(id)
            .await?
            .ok_or(CredentialError::NotEnrolled)?;

        if !password::verify_password(current_password_hash, &member.password_hash)? {
            return Err(CredentialError::InvalidCredentials);
        }

        let stored = password::hash_password(new_password_hash)?;
        let updated = self
            .members
            .update_password(id, &stored)
            .await?
            .ok_or(CredentialError::NotEnrolled)?;

        Ok(updated.into())
    }

    /// Starts the password-reset handshake.
    ///
    /// Always succeeds from the caller's point of view. When the account
    /// exists, a single-use, time-boxed reset credential is bound to it:
    /// only the SHA-256 digest is stored, never the token itself.
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<PasswordReset, CredentialError> {
        let Some(member) = self.members.find_active_by_email(email).await? else {
            return Ok(PasswordReset {
                email: email.to_string(),
                token: None,
            });
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.members
            .set_reset_token(member.id, &hash_reset_token(&token), expires_at)
            .await?;

        tracing::info!(member_id = %member.id, "password reset initiated");
        Ok(PasswordReset {
            email: email.to_string(),
            token: Some(token),
        })
    }

    /// Completes the password-reset handshake.
    ///
    /// The length rule runs before any lookup; the credential is consumed on
    /// success and cannot be replayed.
    pub async fn complete_password_reset(
        &self,
        reset_token: &str,
        new_password_hash: &str,
    ) -> Result<AuthorizedSession, CredentialError> {
        password::validate_password_length(new_password_hash)
            .map_err(CredentialError::Validation)?;

        let member = self
            .members
            .take_by_reset_token(&hash_reset_token(reset_token), Utc::now())
            .await?
            .ok_or(CredentialError::InvalidToken)?;

        let stored = password::hash_password(new_password_hash)?;
        self.members
            .update_password(member.id, &stored)
            .await?
            .ok_or(CredentialError::NotEnrolled)?;

        self.authorize(member.id)
    }

    /// Decommissions the caller's account by setting the soft-delete marker.
    ///
    /// The account stops resolving everywhere; its email becomes available
    /// for registration again.
    pub async fn decommission(&self, principal: &Principal) -> Result<(), CredentialError> {
        let id = principal.member_id().ok_or(CredentialError::NotEnrolled)?;

        if !self.members.soft_delete(id).await? {
            return Err(CredentialError::NotEnrolled);
        }

        tracing::info!(member_id = %id, "member decommissioned");
        Ok(())
    }

    fn authorize(&self, id: Uuid) -> Result<AuthorizedSession, CredentialError> {
        let token = self
            .codec
            .issue_pair(id, Role::Member)
            .map_err(CredentialError::Issue)?;

        Ok(AuthorizedSession { id, token })
    }
}

/// Generates a fresh 32-byte reset token, hex-encoded.
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest stored in place of the reset token.
fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryMemberStore;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn manager() -> CredentialManager {
        CredentialManager::new(
            Arc::new(InMemoryMemberStore::new()),
            TokenCodec::new(SECRET),
        )
    }

    #[tokio::test]
    async fn test_join_then_login_keeps_principal_id_stable() {
        let manager = manager();

        let joined = manager.join("a@example.com", "credential-1").await.unwrap();
        let login1 = manager.login("a@example.com", "credential-1").await.unwrap();
        let login2 = manager.login("a@example.com", "credential-1").await.unwrap();

        assert_eq!(joined.id, login1.id);
        assert_eq!(login1.id, login2.id);
    }

    #[tokio::test]
    async fn test_join_rejects_duplicate_email() {
        let manager = manager();

        manager.join("dup@example.com", "credential-1").await.unwrap();
        let result = manager.join("dup@example.com", "credential-2").await;

        assert!(matches!(result, Err(CredentialError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_decommissioned_email_can_rejoin() {
        let manager = manager();

        let first = manager.join("again@example.com", "credential-1").await.unwrap();
        manager
            .decommission(&Principal::Member { id: first.id })
            .await
            .unwrap();

        let second = manager.join("again@example.com", "credential-2").await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let manager = manager();
        manager.join("known@example.com", "right-credential").await.unwrap();

        let unknown_email = manager.login("unknown@example.com", "whatever").await;
        let wrong_password = manager.login("known@example.com", "wrong-credential").await;

        assert!(matches!(
            unknown_email,
            Err(CredentialError::InvalidCredentials)
        ));
        assert!(matches!(
            wrong_password,
            Err(CredentialError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair_and_preserves_subject() {
        let manager = manager();
        let joined = manager.join("r@example.com", "credential-1").await.unwrap();

        let refreshed = manager.refresh(&joined.token.refresh).await.unwrap();

        assert_eq!(refreshed.id, joined.id);
        assert_ne!(refreshed.token.access, joined.token.access);
        assert_ne!(refreshed.token.refresh, joined.token.refresh);
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let manager = manager();
        let joined = manager.join("ra@example.com", "credential-1").await.unwrap();

        let result = manager.refresh(&joined.token.access).await;
        assert!(matches!(result, Err(CredentialError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_refresh_fails_for_decommissioned_account() {
        let manager = manager();
        let joined = manager.join("gone@example.com", "credential-1").await.unwrap();

        manager
            .decommission(&Principal::Member { id: joined.id })
            .await
            .unwrap();

        let result = manager.refresh(&joined.token.refresh).await;
        assert!(matches!(result, Err(CredentialError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_update_password_requires_current_credential() {
        let manager = manager();
        let joined = manager.join("u@example.com", "old-credential").await.unwrap();
        let principal = Principal::Member { id: joined.id };

        let wrong = manager
            .update_password(&principal, "not-the-old-one", "new-credential")
            .await;
        assert!(matches!(wrong, Err(CredentialError::InvalidCredentials)));

        let view = manager
            .update_password(&principal, "old-credential", "new-credential")
            .await
            .unwrap();
        assert_eq!(view.id, joined.id);

        // Old credential is dead, new one works
        assert!(matches!(
            manager.login("u@example.com", "old-credential").await,
            Err(CredentialError::InvalidCredentials)
        ));
        assert!(manager.login("u@example.com", "new-credential").await.is_ok());
    }

    #[tokio::test]
    async fn test_reset_request_echoes_email_for_unknown_account() {
        let manager = manager();

        let outcome = manager
            .request_password_reset("nobody@example.com")
            .await
            .unwrap();

        assert_eq!(outcome.email, "nobody@example.com");
        assert!(outcome.token.is_none());
    }

    #[tokio::test]
    async fn test_reset_handshake_is_single_use() {
        let manager = manager();
        let joined = manager.join("reset@example.com", "old-credential").await.unwrap();

        let outcome = manager
            .request_password_reset("reset@example.com")
            .await
            .unwrap();
        let token = outcome.token.expect("token for existing account");

        let completed = manager
            .complete_password_reset(&token, "new-credential")
            .await
            .unwrap();
        assert_eq!(completed.id, joined.id);

        assert!(manager.login("reset@example.com", "new-credential").await.is_ok());
        assert!(matches!(
            manager.login("reset@example.com", "old-credential").await,
            Err(CredentialError::InvalidCredentials)
        ));

        // The credential was consumed
        let replay = manager.complete_password_reset(&token, "another-pass").await;
        assert!(matches!(replay, Err(CredentialError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_reset_completion_validates_length_before_lookup() {
        let manager = manager();

        let result = manager.complete_password_reset("whatever", "short").await;
        assert!(matches!(result, Err(CredentialError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reset_completion_rejects_unknown_token() {
        let manager = manager();
        manager.join("t@example.com", "credential-1").await.unwrap();

        let result = manager
            .complete_password_reset("made-up-token", "long-enough-pass")
            .await;
        assert!(matches!(result, Err(CredentialError::InvalidToken)));
    }
}
