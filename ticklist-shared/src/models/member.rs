/// Member account model
///
/// Members are the credentialed identity of TickList. Passwords are stored
/// as Argon2id hashes, never in a recoverable form. Accounts are never hard
/// deleted: decommissioning sets the `deleted_at` marker and every lookup in
/// the identity resolver and credential manager treats a marked account as
/// non-existent.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE members (
///     id UUID PRIMARY KEY,
///     email VARCHAR(320) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     reset_token_hash VARCHAR(64),
///     reset_token_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Member account record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    /// Unique member ID (UUID v4, generated at join time)
    pub id: Uuid,

    /// Email address, unique among live accounts, case-sensitive as stored
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// SHA-256 hex digest of the outstanding password-reset token, if any
    pub reset_token_hash: Option<String>,

    /// When the outstanding reset token stops being honored
    pub reset_token_expires_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker; a non-null value means the account is gone
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Whether the account is still live.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Input for creating a member account
#[derive(Debug, Clone)]
pub struct NewMember {
    /// Account ID, generated by the credential manager
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Argon2id hash of the submitted credential
    pub password_hash: String,
}

/// Caller-visible view of a member account.
///
/// The password hash never leaves the credential manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberView {
    /// Account ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberView {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            email: member.email,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}
