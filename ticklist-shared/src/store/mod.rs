/// Storage traits for TickList
///
/// The domain services never talk to a database directly; they go through
/// these traits. Two implementations ship with the crate:
///
/// - [`postgres`]: production stores backed by sqlx/PostgreSQL
/// - [`memory`]: in-process stores used by tests and local experiments
///
/// Ownership-conditional mutations (`update_owned`, `delete_owned`) take the
/// owner as part of the predicate so a check/act race on ownership cannot
/// slip a mutation past the guard.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Member, NewMember, NewTask, NewTodo, Task, Todo, TodoChanges};
use crate::todos::query::TodoSearch;

pub use memory::{InMemoryMemberStore, InMemoryTaskStore, InMemoryTodoStore};
pub use postgres::{PgMemberStore, PgTaskStore, PgTodoStore};

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for member accounts.
///
/// "Active" lookups exclude soft-deleted rows; a decommissioned account is
/// indistinguishable from one that never existed.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Inserts a new account. Timestamps are stamped by the store.
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError>;

    /// Finds a live account by id.
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Member>, StoreError>;

    /// Finds a live account by email (case-sensitive).
    async fn find_active_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;

    /// Replaces the password hash and bumps `updated_at`.
    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Member>, StoreError>;

    /// Binds a password-reset credential (hash + expiry) to an account,
    /// replacing any outstanding one.
    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Consumes an unexpired reset credential in one step: the matching
    /// account is returned and the credential is cleared so it cannot be
    /// replayed.
    async fn take_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError>;

    /// Sets the soft-delete marker. Returns false when the account was
    /// already gone.
    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Persistence operations for member-owned todos
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a new record. Timestamps are stamped by the store.
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Fetches a record by id regardless of owner. Callers are responsible
    /// for running the result through the ownership guard.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Applies changes to a record iff it is owned by `member_id`, bumping
    /// `updated_at`. Returns `None` when no such owned record exists.
    async fn update_owned(
        &self,
        id: Uuid,
        member_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError>;

    /// Deletes a record iff it is owned by `member_id`.
    async fn delete_owned(&self, id: Uuid, member_id: Uuid) -> Result<bool, StoreError>;

    /// Deletes every record owned by `member_id`, returning how many went.
    async fn delete_all_owned(&self, member_id: Uuid) -> Result<u64, StoreError>;

    /// Runs a search constrained to `member_id`, returning the requested
    /// window plus the total match count.
    async fn search(
        &self,
        member_id: Uuid,
        query: &TodoSearch,
    ) -> Result<(Vec<Todo>, u64), StoreError>;
}

/// Persistence operations for anonymous tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a new task.
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Fetches a task by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Lists every task, ordered by id ascending.
    async fn list_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Sets the completion flag. Returns `None` for a missing task.
    async fn set_completed(&self, id: Uuid, is_completed: bool)
        -> Result<Option<Task>, StoreError>;

    /// Deletes a task. Returns false when it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Whether a task row with this id exists. This is the liveness check
    /// behind the ephemeral `user` identity.
    async fn exists(&self, id: Uuid) -> Result<bool, StoreError>;
}
