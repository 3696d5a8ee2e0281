/// Anonymous task record
///
/// Tasks belong to the token-only user context: there is no owner column and
/// no account behind them. A `user`-role token is considered live only while
/// a task row bearing the token's subject id exists, so this table doubles as
/// the existence check for that ephemeral identity.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     title VARCHAR(500) NOT NULL,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anonymous task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Title (trimmed, 1-500 characters)
    pub title: String,

    /// Completion flag
    pub is_completed: bool,
}

/// Input for inserting a task
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Record ID, generated by the service
    pub id: Uuid,

    /// Normalized title
    pub title: String,
}
