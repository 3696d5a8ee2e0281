/// Member-scoped todo record
///
/// Todos are owned exclusively by one member; the owner is fixed at creation
/// and never changes. Titles are 1-255 characters after whitespace trimming
/// and become immutable once the record is completed. Status may always be
/// toggled between the two values.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_status AS ENUM ('active', 'completed');
///
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     member_id UUID NOT NULL REFERENCES members(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     status todo_status NOT NULL DEFAULT 'active',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Todo completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Open item; title may still be edited
    Active,

    /// Done; the title is locked
    Completed,
}

impl TodoStatus {
    /// Status as stored in the database enum
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Active => "active",
            TodoStatus::Completed => "completed",
        }
    }
}

/// Todo record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique record ID
    pub id: Uuid,

    /// Owning member; immutable after creation
    pub member_id: Uuid,

    /// Title (trimmed, 1-255 characters)
    pub title: String,

    /// Completion status
    pub status: TodoStatus,

    /// When the record was created; never changes
    pub created_at: DateTime<Utc>,

    /// When the record was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    /// Record ID, generated by the service
    pub id: Uuid,

    /// Owner, forced to the calling principal
    pub member_id: Uuid,

    /// Normalized title
    pub title: String,

    /// Initial status (always `Active` for caller-created records)
    pub status: TodoStatus,
}

/// Field changes applied to an existing todo.
///
/// `None` fields are left untouched; `updated_at` is stamped by the store on
/// every successful update.
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    /// Replacement title, already normalized
    pub title: Option<String>,

    /// Replacement status
    pub status: Option<TodoStatus>,
}

impl TodoChanges {
    /// Whether this update would touch anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none()
    }
}
