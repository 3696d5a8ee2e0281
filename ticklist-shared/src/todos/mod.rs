/// Member-scoped todo lifecycle
///
/// Enforces the field-level and state-transition rules on todo records and
/// owns the resolve → authorize → execute pipeline for every record
/// operation:
///
/// - titles are trimmed and must land in 1-255 characters;
/// - a completed record's title is locked (status stays togglable);
/// - the owner is always the calling principal, never client input;
/// - every denial on a specific record is indistinguishable from the record
///   not existing.
///
/// Ownership is checked against a snapshot read, and the mutation itself is
/// owner-conditional at the store, so a check/act race cannot move a record
/// across the guard.

pub mod query;

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::auth::guard;
use crate::auth::resolver::Principal;
use crate::models::{normalize_title, NewTodo, Todo, TodoChanges, TodoStatus};
use crate::page::Page;
use crate::store::{StoreError, TodoStore};
use crate::todos::query::TodoSearch;

/// Maximum todo title length after trimming, in characters
pub const MAX_TITLE_CHARS: usize = 255;

/// Error type for todo operations
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Record does not exist for this caller.
    ///
    /// Served identically for a genuinely missing record and for one owned
    /// by someone else.
    #[error("todo not found")]
    NotFound,

    /// Title edits are forbidden on completed records
    #[error("cannot edit the title of a completed todo")]
    TitleLocked,

    /// Input rejected before any mutation
    #[error("{0}")]
    Validation(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Caller-supplied changes for an update.
///
/// At least one field must be present; both are re-validated before the
/// store sees them.
#[derive(Debug, Clone, Default)]
pub struct TodoUpdate {
    /// Replacement title, raw
    pub title: Option<String>,

    /// Replacement status
    pub status: Option<TodoStatus>,
}

/// Todo record service
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    /// Creates a service over a todo store.
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Creates a record owned by the caller.
    ///
    /// Status is forced to `active` and both timestamps are stamped by the
    /// store.
    pub async fn create(&self, principal: &Principal, title: &str) -> Result<Todo, TodoError> {
        let owner = principal.member_id().ok_or(TodoError::NotFound)?;
        let title = normalize_title(title, MAX_TITLE_CHARS).map_err(TodoError::Validation)?;

        let todo = self
            .store
            .insert(NewTodo {
                id: Uuid::new_v4(),
                member_id: owner,
                title,
                status: TodoStatus::Active,
            })
            .await?;

        Ok(todo)
    }

    /// Fetches one record the caller owns.
    pub async fn get(&self, principal: &Principal, id: Uuid) -> Result<Todo, TodoError> {
        let todo = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound)?;

        guard::authorize(principal, todo.member_id).map_err(|_| TodoError::NotFound)?;

        Ok(todo)
    }

    /// Applies changes to a record the caller owns.
    pub async fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        update: TodoUpdate,
    ) -> Result<Todo, TodoError> {
        if update.title.is_none() && update.status.is_none() {
            return Err(TodoError::Validation(
                "at least one of title or status must be provided".to_string(),
            ));
        }

        let owner = principal.member_id().ok_or(TodoError::NotFound)?;
        let snapshot = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound)?;

        guard::authorize(principal, snapshot.member_id).map_err(|_| TodoError::NotFound)?;

        if update.title.is_some() && snapshot.status == TodoStatus::Completed {
            return Err(TodoError::TitleLocked);
        }

        let changes = TodoChanges {
            title: update
                .title
                .as_deref()
                .map(|raw| normalize_title(raw, MAX_TITLE_CHARS))
                .transpose()
                .map_err(TodoError::Validation)?,
            status: update.status,
        };

        // The store re-checks ownership in the mutation predicate itself.
        self.store
            .update_owned(id, owner, changes)
            .await?
            .ok_or(TodoError::NotFound)
    }

    /// Hard-deletes a record the caller owns.
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), TodoError> {
        let owner = principal.member_id().ok_or(TodoError::NotFound)?;
        let snapshot = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(TodoError::NotFound)?;

        guard::authorize(principal, snapshot.member_id).map_err(|_| TodoError::NotFound)?;

        if !self.store.delete_owned(id, owner).await? {
            return Err(TodoError::NotFound);
        }

        Ok(())
    }

    /// Hard-deletes everything the caller owns. Deleting zero records is
    /// still success.
    pub async fn delete_all(&self, principal: &Principal) -> Result<u64, TodoError> {
        let owner = principal.member_id().ok_or(TodoError::NotFound)?;
        Ok(self.store.delete_all_owned(owner).await?)
    }

    /// Runs a filtered, sorted, paginated search over the caller's records.
    pub async fn search(
        &self,
        principal: &Principal,
        query: &TodoSearch,
    ) -> Result<Page<Todo>, TodoError> {
        let owner = principal.member_id().ok_or(TodoError::NotFound)?;

        query
            .validate()
            .map_err(|e| TodoError::Validation(e.to_string()))?;

        let (rows, total) = self.store.search(owner, query).await?;

        Ok(Page::new(query.page(), query.limit(), total, rows))
    }
}
