/// Anonymous task lifecycle
///
/// CRUD rules for the token-only context's task records. There is no owner
/// column and no authentication on these operations; the table exists for a
/// single implicit actor and doubles as the liveness anchor for `user`-role
/// tokens.
///
/// Titles follow the same trim rules as todos but allow up to 500
/// characters. The list endpoint serves the whole table (it is bounded by
/// design) inside the standard page envelope.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{normalize_title, NewTask, Task};
use crate::page::Page;
use crate::store::{StoreError, TaskStore};

/// Maximum task title length after trimming, in characters
pub const MAX_TASK_TITLE_CHARS: usize = 500;

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task row with the requested id
    #[error("task not found")]
    NotFound,

    /// Input rejected before any mutation
    #[error("{0}")]
    Validation(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Anonymous task service
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    /// Creates a service over a task store.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Creates a task. `is_completed` starts false.
    pub async fn create(&self, title: &str) -> Result<Task, TaskError> {
        let title = normalize_title(title, MAX_TASK_TITLE_CHARS).map_err(TaskError::Validation)?;

        let task = self
            .store
            .insert(NewTask {
                id: Uuid::new_v4(),
                title,
            })
            .await?;

        Ok(task)
    }

    /// Lists every task, ordered by id, in one page.
    pub async fn list(&self) -> Result<Page<Task>, TaskError> {
        let rows = self.store.list_all().await?;
        let records = rows.len() as u64;

        // The whole table fits in one window; the limit reflects what was
        // actually served so the pagination law still holds.
        let limit = u32::try_from(records).unwrap_or(u32::MAX).max(1);
        Ok(Page::new(1, limit, records, rows))
    }

    /// Sets the completion flag on a task.
    pub async fn set_completed(&self, id: Uuid, is_completed: bool) -> Result<Task, TaskError> {
        self.store
            .set_completed(id, is_completed)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Hard-deletes a task.
    pub async fn delete(&self, id: Uuid) -> Result<(), TaskError> {
        if !self.store.delete(id).await? {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryTaskStore;

    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskStore::new()))
    }

    #[tokio::test]
    async fn test_create_trims_and_validates_title() {
        let service = service();

        let task = service.create("  water the plants  ").await.unwrap();
        assert_eq!(task.title, "water the plants");
        assert!(!task.is_completed);

        assert!(matches!(
            service.create("   ").await,
            Err(TaskError::Validation(_))
        ));
        assert!(matches!(
            service.create(&"y".repeat(501)).await,
            Err(TaskError::Validation(_))
        ));
        assert!(service.create(&"y".repeat(500)).await.is_ok());
    }

    #[tokio::test]
    async fn test_completion_toggle() {
        let service = service();
        let task = service.create("toggle me").await.unwrap();

        let done = service.set_completed(task.id, true).await.unwrap();
        assert!(done.is_completed);

        let undone = service.set_completed(task.id, false).await.unwrap();
        assert!(!undone.is_completed);
    }

    #[tokio::test]
    async fn test_mutations_on_missing_task_are_not_found() {
        let service = service();

        assert!(matches!(
            service.set_completed(Uuid::new_v4(), true).await,
            Err(TaskError::NotFound)
        ));
        assert!(matches!(
            service.delete(Uuid::new_v4()).await,
            Err(TaskError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_envelope_is_consistent() {
        let service = service();

        let empty = service.list().await.unwrap();
        assert_eq!(empty.pagination.records, 0);
        assert_eq!(empty.pagination.pages, 0);
        assert!(empty.data.is_empty());

        for i in 0..3 {
            service.create(&format!("task {}", i)).await.unwrap();
        }

        let page = service.list().await.unwrap();
        assert_eq!(page.pagination.current, 1);
        assert_eq!(page.pagination.records, 3);
        assert_eq!(page.pagination.pages, 1);
        assert_eq!(page.data.len(), 3);

        // Deterministic order: id ascending
        let ids: Vec<Uuid> = page.data.iter().map(|t| t.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let service = service();
        let task = service.create("short lived").await.unwrap();

        service.delete(task.id).await.unwrap();
        assert!(matches!(
            service.delete(task.id).await,
            Err(TaskError::NotFound)
        ));
    }
}
