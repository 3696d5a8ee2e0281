/// In-memory store implementations
///
/// Hash-map-backed stores with the same observable semantics as the Postgres
/// implementations. They exist so the full service and HTTP stack can be
/// exercised in tests without external infrastructure, mirroring the mock
/// collaborators used elsewhere in the workspace.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Member, NewMember, NewTask, NewTodo, Task, Todo, TodoChanges};
use crate::store::{MemberStore, StoreError, TaskStore, TodoStore};
use crate::todos::query::{SortField, SortOrder, TodoSearch};

/// Member store over a mutex-guarded map
#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    rows: Mutex<HashMap<Uuid, Member>>,
}

impl InMemoryMemberStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        let now = Utc::now();
        let row = Member {
            id: member.id,
            email: member.email,
            password_hash: member.password_hash,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let mut rows = self.rows.lock().expect("member store poisoned");
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let rows = self.rows.lock().expect("member store poisoned");
        Ok(rows.get(&id).filter(|m| m.is_active()).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let rows = self.rows.lock().expect("member store poisoned");
        Ok(rows
            .values()
            .find(|m| m.is_active() && m.email == email)
            .cloned())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Member>, StoreError> {
        let mut rows = self.rows.lock().expect("member store poisoned");
        let Some(row) = rows.get_mut(&id).filter(|m| m.is_active()) else {
            return Ok(None);
        };

        row.password_hash = password_hash.to_string();
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("member store poisoned");
        if let Some(row) = rows.get_mut(&id).filter(|m| m.is_active()) {
            row.reset_token_hash = Some(token_hash.to_string());
            row.reset_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn take_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError> {
        let mut rows = self.rows.lock().expect("member store poisoned");
        let row = rows.values_mut().find(|m| {
            m.is_active()
                && m.reset_token_hash.as_deref() == Some(token_hash)
                && m.reset_token_expires_at.is_some_and(|at| at > now)
        });

        let Some(row) = row else {
            return Ok(None);
        };

        row.reset_token_hash = None;
        row.reset_token_expires_at = None;
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().expect("member store poisoned");
        let Some(row) = rows.get_mut(&id).filter(|m| m.is_active()) else {
            return Ok(false);
        };

        let now = Utc::now();
        row.deleted_at = Some(now);
        row.updated_at = now;
        Ok(true)
    }
}

/// Todo store over a mutex-guarded map
#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    rows: Mutex<HashMap<Uuid, Todo>>,
}

impl InMemoryTodoStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let now = Utc::now();
        let row = Todo {
            id: todo.id,
            member_id: todo.member_id,
            title: todo.title,
            status: todo.status,
            created_at: now,
            updated_at: now,
        };

        let mut rows = self.rows.lock().expect("todo store poisoned");
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let rows = self.rows.lock().expect("todo store poisoned");
        Ok(rows.get(&id).cloned())
    }

    async fn update_owned(
        &self,
        id: Uuid,
        member_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let mut rows = self.rows.lock().expect("todo store poisoned");
        let Some(row) = rows.get_mut(&id).filter(|t| t.member_id == member_id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            row.title = title;
        }
        if let Some(status) = changes.status {
            row.status = status;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_owned(&self, id: Uuid, member_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().expect("todo store poisoned");
        match rows.get(&id) {
            Some(row) if row.member_id == member_id => {
                rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_all_owned(&self, member_id: Uuid) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().expect("todo store poisoned");
        let before = rows.len();
        rows.retain(|_, row| row.member_id != member_id);
        Ok((before - rows.len()) as u64)
    }

    async fn search(
        &self,
        member_id: Uuid,
        query: &TodoSearch,
    ) -> Result<(Vec<Todo>, u64), StoreError> {
        let rows = self.rows.lock().expect("todo store poisoned");

        let mut matches: Vec<Todo> = rows
            .values()
            .filter(|t| t.member_id == member_id)
            .filter(|t| query.status.map_or(true, |status| t.status == status))
            .filter(|t| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |needle| t.title.contains(needle))
            })
            .filter(|t| {
                query
                    .created_after
                    .map_or(true, |after| t.created_at >= after)
            })
            .filter(|t| {
                query
                    .created_before
                    .map_or(true, |before| t.created_at <= before)
            })
            .cloned()
            .collect();

        // Requested column first, id ascending as the deterministic tie-break.
        matches.sort_by(|a, b| {
            let (ka, kb) = match query.sort() {
                SortField::CreatedAt => (a.created_at, b.created_at),
                SortField::UpdatedAt => (a.updated_at, b.updated_at),
            };
            let primary = match query.order() {
                SortOrder::Asc => ka.cmp(&kb),
                SortOrder::Desc => kb.cmp(&ka),
            };
            primary.then(a.id.cmp(&b.id))
        });

        let total = matches.len() as u64;
        let window = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok((window, total))
    }
}

/// Task store over a mutex-guarded map
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    rows: Mutex<HashMap<Uuid, Task>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let row = Task {
            id: task.id,
            title: task.title,
            is_completed: false,
        };

        let mut rows = self.rows.lock().expect("task store poisoned");
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let rows = self.rows.lock().expect("task store poisoned");
        Ok(rows.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let rows = self.rows.lock().expect("task store poisoned");
        let mut all: Vec<Task> = rows.values().cloned().collect();
        all.sort_by_key(|t| t.id);
        Ok(all)
    }

    async fn set_completed(
        &self,
        id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let mut rows = self.rows.lock().expect("task store poisoned");
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };

        row.is_completed = is_completed;
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().expect("task store poisoned");
        Ok(rows.remove(&id).is_some())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let rows = self.rows.lock().expect("task store poisoned");
        Ok(rows.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoStatus;

    fn new_todo(member_id: Uuid, title: &str) -> NewTodo {
        NewTodo {
            id: Uuid::new_v4(),
            member_id,
            title: title.to_string(),
            status: TodoStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_owner() {
        let store = InMemoryTodoStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(new_todo(alice, "alice 1")).await.unwrap();
        store.insert(new_todo(alice, "alice 2")).await.unwrap();
        store.insert(new_todo(bob, "bob 1")).await.unwrap();

        let (rows, total) = store
            .search(alice, &TodoSearch::default())
            .await
            .unwrap();

        assert_eq!(total, 2);
        assert!(rows.iter().all(|t| t.member_id == alice));
    }

    #[tokio::test]
    async fn test_search_substring_is_case_sensitive() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();

        store.insert(new_todo(owner, "Buy Milk")).await.unwrap();
        store.insert(new_todo(owner, "buy bread")).await.unwrap();

        let query = TodoSearch {
            search: Some("buy".to_string()),
            ..Default::default()
        };
        let (rows, total) = store.search(owner, &query).await.unwrap();

        assert_eq!(total, 1);
        assert_eq!(rows[0].title, "buy bread");
    }

    #[tokio::test]
    async fn test_search_window_and_count() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();

        for i in 0..25 {
            store
                .insert(new_todo(owner, &format!("todo {}", i)))
                .await
                .unwrap();
        }

        let query = TodoSearch {
            page: Some(2),
            limit: Some(10),
            ..Default::default()
        };
        let (rows, total) = store.search(owner, &query).await.unwrap();

        assert_eq!(total, 25);
        assert_eq!(rows.len(), 10);

        let past_end = TodoSearch {
            page: Some(4),
            limit: Some(10),
            ..Default::default()
        };
        let (rows, total) = store.search(owner, &past_end).await.unwrap();
        assert_eq!(total, 25);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_search_pagination_is_stable_across_pages() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();

        for i in 0..30 {
            store
                .insert(new_todo(owner, &format!("todo {}", i)))
                .await
                .unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        for page in 1..=3 {
            let query = TodoSearch {
                page: Some(page),
                limit: Some(10),
                ..Default::default()
            };
            let (rows, _) = store.search(owner, &query).await.unwrap();
            assert_eq!(rows.len(), 10);
            for row in rows {
                assert!(seen.insert(row.id), "row served twice across pages");
            }
        }
        assert_eq!(seen.len(), 30);
    }

    #[tokio::test]
    async fn test_update_owned_requires_matching_owner() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let todo = store.insert(new_todo(owner, "mine")).await.unwrap();

        let changes = TodoChanges {
            title: Some("stolen".to_string()),
            status: None,
        };
        let result = store
            .update_owned(todo.id, stranger, changes)
            .await
            .unwrap();
        assert!(result.is_none());

        let unchanged = store.find_by_id(todo.id).await.unwrap().unwrap();
        assert_eq!(unchanged.title, "mine");
    }

    #[tokio::test]
    async fn test_delete_all_owned_is_idempotent() {
        let store = InMemoryTodoStore::new();
        let owner = Uuid::new_v4();

        store.insert(new_todo(owner, "one")).await.unwrap();
        store.insert(new_todo(owner, "two")).await.unwrap();

        assert_eq!(store.delete_all_owned(owner).await.unwrap(), 2);
        assert_eq!(store.delete_all_owned(owner).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_take_by_reset_token_is_single_use() {
        let store = InMemoryMemberStore::new();
        let member = store
            .insert(NewMember {
                id: Uuid::new_v4(),
                email: "reset@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        let expires = Utc::now() + chrono::Duration::minutes(30);
        store
            .set_reset_token(member.id, "token-hash", expires)
            .await
            .unwrap();

        let now = Utc::now();
        let taken = store.take_by_reset_token("token-hash", now).await.unwrap();
        assert_eq!(taken.map(|m| m.id), Some(member.id));

        // Second attempt with the same credential fails
        let replay = store.take_by_reset_token("token-hash", now).await.unwrap();
        assert!(replay.is_none());
    }

    #[tokio::test]
    async fn test_take_by_reset_token_respects_expiry() {
        let store = InMemoryMemberStore::new();
        let member = store
            .insert(NewMember {
                id: Uuid::new_v4(),
                email: "expired@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        let expired = Utc::now() - chrono::Duration::minutes(1);
        store
            .set_reset_token(member.id, "stale-hash", expired)
            .await
            .unwrap();

        let taken = store
            .take_by_reset_token("stale-hash", Utc::now())
            .await
            .unwrap();
        assert!(taken.is_none());
    }

    #[tokio::test]
    async fn test_soft_deleted_member_is_invisible() {
        let store = InMemoryMemberStore::new();
        let member = store
            .insert(NewMember {
                id: Uuid::new_v4(),
                email: "gone@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();

        assert!(store.soft_delete(member.id).await.unwrap());
        assert!(store
            .find_active_by_id(member.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_active_by_email("gone@example.com")
            .await
            .unwrap()
            .is_none());
        // Double decommission reports nothing left to do
        assert!(!store.soft_delete(member.id).await.unwrap());
    }
}
