/// PostgreSQL store implementations
///
/// Production persistence backed by sqlx. Queries follow the conventions
/// used elsewhere in the workspace: plain `query_as` strings with positional
/// binds, dynamic clause building for partial updates and search filters,
/// and `RETURNING` to hand back the row as stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Member, NewMember, NewTask, NewTodo, Task, Todo, TodoChanges};
use crate::store::{MemberStore, StoreError, TaskStore, TodoStore};
use crate::todos::query::TodoSearch;

const MEMBER_COLUMNS: &str = "id, email, password_hash, reset_token_hash, \
     reset_token_expires_at, created_at, updated_at, deleted_at";

const TODO_COLUMNS: &str = "id, member_id, title, status, created_at, updated_at";

/// Member store backed by the `members` table
#[derive(Debug, Clone)]
pub struct PgMemberStore {
    pool: PgPool,
}

impl PgMemberStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberStore for PgMemberStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        let row = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO members (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(member.id)
        .bind(member.email)
        .bind(member.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query_as::<_, Member>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE email = $1 AND deleted_at IS NULL",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE members
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE members
            SET reset_token_hash = $2, reset_token_expires_at = $3
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Member>, StoreError> {
        // Clearing the credential in the same statement makes it single-use
        // even under concurrent completion attempts.
        let row = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE members
            SET reset_token_hash = NULL, reset_token_expires_at = NULL
            WHERE reset_token_hash = $1
              AND reset_token_expires_at > $2
              AND deleted_at IS NULL
            RETURNING {MEMBER_COLUMNS}
            "#,
        ))
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Todo store backed by the `todos` table
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let row = sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (id, member_id, title, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {TODO_COLUMNS}
            "#,
        ))
        .bind(todo.id)
        .bind(todo.member_id)
        .bind(todo.title)
        .bind(todo.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let row = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        member_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        // Build the SET list from whichever fields are present; the owner is
        // part of the WHERE clause so the update is ownership-conditional.
        let mut sql = String::from("UPDATE todos SET updated_at = NOW()");
        let mut bind_count = 2;

        if changes.title.is_some() {
            bind_count += 1;
            sql.push_str(&format!(", title = ${}", bind_count));
        }
        if changes.status.is_some() {
            bind_count += 1;
            sql.push_str(&format!(", status = ${}", bind_count));
        }

        sql.push_str(&format!(
            " WHERE id = $1 AND member_id = $2 RETURNING {TODO_COLUMNS}",
        ));

        let mut query = sqlx::query_as::<_, Todo>(&sql).bind(id).bind(member_id);

        if let Some(title) = changes.title {
            query = query.bind(title);
        }
        if let Some(status) = changes.status {
            query = query.bind(status);
        }

        let row = query.fetch_optional(&self.pool).await?;

        Ok(row)
    }

    async fn delete_owned(&self, id: Uuid, member_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND member_id = $2")
            .bind(id)
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_owned(&self, member_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE member_id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn search(
        &self,
        member_id: Uuid,
        query: &TodoSearch,
    ) -> Result<(Vec<Todo>, u64), StoreError> {
        // The owner constraint is always first and never optional.
        let mut where_sql = String::from("WHERE member_id = $1");
        let mut bind_count = 1;

        if query.status.is_some() {
            bind_count += 1;
            where_sql.push_str(&format!(" AND status = ${}", bind_count));
        }
        if query.search.is_some() {
            // POSITION gives an exact, case-sensitive substring match with no
            // wildcard interpretation of the needle.
            bind_count += 1;
            where_sql.push_str(&format!(" AND POSITION(${} IN title) > 0", bind_count));
        }
        if query.created_after.is_some() {
            bind_count += 1;
            where_sql.push_str(&format!(" AND created_at >= ${}", bind_count));
        }
        if query.created_before.is_some() {
            bind_count += 1;
            where_sql.push_str(&format!(" AND created_at <= ${}", bind_count));
        }

        let select_sql = format!(
            "SELECT {TODO_COLUMNS} FROM todos {} ORDER BY {} {}, id ASC LIMIT ${} OFFSET ${}",
            where_sql,
            query.sort().as_column(),
            query.order().as_sql(),
            bind_count + 1,
            bind_count + 2,
        );
        let count_sql = format!("SELECT COUNT(*) FROM todos {}", where_sql);

        let mut select = sqlx::query_as::<_, Todo>(&select_sql).bind(member_id);
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(member_id);

        if let Some(status) = query.status {
            select = select.bind(status);
            count = count.bind(status);
        }
        if let Some(ref needle) = query.search {
            select = select.bind(needle.clone());
            count = count.bind(needle.clone());
        }
        if let Some(after) = query.created_after {
            select = select.bind(after);
            count = count.bind(after);
        }
        if let Some(before) = query.created_before {
            select = select.bind(before);
            count = count.bind(before);
        }

        select = select
            .bind(i64::from(query.limit()))
            .bind(query.offset() as i64);

        let rows = select.fetch_all(&self.pool).await?;
        let total = count.fetch_one(&self.pool).await?;

        Ok((rows, total as u64))
    }
}

/// Task store backed by the `tasks` table
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, title, is_completed)
            VALUES ($1, $2, FALSE)
            RETURNING id, title, is_completed
            "#,
        )
        .bind(task.id)
        .bind(task.title)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, Task>(
            "SELECT id, title, is_completed FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, Task>(
            "SELECT id, title, is_completed FROM tasks ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn set_completed(
        &self,
        id: Uuid,
        is_completed: bool,
    ) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET is_completed = $2
            WHERE id = $1
            RETURNING id, title, is_completed
            "#,
        )
        .bind(id)
        .bind(is_completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}
