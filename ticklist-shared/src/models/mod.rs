/// Domain records for TickList
///
/// # Models
///
/// - `member`: credentialed accounts (email + password hash, soft delete)
/// - `todo`: member-owned todo records with lifecycle rules
/// - `task`: anonymous tasks backing the token-only user context

pub mod member;
pub mod task;
pub mod todo;

pub use member::{Member, MemberView, NewMember};
pub use task::{NewTask, Task};
pub use todo::{NewTodo, Todo, TodoChanges, TodoStatus};

/// Normalizes a record title.
///
/// Leading and trailing whitespace is stripped; internal whitespace is kept.
/// The trimmed title must contain between 1 and `max_chars` characters.
pub fn normalize_title(raw: &str, max_chars: usize) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("title must contain at least one non-whitespace character".to_string());
    }
    if trimmed.chars().count() > max_chars {
        return Err(format!("title must be at most {} characters", max_chars));
    }
    Ok(trimmed.to_string())
}
