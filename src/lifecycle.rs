//! Delete-on-invalid policy for edit sessions.
//!
//! While a task or item is being edited it may sit in the store with empty
//! required fields. When the caller decides the session is over (screen
//! dismissed, CLI command finished), it hands the record here: still
//! invalid means it is deleted, valid means nothing happens. The caller
//! owns the "when"; this module owns the "what".

use crate::db::{StoreError, TaskStore};
use crate::models::{Task, TaskItem};

/// Discards `task` from the store if it fails the required-fields rule.
///
/// Deleting a task cascades to its items. Returns whether a delete
/// happened; store failures propagate.
pub fn finalize_task_on_exit<S>(store: &S, task: &Task) -> Result<bool, StoreError>
where
    S: TaskStore + ?Sized,
{
    if task.is_valid() {
        return Ok(false);
    }
    tracing::debug!(task_id = %task.id, "discarding incomplete task on exit");
    store.delete_task(task.id)?;
    Ok(true)
}

/// Discards `item` from the store if it fails the required-fields rule.
///
/// No further cascade. Returns whether a delete happened.
pub fn finalize_item_on_exit<S>(store: &S, item: &TaskItem) -> Result<bool, StoreError>
where
    S: TaskStore + ?Sized,
{
    if item.is_valid() {
        return Ok(false);
    }
    tracing::debug!(item_id = %item.id, "discarding incomplete task item on exit");
    store.delete_task_item(item.id)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use crate::models::{Task, TaskItem};
    use uuid::Uuid;

    #[test]
    fn validity_requires_all_three_text_fields() {
        let mut task = Task::draft(None);
        assert!(!task.is_valid());

        task.title = "Paint the fence".into();
        task.description = "Two coats, white".into();
        assert!(!task.is_valid(), "empty comment must still be invalid");

        task.comment = "Buy brushes first".into();
        assert!(task.is_valid());
    }

    #[test]
    fn item_validity_matches_task_rule() {
        let mut item = TaskItem::draft(Uuid::new_v4());
        assert!(!item.is_valid());

        item.title = "Paint".into();
        item.description = "White, matte".into();
        item.comment = "Hardware store".into();
        assert!(item.is_valid());
    }
}
