//! Domain models for Punchlist.
//!
//! # Core Concepts
//!
//! - [`Task`]: a unit of home-project work with descriptive fields,
//!   completion state, and optional before/after photos.
//! - [`TaskItem`]: a purchasable line entry (quantity × unit price) owned by
//!   exactly one task. Deleting a task deletes its items.
//! - [`Project`]: an optional grouping for tasks. Deleting a project
//!   detaches its tasks, it does not delete them.
//!
//! Tasks and task items share one validity rule: title, description, and
//! comment must all be non-empty, or the record is a transient draft that
//! the lifecycle guard discards when the edit session ends.

mod project;
mod task;
mod task_item;

pub use project::*;
pub use task::*;
pub use task_item::*;
