//! Punchlist core: tasks, their purchasable items, and the rules that
//! derive views and totals from them.
//!
//! The crate is split along the same seams as the app that consumes it:
//!
//! - [`models`]: the persisted records ([`models::Task`], [`models::TaskItem`],
//!   [`models::Project`]) and their create/update inputs.
//! - [`db`]: the SQLite-backed [`db::Database`] plus the [`db::TaskStore`]
//!   trait that callers inject wherever a store is needed.
//! - [`filter`]: the pure task filter engine (category/location/priority/
//!   status, with the "All" sentinel).
//! - [`money`]: defensive price-string parsing and exact-decimal line and
//!   grand totals.
//! - [`lifecycle`]: the required-fields validity rule and the
//!   delete-on-invalid policy applied when an edit session ends.

pub mod db;
pub mod filter;
pub mod lifecycle;
pub mod models;
pub mod money;
