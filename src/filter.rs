//! The task filter engine.
//!
//! One filter is active at a time: a kind (category, location, priority,
//! status, or none) plus a free-form value. The value "All" is the
//! unrestricted sentinel for category/location/priority; for status only
//! "Completed" and "Incomplete" restrict anything.
//!
//! Category, location, and priority match by case-insensitive *substring*,
//! not equality. That is deliberate: the filter behaves like a search box,
//! so "Kitchen" matches "Kitchen cabinets". Do not tighten it to equality.

use serde::{Deserialize, Serialize};

use crate::models::Task;

/// The dimension along which the task list is restricted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FilterKind {
    None,
    Category,
    Location,
    Priority,
    Status,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Category => "category",
            Self::Location => "location",
            Self::Priority => "priority",
            Self::Status => "status",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "category" => Some(Self::Category),
            "location" => Some(Self::Location),
            "priority" => Some(Self::Priority),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

/// The unrestricted sentinel value.
pub const ALL: &str = "All";

/// The currently selected filter, as held by a task-list screen.
///
/// Changing the kind resets the value to "All" so a value left over from a
/// previous kind is never applied under the new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterSelection {
    kind: FilterKind,
    value: String,
}

impl FilterSelection {
    pub fn new(kind: FilterKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Switches the filter dimension, dropping any stale value.
    pub fn set_kind(&mut self, kind: FilterKind) {
        if self.kind != kind {
            self.kind = kind;
            self.value = ALL.to_string();
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Runs the engine with this selection.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        filtered_tasks(tasks, self.kind, &self.value)
    }
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            kind: FilterKind::None,
            value: ALL.to_string(),
        }
    }
}

/// Produces the ordered subset of `tasks` matching the filter.
///
/// Pure projection: input order is preserved, nothing is mutated, and an
/// unrestricted filter returns the input unchanged.
pub fn filtered_tasks(tasks: &[Task], kind: FilterKind, value: &str) -> Vec<Task> {
    match kind {
        FilterKind::None => tasks.to_vec(),
        FilterKind::Category => retain_matching(tasks, value, |t| &t.category),
        FilterKind::Location => retain_matching(tasks, value, |t| &t.location),
        FilterKind::Priority => retain_matching(tasks, value, |t| t.priority.as_str()),
        FilterKind::Status => match value {
            "Completed" => tasks.iter().filter(|t| t.is_completed).cloned().collect(),
            "Incomplete" => tasks.iter().filter(|t| !t.is_completed).cloned().collect(),
            // "All", empty, or anything unrecognized leaves the list alone.
            _ => tasks.to_vec(),
        },
    }
}

fn retain_matching<'t, F>(tasks: &'t [Task], value: &str, field: F) -> Vec<Task>
where
    F: Fn(&'t Task) -> &'t str,
{
    if value == ALL {
        return tasks.to_vec();
    }
    let needle = value.to_lowercase();
    tasks
        .iter()
        .filter(|t| field(t).to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_kind_resets_value_to_all() {
        let mut selection = FilterSelection::new(FilterKind::Category, "Kitchen");
        selection.set_kind(FilterKind::Location);
        assert_eq!(selection.kind(), FilterKind::Location);
        assert_eq!(selection.value(), ALL);
    }

    #[test]
    fn set_kind_same_kind_keeps_value() {
        let mut selection = FilterSelection::new(FilterKind::Category, "Kitchen");
        selection.set_kind(FilterKind::Category);
        assert_eq!(selection.value(), "Kitchen");
    }

    #[test]
    fn default_selection_is_unfiltered() {
        let selection = FilterSelection::default();
        assert_eq!(selection.kind(), FilterKind::None);
        assert_eq!(selection.value(), ALL);
    }

    #[test]
    fn kind_round_trips_through_strings() {
        for kind in [
            FilterKind::None,
            FilterKind::Category,
            FilterKind::Location,
            FilterKind::Priority,
            FilterKind::Status,
        ] {
            assert_eq!(FilterKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(FilterKind::from_str("colour"), None);
    }
}
