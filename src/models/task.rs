use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of home-project work.
///
/// A task starts life as an empty **draft** (see [`Task::draft`]) while the
/// user fills in its fields. Drafts that still fail [`Task::is_valid`] when
/// the edit session ends are discarded by the lifecycle guard rather than
/// kept half-filled.
///
/// Photos are opaque to this crate; they are carried as raw bytes and never
/// inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Optional grouping; a task does not need a project.
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub comment: String,
    /// Where in the home the work happens, e.g. "Kitchen".
    pub location: String,
    pub category: String,
    pub priority: Priority,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    /// Set when the task is completed, cleared if it is reopened.
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_image: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_image: Option<Vec<u8>>,
}

impl Task {
    /// Creates an empty draft, the state a task is in while being edited
    /// for the first time.
    pub fn draft(project_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            title: String::new(),
            description: String::new(),
            comment: String::new(),
            location: String::new(),
            category: String::new(),
            priority: Priority::Medium,
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
            before_image: None,
            after_image: None,
        }
    }

    /// The shared validity rule: title, description, and comment must all
    /// be non-empty. Tasks failing this are never kept long-term.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty() && !self.comment.is_empty()
    }
}

/// How urgent a task is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Input for creating a task that is already fully described, e.g. from the
/// CLI where all fields arrive at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub comment: String,
    pub location: String,
    pub category: String,
    pub priority: Priority,
}

/// Input for updating a task. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
}
