use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable line entry belonging to one task.
///
/// Quantity and unit price are kept as the free text the user typed; the
/// price may carry a leading "$". Totals are derived from them with the
/// defensive parsing in [`crate::money`], so malformed text zeroes the line
/// rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: Uuid,
    /// The owning task; deleting it deletes this item.
    pub task_id: Uuid,
    pub title: String,
    pub description: String,
    pub comment: String,
    pub was_purchased: bool,
    pub quantity: String,
    pub unit_price: String,
    pub purchase_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TaskItem {
    /// Creates an empty draft owned by `task_id`, the state an item is in
    /// while being edited for the first time.
    pub fn draft(task_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            task_id,
            title: String::new(),
            description: String::new(),
            comment: String::new(),
            was_purchased: false,
            quantity: String::new(),
            unit_price: String::new(),
            purchase_date: now,
            created_at: now,
        }
    }

    /// Same validity rule as [`crate::models::Task::is_valid`].
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty() && !self.description.is_empty() && !self.comment.is_empty()
    }

    /// Quantity × unit price, zero when either side fails to parse.
    pub fn line_total(&self) -> rust_decimal::Decimal {
        crate::money::line_total(&self.quantity, &self.unit_price)
    }
}

/// Input for creating a fully described task item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskItemInput {
    pub title: String,
    pub description: String,
    pub comment: String,
    pub was_purchased: bool,
    pub quantity: String,
    pub unit_price: String,
}

/// Input for updating a task item. Unset fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskItemInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub was_purchased: Option<bool>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
}
