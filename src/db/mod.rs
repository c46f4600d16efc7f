//! SQLite-backed entity store.
//!
//! [`Database`] is the concrete store; [`TaskStore`] is the narrow trait
//! the rest of the crate consumes so that the store is always an injected
//! collaborator, never ambient state. Storage failures surface as
//! [`StoreError`] and are propagated, not swallowed.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Storage failure taxonomy. The core never retries; recovery policy
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine data directory")]
    NoDataDir,
    #[error("task {0} not found")]
    TaskNotFound(Uuid),
    #[error("migration {version} ({name}) failed: {source}")]
    Migration {
        version: &'static str,
        name: &'static str,
        source: rusqlite::Error,
    },
}

/// The repository interface consumed by the lifecycle guard and the CLI.
///
/// Fetch-all results are ordered by creation time, so a consistent snapshot
/// feeds the filter engine in a stable order. `insert_*` persists a
/// pre-built record (drafts included); deletes cascade from a task to its
/// items.
pub trait TaskStore {
    fn fetch_all_tasks(&self) -> Result<Vec<Task>, StoreError>;
    fn fetch_all_task_items(&self) -> Result<Vec<TaskItem>, StoreError>;
    fn fetch_task_items(&self, task_id: Uuid) -> Result<Vec<TaskItem>, StoreError>;
    fn insert_task(&self, task: &Task) -> Result<(), StoreError>;
    fn insert_task_item(&self, item: &TaskItem) -> Result<(), StoreError>;
    fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;
    fn delete_task_item(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Flushes pending writes to the underlying medium.
    fn save(&self) -> Result<(), StoreError>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self, StoreError> {
        let dirs =
            directories::ProjectDirs::from("", "", "punchlist").ok_or(StoreError::NoDataDir)?;
        let db_path = dirs.data_dir().join("punchlist.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM projects ORDER BY name")?;

        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    created_at: parse_datetime(row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM projects WHERE id = ?")?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Project {
                id: parse_uuid(row.get::<_, String>(0)?),
                name: row.get(1)?,
                created_at: parse_datetime(row.get::<_, String>(2)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO projects (id, name, created_at) VALUES (?, ?, ?)",
            (id.to_string(), &input.name, now.to_rfc3339()),
        )?;

        Ok(Project {
            id,
            name: input.name,
            created_at: now,
        })
    }

    /// Detaches the project's tasks (their `project_id` becomes NULL); it
    /// never deletes them.
    pub fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Task operations
    // ============================================================

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, description, comment, location, category, priority,
                    is_completed, created_at, completed_at, before_image, after_image
             FROM tasks WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Task {
                id: parse_uuid(row.get::<_, String>(0)?),
                project_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
                title: row.get(2)?,
                description: row.get(3)?,
                comment: row.get(4)?,
                location: row.get(5)?,
                category: row.get(6)?,
                priority: Priority::from_str(&row.get::<_, String>(7)?)
                    .unwrap_or(Priority::Medium),
                is_completed: row.get::<_, i32>(8)? != 0,
                created_at: parse_datetime(row.get::<_, String>(9)?),
                completed_at: row.get::<_, Option<String>>(10)?.map(parse_datetime),
                before_image: row.get(11)?,
                after_image: row.get(12)?,
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, description, comment, location, category, priority,
                    is_completed, created_at, completed_at, before_image, after_image
             FROM tasks ORDER BY created_at",
        )?;

        let tasks = stmt
            .query_map([], |row| {
                Ok(Task {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    project_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
                    title: row.get(2)?,
                    description: row.get(3)?,
                    comment: row.get(4)?,
                    location: row.get(5)?,
                    category: row.get(6)?,
                    priority: Priority::from_str(&row.get::<_, String>(7)?)
                        .unwrap_or(Priority::Medium),
                    is_completed: row.get::<_, i32>(8)? != 0,
                    created_at: parse_datetime(row.get::<_, String>(9)?),
                    completed_at: row.get::<_, Option<String>>(10)?.map(parse_datetime),
                    before_image: row.get(11)?,
                    after_image: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn get_tasks_by_project(&self, project_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, project_id, title, description, comment, location, category, priority,
                    is_completed, created_at, completed_at, before_image, after_image
             FROM tasks WHERE project_id = ? ORDER BY created_at",
        )?;

        let tasks = stmt
            .query_map([project_id.to_string()], |row| {
                Ok(Task {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    project_id: row.get::<_, Option<String>>(1)?.map(parse_uuid),
                    title: row.get(2)?,
                    description: row.get(3)?,
                    comment: row.get(4)?,
                    location: row.get(5)?,
                    category: row.get(6)?,
                    priority: Priority::from_str(&row.get::<_, String>(7)?)
                        .unwrap_or(Priority::Medium),
                    is_completed: row.get::<_, i32>(8)? != 0,
                    created_at: parse_datetime(row.get::<_, String>(9)?),
                    completed_at: row.get::<_, Option<String>>(10)?.map(parse_datetime),
                    before_image: row.get(11)?,
                    after_image: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO tasks (id, project_id, title, description, comment, location, category,
                                priority, is_completed, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)",
            (
                id.to_string(),
                input.project_id.map(|u| u.to_string()),
                &input.title,
                &input.description,
                &input.comment,
                &input.location,
                &input.category,
                input.priority.as_str(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Task {
            id,
            project_id: input.project_id,
            title: input.title,
            description: input.description,
            comment: input.comment,
            location: input.location,
            category: input.category,
            priority: input.priority,
            is_completed: false,
            created_at: now,
            completed_at: None,
            before_image: None,
            after_image: None,
        })
    }

    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let mut updates = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = input.title {
            updates.push("title = ?");
            params.push(Box::new(title));
        }
        if let Some(description) = input.description {
            updates.push("description = ?");
            params.push(Box::new(description));
        }
        if let Some(comment) = input.comment {
            updates.push("comment = ?");
            params.push(Box::new(comment));
        }
        if let Some(location) = input.location {
            updates.push("location = ?");
            params.push(Box::new(location));
        }
        if let Some(category) = input.category {
            updates.push("category = ?");
            params.push(Box::new(category));
        }
        if let Some(priority) = input.priority {
            updates.push("priority = ?");
            params.push(Box::new(priority.as_str().to_string()));
        }

        if updates.is_empty() {
            return Ok(false);
        }

        params.push(Box::new(id.to_string()));

        let sql = format!("UPDATE tasks SET {} WHERE id = ?", updates.join(", "));
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_ref.as_slice())?;

        Ok(rows > 0)
    }

    pub fn complete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let rows = conn.execute(
            "UPDATE tasks SET is_completed = 1, completed_at = ? WHERE id = ?",
            (now.to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    pub fn reopen_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE tasks SET is_completed = 0, completed_at = NULL WHERE id = ?",
            [id.to_string()],
        )?;
        Ok(rows > 0)
    }

    pub fn attach_photos(
        &self,
        id: Uuid,
        before_image: Option<Vec<u8>>,
        after_image: Option<Vec<u8>>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "UPDATE tasks SET before_image = ?, after_image = ? WHERE id = ?",
            (&before_image, &after_image, id.to_string()),
        )?;
        Ok(rows > 0)
    }

    /// Deletes a task and, through the schema's cascade, all of its items.
    pub fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Bulk delete, used by the list screen's multi-select. Returns how many
    /// tasks were actually removed.
    pub fn delete_tasks(&self, ids: &[Uuid]) -> Result<usize, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut deleted = 0;
        for id in ids {
            deleted += conn.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        }
        Ok(deleted)
    }

    // ============================================================
    // Task item operations
    // ============================================================

    pub fn get_task_item(&self, id: Uuid) -> Result<Option<TaskItem>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, title, description, comment, was_purchased, quantity,
                    unit_price, purchase_date, created_at
             FROM task_items WHERE id = ?",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(TaskItem {
                id: parse_uuid(row.get::<_, String>(0)?),
                task_id: parse_uuid(row.get::<_, String>(1)?),
                title: row.get(2)?,
                description: row.get(3)?,
                comment: row.get(4)?,
                was_purchased: row.get::<_, i32>(5)? != 0,
                quantity: row.get(6)?,
                unit_price: row.get(7)?,
                purchase_date: parse_datetime(row.get::<_, String>(8)?),
                created_at: parse_datetime(row.get::<_, String>(9)?),
            }))
        } else {
            Ok(None)
        }
    }

    pub fn get_all_task_items(&self) -> Result<Vec<TaskItem>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, title, description, comment, was_purchased, quantity,
                    unit_price, purchase_date, created_at
             FROM task_items ORDER BY created_at",
        )?;

        let items = stmt
            .query_map([], |row| {
                Ok(TaskItem {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    task_id: parse_uuid(row.get::<_, String>(1)?),
                    title: row.get(2)?,
                    description: row.get(3)?,
                    comment: row.get(4)?,
                    was_purchased: row.get::<_, i32>(5)? != 0,
                    quantity: row.get(6)?,
                    unit_price: row.get(7)?,
                    purchase_date: parse_datetime(row.get::<_, String>(8)?),
                    created_at: parse_datetime(row.get::<_, String>(9)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn get_items_for_task(&self, task_id: Uuid) -> Result<Vec<TaskItem>, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, task_id, title, description, comment, was_purchased, quantity,
                    unit_price, purchase_date, created_at
             FROM task_items WHERE task_id = ? ORDER BY created_at",
        )?;

        let items = stmt
            .query_map([task_id.to_string()], |row| {
                Ok(TaskItem {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    task_id: parse_uuid(row.get::<_, String>(1)?),
                    title: row.get(2)?,
                    description: row.get(3)?,
                    comment: row.get(4)?,
                    was_purchased: row.get::<_, i32>(5)? != 0,
                    quantity: row.get(6)?,
                    unit_price: row.get(7)?,
                    purchase_date: parse_datetime(row.get::<_, String>(8)?),
                    created_at: parse_datetime(row.get::<_, String>(9)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn create_task_item(
        &self,
        task_id: Uuid,
        input: CreateTaskItemInput,
    ) -> Result<TaskItem, StoreError> {
        // Verify the owning task exists
        self.get_task(task_id)?
            .ok_or(StoreError::TaskNotFound(task_id))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO task_items (id, task_id, title, description, comment, was_purchased,
                                     quantity, unit_price, purchase_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                task_id.to_string(),
                &input.title,
                &input.description,
                &input.comment,
                if input.was_purchased { 1 } else { 0 },
                &input.quantity,
                &input.unit_price,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(TaskItem {
            id,
            task_id,
            title: input.title,
            description: input.description,
            comment: input.comment,
            was_purchased: input.was_purchased,
            quantity: input.quantity,
            unit_price: input.unit_price,
            purchase_date: now,
            created_at: now,
        })
    }

    pub fn update_task_item(
        &self,
        id: Uuid,
        input: UpdateTaskItemInput,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");

        let mut updates = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(title) = input.title {
            updates.push("title = ?");
            params.push(Box::new(title));
        }
        if let Some(description) = input.description {
            updates.push("description = ?");
            params.push(Box::new(description));
        }
        if let Some(comment) = input.comment {
            updates.push("comment = ?");
            params.push(Box::new(comment));
        }
        if let Some(was_purchased) = input.was_purchased {
            updates.push("was_purchased = ?");
            params.push(Box::new(if was_purchased { 1 } else { 0 }));
        }
        if let Some(quantity) = input.quantity {
            updates.push("quantity = ?");
            params.push(Box::new(quantity));
        }
        if let Some(unit_price) = input.unit_price {
            updates.push("unit_price = ?");
            params.push(Box::new(unit_price));
        }

        if updates.is_empty() {
            return Ok(false);
        }

        params.push(Box::new(id.to_string()));

        let sql = format!("UPDATE task_items SET {} WHERE id = ?", updates.join(", "));
        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = conn.execute(&sql, params_ref.as_slice())?;

        Ok(rows > 0)
    }

    pub fn delete_task_item(&self, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM task_items WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl TaskStore for Database {
    fn fetch_all_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.get_all_tasks()
    }

    fn fetch_all_task_items(&self) -> Result<Vec<TaskItem>, StoreError> {
        self.get_all_task_items()
    }

    fn fetch_task_items(&self, task_id: Uuid) -> Result<Vec<TaskItem>, StoreError> {
        self.get_items_for_task(task_id)
    }

    fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO tasks (id, project_id, title, description, comment, location, category,
                                priority, is_completed, created_at, completed_at, before_image,
                                after_image)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                task.id.to_string(),
                task.project_id.map(|u| u.to_string()),
                &task.title,
                &task.description,
                &task.comment,
                &task.location,
                &task.category,
                task.priority.as_str(),
                if task.is_completed { 1 } else { 0 },
                task.created_at.to_rfc3339(),
                task.completed_at.map(|dt| dt.to_rfc3339()),
                &task.before_image,
                &task.after_image,
            ),
        )?;
        Ok(())
    }

    fn insert_task_item(&self, item: &TaskItem) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO task_items (id, task_id, title, description, comment, was_purchased,
                                     quantity, unit_price, purchase_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                item.id.to_string(),
                item.task_id.to_string(),
                &item.title,
                &item.description,
                &item.comment,
                if item.was_purchased { 1 } else { 0 },
                &item.quantity,
                &item.unit_price,
                item.purchase_date.to_rfc3339(),
                item.created_at.to_rfc3339(),
            ),
        )?;
        Ok(())
    }

    fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        Database::delete_task(self, id)
    }

    fn delete_task_item(&self, id: Uuid) -> Result<bool, StoreError> {
        Database::delete_task_item(self, id)
    }

    fn save(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        // WAL checkpoint is the one flush-like operation SQLite exposes;
        // autocommit already covers individual statements.
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
