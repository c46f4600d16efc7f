use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use punchlist::db::Database;
use punchlist::filter::{filtered_tasks, FilterKind, ALL};
use punchlist::models::*;
use punchlist::money;

#[derive(Parser)]
#[command(name = "punch")]
#[command(about = "Track home-project tasks and their shopping lists")]
struct Cli {
    /// Database file (defaults to the per-user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage a task's purchasable items
    #[command(subcommand)]
    Item(ItemCommand),
    /// Manage project groupings
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Print the running total over task items
    Total {
        /// Restrict to one task's items
        #[arg(long)]
        task: Option<Uuid>,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Add a fully described task
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        comment: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        category: String,
        /// low, medium, or high
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long)]
        project: Option<Uuid>,
    },
    /// List tasks, optionally filtered along one dimension
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// low, medium, or high
        #[arg(long)]
        priority: Option<String>,
        /// completed, incomplete, or all
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed
    Done { id: Uuid },
    /// Mark a completed task incomplete again
    Reopen { id: Uuid },
    /// Delete one or more tasks (their items go with them)
    Delete { ids: Vec<Uuid> },
}

#[derive(Subcommand)]
enum ItemCommand {
    /// Add an item to a task's shopping list
    Add {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        comment: String,
        #[arg(long, default_value = "1")]
        quantity: String,
        /// Unit price, "$" prefix allowed
        #[arg(long)]
        price: String,
        #[arg(long)]
        purchased: bool,
    },
    /// List items, optionally for one task, with line totals
    List {
        #[arg(long)]
        task: Option<Uuid>,
        #[arg(long)]
        json: bool,
    },
    /// Delete an item
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ProjectCommand {
    Add {
        #[arg(long)]
        name: String,
    },
    List,
    /// Delete a project; its tasks are detached, not deleted
    Delete { id: Uuid },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "punchlist=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(path: Option<PathBuf>) -> anyhow::Result<Database> {
    let db = match path {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

fn parse_priority(s: &str) -> anyhow::Result<Priority> {
    Priority::from_str(s)
        .ok_or_else(|| anyhow::anyhow!("invalid priority '{}': use low, medium, or high", s))
}

/// Maps the CLI's list flags onto a single filter kind and value. At most
/// one dimension may be given.
fn list_filter(
    category: Option<String>,
    location: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> anyhow::Result<(FilterKind, String)> {
    let mut selected: Vec<(FilterKind, String)> = Vec::new();
    if let Some(value) = category {
        selected.push((FilterKind::Category, value));
    }
    if let Some(value) = location {
        selected.push((FilterKind::Location, value));
    }
    if let Some(value) = priority {
        parse_priority(&value)?;
        selected.push((FilterKind::Priority, value));
    }
    if let Some(value) = status {
        let value = match value.to_lowercase().as_str() {
            "completed" => "Completed".to_string(),
            "incomplete" => "Incomplete".to_string(),
            _ => ALL.to_string(),
        };
        selected.push((FilterKind::Status, value));
    }

    match selected.len() {
        0 => Ok((FilterKind::None, ALL.to_string())),
        1 => Ok(selected.remove(0)),
        _ => anyhow::bail!("pick at most one of --category, --location, --priority, --status"),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let db = open_database(cli.db)?;

    match cli.command {
        Commands::Task(cmd) => run_task(&db, cmd)?,
        Commands::Item(cmd) => run_item(&db, cmd)?,
        Commands::Project(cmd) => run_project(&db, cmd)?,
        Commands::Total { task } => {
            let items = match task {
                Some(task_id) => db.get_items_for_task(task_id)?,
                None => db.get_all_task_items()?,
            };
            println!("{}", money::format_currency(money::grand_total(&items)));
        }
    }

    Ok(())
}

fn run_task(db: &Database, cmd: TaskCommand) -> anyhow::Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            description,
            comment,
            location,
            category,
            priority,
            project,
        } => {
            let task = db.create_task(CreateTaskInput {
                project_id: project,
                title,
                description,
                comment,
                location,
                category,
                priority: parse_priority(&priority)?,
            })?;
            println!("Created task {}", task.id);
        }
        TaskCommand::List {
            category,
            location,
            priority,
            status,
            json,
        } => {
            let (kind, value) = list_filter(category, location, priority, status)?;
            let tasks = filtered_tasks(&db.get_all_tasks()?, kind, &value);

            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    let mark = if task.is_completed { "x" } else { " " };
                    println!(
                        "[{}] {}  {}  {} / {} / {}",
                        mark, task.id, task.title, task.category, task.location,
                        task.priority.as_str(),
                    );
                }
            }
        }
        TaskCommand::Done { id } => {
            if db.complete_task(id)? {
                println!("Completed {}", id);
            } else {
                anyhow::bail!("no task with id {}", id);
            }
        }
        TaskCommand::Reopen { id } => {
            if db.reopen_task(id)? {
                println!("Reopened {}", id);
            } else {
                anyhow::bail!("no task with id {}", id);
            }
        }
        TaskCommand::Delete { ids } => {
            let deleted = db.delete_tasks(&ids)?;
            println!("Deleted {} task(s)", deleted);
        }
    }
    Ok(())
}

fn run_item(db: &Database, cmd: ItemCommand) -> anyhow::Result<()> {
    match cmd {
        ItemCommand::Add {
            task,
            title,
            description,
            comment,
            quantity,
            price,
            purchased,
        } => {
            let item = db.create_task_item(
                task,
                CreateTaskItemInput {
                    title,
                    description,
                    comment,
                    was_purchased: purchased,
                    quantity,
                    unit_price: price,
                },
            )?;
            println!(
                "Created item {} ({})",
                item.id,
                money::format_currency(item.line_total())
            );
        }
        ItemCommand::List { task, json } => {
            let items = match task {
                Some(task_id) => db.get_items_for_task(task_id)?,
                None => db.get_all_task_items()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No items.");
            } else {
                for item in &items {
                    let mark = if item.was_purchased { "x" } else { " " };
                    println!(
                        "[{}] {}  {}  {} x {} = {}",
                        mark,
                        item.id,
                        item.title,
                        item.quantity,
                        item.unit_price,
                        money::format_currency(item.line_total()),
                    );
                }
                println!(
                    "Total: {}",
                    money::format_currency(money::grand_total(&items))
                );
            }
        }
        ItemCommand::Delete { id } => {
            if db.delete_task_item(id)? {
                println!("Deleted {}", id);
            } else {
                anyhow::bail!("no item with id {}", id);
            }
        }
    }
    Ok(())
}

fn run_project(db: &Database, cmd: ProjectCommand) -> anyhow::Result<()> {
    match cmd {
        ProjectCommand::Add { name } => {
            let project = db.create_project(CreateProjectInput { name })?;
            println!("Created project {}", project.id);
        }
        ProjectCommand::List => {
            let projects = db.get_all_projects()?;
            if projects.is_empty() {
                println!("No projects.");
            } else {
                for project in &projects {
                    let tasks = db.get_tasks_by_project(project.id)?;
                    println!("{}  {}  ({} tasks)", project.id, project.name, tasks.len());
                }
            }
        }
        ProjectCommand::Delete { id } => {
            if db.delete_project(id)? {
                println!("Deleted {}", id);
            } else {
                anyhow::bail!("no project with id {}", id);
            }
        }
    }
    Ok(())
}
