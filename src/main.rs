use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::PathBuf;
use todostore::{Config, TaskRecord, TaskStatus, TaskStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - task records kept in a single JSON file")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to the backing JSON file (default: from config)
    #[arg(short, long, env = "TODOSTORE_FILE", global = true)]
    file: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all tasks in insertion order
    List,

    /// Show a single task as JSON
    Show { id: String },

    /// Add a new task
    Add {
        title: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Change fields of an existing task
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Delete a task
    Delete { id: String },

    /// Export every task as a JSON array
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import tasks from a JSON array file
    Import {
        input: PathBuf,

        /// Replace the whole store instead of merging by id
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Args)]
struct TaskFields {
    #[arg(long)]
    details: Option<String>,

    #[arg(long)]
    assigned_to: Option<String>,

    #[arg(long)]
    priority: Option<String>,

    /// Todo, InProgress, Blocked, Completed or Cancelled
    #[arg(long)]
    status: Option<TaskStatus>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    started: Option<NaiveDate>,

    /// Completion date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    completed: Option<NaiveDate>,
}

impl TaskFields {
    fn apply(self, task: &mut TaskRecord) {
        if let Some(details) = self.details {
            task.details = Some(details);
        }
        if let Some(assignee) = self.assigned_to {
            task.assigned_to = Some(assignee);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(started) = self.started {
            task.date_started = Some(started);
        }
        if let Some(completed) = self.completed {
            task.date_completed = Some(completed);
        }
    }
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    todostore::models::parse_date(s).map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    let path = config.resolve_data_file(cli.file.as_deref());
    let store = TaskStore::open(&path).wrap_err_with(|| format!("Failed to open store at {}", path.display()))?;

    match cli.command {
        Commands::List => {
            let tasks = store.get_all()?;
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                println!(
                    "{}  {}  {:<8}  {}",
                    task.id.dimmed(),
                    status_label(task.status),
                    task.priority,
                    task.title
                );
            }
        }
        Commands::Show { id } => {
            let task = store.get(&id)?.ok_or_else(|| eyre!("No task with id {}", id))?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Commands::Add { title, fields } => {
            let mut task = TaskRecord::new(title);
            fields.apply(&mut task);
            let created = store.create(task).wrap_err("Failed to add task")?;
            println!("Added {}", created.id.bold());
        }
        Commands::Edit { id, title, fields } => {
            let mut task = store.get(&id)?.ok_or_else(|| eyre!("No task with id {}", id))?;
            if let Some(title) = title {
                task.title = title;
            }
            fields.apply(&mut task);
            if !store.update(task).wrap_err("Failed to update task")?.is_applied() {
                return Err(eyre!("Task {} was deleted before it could be updated", id));
            }
            println!("Updated {}", id.bold());
        }
        Commands::Delete { id } => {
            if store.delete(&id)?.is_applied() {
                println!("Deleted {}", id.bold());
            } else {
                println!("No task with id {}", id);
            }
        }
        Commands::Export { output } => {
            let json = store.export_json()?;
            match output {
                Some(output) => {
                    fs::write(&output, format!("{}\n", json))
                        .wrap_err_with(|| format!("Failed to write {}", output.display()))?;
                    println!("Exported {} tasks to {}", store.len()?, output.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { input, replace } => {
            let json =
                fs::read_to_string(&input).wrap_err_with(|| format!("Failed to read {}", input.display()))?;
            let report = store.import_json(&json, replace).wrap_err("Import failed")?;
            println!(
                "Imported: {} added, {} updated, {} discarded ({} given new ids)",
                report.inserted, report.updated, report.discarded, report.assigned_ids
            );
        }
    }

    Ok(())
}

/// Tracing goes to stderr; RUST_LOG wins over the configured level
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn status_label(status: TaskStatus) -> ColoredString {
    let label = format!("{:<10}", status);
    match status {
        TaskStatus::Todo => label.normal(),
        TaskStatus::InProgress => label.yellow(),
        TaskStatus::Blocked => label.red(),
        TaskStatus::Completed => label.green(),
        TaskStatus::Cancelled => label.dimmed(),
    }
}
