//! Demo 01: Basic CRUD Operations
//!
//! Create, read, update and delete a task, then show the backing file.
//!
//! Run with: cargo run --example 01_basic_crud

use eyre::Result;
use todostore::{TaskRecord, TaskStatus, TaskStore};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store_path = temp_dir.path().join("data").join("tasks.json");

    println!("TodoStore Basic CRUD Demo");
    println!("=========================\n");
    println!("Store file: {}\n", store_path.display());

    // Open (or create) the store
    let store = TaskStore::open(&store_path)?;

    // CREATE
    println!("1. CREATE - Adding a new task...");
    let created = store.create(TaskRecord::new("Write spec").with_priority("high"))?;
    println!("   Created task with ID: {}", created.id);
    println!("   Status defaults to: {}\n", created.status);

    // READ
    println!("2. READ - Retrieving the task...");
    match store.get(&created.id)? {
        Some(task) => println!("   Found: {} [{}]\n", task.title, task.priority),
        None => println!("   Task not found!\n"),
    }

    // UPDATE
    println!("3. UPDATE - Finishing the task...");
    let mut task = created.clone();
    task.title = "Write spec v2".to_string();
    task.status = TaskStatus::Completed;
    let outcome = store.update(task)?;
    println!("   Outcome: {:?}", outcome);

    let mut ghost = TaskRecord::new("Nobody home");
    ghost.id = "no-such-id".to_string();
    println!("   Updating a missing id: {:?}\n", store.update(ghost)?);

    // VALIDATION
    println!("4. VALIDATION - Adding a task without a title...");
    match store.create(TaskRecord::new("")) {
        Ok(_) => println!("   Unexpectedly accepted!\n"),
        Err(e) => println!("   Rejected: {}\n", e),
    }

    // FILE
    println!("5. FILE - Current contents on disk:");
    println!("{}\n", std::fs::read_to_string(&store_path)?);

    // DELETE
    println!("6. DELETE - Removing the task...");
    store.delete(&created.id)?;
    println!("   Task exists = {}", store.get(&created.id)?.is_some());
    println!("   Remaining tasks: {}\n", store.len()?);

    println!("Demo complete!");
    Ok(())
}
