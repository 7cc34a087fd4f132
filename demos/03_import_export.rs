//! Demo 03: Import and Export
//!
//! Export a snapshot, merge a batch in by id, then replace everything.
//!
//! Run with: cargo run --example 03_import_export

use eyre::Result;
use todostore::{TaskRecord, TaskStore};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store = TaskStore::open(temp_dir.path().join("tasks.json"))?;

    println!("TodoStore Import/Export Demo");
    println!("============================\n");

    let groceries = store.create(TaskRecord::new("Buy groceries"))?;
    store.create(TaskRecord::new("Call the plumber").with_assigned_to("alex"))?;

    println!("1. EXPORT - Snapshot of the store:");
    let snapshot = store.export_json()?;
    println!("{}\n", snapshot);

    println!("2. MERGE - One known id, one new task without an id...");
    let batch = format!(
        r#"[
            {{"Id": "{}", "Title": "Buy groceries and flowers", "Status": "InProgress"}},
            {{"Title": "Renew passport", "Priority": "high", "DateStarted": "2024-09-01"}}
        ]"#,
        groceries.id
    );
    let report = store.import_json(&batch, false)?;
    println!("   {:?}", report);
    for task in store.get_all()? {
        println!("   - {} [{}] {}", task.id, task.status, task.title);
    }
    println!();

    println!("3. MALFORMED - Nothing changes on a parse error...");
    match store.import_json("[{\"title\": ", false) {
        Ok(_) => println!("   Unexpectedly accepted!"),
        Err(e) => println!("   Rejected: {}", e),
    }
    println!("   Still {} tasks\n", store.len()?);

    println!("4. REPLACE - Restore the original snapshot...");
    let report = store.import_json(&snapshot, true)?;
    println!("   {:?}", report);
    println!("   Tasks now: {}\n", store.len()?);

    println!("Demo complete!");
    Ok(())
}
