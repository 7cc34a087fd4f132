//! Demo 02: Concurrent Access
//!
//! One store shared by many threads. Every call is serialized by the store's
//! internal lock, so no write is lost and the file is never torn.
//!
//! Run with: cargo run --example 02_concurrent_access

use eyre::Result;
use std::sync::{Arc, Barrier};
use std::thread;
use todostore::{TaskRecord, TaskStore};

fn main() -> Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let store_path = temp_dir.path().join("tasks.json");

    println!("TodoStore Concurrent Access Demo");
    println!("================================\n");

    let store = Arc::new(TaskStore::open(&store_path)?);

    let num_threads = 10;
    let tasks_per_thread = 10;
    let barrier = Arc::new(Barrier::new(num_threads));

    println!(
        "1. Concurrent creation ({} threads, {} tasks each)...",
        num_threads, tasks_per_thread
    );

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let barrier = Arc::clone(&barrier);
            let store = Arc::clone(&store);

            thread::spawn(move || -> todostore::Result<usize> {
                // Wait for all threads to be ready
                barrier.wait();

                for i in 0..tasks_per_thread {
                    store.create(TaskRecord::new(format!("Thread {} task {}", thread_id, i)))?;
                }
                Ok(thread_id)
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(Ok(thread_id)) => println!("   Thread {} completed", thread_id),
            Ok(Err(e)) => println!("   Thread failed: {}", e),
            Err(_) => println!("   Thread panicked"),
        }
    }
    println!();

    println!("2. Verifying...");
    let expected = num_threads * tasks_per_thread;
    println!("   Expected tasks: {}", expected);
    println!("   In memory:      {}", store.len()?);

    // A fresh store reads what is on disk
    let reopened = TaskStore::open(&store_path)?;
    println!("   On disk:        {}", reopened.len()?);
    println!();

    println!("Demo complete!");
    println!("\nKey points:");
    println!("  - Share one TaskStore through Arc; it is Send + Sync");
    println!("  - Reads and writes all wait on the same lock, including the disk write");
    println!("  - Two processes must never open the same file");

    Ok(())
}
