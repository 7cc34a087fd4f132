// TodoStore - task records in a single write-through JSON file

pub mod config;
pub mod error;
pub mod json;
pub mod models;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::{Constraint, FieldViolation, Result, StoreError, ValidationErrors};
pub use models::{TaskRecord, TaskStatus};
pub use record::Record;
pub use store::{ImportReport, Store, TaskStore, WriteOutcome};
