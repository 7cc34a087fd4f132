// JSON array file operations

use crate::record::Record;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parse a JSON array of records, matching field names case-insensitively.
///
/// A bare `null` document parses as an empty list. Anything other than an
/// array of objects that deserialize as `T` is an error.
pub fn parse_records<T: Record>(text: &str) -> Result<Vec<T>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(canonicalize_keys(value, T::field_names()))
}

/// Render records exactly as they are stored on disk
pub fn render_records<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(records)
}

/// Replace the file at `path` with `contents` without ever exposing a partial file.
///
/// Contents go to a sibling temp file, get synced, then are renamed over the target.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let temp = temp_path(path);

    let result = write_synced(&temp, contents).and_then(|()| fs::rename(&temp, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result?;

    debug!(path = ?path, bytes = contents.len(), "write_atomic: replaced file");
    Ok(())
}

fn write_synced(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// `tasks.json` -> `tasks.json.tmp`, in the same directory so rename stays atomic
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn canonicalize_keys(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(|item| canonicalize_object(item, fields)).collect()),
        other => other,
    }
}

fn canonicalize_object(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(map) => {
            let renamed: Map<String, Value> = map
                .into_iter()
                .map(|(key, v)| {
                    let key = fields
                        .iter()
                        .find(|field| field.eq_ignore_ascii_case(&key))
                        .map(|field| field.to_string())
                        .unwrap_or(key);
                    (key, v)
                })
                .collect();
            Value::Object(renamed)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskRecord, TaskStatus};
    use tempfile::TempDir;

    #[test]
    fn test_parse_records_case_insensitive() {
        let json = r#"[
            {"Id":"a","TITLE":"Upper","AssignedTo":"kim","Status":1,"DataStarted":"2024-01-02T00:00:00"},
            {"id":"b","title":"lower","assignedto":"lee","status":"blocked","datecompleted":"2024-02-03"}
        ]"#;

        let records: Vec<TaskRecord> = parse_records(json).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "a");
        assert_eq!(records[0].title, "Upper");
        assert_eq!(records[0].assigned_to.as_deref(), Some("kim"));
        assert_eq!(records[0].status, TaskStatus::InProgress);
        assert!(records[0].date_started.is_some());

        assert_eq!(records[1].assigned_to.as_deref(), Some("lee"));
        assert_eq!(records[1].status, TaskStatus::Blocked);
        assert!(records[1].date_completed.is_some());
    }

    #[test]
    fn test_parse_records_unknown_fields_ignored() {
        let records: Vec<TaskRecord> = parse_records(r#"[{"title":"t","color":"red"}]"#).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_records_null_and_empty() {
        let records: Vec<TaskRecord> = parse_records("null").unwrap();
        assert!(records.is_empty());

        let records: Vec<TaskRecord> = parse_records(" [ ] ").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_records_rejects_malformed() {
        assert!(parse_records::<TaskRecord>("").is_err());
        assert!(parse_records::<TaskRecord>("[{\"title\":").is_err());
        assert!(parse_records::<TaskRecord>(r#"{"title":"not an array"}"#).is_err());
        assert!(parse_records::<TaskRecord>(r#"[{"status":"Someday"}]"#).is_err());
    }

    #[test]
    fn test_render_records_is_pretty() {
        let rendered = render_records(&[TaskRecord::new("one")]).unwrap();
        assert!(rendered.starts_with("[\n  {"));
        assert!(rendered.contains("\"title\": \"one\""));

        assert_eq!(render_records::<TaskRecord>(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.json");

        write_atomic(&path, "[]").unwrap();
        write_atomic(&path, "[1]").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[1]");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("tasks.json");

        assert!(write_atomic(&path, "[]").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(temp_path(Path::new("/data/tasks.json")), PathBuf::from("/data/tasks.json.tmp"));
    }
}
