// Data models for the task store

use crate::error::{Constraint, ValidationErrors};
use crate::record::Record;
use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TITLE_MAX_LEN: usize = 100;
pub const DETAILS_MAX_LEN: usize = 500;

/// A single task item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: TaskStatus,
    // Older files spell this field "dataStarted"
    #[serde(default, alias = "dataStarted", with = "calendar_date")]
    pub date_started: Option<NaiveDate>,
    #[serde(default, with = "calendar_date")]
    pub date_completed: Option<NaiveDate>,
}

impl TaskRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = Some(assignee.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for TaskRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn collection_name() -> &'static str {
        "tasks"
    }

    fn field_names() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "details",
            "assignedTo",
            "priority",
            "status",
            "dateStarted",
            "dataStarted",
            "dateCompleted",
        ]
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.push("title", Constraint::Required);
        } else if self.title.chars().count() > TITLE_MAX_LEN {
            errors.push("title", Constraint::MaxLength(TITLE_MAX_LEN));
        }

        if let Some(details) = &self.details
            && details.chars().count() > DETAILS_MAX_LEN
        {
            errors.push("details", Constraint::MaxLength(DETAILS_MAX_LEN));
        }

        errors.into_result()
    }
}

/// Workflow state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Variants in their legacy numeric order
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
        }
    }

    pub fn from_index(index: u64) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    /// Case-insensitive; separators are ignored so "in-progress" works too
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str().to_lowercase() == folded)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}' (expected one of: Todo, InProgress, Blocked, Completed, Cancelled)",
                    s
                )
            })
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl Visitor<'_> for StatusVisitor {
            type Value = TaskStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a task status name or its number 0-4")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TaskStatus, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<TaskStatus, E> {
                TaskStatus::from_index(v).ok_or_else(|| E::custom(format!("status number out of range: {}", v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<TaskStatus, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("status number out of range: {}", v)))
                    .and_then(|v| self.visit_u64(v))
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

/// Parse a calendar date, accepting a date-time and dropping its time part
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    let s = s.trim();
    let date_part = match s.find(['T', ' ']) {
        Some(idx) => &s[..idx],
        None => s,
    };
    NaiveDate::parse_from_str(date_part, calendar_date::FORMAT)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional dates as `YYYY-MM-DD`
mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => super::parse_date(&raw)
                .map(Some)
                .map_err(|e| de::Error::custom(format!("invalid date '{}': {}", raw, e))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");

        let status: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);

        let status: TaskStatus = serde_json::from_str("2").unwrap();
        assert_eq!(status, TaskStatus::Blocked);

        assert!(serde_json::from_str::<TaskStatus>("5").is_err());
        assert!(serde_json::from_str::<TaskStatus>("-1").is_err());
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("Cancelled".parse::<TaskStatus>().unwrap(), TaskStatus::Cancelled);
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_serialization() {
        let mut task = TaskRecord::new("Write spec")
            .with_priority("high")
            .with_assigned_to("sam");
        task.id = "task-1".to_string();
        task.date_started = Some(date(2024, 3, 1));

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["title"], "Write spec");
        assert_eq!(value["assignedTo"], "sam");
        assert_eq!(value["status"], "Todo");
        assert_eq!(value["dateStarted"], "2024-03-01");
        assert!(value["dateCompleted"].is_null());
        assert!(value["details"].is_null());

        let back: TaskRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_task_defaults_and_nulls() {
        let task: TaskRecord =
            serde_json::from_str(r#"{"title":"Only a title","priority":null,"status":null,"id":null}"#).unwrap();
        assert_eq!(task.title, "Only a title");
        assert_eq!(task.priority, "");
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.id.is_empty());
        assert_eq!(task.date_started, None);
    }

    #[test]
    fn test_legacy_dates() {
        let task: TaskRecord = serde_json::from_str(
            r#"{"title":"Old","dataStarted":"2023-11-05T00:00:00","dateCompleted":"2023-11-07T13:45:10.123"}"#,
        )
        .unwrap();
        assert_eq!(task.date_started, Some(date(2023, 11, 5)));
        assert_eq!(task.date_completed, Some(date(2023, 11, 7)));

        assert!(serde_json::from_str::<TaskRecord>(r#"{"title":"Bad","dateStarted":"yesterday"}"#).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(TaskRecord::new("ok").validate().is_ok());

        let err = TaskRecord::new("").validate().unwrap_err();
        assert_eq!(err.fields(), vec!["title"]);

        let err = TaskRecord::new("   ").validate().unwrap_err();
        assert_eq!(err.violations()[0].constraint, Constraint::Required);

        let err = TaskRecord::new("x".repeat(101))
            .with_details("y".repeat(501))
            .validate()
            .unwrap_err();
        assert_eq!(err.fields(), vec!["title", "details"]);

        // Limits count characters, not bytes
        assert!(TaskRecord::new("é".repeat(100)).with_details("ü".repeat(500)).validate().is_ok());
    }
}
