// Generic record trait for any storable type

use crate::error::ValidationErrors;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Core trait that any storable record must implement
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Replace the identifier (only the store assigns ids)
    fn set_id(&mut self, id: String);

    /// Collection name for this record type, used in log output
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Canonical serialized field names.
    ///
    /// Incoming documents have their keys matched against these without
    /// regard to case and rewritten to the canonical spelling before
    /// deserialization.
    fn field_names() -> &'static [&'static str]
    where
        Self: Sized;

    /// Check field constraints; runs before create and update touch the store
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Whether this record carries a usable id
    fn has_id(&self) -> bool {
        !is_blank_id(self.id())
    }
}

/// Generate a fresh record id (UUID v7, so ids sort by creation time)
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Empty, whitespace-only and nil-UUID ids all count as "no id"
pub fn is_blank_id(id: &str) -> bool {
    let id = id.trim();
    id.is_empty() || Uuid::parse_str(id).map(|u| u.is_nil()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestRecord {
        id: String,
        name: String,
    }

    impl Record for TestRecord {
        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }

        fn collection_name() -> &'static str {
            "test"
        }

        fn field_names() -> &'static [&'static str] {
            &["id", "name"]
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        let mut record = TestRecord {
            id: String::new(),
            name: "Test".to_string(),
        };

        assert!(!record.has_id());
        assert!(record.validate().is_ok());
        assert_eq!(TestRecord::collection_name(), "test");

        record.set_id("test-1".to_string());
        assert_eq!(record.id(), "test-1");
        assert!(record.has_id());
    }

    #[test]
    fn test_blank_ids() {
        assert!(is_blank_id(""));
        assert!(is_blank_id("   "));
        assert!(is_blank_id("00000000-0000-0000-0000-000000000000"));
        assert!(!is_blank_id("task-1"));
        assert!(!is_blank_id(&new_id()));
    }

    #[test]
    fn test_new_id_is_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
