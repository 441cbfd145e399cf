//! Task record model and typed property extraction.
//!
//! Records arrive from the store as semi-structured JSON. The accessors
//! here pull out the fields the engine needs and report any shape
//! mismatch as [`EngineError::InvalidRecord`] rather than panicking, so a
//! single malformed record never takes down a batch.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{EngineError, Result};

/// Task status values the engine acts on. Anything else is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Completed; eligible for reset once overdue.
    Done,
    /// Actionable; the state a reset returns a task to.
    NotStarted,
    /// Any other status option defined in the schema.
    Other(String),
}

impl TaskStatus {
    /// Store-side label for this status.
    pub fn as_store_name(&self) -> &str {
        match self {
            Self::Done => "Done",
            Self::NotStarted => "Not Started",
            Self::Other(name) => name,
        }
    }

    /// Parse a store-side status label.
    pub fn from_store_name(name: &str) -> Self {
        match name {
            "Done" => Self::Done,
            "Not Started" => Self::NotStarted,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// One record fetched from the task store.
///
/// `properties` keeps the raw property map as returned over the wire;
/// schema-dependent fields are extracted lazily through the typed
/// accessors below.
#[derive(Debug, Clone)]
pub struct TaskPage {
    /// Opaque store-side id, immutable.
    pub id: String,
    /// Raw property map.
    pub properties: Value,
}

impl TaskPage {
    /// Wrap a raw record.
    pub fn new(id: impl Into<String>, properties: Value) -> Self {
        Self {
            id: id.into(),
            properties,
        }
    }

    fn invalid(&self, field: &str) -> EngineError {
        EngineError::InvalidRecord {
            page_id: self.id.clone(),
            field: field.to_owned(),
        }
    }

    /// Extract the human-readable title.
    ///
    /// The title property is located by its declared *type* (`"title"`),
    /// not by name: the property name varies between database schemas.
    /// Rich-text fragments are concatenated in order.
    pub fn title(&self) -> Result<String> {
        let props = self
            .properties
            .as_object()
            .ok_or_else(|| self.invalid("properties"))?;

        for prop in props.values() {
            if prop.get("type").and_then(Value::as_str) != Some("title") {
                continue;
            }
            let fragments = prop
                .get("title")
                .and_then(Value::as_array)
                .ok_or_else(|| self.invalid("title"))?;
            let text: String = fragments
                .iter()
                .filter_map(|f| f.get("plain_text").and_then(Value::as_str))
                .collect();
            return Ok(text);
        }

        Err(self.invalid("title"))
    }

    /// Read the status property (`status` property type).
    pub fn status(&self, prop_name: &str) -> Result<TaskStatus> {
        let name = self
            .properties
            .get(prop_name)
            .and_then(|p| p.get("status"))
            .and_then(|s| s.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid(prop_name))?;
        Ok(TaskStatus::from_store_name(name))
    }

    /// Read the next-due date.
    ///
    /// The date may live in a plain `date` property or nested inside a
    /// computed `formula` property (`formula.date.start`). Datetime
    /// values are truncated to their calendar date.
    pub fn due_next(&self, prop_name: &str) -> Result<NaiveDate> {
        let value = self
            .properties
            .get(prop_name)
            .ok_or_else(|| self.invalid(prop_name))?;

        let date = match value.get("type").and_then(Value::as_str) {
            Some("date") => value.get("date"),
            Some("formula") => value.get("formula").and_then(|f| f.get("date")),
            _ => None,
        };

        let start = date
            .and_then(|d| d.get("start"))
            .and_then(Value::as_str)
            .ok_or_else(|| self.invalid(prop_name))?;

        let day = start.get(..10).ok_or_else(|| self.invalid(prop_name))?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| self.invalid(prop_name))
    }
}

/// Ephemeral record of one successful reset, used to build the
/// notification payload. Lives only for the duration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    /// Store-side id of the reset task.
    pub page_id: String,
    /// Title at the time of reset.
    pub title: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use serde_json::json;

    fn page(properties: Value) -> TaskPage {
        TaskPage::new("page-1", properties)
    }

    #[test]
    fn title_is_located_by_type_not_name() {
        let task = page(json!({
            "Aufgabe": {
                "type": "title",
                "title": [{"plain_text": "Water plants"}]
            },
            "Status": {"type": "status", "status": {"name": "Done"}}
        }));
        assert_eq!(task.title().unwrap(), "Water plants");
    }

    #[test]
    fn title_concatenates_rich_text_fragments() {
        let task = page(json!({
            "Name": {
                "type": "title",
                "title": [
                    {"plain_text": "Water "},
                    {"plain_text": "plants"}
                ]
            }
        }));
        assert_eq!(task.title().unwrap(), "Water plants");
    }

    #[test]
    fn missing_title_property_is_invalid() {
        let task = page(json!({
            "Status": {"type": "status", "status": {"name": "Done"}}
        }));
        let err = task.title().unwrap_err();
        assert!(
            matches!(err, EngineError::InvalidRecord { ref field, .. } if field == "title"),
            "got {err}"
        );
    }

    #[test]
    fn status_parses_known_and_unknown_names() {
        let task = page(json!({
            "Status": {"type": "status", "status": {"name": "Done"}}
        }));
        assert_eq!(task.status("Status").unwrap(), TaskStatus::Done);

        let task = page(json!({
            "Status": {"type": "status", "status": {"name": "In Progress"}}
        }));
        assert_eq!(
            task.status("Status").unwrap(),
            TaskStatus::Other("In Progress".to_owned())
        );
    }

    #[test]
    fn missing_status_is_invalid_with_field_name() {
        let task = page(json!({}));
        let err = task.status("Status").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord { ref field, .. } if field == "Status"));
    }

    #[test]
    fn due_next_reads_plain_date_property() {
        let task = page(json!({
            "Due Next": {"type": "date", "date": {"start": "2024-03-08"}}
        }));
        assert_eq!(
            task.due_next("Due Next").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
    }

    #[test]
    fn due_next_reads_formula_nested_date() {
        let task = page(json!({
            "Due Next": {
                "type": "formula",
                "formula": {"type": "date", "date": {"start": "2024-03-08"}}
            }
        }));
        assert_eq!(
            task.due_next("Due Next").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
    }

    #[test]
    fn due_next_truncates_datetime_values() {
        let task = page(json!({
            "Due Next": {"type": "date", "date": {"start": "2024-03-08T09:30:00.000+01:00"}}
        }));
        assert_eq!(
            task.due_next("Due Next").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 8).unwrap()
        );
    }

    #[test]
    fn due_next_shape_mismatch_is_invalid_not_panic() {
        // formula that computes a number instead of a date
        let task = page(json!({
            "Due Next": {
                "type": "formula",
                "formula": {"type": "number", "number": 4}
            }
        }));
        let err = task.due_next("Due Next").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord { ref field, .. } if field == "Due Next"));

        let task = page(json!({
            "Due Next": {"type": "date", "date": {"start": "soon"}}
        }));
        assert!(task.due_next("Due Next").is_err());
    }

    #[test]
    fn missing_due_property_is_invalid() {
        let task = page(json!({}));
        let err = task.due_next("Due Next").unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecord { ref field, .. } if field == "Due Next"));
    }
}
