use serde::{Deserialize, Deserializer, Serialize};

use super::{Priority, WorkItemType};
use crate::error::{PusherError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: WorkItemType,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub acceptance_criteria: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// Optional fields accept an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl WorkItem {
    /// Decode an untyped record and check the fields serde cannot.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let item: WorkItem = serde_json::from_value(value.clone())
            .map_err(|e| PusherError::Validation(format!("invalid work item: {e}")))?;
        item.validate()?;
        Ok(item)
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PusherError::Validation("work item title is required".into()));
        }
        if let Some(hours) = self.estimated_hours {
            if !hours.is_finite() || hours < 0.0 {
                return Err(PusherError::Validation(format!(
                    "estimatedHours must be a non-negative number, got {hours}"
                )));
            }
        }
        Ok(())
    }
}

/// Best-effort title of a record that may not be a valid work item.
pub fn raw_title(value: &serde_json::Value) -> String {
    value
        .get("title")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string()
}
