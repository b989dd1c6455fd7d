use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kinds of work item Azure DevOps understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkItemType {
    UserStory,
    #[default]
    Task,
    Bug,
    Feature,
    Epic,
}

const TYPE_TABLE: &[(&str, WorkItemType)] = &[
    ("User Story", WorkItemType::UserStory),
    ("UserStory", WorkItemType::UserStory),
    ("Task", WorkItemType::Task),
    ("Bug", WorkItemType::Bug),
    ("Feature", WorkItemType::Feature),
    ("Epic", WorkItemType::Epic),
];

impl WorkItemType {
    /// Look up a type by label; unknown labels become Task.
    pub fn from_label(label: &str) -> Self {
        TYPE_TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, kind)| *kind)
            .unwrap_or_default()
    }

    /// Name of the type in Azure DevOps, used in the create URL.
    pub fn azure_name(self) -> &'static str {
        match self {
            WorkItemType::UserStory => "User Story",
            WorkItemType::Task => "Task",
            WorkItemType::Bug => "Bug",
            WorkItemType::Feature => "Feature",
            WorkItemType::Epic => "Epic",
        }
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.azure_name())
    }
}

impl Serialize for WorkItemType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.azure_name())
    }
}

impl<'de> Deserialize<'de> for WorkItemType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(WorkItemType::from_label).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_keep_their_azure_name() {
        assert_eq!(WorkItemType::from_label("User Story").azure_name(), "User Story");
        assert_eq!(WorkItemType::from_label("UserStory").azure_name(), "User Story");
        assert_eq!(WorkItemType::from_label("Bug").azure_name(), "Bug");
        assert_eq!(WorkItemType::from_label("Epic").azure_name(), "Epic");
    }

    #[test]
    fn unknown_types_map_to_task() {
        assert_eq!(WorkItemType::from_label("Spike"), WorkItemType::Task);
        assert_eq!(WorkItemType::from_label("bug"), WorkItemType::Task);

        let parsed: WorkItemType = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, WorkItemType::Task);
    }
}
