use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Priority levels for work items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Critical priority (1)
    Critical = 1,
    /// High priority (2)
    High = 2,
    /// Medium priority (3)
    #[default]
    Medium = 3,
    /// Low priority (4)
    Low = 4,
}

const PRIORITY_TABLE: &[(&str, Priority)] = &[
    ("Critical", Priority::Critical),
    ("High", Priority::High),
    ("Medium", Priority::Medium),
    ("Low", Priority::Low),
];

impl Priority {
    /// Look up a priority by label, falling back to Medium for anything unknown.
    pub fn from_label(label: &str) -> Self {
        PRIORITY_TABLE
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, priority)| *priority)
            .unwrap_or_default()
    }

    /// Azure DevOps priority value (1-4).
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Get the colored label for terminal output.
    pub fn colored(self) -> String {
        let label = self.label();
        match self {
            Priority::Critical => label.red().bold().to_string(),
            Priority::High => label.yellow().bold().to_string(),
            Priority::Medium => label.blue().to_string(),
            Priority::Low => label.bright_black().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Priority::from_label).unwrap_or_default())
    }
}
