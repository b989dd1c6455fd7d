use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MODEL;

/// Per-user credentials and preferences. Empty strings mean "not set".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserSettings {
    pub openrouter_api_key: String,
    pub default_model: String,
    pub azure_devops_org: String,
    pub azure_devops_project: String,
    pub azure_devops_pat: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            openrouter_api_key: String::new(),
            default_model: DEFAULT_MODEL.to_string(),
            azure_devops_org: String::new(),
            azure_devops_project: String::new(),
            azure_devops_pat: String::new(),
        }
    }
}

impl UserSettings {
    pub fn openrouter_api_key(&self) -> Option<&str> {
        non_empty(&self.openrouter_api_key)
    }

    pub fn default_model(&self) -> Option<&str> {
        non_empty(&self.default_model)
    }

    pub fn azure_devops_org(&self) -> Option<&str> {
        non_empty(&self.azure_devops_org)
    }

    pub fn azure_devops_project(&self) -> Option<&str> {
        non_empty(&self.azure_devops_project)
    }

    pub fn azure_devops_pat(&self) -> Option<&str> {
        non_empty(&self.azure_devops_pat)
    }

    /// Trim every field and put the default model back when it was cleared.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.openrouter_api_key,
            &mut self.default_model,
            &mut self.azure_devops_org,
            &mut self.azure_devops_project,
            &mut self.azure_devops_pat,
        ] {
            *field = field.trim().to_string();
        }
        if self.default_model.is_empty() {
            self.default_model = DEFAULT_MODEL.to_string();
        }
        self
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: UserSettings =
            serde_json::from_str(r#"{ "azure_devops_org": "contoso" }"#).unwrap();

        assert_eq!(settings.azure_devops_org(), Some("contoso"));
        assert_eq!(settings.openrouter_api_key(), None);
        assert_eq!(settings.default_model, DEFAULT_MODEL);
    }

    #[test]
    fn normalized_restores_default_model() {
        let settings = UserSettings {
            default_model: "  ".into(),
            azure_devops_pat: " pat ".into(),
            ..Default::default()
        }
        .normalized();

        assert_eq!(settings.default_model, DEFAULT_MODEL);
        assert_eq!(settings.azure_devops_pat, "pat");
    }
}
