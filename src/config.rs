use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::azure::AzureCredentials;
use crate::error::{PusherError, Result};
use crate::types::UserSettings;

pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_AZURE_BASE_URL: &str = "https://dev.azure.com";

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub default_model: Option<String>,
    pub azure_devops_org: Option<String>,
    pub azure_devops_project: Option<String>,
    pub azure_devops_pat: Option<String>,
    pub bind_addr: Option<String>,
    pub database_path: Option<PathBuf>,
    pub public_url: Option<String>,
    pub openrouter_base_url: Option<String>,
    pub azure_base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| PusherError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| PusherError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "devops-pusher")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(PusherError::NoConfigDir)
    }

    /// Deployment defaults with environment variables taking precedence over the config file.
    pub fn defaults(&self) -> Defaults {
        Defaults {
            openrouter_api_key: env_or("OPENROUTER_API_KEY", &self.openrouter_api_key),
            default_model: env_or("DEVOPS_PUSHER_MODEL", &self.default_model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            azure_devops_org: env_or("AZURE_DEVOPS_ORG", &self.azure_devops_org),
            azure_devops_project: env_or("AZURE_DEVOPS_PROJECT", &self.azure_devops_project),
            azure_devops_pat: env_or("AZURE_DEVOPS_PAT", &self.azure_devops_pat),
        }
    }

    pub fn bind_addr(&self) -> String {
        env_or("DEVOPS_PUSHER_BIND", &self.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = non_empty_env("DEVOPS_PUSHER_DB") {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        Self::config_path().map(|p| p.with_file_name("devops-pusher.db"))
    }

    pub fn public_url(&self) -> String {
        env_or("DEVOPS_PUSHER_PUBLIC_URL", &self.public_url)
            .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
    }

    pub fn openrouter_base_url(&self) -> String {
        self.openrouter_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string())
    }

    pub fn azure_base_url(&self) -> String {
        self.azure_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AZURE_BASE_URL.to_string())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, fallback: &Option<String>) -> Option<String> {
    non_empty_env(key).or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
}

/// Deployment-wide credentials used when neither the request nor the caller's
/// stored settings provide a value.
#[derive(Clone, Default)]
pub struct Defaults {
    pub openrouter_api_key: Option<String>,
    pub default_model: String,
    pub azure_devops_org: Option<String>,
    pub azure_devops_project: Option<String>,
    pub azure_devops_pat: Option<String>,
}

/// Values a caller supplied directly with a request.
#[derive(Default, Debug, Clone)]
pub struct InlineCredentials {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub organization: Option<String>,
    pub project: Option<String>,
    pub personal_access_token: Option<String>,
}

/// Resolves credentials field by field: inline value, then stored user
/// settings, then deployment defaults.
pub struct CredentialResolver<'a> {
    pub inline: &'a InlineCredentials,
    pub settings: Option<&'a UserSettings>,
    pub defaults: &'a Defaults,
}

impl CredentialResolver<'_> {
    pub fn api_key(&self) -> Result<String> {
        pick(
            &self.inline.api_key,
            self.settings.and_then(UserSettings::openrouter_api_key),
            &self.defaults.openrouter_api_key,
        )
        .ok_or(PusherError::MissingApiKey)
    }

    pub fn model(&self) -> String {
        pick(
            &self.inline.model,
            self.settings.and_then(UserSettings::default_model),
            &None,
        )
        .unwrap_or_else(|| self.defaults.default_model.clone())
    }

    pub fn azure(&self) -> Result<AzureCredentials> {
        let settings = self.settings;
        let organization = pick(
            &self.inline.organization,
            settings.and_then(UserSettings::azure_devops_org),
            &self.defaults.azure_devops_org,
        );
        let project = pick(
            &self.inline.project,
            settings.and_then(UserSettings::azure_devops_project),
            &self.defaults.azure_devops_project,
        );
        let pat = pick(
            &self.inline.personal_access_token,
            settings.and_then(UserSettings::azure_devops_pat),
            &self.defaults.azure_devops_pat,
        );

        match (organization, project, pat) {
            (Some(organization), Some(project), Some(personal_access_token)) => {
                Ok(AzureCredentials {
                    organization,
                    project,
                    personal_access_token,
                })
            }
            _ => Err(PusherError::MissingAzureConfig),
        }
    }
}

fn pick(inline: &Option<String>, stored: Option<&str>, default: &Option<String>) -> Option<String> {
    inline
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .or(stored)
        .or(default.as_deref().filter(|v| !v.trim().is_empty()))
        .map(String::from)
}
