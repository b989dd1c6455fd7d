use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PusherError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(
        "OpenRouter API key not configured. Save one in your settings or set OPENROUTER_API_KEY"
    )]
    MissingApiKey,

    #[error(
        "Azure DevOps not configured. Save organization, project and PAT in your settings or set AZURE_DEVOPS_ORG, AZURE_DEVOPS_PROJECT and AZURE_DEVOPS_PAT"
    )]
    MissingAzureConfig,

    #[error("{service} error{}: {message}", status_suffix(.status))]
    Upstream {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid JSON response from AI: {0}")]
    InvalidAiResponse(String),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PusherError {
    /// HTTP status the server answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PusherError::Validation(_)
            | PusherError::Json(_)
            | PusherError::MissingApiKey
            | PusherError::MissingAzureConfig => StatusCode::BAD_REQUEST,
            PusherError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PusherError>;
