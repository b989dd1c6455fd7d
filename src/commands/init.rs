use std::io::{self, Write};

use crate::config::{Config, DEFAULT_MODEL};
use crate::error::{PusherError, Result};

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() {
        let answer = prompt(&format!(
            "Config file already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("DevOps Pusher Configuration");
    println!("===========================\n");
    println!("These are deployment defaults; users can override them with their own settings.\n");

    let config = Config {
        openrouter_api_key: optional(prompt(
            "OpenRouter API key (https://openrouter.ai/keys) [optional]: ",
        )?),
        default_model: optional(prompt(&format!("Default model [{DEFAULT_MODEL}]: "))?),
        azure_devops_org: optional(prompt("Azure DevOps organization [optional]: ")?),
        azure_devops_project: optional(prompt("Azure DevOps project [optional]: ")?),
        azure_devops_pat: optional(prompt("Azure DevOps personal access token [optional]: ")?),
        ..Default::default()
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PusherError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let contents = toml::to_string(&config)
        .map_err(|e| PusherError::Validation(format!("could not encode config: {e}")))?;
    std::fs::write(&config_path, contents).map_err(|e| PusherError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run 'devops-pusher serve' to start the API.");

    Ok(())
}
