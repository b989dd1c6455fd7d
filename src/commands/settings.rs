use serde::Serialize;

use crate::cli::SettingsSetArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::{mask_secret, print_item};
use crate::types::UserSettings;

use super::open_store;

/// Settings as shown on the terminal, secrets masked.
#[derive(Serialize)]
struct SettingsView {
    user: String,
    openrouter_api_key: String,
    default_model: String,
    azure_devops_org: String,
    azure_devops_project: String,
    azure_devops_pat: String,
}

impl SettingsView {
    fn new(user: &str, settings: &UserSettings) -> Self {
        Self {
            user: user.to_string(),
            openrouter_api_key: mask_secret(&settings.openrouter_api_key),
            default_model: settings.default_model.clone(),
            azure_devops_org: settings.azure_devops_org.clone(),
            azure_devops_project: settings.azure_devops_project.clone(),
            azure_devops_pat: mask_secret(&settings.azure_devops_pat),
        }
    }
}

fn display(view: &SettingsView) {
    println!("Settings for {}", view.user);
    println!();
    println!("OpenRouter key:  {}", view.openrouter_api_key);
    println!("Default model:   {}", view.default_model);
    println!("Azure org:       {}", or_dash(&view.azure_devops_org));
    println!("Azure project:   {}", or_dash(&view.azure_devops_project));
    println!("Azure PAT:       {}", view.azure_devops_pat);
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

pub async fn show(config: &Config, user: &str) -> Result<()> {
    let store = open_store(config).await?;
    let settings = store.load_settings(user).await?.unwrap_or_default();

    print_item(&SettingsView::new(user, &settings), display);
    Ok(())
}

pub async fn set(config: &Config, args: SettingsSetArgs) -> Result<()> {
    let store = open_store(config).await?;
    let mut settings = store.load_settings(&args.user).await?.unwrap_or_default();

    if let Some(key) = args.openrouter_key {
        settings.openrouter_api_key = key;
    }
    if let Some(model) = args.model {
        settings.default_model = model;
    }
    if let Some(org) = args.org {
        settings.azure_devops_org = org;
    }
    if let Some(project) = args.project {
        settings.azure_devops_project = project;
    }
    if let Some(pat) = args.pat {
        settings.azure_devops_pat = pat;
    }

    let saved = store.save_settings(&args.user, settings).await?;
    print_item(&SettingsView::new(&args.user, &saved), display);
    Ok(())
}
