use tabled::Tabled;

use crate::cli::GenerateArgs;
use crate::config::{Config, CredentialResolver, InlineCredentials};
use crate::error::Result;
use crate::generator::{generate_work_items, GenerateRequest, OpenRouterClient};
use crate::output::{is_json_output, print_table, truncate};
use crate::types::WorkItem;

use super::user_settings;

#[derive(Tabled)]
struct WorkItemRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

impl From<&WorkItem> for WorkItemRow {
    fn from(item: &WorkItem) -> Self {
        Self {
            kind: item.kind.to_string(),
            priority: item.priority.colored(),
            title: truncate(&item.title, 60),
            hours: item
                .estimated_hours
                .map(|h| h.to_string())
                .unwrap_or_default(),
            tags: item.tags.join(", "),
        }
    }
}

pub async fn run(config: &Config, args: GenerateArgs) -> Result<()> {
    let settings = user_settings(config, args.user.as_deref()).await?;
    let defaults = config.defaults();
    let inline = InlineCredentials {
        api_key: args.api_key,
        model: args.model,
        ..Default::default()
    };
    let resolver = CredentialResolver {
        inline: &inline,
        settings: settings.as_ref(),
        defaults: &defaults,
    };

    let request = GenerateRequest {
        prompt: args.prompt,
        model: resolver.model(),
        api_key: resolver.api_key()?,
    };
    let backend = OpenRouterClient::new(config.openrouter_base_url(), config.public_url());
    let items = generate_work_items(&backend, &request).await?;

    if let Some(path) = &args.out {
        std::fs::write(path, serde_json::to_string_pretty(&items)?)?;
        if !is_json_output() {
            eprintln!("Wrote {} work items to {}", items.len(), path.display());
        }
    }

    print_table(&items, |item| WorkItemRow::from(item));
    Ok(())
}
