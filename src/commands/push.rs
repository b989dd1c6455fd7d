use std::io::Read;
use std::path::Path;

use colored::Colorize;
use serde_json::Value;
use tabled::{settings::Style, Table, Tabled};

use crate::azure::AzureDevOpsClient;
use crate::cli::PushArgs;
use crate::config::{Config, CredentialResolver, InlineCredentials};
use crate::error::{PusherError, Result};
use crate::output::{print_item, truncate};
use crate::submitter::submit_work_items;
use crate::types::SubmissionSummary;

use super::user_settings;

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "")]
    status: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "ID / Error")]
    detail: String,
}

/// Work item records from a JSON document: either a bare array or an object
/// with a `workItems` array.
fn records_from(document: Value) -> Result<Vec<Value>> {
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("workItems") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    if records.is_empty() {
        return Err(PusherError::Validation("Work items array is required".into()));
    }
    Ok(records)
}

fn read_document(path: &Path) -> Result<Value> {
    let mut contents = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut contents)?;
    } else {
        contents = std::fs::read_to_string(path)?;
    }
    Ok(serde_json::from_str(&contents)?)
}

pub async fn run(config: &Config, args: PushArgs) -> Result<()> {
    let records = records_from(read_document(&args.file)?)?;

    let settings = user_settings(config, args.user.as_deref()).await?;
    let defaults = config.defaults();
    let inline = InlineCredentials {
        organization: args.org,
        project: args.project,
        personal_access_token: args.pat,
        ..Default::default()
    };
    let credentials = CredentialResolver {
        inline: &inline,
        settings: settings.as_ref(),
        defaults: &defaults,
    }
    .azure()?;

    let client = AzureDevOpsClient::new(config.azure_base_url());
    let summary = submit_work_items(&client, &credentials, &records).await;

    print_item(&summary, print_summary);
    Ok(())
}

fn print_summary(summary: &SubmissionSummary) {
    let mut rows: Vec<ResultRow> = summary
        .results
        .iter()
        .map(|created| ResultRow {
            status: "created".green().to_string(),
            title: truncate(&created.title, 60),
            detail: format!("#{} {}", created.id, created.url),
        })
        .collect();
    rows.extend(summary.errors.iter().map(|failed| ResultRow {
        status: "failed".red().to_string(),
        title: truncate(&failed.title, 60),
        detail: failed.error.clone(),
    }));

    println!("{}", Table::new(rows).with(Style::rounded()));
    println!(
        "Created {}, failed {}",
        summary.created.to_string().green().bold(),
        summary.failed.to_string().red().bold()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_array_or_wrapped_object() {
        let bare = records_from(json!([{ "title": "A" }])).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped = records_from(json!({ "workItems": [{ "title": "A" }, { "title": "B" }] })).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn rejects_empty_or_missing_items() {
        for document in [json!([]), json!({}), json!({ "workItems": "x" }), json!(3)] {
            assert!(matches!(
                records_from(document),
                Err(PusherError::Validation(_))
            ));
        }
    }
}
