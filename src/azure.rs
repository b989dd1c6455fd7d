//! Azure DevOps work item creation over the REST API.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::error::{PusherError, Result};
use crate::types::{WorkItem, WorkItemType};

const SERVICE: &str = "Azure DevOps";
const API_VERSION: &str = "7.0";
const JSON_PATCH: &str = "application/json-patch+json";

const FIELD_TITLE: &str = "/fields/System.Title";
const FIELD_DESCRIPTION: &str = "/fields/System.Description";
const FIELD_PRIORITY: &str = "/fields/Microsoft.VSTS.Common.Priority";
const FIELD_ACCEPTANCE_CRITERIA: &str = "/fields/Microsoft.VSTS.Common.AcceptanceCriteria";
const FIELD_TAGS: &str = "/fields/System.Tags";
const FIELD_ORIGINAL_ESTIMATE: &str = "/fields/Microsoft.VSTS.Scheduling.OriginalEstimate";
const FIELD_ASSIGNED_TO: &str = "/fields/System.AssignedTo";

#[derive(Clone)]
pub struct AzureCredentials {
    pub organization: String,
    pub project: String,
    pub personal_access_token: String,
}

impl fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("personal_access_token", &"<redacted>")
            .finish()
    }
}

/// One JSON Patch "add" operation against a work item field.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PatchOperation {
    pub op: &'static str,
    pub path: &'static str,
    pub value: Value,
}

impl PatchOperation {
    fn add(path: &'static str, value: Value) -> Self {
        Self {
            op: "add",
            path,
            value,
        }
    }
}

/// Render acceptance criteria as a numbered list, one per line.
pub fn format_acceptance_criteria(criteria: &[String]) -> String {
    criteria
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {c}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tags(tags: &[String]) -> String {
    tags.join("; ")
}

/// Field operations for creating `item`. Title, description and priority are
/// always set; the rest only when the item carries them.
pub fn build_patch_document(item: &WorkItem) -> Vec<PatchOperation> {
    let mut ops = vec![
        PatchOperation::add(FIELD_TITLE, json!(item.title)),
        PatchOperation::add(FIELD_DESCRIPTION, json!(item.description)),
        PatchOperation::add(FIELD_PRIORITY, json!(item.priority.as_i32())),
    ];

    if !item.acceptance_criteria.is_empty() {
        ops.push(PatchOperation::add(
            FIELD_ACCEPTANCE_CRITERIA,
            json!(format_acceptance_criteria(&item.acceptance_criteria)),
        ));
    }
    if !item.tags.is_empty() {
        ops.push(PatchOperation::add(FIELD_TAGS, json!(format_tags(&item.tags))));
    }
    if let Some(hours) = item.estimated_hours.filter(|h| *h > 0.0) {
        ops.push(PatchOperation::add(FIELD_ORIGINAL_ESTIMATE, json!(hours)));
    }
    if let Some(assignee) = item.assigned_to.as_deref().filter(|a| !a.trim().is_empty()) {
        ops.push(PatchOperation::add(FIELD_ASSIGNED_TO, json!(assignee)));
    }

    ops
}

/// A work item created remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedWorkItem {
    pub id: i64,
    pub url: String,
}

/// Destination that can create work items, one call per item.
#[async_trait]
pub trait WorkItemSink: Send + Sync {
    async fn create_work_item(
        &self,
        credentials: &AzureCredentials,
        kind: WorkItemType,
        patch: &[PatchOperation],
    ) -> Result<CreatedWorkItem>;
}

pub struct AzureDevOpsClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CreateResponse {
    id: i64,
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Deserialize)]
struct Links {
    html: Link,
}

#[derive(Deserialize)]
struct Link {
    href: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl AzureDevOpsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// `<base>/<org>/<project>/_apis/wit/workitems/$<Type>?api-version=7.0`
    pub fn create_url(&self, credentials: &AzureCredentials, kind: WorkItemType) -> Result<Url> {
        let mut url =
            Url::parse(&self.base_url).map_err(|_| PusherError::InvalidUrl(self.base_url.clone()))?;
        let type_segment = format!("${}", kind.azure_name());
        url.path_segments_mut()
            .map_err(|_| PusherError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([
                credentials.organization.as_str(),
                credentials.project.as_str(),
                "_apis",
                "wit",
                "workitems",
                type_segment.as_str(),
            ]);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }
}

#[async_trait]
impl WorkItemSink for AzureDevOpsClient {
    async fn create_work_item(
        &self,
        credentials: &AzureCredentials,
        kind: WorkItemType,
        patch: &[PatchOperation],
    ) -> Result<CreatedWorkItem> {
        let url = self.create_url(credentials, kind)?;
        debug!(url = %url, "POST work item");

        let response = self
            .http
            .post(url)
            .basic_auth("", Some(&credentials.personal_access_token))
            .header("Content-Type", JSON_PATCH)
            .body(serde_json::to_vec(patch)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            return Err(PusherError::Upstream {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: api_error_message(&body),
            });
        }

        let created: CreateResponse = response.json().await?;
        Ok(CreatedWorkItem {
            id: created.id,
            url: created.links.html.href,
        })
    }
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.message)
        .unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    use crate::test_support::Upstream;
    use crate::types::Priority;

    fn item() -> WorkItem {
        WorkItem {
            title: "Add login".into(),
            description: "Login page".into(),
            kind: WorkItemType::UserStory,
            priority: Priority::Critical,
            acceptance_criteria: Vec::new(),
            tags: Vec::new(),
            estimated_hours: None,
            assigned_to: None,
        }
    }

    fn credentials() -> AzureCredentials {
        AzureCredentials {
            organization: "contoso".into(),
            project: "Fabrikam Fiber".into(),
            personal_access_token: "secret-pat".into(),
        }
    }

    #[test]
    fn acceptance_criteria_render_as_numbered_lines() {
        let criteria = vec!["A".to_string(), "B".to_string()];
        assert_eq!(format_acceptance_criteria(&criteria), "1. A\n2. B");
    }

    #[test]
    fn minimal_item_sets_three_fields() {
        let ops = build_patch_document(&item());
        let paths: Vec<_> = ops.iter().map(|op| op.path).collect();

        assert_eq!(paths, vec![FIELD_TITLE, FIELD_DESCRIPTION, FIELD_PRIORITY]);
        assert_eq!(ops[2].value, json!(1));
        assert!(ops.iter().all(|op| op.op == "add"));
    }

    #[test]
    fn optional_fields_follow_in_order() {
        let mut item = item();
        item.acceptance_criteria = vec!["Works".into(), "Is fast".into()];
        item.tags = vec!["frontend".into(), "auth".into()];
        item.estimated_hours = Some(5.5);
        item.assigned_to = Some("dev@example.com".into());

        let ops = build_patch_document(&item);
        let paths: Vec<_> = ops.iter().map(|op| op.path).collect();

        assert_eq!(
            paths,
            vec![
                FIELD_TITLE,
                FIELD_DESCRIPTION,
                FIELD_PRIORITY,
                FIELD_ACCEPTANCE_CRITERIA,
                FIELD_TAGS,
                FIELD_ORIGINAL_ESTIMATE,
                FIELD_ASSIGNED_TO,
            ]
        );
        assert_eq!(ops[3].value, json!("1. Works\n2. Is fast"));
        assert_eq!(ops[4].value, json!("frontend; auth"));
        assert_eq!(ops[5].value, json!(5.5));
    }

    #[test]
    fn zero_estimate_is_left_out() {
        let mut item = item();
        item.estimated_hours = Some(0.0);
        assert_eq!(build_patch_document(&item).len(), 3);
    }

    #[test]
    fn create_url_encodes_project_and_type() {
        let client = AzureDevOpsClient::new("https://dev.azure.com");
        let url = client
            .create_url(&credentials(), WorkItemType::UserStory)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/contoso/Fabrikam%20Fiber/_apis/wit/workitems/$User%20Story?api-version=7.0"
        );
    }

    #[test]
    fn create_url_keeps_base_path() {
        let client = AzureDevOpsClient::new("https://tfs.example.com/collection/");
        let url = client.create_url(&credentials(), WorkItemType::Bug).unwrap();

        assert_eq!(url.path(), "/collection/contoso/Fabrikam%20Fiber/_apis/wit/workitems/$Bug");
    }

    #[test]
    fn debug_output_hides_pat() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("secret-pat"));
        assert!(rendered.contains("contoso"));
    }

    #[test]
    fn api_errors_prefer_message_field() {
        assert_eq!(
            api_error_message(r#"{"$id":"1","message":"TF401320: Rule Error","typeKey":"RuleValidationException"}"#),
            "TF401320: Rule Error"
        );
        assert_eq!(api_error_message("Service Unavailable"), "Service Unavailable");
    }

    #[tokio::test]
    async fn create_sends_basic_auth_and_json_patch() {
        let upstream = Upstream::start(
            StatusCode::OK,
            json!({ "id": 42, "_links": { "html": { "href": "https://dev.azure.com/o/p/_workitems/edit/42" } } }),
        )
        .await;
        let client = AzureDevOpsClient::new(upstream.base_url.clone());
        let credentials = AzureCredentials {
            organization: "o".into(),
            project: "p".into(),
            personal_access_token: "pat".into(),
        };

        let created = client
            .create_work_item(&credentials, WorkItemType::Task, &build_patch_document(&item()))
            .await
            .unwrap();

        assert_eq!(created.id, 42);
        assert_eq!(created.url, "https://dev.azure.com/o/p/_workitems/edit/42");

        let requests = upstream.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.path_and_query,
            "/o/p/_apis/wit/workitems/$Task?api-version=7.0"
        );
        // base64(":pat")
        assert_eq!(request.header("authorization"), "Basic OnBhdA==");
        assert_eq!(request.header("content-type"), JSON_PATCH);
        assert_eq!(request.body[0]["op"], "add");
        assert_eq!(request.body[0]["path"], FIELD_TITLE);
        assert_eq!(request.body[0]["value"], "Add login");
        assert_eq!(request.body[2]["value"], 1);
    }

    #[tokio::test]
    async fn rejected_create_carries_remote_message() {
        let upstream = Upstream::start(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "TF400813: The user is not authorized" }),
        )
        .await;
        let client = AzureDevOpsClient::new(upstream.base_url.clone());

        let err = client
            .create_work_item(&credentials(), WorkItemType::Bug, &build_patch_document(&item()))
            .await
            .unwrap_err();

        match err {
            PusherError::Upstream { status, message, .. } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "TF400813: The user is not authorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
