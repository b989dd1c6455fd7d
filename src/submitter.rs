//! Bulk submission of work items with per-item failure isolation.

use serde_json::Value;
use tracing::{info, warn};

use crate::azure::{build_patch_document, AzureCredentials, WorkItemSink};
use crate::types::{raw_title, ItemOutcome, SubmissionSummary, WorkItem};

/// Submit `records` one at a time, in order. A record that fails validation or
/// whose remote call fails is recorded as a failure; the remaining records are
/// still submitted.
pub async fn submit_work_items(
    sink: &dyn WorkItemSink,
    credentials: &AzureCredentials,
    records: &[Value],
) -> SubmissionSummary {
    let mut outcomes = Vec::with_capacity(records.len());
    for record in records {
        outcomes.push(submit_one(sink, credentials, record).await);
    }

    let summary = SubmissionSummary::from_outcomes(outcomes);
    info!(
        organization = %credentials.organization,
        project = %credentials.project,
        created = summary.created,
        failed = summary.failed,
        "Submitted work items"
    );
    summary
}

async fn submit_one(
    sink: &dyn WorkItemSink,
    credentials: &AzureCredentials,
    record: &Value,
) -> ItemOutcome {
    let item = match WorkItem::from_value(record) {
        Ok(item) => item,
        Err(e) => {
            let title = raw_title(record);
            warn!(title = %title, error = %e, "Skipping invalid work item");
            return ItemOutcome::failure(title, e.to_string());
        }
    };

    let patch = build_patch_document(&item);
    match sink.create_work_item(credentials, item.kind, &patch).await {
        Ok(created) => ItemOutcome::success(item.title, created.id, created.url),
        Err(e) => {
            warn!(title = %item.title, error = %e, "Error creating work item");
            ItemOutcome::failure(item.title, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::azure::{CreatedWorkItem, PatchOperation};
    use crate::error::{PusherError, Result};
    use crate::types::WorkItemType;

    /// Records every call and fails for titles listed in `reject`.
    struct RecordingSink {
        reject: Vec<&'static str>,
        calls: Mutex<Vec<(WorkItemType, Vec<PatchOperation>)>>,
    }

    impl RecordingSink {
        fn new(reject: Vec<&'static str>) -> Self {
            Self {
                reject,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn titles(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, patch)| patch[0].value.as_str().unwrap().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl WorkItemSink for RecordingSink {
        async fn create_work_item(
            &self,
            _credentials: &AzureCredentials,
            kind: WorkItemType,
            patch: &[PatchOperation],
        ) -> Result<CreatedWorkItem> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((kind, patch.to_vec()));
            let title = patch[0].value.as_str().unwrap_or_default();
            if self.reject.iter().any(|r| *r == title) {
                return Err(PusherError::Upstream {
                    service: "Azure DevOps",
                    status: Some(400),
                    message: format!("rejected {title}"),
                });
            }
            let id = calls.len() as i64;
            Ok(CreatedWorkItem {
                id,
                url: format!("https://dev.azure.com/contoso/_workitems/edit/{id}"),
            })
        }
    }

    fn credentials() -> AzureCredentials {
        AzureCredentials {
            organization: "contoso".into(),
            project: "web".into(),
            personal_access_token: "pat".into(),
        }
    }

    fn records(titles: &[&str]) -> Vec<Value> {
        titles
            .iter()
            .map(|t| json!({ "title": t, "type": "Task", "priority": "Low" }))
            .collect()
    }

    #[tokio::test]
    async fn all_successes_leave_no_errors() {
        let sink = RecordingSink::new(vec![]);
        let input = records(&["A", "B", "C"]);

        let summary = submit_work_items(&sink, &credentials(), &input).await;

        assert_eq!(summary.created, 3);
        assert_eq!(summary.failed, 0);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.results[2].id, 3);
        assert!(serde_json::to_value(&summary).unwrap().get("errors").is_none());
    }

    #[tokio::test]
    async fn all_failures_still_visit_every_item() {
        let sink = RecordingSink::new(vec!["A", "B", "C"]);
        let input = records(&["A", "B", "C"]);

        let summary = submit_work_items(&sink, &credentials(), &input).await;

        assert_eq!(summary.created, 0);
        assert_eq!(summary.failed, 3);
        assert_eq!(sink.titles(), vec!["A", "B", "C"]);
        assert_eq!(summary.errors[1].error, "Azure DevOps error (status 400): rejected B");
    }

    #[tokio::test]
    async fn failure_in_the_middle_does_not_abort() {
        let sink = RecordingSink::new(vec!["B"]);
        let input = records(&["A", "B", "C", "D"]);

        let summary = submit_work_items(&sink, &credentials(), &input).await;

        assert_eq!(summary.created + summary.failed, input.len());
        assert_eq!(summary.created, 3);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].title, "B");
        assert_eq!(sink.titles(), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn malformed_item_fails_locally() {
        let sink = RecordingSink::new(vec![]);
        let input = vec![
            json!({ "title": "Valid", "type": "Bug" }),
            json!({ "description": "missing title" }),
        ];

        let summary = submit_work_items(&sink, &credentials(), &input).await;

        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].title, "");
        assert_eq!(sink.titles(), vec!["Valid"]);
    }

    #[tokio::test]
    async fn unknown_type_and_priority_use_defaults() {
        let sink = RecordingSink::new(vec![]);
        let input = vec![json!({ "title": "Odd", "type": "Spike", "priority": "Urgent" })];

        submit_work_items(&sink, &credentials(), &input).await;

        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls[0].0, WorkItemType::Task);
        assert_eq!(calls[0].1[2].value, json!(3));
    }
}
