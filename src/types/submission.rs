use serde::Serialize;

/// Outcome of submitting a single work item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Success(CreatedResult),
    Failure(FailedResult),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreatedResult {
    pub success: bool,
    pub title: String,
    pub id: i64,
    pub url: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FailedResult {
    pub success: bool,
    pub title: String,
    pub error: String,
}

impl ItemOutcome {
    pub fn success(title: String, id: i64, url: String) -> Self {
        ItemOutcome::Success(CreatedResult {
            success: true,
            title,
            id,
            url,
        })
    }

    pub fn failure(title: String, error: String) -> Self {
        ItemOutcome::Failure(FailedResult {
            success: false,
            title,
            error,
        })
    }
}

/// Aggregate of a bulk submission. `created + failed` equals the number of
/// submitted records.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct SubmissionSummary {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<CreatedResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FailedResult>,
}

impl SubmissionSummary {
    pub fn record(mut self, outcome: ItemOutcome) -> Self {
        match outcome {
            ItemOutcome::Success(result) => {
                self.created += 1;
                self.results.push(result);
            }
            ItemOutcome::Failure(error) => {
                self.failed += 1;
                self.errors.push(error);
            }
        }
        self
    }

    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ItemOutcome>) -> Self {
        outcomes
            .into_iter()
            .fold(SubmissionSummary::default(), SubmissionSummary::record)
    }
}
