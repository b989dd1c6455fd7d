mod model;
mod priority;
mod settings;
mod submission;
mod work_item;
mod work_item_type;

pub use model::{AiModel, AI_MODELS};
pub use priority::Priority;
pub use settings::UserSettings;
pub use submission::{ItemOutcome, SubmissionSummary};
pub use work_item::{raw_title, WorkItem};
pub use work_item_type::WorkItemType;
