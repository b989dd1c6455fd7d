use tabled::Tabled;

use crate::output::print_table;
use crate::types::{AiModel, AI_MODELS};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "ID")]
    id: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Provider")]
    provider: &'static str,
    #[tabled(rename = "")]
    recommended: &'static str,
}

impl From<&AiModel> for ModelRow {
    fn from(model: &AiModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            provider: model.provider,
            recommended: if model.recommended { "recommended" } else { "" },
        }
    }
}

pub fn list() {
    print_table(AI_MODELS, |model| ModelRow::from(model));
}
