use serde::Serialize;

/// A model selectable for work item generation.
#[derive(Serialize, Debug, Clone, Copy)]
pub struct AiModel {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: &'static str,
    pub recommended: bool,
}

pub const AI_MODELS: &[AiModel] = &[
    AiModel {
        id: "anthropic/claude-3.5-sonnet",
        name: "Claude 3.5 Sonnet",
        provider: "Anthropic",
        recommended: true,
    },
    AiModel {
        id: "anthropic/claude-3-opus",
        name: "Claude 3 Opus",
        provider: "Anthropic",
        recommended: false,
    },
    AiModel {
        id: "anthropic/claude-3-haiku",
        name: "Claude 3 Haiku (Fast & Cheap)",
        provider: "Anthropic",
        recommended: false,
    },
    AiModel {
        id: "openai/gpt-4-turbo",
        name: "GPT-4 Turbo",
        provider: "OpenAI",
        recommended: false,
    },
    AiModel {
        id: "openai/gpt-4",
        name: "GPT-4",
        provider: "OpenAI",
        recommended: false,
    },
    AiModel {
        id: "openai/gpt-3.5-turbo",
        name: "GPT-3.5 Turbo (Cheap)",
        provider: "OpenAI",
        recommended: false,
    },
    AiModel {
        id: "google/gemini-pro",
        name: "Gemini Pro",
        provider: "Google",
        recommended: false,
    },
    AiModel {
        id: "meta-llama/llama-3-70b-instruct",
        name: "Llama 3 70B",
        provider: "Meta",
        recommended: false,
    },
];
