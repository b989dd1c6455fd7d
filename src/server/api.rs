use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::auth::CurrentUser;
use super::AppState;
use crate::config::{CredentialResolver, InlineCredentials};
use crate::error::{PusherError, Result};
use crate::generator::{generate_work_items, GenerateRequest};
use crate::submitter::submit_work_items;
use crate::types::{SubmissionSummary, UserSettings, WorkItem, AI_MODELS};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    prompt: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    work_items: Vec<WorkItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBody {
    work_items: Option<Value>,
    organization: Option<String>,
    project: Option<String>,
    personal_access_token: Option<String>,
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| PusherError::Validation(e.body_text()))
}

pub async fn generate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: std::result::Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let body = json_body(payload)?;
    let prompt = body
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| PusherError::Validation("Prompt is required".into()))?;

    let settings = state.store.load_settings(&user_id).await?;
    let inline = InlineCredentials {
        api_key: body.api_key,
        model: body.model,
        ..Default::default()
    };
    let resolver = CredentialResolver {
        inline: &inline,
        settings: settings.as_ref(),
        defaults: &state.defaults,
    };

    let request = GenerateRequest {
        prompt,
        model: resolver.model(),
        api_key: resolver.api_key()?,
    };
    let work_items = generate_work_items(state.generator.as_ref(), &request).await?;

    Ok(Json(GenerateResponse { work_items }))
}

pub async fn azure_push(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: std::result::Result<Json<PushBody>, JsonRejection>,
) -> Result<Json<SubmissionSummary>> {
    let body = json_body(payload)?;
    let records = body
        .work_items
        .as_ref()
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| PusherError::Validation("Work items array is required".into()))?;

    let settings = state.store.load_settings(&user_id).await?;
    let inline = InlineCredentials {
        organization: body.organization,
        project: body.project,
        personal_access_token: body.personal_access_token,
        ..Default::default()
    };
    let credentials = CredentialResolver {
        inline: &inline,
        settings: settings.as_ref(),
        defaults: &state.defaults,
    }
    .azure()?;

    let summary = submit_work_items(state.sink.as_ref(), &credentials, records).await;
    Ok(Json(summary))
}

pub async fn get_settings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserSettings>> {
    let settings = state.store.load_settings(&user_id).await?;
    Ok(Json(settings.unwrap_or_default()))
}

pub async fn save_settings(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: std::result::Result<Json<UserSettings>, JsonRejection>,
) -> Result<Json<UserSettings>> {
    let settings = json_body(payload)?;
    let saved = state.store.save_settings(&user_id, settings).await?;
    Ok(Json(saved))
}

pub async fn models() -> Json<Value> {
    Json(json!({ "models": AI_MODELS }))
}
