//! Placeholder deployment data for the dashboard. Nothing here talks to a real
//! CI/CD system.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use chrono::{Duration, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{PusherError, Result};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    id: u32,
    name: String,
    status: &'static str,
    branch: String,
    commit: String,
    timestamp: String,
    duration: &'static str,
    environment: String,
    author: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    id: u32,
    name: &'static str,
    status: &'static str,
    version: &'static str,
    url: &'static str,
    uptime: &'static str,
    last_deploy: String,
    instances: u32,
    region: &'static str,
}

#[derive(Deserialize)]
pub struct NewDeployment {
    branch: Option<String>,
    environment: Option<String>,
}

fn minutes_ago(minutes: i64) -> String {
    (Utc::now() - Duration::minutes(minutes)).to_rfc3339()
}

pub async fn deployments() -> Json<Value> {
    let deployments = [
        Deployment {
            id: 1,
            name: "Production Deploy".into(),
            status: "success",
            branch: "main".into(),
            commit: "a1b2c3d".into(),
            timestamp: minutes_ago(30),
            duration: "2m 34s",
            environment: "production".into(),
            author: "john.doe@example.com",
        },
        Deployment {
            id: 2,
            name: "Staging Deploy".into(),
            status: "in_progress",
            branch: "develop".into(),
            commit: "e4f5g6h".into(),
            timestamp: minutes_ago(0),
            duration: "1m 12s",
            environment: "staging".into(),
            author: "jane.smith@example.com",
        },
        Deployment {
            id: 3,
            name: "Feature Branch".into(),
            status: "failed",
            branch: "feature/new-ui".into(),
            commit: "i7j8k9l".into(),
            timestamp: minutes_ago(120),
            duration: "45s",
            environment: "preview".into(),
            author: "bob.wilson@example.com",
        },
    ];
    Json(json!({ "deployments": deployments }))
}

pub async fn create_deployment(
    payload: std::result::Result<Json<NewDeployment>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(request) = payload.map_err(|e| PusherError::Validation(e.body_text()))?;
    let branch = request.branch.unwrap_or_default();
    let environment = request.environment.unwrap_or_default();

    let mut rng = rand::rng();
    let commit: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect();
    let deployment = Deployment {
        id: rng.random_range(0..10_000),
        name: format!("Deploy {branch} to {environment}"),
        status: "in_progress",
        branch,
        commit,
        timestamp: minutes_ago(0),
        duration: "0s",
        environment,
        author: "api@devops-pusher.com",
    };

    Ok((StatusCode::CREATED, Json(json!({ "deployment": deployment }))))
}

pub async fn environments() -> Json<Value> {
    let environments = [
        Environment {
            id: 1,
            name: "Production",
            status: "healthy",
            version: "v1.2.5",
            url: "app.example.com",
            uptime: "99.98%",
            last_deploy: minutes_ago(30),
            instances: 3,
            region: "us-east-1",
        },
        Environment {
            id: 2,
            name: "Staging",
            status: "deploying",
            version: "v1.3.0-beta",
            url: "staging.example.com",
            uptime: "99.95%",
            last_deploy: minutes_ago(0),
            instances: 2,
            region: "us-west-2",
        },
        Environment {
            id: 3,
            name: "Preview",
            status: "error",
            version: "v1.3.0-rc",
            url: "preview.example.com",
            uptime: "98.50%",
            last_deploy: minutes_ago(60),
            instances: 1,
            region: "eu-west-1",
        },
    ];
    Json(json!({ "environments": environments }))
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub async fn stats() -> Json<Value> {
    let mut rng = rand::rng();
    let hourly: Vec<Value> = (0..24)
        .map(|hour| json!({ "hour": hour, "deployments": rng.random_range(0..10) }))
        .collect();
    let daily: Vec<Value> = WEEKDAYS
        .iter()
        .map(|day| json!({ "day": day, "deployments": rng.random_range(5..25) }))
        .collect();

    Json(json!({
        "stats": {
            "totalDeployments": 127,
            "successRate": 94.5,
            "avgDeployTime": "2m 15s",
            "activeEnvironments": 3,
            "deploymentsToday": 8,
            "deploymentsThisWeek": 47,
            "failureRate": 5.5,
            "topContributor": "john.doe@example.com",
            "metrics": {
                "hourly": hourly,
                "daily": daily
            }
        }
    }))
}
