//! Local HTTP upstream for exercising the real API clients in tests.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;

/// One request as the upstream received it.
#[derive(Debug, Clone)]
pub struct Received {
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Received {
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub struct Upstream {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl Upstream {
    /// Answer every request with `status` and `reply`, recording what came in.
    pub async fn start(status: StatusCode, reply: Value) -> Self {
        let received: Arc<Mutex<Vec<Received>>> = Arc::default();
        let recorder = received.clone();

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().unwrap().push(Received {
                    path_and_query: uri
                        .path_and_query()
                        .map(|pq| pq.as_str().to_string())
                        .unwrap_or_default(),
                    headers,
                    body: serde_json::from_slice(&body).unwrap_or(Value::Null),
                });
                (status, Json(reply))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            received,
        }
    }

    pub fn requests(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}
