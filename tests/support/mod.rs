//! Stub project-graph server for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde_json::{json, Value};

use project_graph::client::{ApiClient, ClientConfig};

pub const MAIN_EMAIL: &str = "ana@example.com";
pub const LAUNCH_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Counts requests a route has served.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server failed");
    });
    format!("http://{}", addr)
}

/// Accept connections and close them unanswered after `delay`.
pub async fn serve_hangup(delay: Duration) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Failed to read stub address");
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                drop(socket);
            });
        }
    });
    format!("http://{}", addr)
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ClientConfig::new(base_url)).expect("Failed to create client")
}

/// GET route answering `body` after `delay`. Requests without an `email`
/// query parameter are rejected with 400.
pub fn json_route(hits: Hits, delay: Duration, body: Value) -> MethodRouter {
    get(move |Query(params): Query<HashMap<String, String>>| {
        let hits = hits.clone();
        let body = body.clone();
        async move {
            hits.record();
            tokio::time::sleep(delay).await;
            if !params.contains_key("email") {
                return (StatusCode::BAD_REQUEST, "missing email".to_string());
            }
            (StatusCode::OK, body.to_string())
        }
    })
}

/// GET route answering `status` with `message` after `delay`.
pub fn failing_route(hits: Hits, delay: Duration, status: StatusCode, message: &str) -> MethodRouter {
    let message = message.to_string();
    get(move || {
        let hits = hits.clone();
        let message = message.clone();
        async move {
            hits.record();
            tokio::time::sleep(delay).await;
            (status, message)
        }
    })
}

/// GET route failing with 500 on its first request and answering `body` after.
pub fn flaky_route(hits: Hits, body: Value) -> MethodRouter {
    get(move || {
        let hits = hits.clone();
        let body = body.clone();
        async move {
            if hits.record() == 0 {
                (StatusCode::INTERNAL_SERVER_ERROR, "warming up".to_string())
            } else {
                (StatusCode::OK, body.to_string())
            }
        }
    })
}

/// GET route answering the n-th request with the n-th of `bodies`, repeating
/// the last one once they run out.
pub fn sequence_route(hits: Hits, bodies: Vec<Value>) -> MethodRouter {
    get(move || {
        let hits = hits.clone();
        let bodies = bodies.clone();
        async move {
            let n = hits.record().min(bodies.len().saturating_sub(1));
            match bodies.get(n) {
                Some(body) => (StatusCode::OK, body.to_string()),
                None => (StatusCode::NOT_FOUND, String::new()),
            }
        }
    })
}

/// POST route passing the request body through `respond`.
pub fn echo_route<F>(hits: Hits, respond: F) -> MethodRouter
where
    F: Fn(Value) -> Value + Clone + Send + Sync + 'static,
{
    post(move |Json(body): Json<Value>| {
        let hits = hits.clone();
        let respond = respond.clone();
        async move {
            hits.record();
            Json(respond(body))
        }
    })
}

pub fn launch_document() -> Value {
    json!({
        "uuid": LAUNCH_ID,
        "name": "Launch",
        "type": 1,
        "favorite": true,
        "dateToStart": "2024-01-01T00:00:00Z",
        "priorities": [],
        "measuredGoals": [],
        "completion": {"days": 1, "weeks": 0, "months": 0, "years": 0}
    })
}

pub fn profile_document() -> Value {
    json!([{
        "completeName": "Ana Torres",
        "preferredName": "Ana",
        "age": 34,
        "email": MAIN_EMAIL,
        "priorities": [
            {"id": 1, "descriptionEn": "Health", "descriptionEs": "Salud"},
            {"id": 2, "dscrptn_en": "Work", "dscrptn_es": "Trabajo"}
        ]
    }])
}
