//! Shared harness: an in-process HTTP server with scripted replies.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use activity_monitor_lib::config::Config;
use activity_monitor_lib::screens::OperationState;
use activity_monitor_lib::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const WAIT: Duration = Duration::from_secs(5);

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

/// A scripted reply.
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self::text(status, "")
    }

    /// Hold the reply back for `delay`, keeping the request in flight.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
struct Script {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockServer {
    pub base_url: String,
    script: Arc<Script>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let script = Arc::new(Script::default());
        let router = Router::new().fallback(serve).with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            script,
            handle,
        }
    }

    /// Always answer `path` with `reply`.
    pub fn reply(&self, path: &str, reply: Reply) {
        self.reply_sequence(path, vec![reply]);
    }

    /// Answer `path` with each reply in turn; the last one repeats.
    pub fn reply_sequence(&self, path: &str, replies: Vec<Reply>) {
        self.script
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.script.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Wait until `path` has been requested at least `count` times.
    pub async fn wait_for_requests(&self, path: &str, count: usize) {
        tokio::time::timeout(WAIT, async {
            while self.requests_to(path).len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("requests did not arrive in time");
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    State(script): State<Arc<Script>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches('/').to_string();

    script.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(String::from),
        token: headers
            .get("x-api-auth")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).ok(),
    });

    let reply = {
        let mut replies = script.replies.lock().unwrap();
        match replies.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    if let Some(delay) = reply.as_ref().and_then(|r| r.delay) {
        tokio::time::sleep(delay).await;
    }

    match reply {
        Some(reply) => (
            StatusCode::from_u16(reply.status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Full client stack pointed at `base_url`, with preferences under `dir`.
pub fn app(base_url: &str, dir: &TempDir) -> AppState {
    AppState::new(Config::new(base_url, dir.path().to_path_buf())).unwrap()
}

/// Wait until an operation succeeds or fails.
pub async fn settled<T: Clone>(mut rx: watch::Receiver<OperationState<T>>) -> OperationState<T> {
    tokio::time::timeout(WAIT, rx.wait_for(OperationState::is_settled))
        .await
        .expect("operation did not settle in time")
        .expect("state holder dropped")
        .clone()
}

pub fn user_json() -> Value {
    serde_json::json!({
        "_id": "u-1",
        "email": "operator@plant.az",
        "registration": "2024-03-01T09:00:00Z",
        "isAdmin": false,
        "firstName": "Aysel",
        "lastName": "Mammadova",
        "position": "Shift lead",
        "factory": "Baku-2"
    })
}

pub fn device_json(id: &str, status: bool) -> Value {
    serde_json::json!({
        "_id": id,
        "name": format!("Machine {id}"),
        "description": "CNC lathe",
        "owner": "u-1",
        "status": status,
        "created": "2024-05-01T08:00:00Z",
        "updated": "2024-06-01T08:00:00Z",
        "utilization": 0.5,
        "__v": 0,
        "model": { "name": "T-400", "maintenancePeriod": 30 }
    })
}

pub fn list_json(devices: Vec<Value>) -> Value {
    let total = devices.len();
    serde_json::json!({
        "status": "success",
        "data": { "total": total, "devices": devices }
    })
}
