//! Local stand-in for the portal API. Answers canned JSON per route and
//! records every request it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use schooldesk_portal::api::HttpApi;
use schooldesk_portal::storage::{StaticToken, TokenStore};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

type Routes = HashMap<(Method, String), (StatusCode, Value)>;

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

pub struct MockApi {
    base: Url,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock API should bind");
        let addr = listener.local_addr().expect("listener has an address");
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock API should serve");
        });
        let base = Url::parse(&format!("http://{}/api", addr)).expect("base URL should parse");
        Self {
            base,
            state,
            server,
        }
    }

    /// Canned answer for `method` on `path`, relative to `/api`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.state
            .routes
            .lock()
            .expect("routes lock")
            .insert((method, format!("/api/{}", path)), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("a request was recorded")
    }

    pub fn client(&self, token: Option<&str>) -> HttpApi {
        let tokens: Arc<dyn TokenStore> = match token {
            Some(token) => Arc::new(StaticToken::new(token)),
            None => Arc::new(StaticToken::none()),
        };
        HttpApi::new(self.base.clone(), tokens).expect("client should build")
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).ok();
    state.requests.lock().expect("requests lock").push(Recorded {
        method: method.clone(),
        path: path.clone(),
        authorization,
        body,
    });

    let answer = state
        .routes
        .lock()
        .expect("routes lock")
        .get(&(method, path))
        .cloned();
    match answer {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Route not found" })),
        ),
    }
}
