//! In-process stand-in for the messaging API, used by tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

/// One request received by [`FakeMessagingApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Messaging API double that answers every POST with a canned reply.
pub struct FakeMessagingApi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeMessagingApi {
    pub async fn start(status: u16, reply: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status: StatusCode::from_u16(status).unwrap(),
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/:phone_number_id/messages", post(record))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn messages_url(&self, phone_number_id: &str) -> String {
        format!("{}/{}/messages", self.base_url(), phone_number_id)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(state): State<FakeState>,
    Path(phone_number_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(RecordedRequest {
        path: format!("/{phone_number_id}/messages"),
        authorization,
        body,
    });

    (state.status, Json(state.reply.clone()))
}
