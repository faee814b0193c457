//! Test helpers: a fake TV serving the HTTP control API on a local port.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};

use crate::DeviceAddress;

/// How the fake TV answers a request.
#[derive(Debug, Clone)]
pub(crate) enum FakeReply {
    /// Reply immediately with a 200 and the given body.
    Json(String),
    /// Reply with a 200 and the given body after a delay.
    Delayed(Duration, String),
    /// Reply with the given HTTP status and body.
    Status(u16, String),
    /// Accept the request and never reply.
    Silent,
}

impl FakeReply {
    pub(crate) fn json(body: &str) -> Self {
        FakeReply::Json(body.to_string())
    }
}

type Responder = Arc<dyn Fn(&str) -> FakeReply + Send + Sync>;

#[derive(Clone)]
struct FakeTvState {
    responder: Responder,
    requests: Arc<Mutex<Vec<String>>>,
    abandoned: Arc<Notify>,
}

/// Notifies when a silent request is dropped, which happens when the client goes away.
struct AbandonGuard(Arc<Notify>);

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        self.0.notify_one();
    }
}

/// A fake TV. Records the request target (path and query) of every request it receives and
/// answers using the responder it was started with.
pub(crate) struct FakeTv {
    address: DeviceAddress,
    requests: Arc<Mutex<Vec<String>>>,
    abandoned: Arc<Notify>,
}

impl FakeTv {
    pub(crate) async fn start<F>(responder: F) -> FakeTv
    where
        F: Fn(&str) -> FakeReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state = FakeTvState {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
            abandoned: Arc::new(Notify::new()),
        };

        let fake_tv = FakeTv {
            address: DeviceAddress::new("127.0.0.1", port),
            requests: Arc::clone(&state.requests),
            abandoned: Arc::clone(&state.abandoned),
        };

        let app = Router::new().fallback(handle_request).with_state(state);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        fake_tv
    }

    pub(crate) fn address(&self) -> DeviceAddress {
        self.address.clone()
    }

    /// All request targets received so far, in arrival order.
    pub(crate) async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// Wait until a client abandons a request the fake TV was not answering.
    pub(crate) async fn abandoned(&self) {
        self.abandoned.notified().await;
    }
}

async fn handle_request(State(state): State<FakeTvState>, uri: Uri) -> Response {
    let target = uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str().to_string())
        .unwrap_or_default();

    state.requests.lock().await.push(target.clone());

    match (state.responder)(&target) {
        FakeReply::Json(body) => json_response(StatusCode::OK, body),
        FakeReply::Delayed(delay, body) => {
            tokio::time::sleep(delay).await;
            json_response(StatusCode::OK, body)
        }
        FakeReply::Status(status, body) => {
            json_response(StatusCode::from_u16(status).unwrap(), body)
        }
        FakeReply::Silent => {
            let _guard = AbandonGuard(Arc::clone(&state.abandoned));
            tokio::time::sleep(Duration::from_secs(30)).await;

            StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// An address on which nothing is listening.
pub(crate) async fn unused_address() -> DeviceAddress {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    DeviceAddress::new("127.0.0.1", port)
}

/// A reply the fake TV uses for a successful request.
pub(crate) const OK_REPLY: &str = r#"{"status":0,"msg":"success"}"#;

/// A reply the fake TV uses for a failed request.
pub(crate) const BUSY_REPLY: &str = r#"{"status":1,"msg":"busy"}"#;
