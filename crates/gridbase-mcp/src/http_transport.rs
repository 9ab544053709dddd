//! HTTP transport for the MCP server.
//!
//! POST /mcp carries JSON-RPC; GET /mcp opens an SSE stream tied to a
//! session id. A POST that names a live session gets its response
//! delivered over that session's stream and is acknowledged with 202;
//! without a session the response comes back in the POST body. The
//! transport owns the session registry; a guard dropped with the stream
//! removes the entry, so the map only ever holds live connections.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// HTTP transport handler state.
pub struct HttpTransportState {
    /// Channel for sending requests to the MCP server.
    request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>,
    /// Active SSE connections, keyed by session id.
    sse_connections: RwLock<HashMap<String, mpsc::Sender<SseEvent>>>,
}

impl HttpTransportState {
    pub fn new(
        request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>,
    ) -> Self {
        Self {
            request_tx,
            sse_connections: RwLock::new(HashMap::new()),
        }
    }

    fn register_session(&self, session_id: String, tx: mpsc::Sender<SseEvent>) {
        self.sse_connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id, tx);
    }

    fn remove_session(&self, session_id: &str) {
        self.sse_connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
    }

    /// Deliver an event to a session's stream. A failed send means the
    /// receiver is gone; the stale entry is pruned and delivery reports
    /// failure so the caller can fall back.
    async fn publish(&self, session_id: &str, event: SseEvent) -> bool {
        let sender = self
            .sse_connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned();
        let Some(sender) = sender else {
            return false;
        };
        if sender.send(event).await.is_err() {
            self.remove_session(session_id);
            return false;
        }
        true
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sse_connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Removes a session's registry entry when its stream goes away, whether
/// the stream ended or axum dropped it on client disconnect.
struct SessionGuard {
    state: Arc<HttpTransportState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.remove_session(&self.session_id);
        tracing::debug!(session = %self.session_id, "SSE session closed");
    }
}

/// SSE event for streaming.
#[derive(Debug, Clone, Serialize)]
pub struct SseEvent {
    pub event: String,
    pub data: serde_json::Value,
}

/// Query parameters for the MCP endpoint.
#[derive(Debug, Deserialize)]
pub struct McpQuery {
    /// Session id binding a request or stream; generated for streams when
    /// absent.
    session_id: Option<String>,
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/mcp", get(handle_mcp_sse))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    Query(query): Query<McpQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let (response_tx, mut response_rx) = mpsc::channel(1);

    if state.request_tx.send((request, response_tx)).await.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(
                None,
                -32603,
                "MCP server unavailable",
            )),
        )
            .into_response();
    }

    let Some(response) = response_rx.recv().await else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(
                None,
                -32603,
                "No response from MCP server",
            )),
        )
            .into_response();
    };

    // A request bound to a live session answers over that session's
    // stream; the POST itself only acknowledges receipt.
    if let Some(session_id) = &query.session_id {
        let event = SseEvent {
            event: "message".to_string(),
            data: serde_json::to_value(&response).unwrap_or_default(),
        };
        if state.publish(session_id, event).await {
            return StatusCode::ACCEPTED.into_response();
        }
    }

    (StatusCode::OK, Json(response)).into_response()
}

/// Handle GET requests to /mcp (SSE streaming).
async fn handle_mcp_sse(
    State(state): State<Arc<HttpTransportState>>,
    Query(query): Query<McpQuery>,
) -> impl IntoResponse {
    let session_id = query
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let (event_tx, event_rx) = mpsc::channel(100);
    state.register_session(session_id.clone(), event_tx);
    tracing::debug!(session = %session_id, "SSE session opened");

    let guard = SessionGuard { state, session_id };

    let stream = async_stream::stream! {
        let _guard = guard;
        let mut rx = event_rx;
        while let Some(event) = rx.recv().await {
            let data = serde_json::to_string(&event.data).unwrap_or_default();
            yield Ok::<_, Infallible>(axum::response::sse::Event::default()
                .event(event.event)
                .data(data));
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(30))
            .text("ping"),
    )
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gridbase-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for the MCP transport.
pub struct HttpServer {
    port: u16,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    pub fn new(
        port: u16,
        request_tx: mpsc::Sender<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>,
    ) -> Self {
        Self {
            port,
            state: Arc::new(HttpTransportState::new(request_tx)),
        }
    }

    /// Run the HTTP server until the listener fails.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", self.port))
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to port {}: {}", self.port, e))
            })?;

        tracing::info!(port = self.port, "MCP HTTP server listening");

        axum::serve(listener, app).await.map_err(McpError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn state() -> Arc<HttpTransportState> {
        let (tx, _rx) = mpsc::channel(1);
        Arc::new(HttpTransportState::new(tx))
    }

    #[tokio::test]
    async fn health_endpoint_answers_ok() {
        let app = create_router(state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dropped_stream_removes_its_session() {
        let state = state();
        let (event_tx, _event_rx) = mpsc::channel(1);
        state.register_session("s1".to_string(), event_tx);
        assert_eq!(state.session_count(), 1);

        let guard = SessionGuard {
            state: Arc::clone(&state),
            session_id: "s1".to_string(),
        };
        drop(guard);
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn publish_delivers_to_live_sessions_and_prunes_dead_ones() {
        let state = state();

        let (event_tx, mut event_rx) = mpsc::channel(1);
        state.register_session("live".to_string(), event_tx);
        let event = SseEvent {
            event: "message".to_string(),
            data: json!({"n": 1}),
        };
        assert!(state.publish("live", event).await);
        assert_eq!(event_rx.recv().await.unwrap().data["n"], 1);

        let (dead_tx, dead_rx) = mpsc::channel(1);
        state.register_session("dead".to_string(), dead_tx);
        drop(dead_rx);
        let event = SseEvent {
            event: "message".to_string(),
            data: serde_json::Value::Null,
        };
        assert!(!state.publish("dead", event).await);
        assert_eq!(state.session_count(), 1);

        assert!(!state.publish("never-registered", SseEvent {
            event: "message".to_string(),
            data: serde_json::Value::Null,
        })
        .await);
    }

    fn ping_body() -> Body {
        Body::from(
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "ping"
            })
            .to_string(),
        )
    }

    fn spawn_responder(mut rx: mpsc::Receiver<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>) {
        tokio::spawn(async move {
            if let Some((request, response_tx)) = rx.recv().await {
                let _ = response_tx
                    .send(JsonRpcResponse::success(request.id, json!({"pong": true})))
                    .await;
            }
        });
    }

    #[tokio::test]
    async fn post_routes_through_request_channel() {
        let (tx, rx) = mpsc::channel(1);
        let state = Arc::new(HttpTransportState::new(tx));
        let app = create_router(state);
        spawn_responder(rx);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp")
                    .header("content-type", "application/json")
                    .body(ping_body())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn post_answers_over_a_live_session_stream() {
        let (tx, rx) = mpsc::channel(1);
        let state = Arc::new(HttpTransportState::new(tx));
        let (event_tx, mut event_rx) = mpsc::channel(1);
        state.register_session("s1".to_string(), event_tx);
        let app = create_router(Arc::clone(&state));
        spawn_responder(rx);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp?session_id=s1")
                    .header("content-type", "application/json")
                    .body(ping_body())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let event = event_rx.recv().await.unwrap();
        assert_eq!(event.event, "message");
        assert_eq!(event.data["result"]["pong"], true);
    }

    #[tokio::test]
    async fn post_with_unknown_session_falls_back_to_direct_response() {
        let (tx, rx) = mpsc::channel(1);
        let state = Arc::new(HttpTransportState::new(tx));
        let app = create_router(state);
        spawn_responder(rx);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/mcp?session_id=ghost")
                    .header("content-type", "application/json")
                    .body(ping_body())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
