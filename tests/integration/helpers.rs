//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use relay_api::{AppState, build_router};
use relay_core::config::AppConfig;
use relay_realtime::metrics::MetricsSnapshot;
use relay_realtime::server::RelayEngine;

/// WebSocket client stream used by the tests
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for in-process requests
    pub router: Router,
    /// Engine behind the router
    pub relay: RelayEngine,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub async fn new() -> Self {
        let config = AppConfig::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 0

            [pool]
            inlet_capacity = 64
            "#,
        )
        .expect("Failed to load test config");

        let relay = RelayEngine::start(&config.pool);
        let router = build_router(AppState::new(config, relay.clone()));

        Self { router, relay }
    }

    /// Make an in-process HTTP request
    pub async fn request(&self, method: &str, path: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn_server(&self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Test server failed");
        });

        TestServer {
            addr,
            relay: self.relay.clone(),
        }
    }
}

/// A relay listening on a real socket
pub struct TestServer {
    /// Bound address
    pub addr: SocketAddr,
    /// Engine behind the server
    pub relay: RelayEngine,
}

impl TestServer {
    /// Open a WebSocket to `/ws`
    pub async fn connect(&self) -> WsClient {
        let url = format!("ws://{}/ws", self.addr);
        let (stream, _) = connect_async(url)
            .await
            .expect("Failed to open WebSocket");
        stream
    }

    /// Open `n` WebSockets and wait until the pool has registered all of them
    pub async fn connect_many(&self, n: usize) -> Vec<WsClient> {
        let mut clients = Vec::with_capacity(n);
        for _ in 0..n {
            clients.push(self.connect().await);
        }
        self.wait_for(|m| m.connections_active == n as u64).await;
        clients
    }

    /// Poll the relay metrics until `done` holds
    pub async fn wait_for(&self, done: impl Fn(&MetricsSnapshot) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !done(&self.relay.metrics()) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Relay did not reach the expected state");
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
}
