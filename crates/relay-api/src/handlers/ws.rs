//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use tracing::{info, warn};

use crate::socket::WsConnection;
use crate::state::AppState;

/// GET /ws: upgrade, then relay until the socket fails
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    info!("Receiving connection");

    ws.on_failed_upgrade(|e| warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            state
                .relay
                .accept(Arc::new(WsConnection::new(socket)))
                .await;
        })
}
