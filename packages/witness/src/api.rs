//! Health & Status API endpoints
//!
//! - GET /health - Simple health check
//! - GET /metrics - Prometheus metrics
//! - GET /status - Witness mode, uptime and per-type cursors

use eyre::Result;
use interchain_rs::{metrics, EventType, InterChainEventCache};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// What `/status` reports on
#[derive(Clone)]
pub struct ApiState {
    pub cache: Arc<InterChainEventCache>,
    pub mode: String,
    /// Types whose cursors are listed
    pub event_types: Vec<EventType>,
    pub started_at: Instant,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    mode: String,
    uptime_seconds: u64,
    cursors: Vec<CursorStatus>,
}

#[derive(Serialize)]
struct CursorStatus {
    event_type: String,
    code: u64,
    last_queried_height: Option<u64>,
    next_transfer_nonce: Option<String>,
    error: Option<String>,
}

/// Start the API server (combines metrics and status endpoints)
pub async fn start_api_server(addr: SocketAddr, state: ApiState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server started");

    metrics::UP.set(1.0);

    loop {
        let (mut socket, _) = listener.accept().await?;
        let state = state.clone();

        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            if socket.readable().await.is_ok() {
                let _ = socket.try_read(&mut buf);
            }

            let request = String::from_utf8_lossy(&buf);

            if request.starts_with("GET /metrics") {
                let buffer = metrics::gather();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\n\r\n",
                    buffer.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(&buffer).await;
            } else if request.starts_with("GET /health") {
                let response =
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nOK";
                let _ = socket.write_all(response.as_bytes()).await;
            } else if request.starts_with("GET /status") {
                let body = serde_json::to_string(&build_status_response(&state))
                    .unwrap_or_else(|_| "{}".to_string());
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            } else {
                let response = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
    }
}

fn build_status_response(state: &ApiState) -> StatusResponse {
    let cursors = state
        .event_types
        .iter()
        .map(|&event_type| cursor_status(&state.cache, event_type))
        .collect::<Vec<_>>();

    let status = if cursors.iter().any(|c| c.error.is_some()) {
        "degraded"
    } else {
        "ok"
    };

    StatusResponse {
        status: status.to_string(),
        mode: state.mode.clone(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cursors,
    }
}

fn cursor_status(cache: &InterChainEventCache, event_type: EventType) -> CursorStatus {
    let mut status = CursorStatus {
        event_type: format!("{:?}", event_type),
        code: event_type.code(),
        last_queried_height: None,
        next_transfer_nonce: None,
        error: None,
    };

    let is_transfer = matches!(
        event_type,
        EventType::TFuelTransfer | EventType::Tnt20Transfer | EventType::Tnt721Transfer
    );
    let result = if is_transfer {
        cache
            .get_next_transfer_nonce(event_type)
            .map(|nonce| status.next_transfer_nonce = Some(nonce.to_string()))
    } else {
        cache
            .get_last_queried_height(event_type)
            .map(|height| status.last_queried_height = Some(height))
    };

    if let Err(e) = result {
        status.error = Some(e.to_string());
    }
    status
}
