//! stdio and HTTP transports

use super::server::McpServer;
use crate::core::error::{ReleaseResult, ResultExt};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use std::io::{BufRead, Write};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transport {
  /// Newline-delimited JSON-RPC on stdin/stdout
  Stdio,
  /// JSON-RPC over `POST /` or `POST /mcp`
  Http,
}

/// Serve until stdin closes
pub fn serve_stdio(server: &McpServer) -> ReleaseResult<()> {
  info!("serving MCP on stdio");
  let stdin = std::io::stdin();
  let mut stdout = std::io::stdout();

  for line in stdin.lock().lines() {
    let line = line.context("Failed to read from stdin")?;
    if line.trim().is_empty() {
      continue;
    }
    if let Some(response) = server.handle_message(&line) {
      writeln!(stdout, "{}", response).context("Failed to write to stdout")?;
      stdout.flush().context("Failed to flush stdout")?;
    }
  }

  info!("stdin closed, stopping");
  Ok(())
}

/// `:3000` binds every interface, like Go's listen addresses
pub fn bind_address(address: &str) -> String {
  if address.starts_with(':') {
    format!("0.0.0.0{}", address)
  } else {
    address.to_string()
  }
}

/// MCP on `POST /` and `POST /mcp`, liveness on `GET /health`
pub fn router(server: McpServer) -> Router {
  Router::new()
    .route("/", post(handle_mcp))
    .route("/mcp", post(handle_mcp))
    .route("/health", get(health_check))
    .with_state(server)
}

/// Serve until ctrl-c
pub async fn serve_http(server: McpServer, address: &str) -> ReleaseResult<()> {
  let address = bind_address(address);
  let listener = tokio::net::TcpListener::bind(&address)
    .await
    .with_context(|| format!("Failed to bind {}", address))?;
  info!(address = %address, "serving MCP over HTTP");

  axum::serve(listener, router(server))
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server failed")?;

  info!("HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutdown requested");
}

async fn handle_mcp(State(server): State<McpServer>, body: String) -> Response {
  match tokio::task::spawn_blocking(move || server.handle_message(&body)).await {
    Ok(Some(response)) => ([(header::CONTENT_TYPE, "application/json")], response).into_response(),
    Ok(None) => StatusCode::ACCEPTED.into_response(),
    Err(e) => {
      warn!(error = %e, "request handler panicked");
      StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
  }
}

async fn health_check() -> impl IntoResponse {
  (StatusCode::OK, "OK")
}
