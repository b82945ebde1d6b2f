//! Sketch of the real unix-domain-socket worker listener. Gated behind the
//! `daemon` feature and off by default — the only consumer of this socket,
//! an editor/cursor extension, is out of scope, so wiring a production
//! listener here would serve a collaborator this workspace never builds.
//!
//! Kept as a feature-gated module rather than deleted outright so the shape
//! of a real deployment is visible: one [`WorkerSession`] per accepted
//! connection, requests framed as newline-delimited JSON, reconnection left
//! to the client with bounded retry.

#![cfg(feature = "daemon")]

use crate::{InProcessSession, WorkerSession};
use codegraph_config::Config;
use codegraph_core::{GraphStore, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

#[derive(serde::Deserialize)]
struct AnalyzeRequest {
    project_path: String,
}

/// Accepts connections on `socket_path` until the process is killed. Each
/// connection gets a fresh session over the shared store; a request is one
/// line of `{"project_path": "..."}`, a response one line of the run's JSON
/// summary.
pub async fn serve<S: GraphStore + 'static>(socket_path: &str, config: Config, store: Arc<S>) -> Result<()> {
    let _ = std::fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path).map_err(codegraph_core::CodeGraphError::Io)?;
    tracing::info!(socket_path, "worker daemon listening");

    loop {
        let (stream, _addr) = listener.accept().await.map_err(codegraph_core::CodeGraphError::Io)?;
        let session = InProcessSession::new(config.clone(), store.clone());
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, session).await {
                tracing::warn!(error = %e, "daemon connection ended with error");
            }
        });
    }
}

async fn handle_connection<S: GraphStore + 'static>(stream: UnixStream, session: InProcessSession<S>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await.map_err(codegraph_core::CodeGraphError::Io)? {
        let request: AnalyzeRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "malformed daemon request, dropping connection");
                break;
            }
        };

        let report = session.analyze(&PathBuf::from(&request.project_path)).await;
        let response = match report {
            Ok(r) => serde_json::json!({
                "ok": true,
                "roots": r.roots.len(),
                "findings": r.validation_findings.len(),
            }),
            Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
        };
        let mut line = response.to_string();
        line.push('\n');
        writer.write_all(line.as_bytes()).await.map_err(codegraph_core::CodeGraphError::Io)?;
    }

    Ok(())
}
