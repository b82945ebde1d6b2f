//! Worker / CLI glue: drives the orchestrator on behalf of a front end.
//!
//! A real deployment exposes this over a unix-domain socket so a long-running
//! IDE extension or daemon can submit a project path and stream back stats.
//! That transport's only consumer, an editor extension, is out of scope, so
//! the socket exists only to serve a collaborator this workspace never
//! builds. What's in scope is the contract the socket would carry: the
//! [`WorkerSession`] trait, with [`InProcessSession`] as the implementation
//! the CLI binary drives synchronously. A sketch of the real listener lives
//! behind the `daemon` feature, off by default.

pub mod daemon;

use codegraph_config::Config;
use codegraph_core::{CancellationToken, GraphStore, Result};
use codegraph_orchestrator::{Orchestrator, RunReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One analysis request-response cycle, independent of how the request
/// arrived (in-process call today, a UDS frame if `daemon` is ever wired up).
#[async_trait::async_trait]
pub trait WorkerSession: Send + Sync {
    async fn analyze(&self, project_path: &Path) -> Result<RunReport>;
}

/// Drives an [`Orchestrator`] directly in the caller's task — no socket, no
/// framing, just the same trait boundary a real session would expose.
pub struct InProcessSession<S: GraphStore + 'static> {
    orchestrator: Orchestrator<S>,
    store: Arc<S>,
}

impl<S: GraphStore + 'static> InProcessSession<S> {
    pub fn new(config: Config, store: Arc<S>) -> Self {
        Self {
            orchestrator: Orchestrator::new(config),
            store,
        }
    }
}

#[async_trait::async_trait]
impl<S: GraphStore + 'static> WorkerSession for InProcessSession<S> {
    async fn analyze(&self, project_path: &Path) -> Result<RunReport> {
        let cancel = CancellationToken::new();
        self.orchestrator.run(project_path, self.store.clone(), &cancel).await
    }
}

/// Resolves a project path argument to an absolute path, canonicalizing
/// user-supplied paths before anything downstream treats them as a workspace
/// root.
pub fn canonical_project_path(path: &str) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(codegraph_core::CodeGraphError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_storage::mem::MemoryGraphStore;

    #[tokio::test]
    async fn in_process_session_runs_orchestrator() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "const a = 1;\n").unwrap();

        let session = InProcessSession::new(Config::default(), Arc::new(MemoryGraphStore::new()));
        let report = session.analyze(dir.path()).await.unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.roots.len(), 1);
    }

    #[test]
    fn canonical_project_path_rejects_missing_path() {
        assert!(canonical_project_path("/does/not/exist/anywhere").is_err());
    }
}
