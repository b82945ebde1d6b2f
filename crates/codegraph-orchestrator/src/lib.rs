//! The pipeline orchestrator: discovery, analysis, enrichment and
//! validation wired into one run against a shared [`GraphStore`].
//!
//! Phases run strictly in sequence — DISCOVERY, ANALYSIS, ENRICHMENT,
//! VALIDATION — because each depends on the previous one's output.
//! Within the ANALYSIS phase, per-file parsing and building runs
//! concurrently against the same store, bounded by a semaphore, since files
//! are independent until their nodes land in the shared graph.

pub mod discovery;
pub mod registry;
mod topo;

pub use registry::PluginRegistry;

use codegraph_builder::ModuleHandle;
use codegraph_config::Config;
use codegraph_core::{CancellationToken, CodeGraphError, GraphStore, Result};
use codegraph_enrich::EnrichReport;
use codegraph_lang_js::{JsAnalyzer, JsDialect};
use codegraph_storage::StorageFacade;
use codegraph_validate::{ValidationConfig, ValidationFinding};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

const MAX_CONCURRENT_ANALYSIS: usize = 8;

/// What one file's ANALYSIS step produced, or why it didn't.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub nodes_written: usize,
    pub edges_written: usize,
    pub failures: Vec<String>,
}

/// What one root's walk through the pipeline produced.
#[derive(Debug, Default)]
pub struct RootReport {
    pub root: PathBuf,
    pub root_prefix: String,
    pub files_discovered: usize,
    pub files_analyzed: usize,
    pub files_failed: Vec<(PathBuf, String)>,
    pub nodes_written: usize,
    pub edges_written: usize,
}

/// The whole run's result, across every configured root plus the shared
/// enrichment/validation passes that follow them.
#[derive(Debug, Default)]
pub struct RunReport {
    pub roots: Vec<RootReport>,
    pub enrichment: EnrichReport,
    pub validation_findings: Vec<ValidationFinding>,
    pub cancelled: bool,
}

fn dialect_for(path: &Path) -> Option<JsDialect> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("jsx") => Some(JsDialect::JavaScript),
        Some("ts") | Some("tsx") => Some(JsDialect::TypeScript),
        _ => None,
    }
}

/// Runs a single file through ANALYSIS: parse, build, flush. The module's
/// scope is rooted at the file's path relative to `project_path`: a
/// multi-root workspace's ids carry each root's own subdirectory, e.g.
/// `backend/src/api.js`, because that's the file's path relative to the
/// project as a whole; a single-root project's files get no prefix at all,
/// e.g. `demo.js`. Ids stay stable across re-runs regardless of how many
/// roots are configured.
async fn analyze_file<S: GraphStore + 'static>(
    path: PathBuf,
    project_path: &Path,
    facade: Arc<StorageFacade<S>>,
) -> FileOutcome {
    let module_file = path
        .strip_prefix(project_path)
        .unwrap_or(&path)
        .to_string_lossy()
        .replace('\\', "/");

    let outcome = async {
        let Some(dialect) = dialect_for(&path) else {
            return Err(CodeGraphError::Parse(format!("unsupported extension: {}", path.display())));
        };
        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(CodeGraphError::Io)?;
        let collections = JsAnalyzer::analyze(&module_file, &source, dialect)?;
        let module = ModuleHandle::new(module_file.clone())?;
        codegraph_builder::build_module(&module, &collections, &facade).await
    }
    .await;

    match outcome {
        Ok(report) => FileOutcome {
            path,
            nodes_written: report.nodes_written,
            edges_written: report.edges_written,
            failures: report.failures,
        },
        Err(e) => FileOutcome {
            path,
            nodes_written: 0,
            edges_written: 0,
            failures: vec![e.to_string()],
        },
    }
}

/// Owns the registry and a workspace config, and drives a full run of the
/// pipeline against any [`GraphStore`] the caller hands it.
pub struct Orchestrator<S: GraphStore + 'static> {
    registry: PluginRegistry<S>,
    config: Config,
}

impl<S: GraphStore + 'static> Orchestrator<S> {
    pub fn new(config: Config) -> Self {
        Self {
            registry: PluginRegistry::new(),
            config,
        }
    }

    pub fn registry_mut(&mut self) -> &mut PluginRegistry<S> {
        &mut self.registry
    }

    /// Runs DISCOVERY + ANALYSIS over every configured root against `store`,
    /// then ENRICHMENT and VALIDATION once across the whole combined graph,
    /// checking `cancel` at every phase boundary.
    pub async fn run(&self, project_path: &Path, store: Arc<S>, cancel: &CancellationToken) -> Result<RunReport> {
        let mut report = RunReport::default();
        let facade = Arc::new(StorageFacade::new(store).with_strict(self.config.strict));

        let roots = self.config.resolve_roots(project_path);
        let prefixes = self.config.validate_roots(&roots)?;
        let filters = self.config.compile_filters()?;

        for (root, prefix) in roots.iter().zip(prefixes.iter()) {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(report);
            }
            let root_report = self.run_root(root, prefix, project_path, &filters, facade.clone()).await;
            report.roots.push(root_report);
        }

        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        let enrichment_names = &self.config.plugins.enrichment;
        let enrichment_plugins = self.registry.enrichment_plugins(enrichment_names)?;
        tracing::info!(phase = "enrichment", plugins = enrichment_plugins.len(), "running enrichment plugins");
        for plugin in &enrichment_plugins {
            match plugin.run(facade.store().as_ref()).await {
                Ok(r) => {
                    report.enrichment.edges_added += r.edges_added;
                    report.enrichment.unresolved += r.unresolved;
                }
                Err(e) => tracing::warn!(plugin = plugin.name(), error = %e, "enrichment plugin failed, continuing"),
            }
        }

        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        let validation_names = &self.config.plugins.validation;
        let validation_plugins = self.registry.validation_plugins(validation_names)?;
        let validation_config = ValidationConfig::default();
        tracing::info!(phase = "validation", plugins = validation_plugins.len(), "running validation plugins");
        for plugin in &validation_plugins {
            match plugin.run(facade.store().as_ref(), &validation_config).await {
                Ok(mut findings) => report.validation_findings.append(&mut findings),
                Err(e) => tracing::warn!(plugin = plugin.name(), error = %e, "validator failed, continuing"),
            }
        }

        Ok(report)
    }

    async fn run_root(
        &self,
        root: &Path,
        root_prefix: &str,
        project_path: &Path,
        filters: &codegraph_config::FileFilters,
        facade: Arc<StorageFacade<S>>,
    ) -> RootReport {
        let mut root_report = RootReport {
            root: root.to_path_buf(),
            root_prefix: root_prefix.to_string(),
            ..Default::default()
        };

        let files = discovery::discover_files(root, filters);
        root_report.files_discovered = files.len();
        tracing::info!(phase = "discovery", root = %root.display(), files = root_report.files_discovered, "discovered source files");

        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_ANALYSIS));
        let mut tasks = tokio::task::JoinSet::new();
        for path in files {
            let permit = semaphore.clone();
            let facade = facade.clone();
            let project_path = project_path.to_path_buf();
            tasks.spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                analyze_file(path, &project_path, facade).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    root_report.nodes_written += outcome.nodes_written;
                    root_report.edges_written += outcome.edges_written;
                    if outcome.failures.is_empty() {
                        root_report.files_analyzed += 1;
                    } else {
                        root_report.files_failed.push((outcome.path, outcome.failures.join("; ")));
                    }
                }
                Err(e) => tracing::error!(error = %e, "analysis task panicked"),
            }
        }

        tracing::info!(
            phase = "analysis",
            root = %root.display(),
            analyzed = root_report.files_analyzed,
            failed = root_report.files_failed.len(),
            "analysis phase complete"
        );
        root_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{EdgeType, NodeType};
    use codegraph_storage::mem::MemoryGraphStore;
    use std::collections::HashMap;
    use std::io::Write as _;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    /// A single-root project with one class and
    /// one instantiation produces the expected id and INSTANCE_OF edge, with
    /// no id leaking the host's absolute temp-dir path.
    #[tokio::test]
    async fn scenario_a_single_file_instance_of() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "demo.js", "class SocketService {}\nconst s = new SocketService();\n");

        let orchestrator = Orchestrator::<MemoryGraphStore>::new(Config::default());
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        let report = orchestrator.run(dir.path(), store.clone(), &cancel).await.unwrap();
        assert!(report.roots[0].files_failed.is_empty(), "{:?}", report.roots[0].files_failed);

        let class_id = "demo.js->global->CLASS->SocketService";
        let variable_id = "demo.js->global->CONSTANT->s";
        assert!(store.get_node(class_id).await.unwrap().is_some());
        assert!(!class_id.contains(dir.path().to_string_lossy().as_ref()));

        let edges = store.get_outgoing_edges(variable_id, Some(&[EdgeType::InstanceOf])).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].dst, class_id);
    }

    /// Three specifiers on one import statement
    /// each carry a distinct `(column, end_column)` range, and the one whose
    /// range contains a given cursor column is the one named `resolve`.
    #[tokio::test]
    async fn scenario_b_multi_specifier_import_column_ranges() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "index.ts", "import { join, resolve, basename } from 'path';\n");

        let orchestrator = Orchestrator::<MemoryGraphStore>::new(Config::default());
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        orchestrator.run(dir.path(), store.clone(), &cancel).await.unwrap();

        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Import.to_string());
        let imports = store.query_nodes(&query).await.unwrap();
        assert_eq!(imports.len(), 3);

        let mut ranges: Vec<(u32, u32)> = imports
            .iter()
            .map(|n| (n.location.column.unwrap(), n.location.end_column.unwrap()))
            .collect();
        ranges.sort();
        ranges.dedup();
        assert_eq!(ranges.len(), 3, "each specifier must carry a distinct column range");

        let cursor_column = 14u32;
        let under_cursor = imports
            .iter()
            .find(|n| {
                let col = n.location.column.unwrap();
                let end = n.location.end_column.unwrap();
                cursor_column >= col && cursor_column < end
            })
            .expect("some import specifier must contain the cursor column");
        assert_eq!(under_cursor.name, "resolve");
    }

    /// A class private field with an initializer
    /// produces `VARIABLE(#count) --ASSIGNED_FROM--> LITERAL(42)`, and the
    /// data-flow validator raises no finding for it.
    #[tokio::test]
    async fn scenario_c_class_private_field_assigned_from_literal() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "counter.js", "class C { #count = 42; }\n");

        let orchestrator = Orchestrator::<MemoryGraphStore>::new(Config::default());
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        let report = orchestrator.run(dir.path(), store.clone(), &cancel).await.unwrap();

        let variable_id = "counter.js->C->VARIABLE->#count";
        let edges = store.get_outgoing_edges(variable_id, Some(&[EdgeType::AssignedFrom])).await.unwrap();
        assert_eq!(edges.len(), 1);
        let literal = store.get_node(&edges[0].dst).await.unwrap().unwrap();
        assert_eq!(literal.node_type, NodeType::Literal);
        assert_eq!(literal.name, "42");

        assert!(
            !report.validation_findings.iter().any(|f| f.node_id.as_deref() == Some(variable_id)),
            "private field with an initializer must not be flagged: {:?}",
            report.validation_findings
        );
    }

    /// Two roots each declaring `getUser` get
    /// distinct ids carrying their own root's relative path.
    #[tokio::test]
    async fn scenario_d_multi_root_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("backend/src")).unwrap();
        std::fs::create_dir_all(dir.path().join("frontend/src")).unwrap();
        write_file(&dir.path().join("backend/src"), "api.js", "function getUser(){}\n");
        write_file(&dir.path().join("frontend/src"), "app.js", "function getUser(){}\n");

        let mut config = Config::default();
        config.workspace.roots = Some(vec!["backend".to_string(), "frontend".to_string()]);
        let orchestrator = Orchestrator::<MemoryGraphStore>::new(config);
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        orchestrator.run(dir.path(), store.clone(), &cancel).await.unwrap();

        assert!(store.get_node("backend/src/api.js->global->FUNCTION->getUser").await.unwrap().is_some());
        assert!(store.get_node("frontend/src/app.js->global->FUNCTION->getUser").await.unwrap().is_some());
    }

    /// `yield 1` and `yield r` produce YIELDS
    /// edges, `yield* h()` a DELEGATES_TO edge, and a bare `yield;` no edge.
    #[tokio::test]
    async fn scenario_e_yield_generator_edges() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "gen.js",
            "function* g(){ yield 1; const r = 5; yield r; yield* h(); yield; }\n",
        );

        let orchestrator = Orchestrator::<MemoryGraphStore>::new(Config::default());
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        orchestrator.run(dir.path(), store.clone(), &cancel).await.unwrap();

        let function_id = "gen.js->global->FUNCTION->g";
        let incoming_yields = store.get_incoming_edges(function_id, Some(&[EdgeType::Yields])).await.unwrap();
        let incoming_delegates = store.get_incoming_edges(function_id, Some(&[EdgeType::DelegatesTo])).await.unwrap();
        assert_eq!(incoming_yields.len(), 2, "literal 1 and variable r should each YIELD");
        assert_eq!(incoming_delegates.len(), 1, "yield* h() should DELEGATES_TO");
    }

    /// The registry a worker session consults and
    /// the registry an orchestrator built independently both see a plugin
    /// registered through the same `PluginRegistry::new()` entry point — no
    /// duplicate per-entry-point map exists.
    #[test]
    fn scenario_f_single_canonical_registry() {
        let worker_view = registry::PluginRegistry::<MemoryGraphStore>::new();
        let cli_view = registry::PluginRegistry::<MemoryGraphStore>::new();
        let worker_names: Vec<&str> = worker_view.enrichment_plugins(&[]).unwrap().iter().map(|p| p.name()).collect();
        let cli_names: Vec<&str> = cli_view.enrichment_plugins(&[]).unwrap().iter().map(|p| p.name()).collect();
        assert_eq!(worker_names, cli_names);
    }

    #[tokio::test]
    async fn single_root_single_file_run_produces_nodes() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "widget.js",
            "class Widget {}\nconst w = new Widget();\n",
        );

        let config = Config::default();
        let orchestrator = Orchestrator::<MemoryGraphStore>::new(config);
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();

        let report = orchestrator.run(dir.path(), store, &cancel).await.unwrap();
        assert!(!report.cancelled);
        assert_eq!(report.roots.len(), 1);
        assert_eq!(report.roots[0].files_discovered, 1);
        assert_eq!(report.roots[0].files_analyzed, 1);
        assert!(report.roots[0].nodes_written >= 2);
    }

    #[tokio::test]
    async fn cancelled_before_run_returns_immediately() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.js", "const a = 1;\n");

        let config = Config::default();
        let orchestrator = Orchestrator::<MemoryGraphStore>::new(config);
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = orchestrator.run(dir.path(), store, &cancel).await.unwrap();
        assert!(report.cancelled);
        assert!(report.roots.is_empty());
    }

    #[tokio::test]
    async fn unresolved_plugin_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.js", "const a = 1;\n");

        let mut config = Config::default();
        config.plugins.enrichment = vec!["NotAPlugin".to_string()];
        let orchestrator = Orchestrator::<MemoryGraphStore>::new(config);
        let store = Arc::new(MemoryGraphStore::new());
        let cancel = CancellationToken::new();

        let err = orchestrator.run(dir.path(), store, &cancel).await.unwrap_err();
        assert!(err.to_string().contains("unknown"));
    }
}
