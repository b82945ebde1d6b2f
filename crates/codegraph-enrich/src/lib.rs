//! Enrichment phase: pure transformations over the flushed graph.
//! Each plugin scans for a narrow pattern, resolves a reference the analysis
//! phase could not, and adds edges. A plugin that cannot resolve a reference
//! leaves it dangling — it never invents a node under a made-up id.

use async_trait::async_trait;
use codegraph_core::{EdgeRecord, EdgeType, GraphStore, NodeId, NodeType, Result};
use codegraph_ids::ScopeContext;
use std::collections::HashMap;

/// Edges added and references a plugin looked at but could not resolve.
#[derive(Debug, Default, Clone)]
pub struct EnrichReport {
    pub edges_added: usize,
    pub unresolved: usize,
}

impl EnrichReport {
    fn merge(&mut self, other: EnrichReport) {
        self.edges_added += other.edges_added;
        self.unresolved += other.unresolved;
    }
}

#[async_trait]
pub trait EnrichmentPlugin<S: GraphStore>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Plugin names this one must run after, within the enrichment phase.
    /// Most plugins declare none.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    async fn run(&self, store: &S) -> Result<EnrichReport>;
}

/// Runs every plugin in priority order (the slice's order) against `store`,
/// accumulating one report. No plugin's failure aborts the remaining ones:
/// an enrichment pass is best effort, never fatal to the run.
pub async fn run_all<S: GraphStore>(plugins: &[Box<dyn EnrichmentPlugin<S>>], store: &S) -> EnrichReport {
    let mut total = EnrichReport::default();
    for plugin in plugins {
        match plugin.run(store).await {
            Ok(report) => {
                tracing::debug!(plugin = plugin.name(), edges_added = report.edges_added, unresolved = report.unresolved, "enrichment plugin finished");
                total.merge(report);
            }
            Err(e) => {
                tracing::warn!(plugin = plugin.name(), error = %e, "enrichment plugin failed, continuing");
            }
        }
    }
    total
}

/// Joins a relative import specifier (`./foo`, `../bar/baz`) against the
/// importing module's own workspace-relative path, the same dotted-segment
/// resolution a bundler's resolver performs, without touching the filesystem
/// (the enrichment phase works purely against already-indexed graph state).
fn resolve_relative(importer_file: &str, source: &str) -> Option<String> {
    if !(source.starts_with('.') || source.starts_with('/')) {
        return None;
    }
    let mut segments: Vec<&str> = importer_file.split('/').collect();
    segments.pop(); // drop the importer's own filename
    for part in source.split('/') {
        match part {
            "." | "" => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

fn attr<'a>(node: &'a codegraph_core::NodeRecord, key: &str) -> Option<&'a str> {
    node.metadata.attributes.get(key).and_then(|v| v.as_str())
}

/// For every IMPORT node whose source is a relative path, resolves the
/// target module and the matching EXPORT, and emits `IMPORTS_FROM`.
pub struct ImportExportLinker;

#[async_trait]
impl<S: GraphStore> EnrichmentPlugin<S> for ImportExportLinker {
    fn name(&self) -> &'static str {
        "ImportExportLinker"
    }

    async fn run(&self, store: &S) -> Result<EnrichReport> {
        let mut report = EnrichReport::default();
        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Import.to_string());
        let imports = store.query_nodes(&query).await?;

        for import_node in imports {
            let Some(source) = attr(&import_node, "source") else {
                report.unresolved += 1;
                continue;
            };

            // TODO: read the cross-root package marker once indexing tags it
            // on the IMPORT node; for now only relative-path imports resolve.
            let Some(target_file) = resolve_relative(&import_node.file, source) else {
                report.unresolved += 1;
                continue;
            };

            let mut export_query = HashMap::new();
            export_query.insert("type".to_string(), NodeType::Export.to_string());
            export_query.insert("file".to_string(), target_file);
            export_query.insert("name".to_string(), import_node.name.clone());
            let matches = store.query_nodes(&export_query).await?;

            match matches.into_iter().next() {
                Some(export_node) => {
                    store
                        .add_edge(EdgeRecord::new(EdgeType::ImportsFrom, import_node.id.clone(), export_node.id))
                        .await?;
                    report.edges_added += 1;
                }
                None => report.unresolved += 1,
            }
        }

        Ok(report)
    }
}

/// Re-points dangling `INSTANCE_OF` edges (class imported from elsewhere, so
/// the builder could only mint a same-file fallback id) to the real CLASS
/// node, resolved through the matching IMPORT binding.
///
/// `GraphStore` exposes no edge deletion, so a dangling edge is not removed
/// once resolved — a second, correctly-targeted edge is added alongside it.
/// A query-time consumer following `INSTANCE_OF` out of a VARIABLE should
/// prefer an edge whose `dst` resolves to an existing node.
pub struct InstanceOfResolver;

#[async_trait]
impl<S: GraphStore> EnrichmentPlugin<S> for InstanceOfResolver {
    fn name(&self) -> &'static str {
        "InstanceOfResolver"
    }

    fn dependencies(&self) -> &[&'static str] {
        &["ImportExportLinker"]
    }

    async fn run(&self, store: &S) -> Result<EnrichReport> {
        let mut report = EnrichReport::default();
        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Variable.to_string());
        let variables = store.query_nodes(&query).await?;

        for variable in variables {
            let edges = store
                .get_outgoing_edges(&variable.id, Some(&[EdgeType::InstanceOf]))
                .await?;
            for edge in edges {
                if store.get_node(&edge.dst).await?.is_some() {
                    continue; // already resolves to a real node
                }
                let Some(parsed) = codegraph_ids::parse_id(&edge.dst) else {
                    report.unresolved += 1;
                    continue;
                };
                if parsed.node_type != NodeType::Class {
                    report.unresolved += 1;
                    continue;
                }

                let mut import_query = HashMap::new();
                import_query.insert("type".to_string(), NodeType::Import.to_string());
                import_query.insert("name".to_string(), parsed.name.clone());
                let Some(import_node) = store.query_nodes(&import_query).await?.into_iter().next() else {
                    report.unresolved += 1;
                    continue;
                };
                let Some(source) = attr(&import_node, "source") else {
                    report.unresolved += 1;
                    continue;
                };
                let Some(target_file) = resolve_relative(&import_node.file, source) else {
                    report.unresolved += 1;
                    continue;
                };

                let basename = target_file.rsplit('/').next().unwrap_or(&target_file).to_string();
                let class_scope = ScopeContext::new(basename);
                let Ok(class_id) = codegraph_ids::compute_id(&NodeType::Class, &parsed.name, &class_scope) else {
                    report.unresolved += 1;
                    continue;
                };

                if store.get_node(&class_id).await?.is_some() {
                    store
                        .add_edge(EdgeRecord::new(EdgeType::InstanceOf, variable.id.clone(), class_id))
                        .await?;
                    report.edges_added += 1;
                } else {
                    report.unresolved += 1;
                }
            }
        }

        Ok(report)
    }
}

/// Resolves a callback argument (`PASSES_ARGUMENT` whose `dst` is a function
/// imported from another module and so dangling at build time) to the real
/// FUNCTION node, the same import-lookup shape as [`InstanceOfResolver`]
/// applied to `NodeType::Function` instead of `NodeType::Class`.
pub struct CallbackCallResolver;

#[async_trait]
impl<S: GraphStore> EnrichmentPlugin<S> for CallbackCallResolver {
    fn name(&self) -> &'static str {
        "CallbackCallResolver"
    }

    fn dependencies(&self) -> &[&'static str] {
        &["ImportExportLinker"]
    }

    async fn run(&self, store: &S) -> Result<EnrichReport> {
        let mut report = EnrichReport::default();
        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Call.to_string());
        let calls = store.query_nodes(&query).await?;

        for call in calls {
            let edges = store
                .get_outgoing_edges(&call.id, Some(&[EdgeType::PassesArgument]))
                .await?;
            for edge in edges {
                if store.get_node(&edge.dst).await?.is_some() {
                    continue;
                }
                let Some(parsed) = codegraph_ids::parse_id(&edge.dst) else {
                    report.unresolved += 1;
                    continue;
                };
                if parsed.node_type != NodeType::Function && parsed.node_type != NodeType::Variable {
                    report.unresolved += 1;
                    continue;
                }
                match resolve_dangling_via_import(store, &call.file, &parsed.name).await? {
                    Some(real_id) => {
                        store
                            .add_edge(EdgeRecord::new(EdgeType::PassesArgument, call.id.clone(), real_id))
                            .await?;
                        report.edges_added += 1;
                    }
                    None => report.unresolved += 1,
                }
            }
        }
        Ok(report)
    }
}

/// Shared by [`CallbackCallResolver`]: looks up an IMPORT binding for `name`
/// in `importer_file`, resolves its source module, and returns the real
/// FUNCTION node declared there under the same name, if any.
async fn resolve_dangling_via_import<S: GraphStore>(
    store: &S,
    importer_file: &str,
    name: &str,
) -> Result<Option<NodeId>> {
    let mut import_query = HashMap::new();
    import_query.insert("type".to_string(), NodeType::Import.to_string());
    import_query.insert("name".to_string(), name.to_string());
    import_query.insert("file".to_string(), importer_file.to_string());
    let Some(import_node) = store.query_nodes(&import_query).await?.into_iter().next() else {
        return Ok(None);
    };
    let Some(source) = attr(&import_node, "source") else {
        return Ok(None);
    };
    let Some(target_file) = resolve_relative(importer_file, source) else {
        return Ok(None);
    };

    let mut fn_query = HashMap::new();
    fn_query.insert("type".to_string(), NodeType::Function.to_string());
    fn_query.insert("name".to_string(), name.to_string());
    fn_query.insert("file".to_string(), target_file);
    Ok(store.query_nodes(&fn_query).await?.into_iter().next().map(|n| n.id))
}

/// The canonical set of enrichment plugins run by every entry point
/// (worker, CLI): one registry, no duplicates.
pub fn default_plugins<S: GraphStore + 'static>() -> Vec<Box<dyn EnrichmentPlugin<S>>> {
    vec![
        Box::new(ImportExportLinker),
        Box::new(InstanceOfResolver),
        Box::new(CallbackCallResolver),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Location, NodeRecord};
    use codegraph_storage::mem::MemoryGraphStore;
    use std::sync::Arc;

    fn loc() -> Location {
        Location::default()
    }

    fn node(id: &str, node_type: NodeType, name: &str, file: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            node_type,
            name: name.to_string(),
            file: file.to_string(),
            location: loc(),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn import_export_linker_resolves_relative_import() {
        let store = MemoryGraphStore::new();
        let mut import = node("a->global->IMPORT->helper", NodeType::Import, "helper", "src/a.js");
        import.metadata = codegraph_core::Metadata::default().with("source", "./b");
        store.add_node(import.clone()).await.unwrap();
        store
            .add_node(node("b->global->EXPORT->helper", NodeType::Export, "helper", "src/b.js"))
            .await
            .unwrap();

        let plugins = default_plugins::<MemoryGraphStore>();
        let report = run_all(&plugins, &store).await;
        assert!(report.edges_added >= 1);

        let edges = store
            .get_outgoing_edges(&import.id, Some(&[EdgeType::ImportsFrom]))
            .await
            .unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[tokio::test]
    async fn instance_of_resolver_repoints_dangling_edge() {
        let store = MemoryGraphStore::new();
        let variable = node("a->global->VARIABLE->w", NodeType::Variable, "w", "src/a.js");
        store.add_node(variable.clone()).await.unwrap();

        let mut import = node("a->global->IMPORT->Widget", NodeType::Import, "Widget", "src/a.js");
        import.metadata = codegraph_core::Metadata::default().with("source", "./widget");
        store.add_node(import).await.unwrap();

        let real_class = node("widget.js->global->CLASS->Widget", NodeType::Class, "Widget", "widget.js");
        store.add_node(real_class.clone()).await.unwrap();

        store
            .add_edge(EdgeRecord::new(
                EdgeType::InstanceOf,
                variable.id.clone(),
                "a->global->CLASS->Widget".to_string(),
            ))
            .await
            .unwrap();

        let resolver = InstanceOfResolver;
        let report = resolver.run(&store).await.unwrap();
        assert_eq!(report.edges_added, 1);

        let edges = store
            .get_outgoing_edges(&variable.id, Some(&[EdgeType::InstanceOf]))
            .await
            .unwrap();
        assert!(edges.iter().any(|e| e.dst == real_class.id));
    }
}
