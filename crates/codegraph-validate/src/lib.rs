//! Validation phase: read-only passes over the enriched graph that
//! emit findings. Validators never fail the run — the orchestrator collects
//! and surfaces what they report.

use async_trait::async_trait;
use codegraph_core::{EdgeType, GraphStore, NodeId, NodeType, Result};
use std::collections::{HashMap, HashSet};

/// One validator's complaint about the graph. `node_id` is the offending
/// node, when the finding is node-scoped.
#[derive(Debug, Clone)]
pub struct ValidationFinding {
    pub code: &'static str,
    pub message: String,
    pub node_id: Option<NodeId>,
}

impl ValidationFinding {
    fn new(code: &'static str, message: impl Into<String>, node_id: impl Into<NodeId>) -> Self {
        Self {
            code,
            message: message.into(),
            node_id: Some(node_id.into()),
        }
    }
}

/// The leaf node types a data-flow chain is allowed to terminate at.
/// `CONSTRUCTOR_CALL` has no distinct node type in
/// this schema — a `new X()` instantiation is recorded as an `INSTANCE_OF`
/// edge to the CLASS node, so `NodeType::Class` already plays that role.
pub fn default_leaf_types() -> Vec<NodeType> {
    vec![
        NodeType::Literal,
        NodeType::ArrayLiteral,
        NodeType::ObjectLiteral,
        NodeType::Call,
        NodeType::MethodCall,
        NodeType::Class,
        NodeType::Function,
        NodeType::NetRequest,
        NodeType::NetStdio,
        NodeType::HttpRequest,
        NodeType::DbQuery,
        NodeType::FsOperation,
    ]
}

#[derive(Debug, Clone)]
pub struct ValidationConfig {
    pub leaf_types: Vec<NodeType>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            leaf_types: default_leaf_types(),
        }
    }
}

#[async_trait]
pub trait ValidationPlugin<S: GraphStore>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Plugin names this one must run after, within the validation phase.
    /// Neither built-in validator depends on the other.
    fn dependencies(&self) -> &[&'static str] {
        &[]
    }

    async fn run(&self, store: &S, config: &ValidationConfig) -> Result<Vec<ValidationFinding>>;
}

pub async fn run_all<S: GraphStore>(
    plugins: &[Box<dyn ValidationPlugin<S>>],
    store: &S,
    config: &ValidationConfig,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    for plugin in plugins {
        match plugin.run(store, config).await {
            Ok(mut found) => {
                tracing::debug!(plugin = plugin.name(), count = found.len(), "validator finished");
                findings.append(&mut found);
            }
            Err(e) => {
                tracing::warn!(plugin = plugin.name(), error = %e, "validator failed, continuing");
            }
        }
    }
    findings
}

/// Every VARIABLE must reach a configured leaf type by following
/// `ASSIGNED_FROM | DERIVES_FROM` edges outward. Class fields with no
/// initializer (`is_class_property`, and so deliberately no outgoing
/// `ASSIGNED_FROM`) are exempt.
pub struct DataFlowLeafValidator;

#[async_trait]
impl<S: GraphStore> ValidationPlugin<S> for DataFlowLeafValidator {
    fn name(&self) -> &'static str {
        "DataFlowLeafValidator"
    }

    async fn run(&self, store: &S, config: &ValidationConfig) -> Result<Vec<ValidationFinding>> {
        let mut findings = Vec::new();
        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Variable.to_string());
        let variables = store.query_nodes(&query).await?;

        for variable in variables {
            let is_class_property = variable
                .metadata
                .attributes
                .get("is_class_property")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);

            if reaches_leaf(store, &variable.id, &config.leaf_types).await? {
                continue;
            }

            let has_outgoing = !store
                .get_outgoing_edges(&variable.id, Some(&[EdgeType::AssignedFrom, EdgeType::DerivesFrom]))
                .await?
                .is_empty();

            if is_class_property && !has_outgoing {
                continue;
            }

            findings.push(ValidationFinding::new(
                "ERR_NO_LEAF_NODE",
                format!("variable '{}' has no data-flow path to a leaf node", variable.name),
                variable.id,
            ));
        }

        Ok(findings)
    }
}

async fn reaches_leaf<S: GraphStore>(store: &S, start: &NodeId, leaf_types: &[NodeType]) -> Result<bool> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut frontier = vec![start.clone()];

    while let Some(id) = frontier.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        let edges = store
            .get_outgoing_edges(&id, Some(&[EdgeType::AssignedFrom, EdgeType::DerivesFrom]))
            .await?;
        for edge in edges {
            let Some(target) = store.get_node(&edge.dst).await? else {
                continue; // dangling — not yet a leaf, keep searching other branches
            };
            if leaf_types.contains(&target.node_type) {
                return Ok(true);
            }
            frontier.push(target.id);
        }
    }

    Ok(false)
}

/// Every IMPORT whose source is not an external package and has no outgoing
/// `IMPORTS_FROM` after enrichment is a broken import.
pub struct BrokenImportValidator;

#[async_trait]
impl<S: GraphStore> ValidationPlugin<S> for BrokenImportValidator {
    fn name(&self) -> &'static str {
        "BrokenImportValidator"
    }

    async fn run(&self, store: &S, _config: &ValidationConfig) -> Result<Vec<ValidationFinding>> {
        let mut findings = Vec::new();
        let mut query = HashMap::new();
        query.insert("type".to_string(), NodeType::Import.to_string());
        let imports = store.query_nodes(&query).await?;

        for import in imports {
            let source = import
                .metadata
                .attributes
                .get("source")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let is_external = !(source.starts_with('.') || source.starts_with('/'));
            if is_external {
                continue;
            }

            let has_link = !store
                .get_outgoing_edges(&import.id, Some(&[EdgeType::ImportsFrom]))
                .await?
                .is_empty();
            if has_link {
                continue;
            }

            findings.push(ValidationFinding::new(
                "WARN_BROKEN_IMPORT",
                format!("import '{}' from '{}' did not resolve to an export", import.name, source),
                import.id,
            ));
        }

        Ok(findings)
    }
}

pub fn default_plugins<S: GraphStore + 'static>() -> Vec<Box<dyn ValidationPlugin<S>>> {
    vec![Box::new(DataFlowLeafValidator), Box::new(BrokenImportValidator)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{EdgeRecord, Location, Metadata, NodeRecord};
    use codegraph_storage::mem::MemoryGraphStore;

    fn node(id: &str, node_type: NodeType, name: &str, file: &str, metadata: Metadata) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            node_type,
            name: name.to_string(),
            file: file.to_string(),
            location: Location::default(),
            metadata,
        }
    }

    #[tokio::test]
    async fn variable_with_literal_leaf_is_clean() {
        let store = MemoryGraphStore::new();
        store
            .add_node(node("a->global->VARIABLE->x", NodeType::Variable, "x", "a.js", Metadata::default()))
            .await
            .unwrap();
        store
            .add_node(node("a->global->LITERAL->1", NodeType::Literal, "1", "a.js", Metadata::default()))
            .await
            .unwrap();
        store
            .add_edge(EdgeRecord::new(
                EdgeType::AssignedFrom,
                "a->global->VARIABLE->x".to_string(),
                "a->global->LITERAL->1".to_string(),
            ))
            .await
            .unwrap();

        let findings = DataFlowLeafValidator.run(&store, &ValidationConfig::default()).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn unreachable_variable_is_flagged() {
        let store = MemoryGraphStore::new();
        store
            .add_node(node("a->global->VARIABLE->x", NodeType::Variable, "x", "a.js", Metadata::default()))
            .await
            .unwrap();

        let findings = DataFlowLeafValidator.run(&store, &ValidationConfig::default()).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "ERR_NO_LEAF_NODE");
    }

    #[tokio::test]
    async fn class_property_without_initializer_is_exempt() {
        let store = MemoryGraphStore::new();
        let metadata = Metadata::default().with("is_class_property", true);
        store
            .add_node(node("a->global->VARIABLE->count", NodeType::Variable, "count", "a.js", metadata))
            .await
            .unwrap();

        let findings = DataFlowLeafValidator.run(&store, &ValidationConfig::default()).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn unresolved_relative_import_is_flagged() {
        let store = MemoryGraphStore::new();
        let metadata = Metadata::default().with("source", "./missing");
        store
            .add_node(node("a->global->IMPORT->helper", NodeType::Import, "helper", "a.js", metadata))
            .await
            .unwrap();

        let findings = BrokenImportValidator.run(&store, &ValidationConfig::default()).await.unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "WARN_BROKEN_IMPORT");
    }

    #[tokio::test]
    async fn external_package_import_is_not_flagged() {
        let store = MemoryGraphStore::new();
        let metadata = Metadata::default().with("source", "lodash");
        store
            .add_node(node("a->global->IMPORT->map", NodeType::Import, "map", "a.js", metadata))
            .await
            .unwrap();

        let findings = BrokenImportValidator.run(&store, &ValidationConfig::default()).await.unwrap();
        assert!(findings.is_empty());
    }
}
