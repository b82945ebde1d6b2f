//! Storage facade: the buffered write surface every builder and
//! enrichment plugin goes through instead of touching the `GraphStore`
//! directly.

use codegraph_core::{EdgeRecord, GraphStore, NodeRecord};
use dashmap::DashSet;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Ids already buffered or flushed as singletons, scoped to one builder
/// instance's lifetime (one module). Enrichment plugins
/// re-consult singleton creation through the store's own upsert semantics,
/// not through this registry — it is not shared across plugins.
#[derive(Default)]
pub struct SingletonRegistry(DashSet<String>);

impl SingletonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_created(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn mark_created(&self, id: &str) {
        self.0.insert(id.to_string());
    }
}

/// One write failure recorded instead of aborting the surrounding plugin.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct FlushReport {
    pub nodes_written: usize,
    pub edges_written: usize,
    pub failures: Vec<WriteFailure>,
}

pub struct StorageFacade<S: GraphStore> {
    store: Arc<S>,
    node_buffer: Mutex<Vec<NodeRecord>>,
    edge_buffer: Mutex<Vec<EdgeRecord>>,
    singletons: SingletonRegistry,
    strict: bool,
}

impl<S: GraphStore> StorageFacade<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            node_buffer: Mutex::new(Vec::new()),
            edge_buffer: Mutex::new(Vec::new()),
            singletons: SingletonRegistry::new(),
            strict: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn buffer_node(&self, node: NodeRecord) {
        self.node_buffer.lock().push(node);
    }

    pub fn buffer_edge(&self, edge: EdgeRecord) {
        self.edge_buffer.lock().push(edge);
    }

    pub fn is_created(&self, singleton_id: &str) -> bool {
        self.singletons.is_created(singleton_id)
    }

    pub fn mark_created(&self, singleton_id: &str) {
        self.singletons.mark_created(singleton_id);
    }

    /// Dedupes id-equal records within the batch (last write wins) and
    /// performs a single bulk write. In strict mode, factory-invalid records
    /// are rejected and recorded as failures rather than written.
    pub async fn flush_nodes(&self) -> FlushReport {
        let nodes: Vec<NodeRecord> = std::mem::take(&mut *self.node_buffer.lock());
        let mut dedup: HashMap<String, NodeRecord> = HashMap::new();
        for node in nodes {
            dedup.insert(node.id.clone(), node);
        }

        let mut report = FlushReport::default();
        let mut to_write = Vec::with_capacity(dedup.len());
        for (id, node) in dedup {
            if self.strict {
                let errors = codegraph_nodes::validate(&node);
                if !errors.is_empty() {
                    tracing::warn!(id = %id, errors = ?errors, "rejecting invalid node in strict mode");
                    report.failures.push(WriteFailure {
                        id,
                        reason: errors.join("; "),
                    });
                    continue;
                }
            }
            to_write.push(node);
        }

        match self.store.commit_batch(to_write, Vec::new()).await {
            Ok((n, _)) => report.nodes_written = n,
            Err(e) => {
                tracing::error!(error = %e, "bulk node write failed");
                report.failures.push(WriteFailure {
                    id: "<batch>".to_string(),
                    reason: e.to_string(),
                });
            }
        }
        report
    }

    pub async fn flush_edges(&self) -> FlushReport {
        let edges: Vec<EdgeRecord> = std::mem::take(&mut *self.edge_buffer.lock());
        let mut dedup: HashMap<(String, String, String), EdgeRecord> = HashMap::new();
        for edge in edges {
            let key = (edge.edge_type.to_string(), edge.src.clone(), edge.dst.clone());
            dedup.insert(key, edge);
        }

        let mut report = FlushReport::default();
        let to_write: Vec<EdgeRecord> = dedup.into_values().collect();
        match self.store.commit_batch(Vec::new(), to_write).await {
            Ok((_, e)) => report.edges_written = e,
            Err(e) => {
                tracing::error!(error = %e, "bulk edge write failed");
                report.failures.push(WriteFailure {
                    id: "<batch>".to_string(),
                    reason: e.to_string(),
                });
            }
        }
        report
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::MemoryGraphStore;
    use codegraph_core::{EdgeType, Location, NodeType};

    fn node(id: &str) -> NodeRecord {
        NodeRecord {
            id: id.to_string(),
            node_type: NodeType::Variable,
            name: "x".to_string(),
            file: "a.js".to_string(),
            location: Location::default(),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn flush_dedupes_id_equal_nodes_within_batch() {
        let store = Arc::new(MemoryGraphStore::new());
        let facade = StorageFacade::new(store.clone());
        facade.buffer_node(node("a.js->global->VARIABLE->x"));
        facade.buffer_node(node("a.js->global->VARIABLE->x"));
        let report = facade.flush_nodes().await;
        assert_eq!(report.nodes_written, 1);
        assert_eq!(store.node_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn singleton_registry_dedupes_mark_then_is_created() {
        let store = Arc::new(MemoryGraphStore::new());
        let facade = StorageFacade::new(store);
        let id = codegraph_ids::NET_REQUEST_SINGLETON_ID;
        assert!(!facade.is_created(id));
        facade.mark_created(id);
        assert!(facade.is_created(id));
    }

    #[tokio::test]
    async fn nodes_flush_before_edges_are_addressable() {
        let store = Arc::new(MemoryGraphStore::new());
        let facade = StorageFacade::new(store.clone());
        facade.buffer_node(node("a.js->global->VARIABLE->x"));
        facade.flush_nodes().await;
        facade.buffer_edge(EdgeRecord::new(
            EdgeType::AssignedFrom,
            "a.js->global->VARIABLE->x",
            "a.js->global->LITERAL->1",
        ));
        let report = facade.flush_edges().await;
        assert_eq!(report.edges_written, 1);
    }
}
