//! An in-memory `GraphStore`. Not a production store — the real backing
//! store is an external collaborator — but a test/dev double good
//! enough to drive the full pipeline end to end in this workspace's own
//! tests and in `codegraph-worker --store memory`.

use async_trait::async_trait;
use codegraph_core::{EdgeRecord, EdgeType, GraphStore, NodeRecord, Result};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryGraphStore {
    nodes: DashMap<String, NodeRecord>,
    edges: RwLock<Vec<EdgeRecord>>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn add_node(&self, record: NodeRecord) -> Result<()> {
        self.nodes.insert(record.id.clone(), record);
        Ok(())
    }

    async fn add_edge(&self, record: EdgeRecord) -> Result<()> {
        self.edges.write().push(record);
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>> {
        Ok(self.nodes.get(id).map(|r| r.value().clone()))
    }

    async fn query_nodes(&self, attrs: &HashMap<String, String>) -> Result<Vec<NodeRecord>> {
        Ok(self
            .nodes
            .iter()
            .filter(|entry| {
                attrs.iter().all(|(k, v)| match k.as_str() {
                    "name" => &entry.value().name == v,
                    "file" => &entry.value().file == v,
                    "type" => entry.value().node_type.to_string() == *v,
                    _ => entry
                        .value()
                        .metadata
                        .attributes
                        .get(k)
                        .map(|mv| mv.as_str() == Some(v.as_str()) || mv.to_string() == *v)
                        .unwrap_or(false),
                })
            })
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn get_outgoing_edges(
        &self,
        id: &str,
        types: Option<&[EdgeType]>,
    ) -> Result<Vec<EdgeRecord>> {
        Ok(self
            .edges
            .read()
            .iter()
            .filter(|e| e.src == id)
            .filter(|e| types.map(|ts| ts.contains(&e.edge_type)).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn get_incoming_edges(
        &self,
        id: &str,
        types: Option<&[EdgeType]>,
    ) -> Result<Vec<EdgeRecord>> {
        Ok(self
            .edges
            .read()
            .iter()
            .filter(|e| e.dst == id)
            .filter(|e| types.map(|ts| ts.contains(&e.edge_type)).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn node_count(&self) -> Result<usize> {
        Ok(self.nodes.len())
    }

    async fn edge_count(&self) -> Result<usize> {
        Ok(self.edges.read().len())
    }

    async fn commit_batch(
        &self,
        nodes: Vec<NodeRecord>,
        edges: Vec<EdgeRecord>,
    ) -> Result<(usize, usize)> {
        let n = nodes.len();
        let e = edges.len();
        for node in nodes {
            self.nodes.insert(node.id.clone(), node);
        }
        self.edges.write().extend(edges);
        Ok((n, e))
    }
}
