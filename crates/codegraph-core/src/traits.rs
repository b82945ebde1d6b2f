use crate::{EdgeRecord, EdgeType, NodeId, NodeRecord, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// The narrow interface the storage facade (and, directly, enrichment /
/// validation plugins) depend on. The backing implementation — the real
/// key-value/triple store — is an external collaborator; this trait is
/// its contract, not its implementation.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn add_node(&self, record: NodeRecord) -> Result<()>;
    async fn add_edge(&self, record: EdgeRecord) -> Result<()>;
    async fn get_node(&self, id: &str) -> Result<Option<NodeRecord>>;
    async fn query_nodes(&self, attrs: &HashMap<String, String>) -> Result<Vec<NodeRecord>>;
    async fn get_outgoing_edges(
        &self,
        id: &str,
        types: Option<&[EdgeType]>,
    ) -> Result<Vec<EdgeRecord>>;
    async fn get_incoming_edges(
        &self,
        id: &str,
        types: Option<&[EdgeType]>,
    ) -> Result<Vec<EdgeRecord>>;
    async fn node_count(&self) -> Result<usize>;
    async fn edge_count(&self) -> Result<usize>;
    async fn commit_batch(
        &self,
        nodes: Vec<NodeRecord>,
        edges: Vec<EdgeRecord>,
    ) -> Result<(usize, usize)>;
}

/// A cancellation signal checked at phase boundaries and at every flush call.
/// Cheap to clone; `cancelled()` is a plain atomic load.
#[derive(Clone, Default)]
pub struct CancellationToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Anything that can contribute nodes to a graph, used by validators/queries
/// that need to resolve a dangling edge's `dst` without caring who built it.
pub trait HasNodeId {
    fn node_id(&self) -> &NodeId;
}

impl HasNodeId for NodeRecord {
    fn node_id(&self) -> &NodeId {
        &self.id
    }
}
