//! Build-time lookup context: wraps the storage facade with the
//! scope-aware indices a domain builder needs to resolve a source name to a
//! node id without re-querying the (not-yet-flushed) store.

use codegraph_core::{EdgeRecord, GraphStore, NodeId, NodeRecord};
use codegraph_storage::StorageFacade;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct ScopedEntry {
    scope_path: Vec<String>,
    id: NodeId,
}

/// One module's worth of `{ name -> [ (scope_path, id) ] }` tables, populated
/// during phase 1 (node buffering) and consulted during phase 2 (edge
/// buffering) by every domain builder.
#[derive(Default)]
struct ScopeIndex {
    functions: HashMap<String, Vec<ScopedEntry>>,
    variables: HashMap<String, Vec<ScopedEntry>>,
    parameters: HashMap<String, Vec<ScopedEntry>>,
    classes: HashMap<String, NodeId>,
    /// Keyed by literal text rather than a declared name — lets RHS
    /// classification reuse the exact node phase 1 already buffered for the
    /// same literal occurrence instead of minting a second one.
    literals: HashMap<String, Vec<ScopedEntry>>,
}

pub struct BuildContext<'a, S: GraphStore> {
    facade: &'a StorageFacade<S>,
    index: Mutex<ScopeIndex>,
}

impl<'a, S: GraphStore> BuildContext<'a, S> {
    pub fn new(facade: &'a StorageFacade<S>) -> Self {
        Self {
            facade,
            index: Mutex::new(ScopeIndex::default()),
        }
    }

    pub fn buffer_node(&self, node: NodeRecord) {
        self.facade.buffer_node(node);
    }

    pub fn buffer_edge(&self, edge: EdgeRecord) {
        self.facade.buffer_edge(edge);
    }

    pub fn is_created(&self, singleton_id: &str) -> bool {
        self.facade.is_created(singleton_id)
    }

    pub fn mark_created(&self, singleton_id: &str) {
        self.facade.mark_created(singleton_id);
    }

    /// Registers a function so later calls in the same module can resolve it
    /// by name from the scope it was declared in or any scope nested inside.
    pub fn register_function(&self, name: &str, scope_path: &[String], id: NodeId) {
        self.index
            .lock()
            .functions
            .entry(name.to_string())
            .or_default()
            .push(ScopedEntry {
                scope_path: scope_path.to_vec(),
                id,
            });
    }

    pub fn register_variable(&self, name: &str, scope_path: &[String], id: NodeId) {
        self.index
            .lock()
            .variables
            .entry(name.to_string())
            .or_default()
            .push(ScopedEntry {
                scope_path: scope_path.to_vec(),
                id,
            });
    }

    pub fn register_parameter(&self, name: &str, scope_path: &[String], id: NodeId) {
        self.index
            .lock()
            .parameters
            .entry(name.to_string())
            .or_default()
            .push(ScopedEntry {
                scope_path: scope_path.to_vec(),
                id,
            });
    }

    /// Classes are looked up by declared name alone — reconciliation of the
    /// CLASS node's file-basename-vs-root-prefixed-path mismatch happens at
    /// the call site, not here.
    pub fn register_class(&self, name: &str, id: NodeId) {
        self.index.lock().classes.insert(name.to_string(), id);
    }

    pub fn find_class_by_name(&self, name: &str) -> Option<NodeId> {
        self.index.lock().classes.get(name).cloned()
    }

    pub fn register_literal(&self, text: &str, scope_path: &[String], id: NodeId) {
        self.index
            .lock()
            .literals
            .entry(text.to_string())
            .or_default()
            .push(ScopedEntry {
                scope_path: scope_path.to_vec(),
                id,
            });
    }

    pub fn find_literal_in_scope(&self, text: &str, from_scope: &[String]) -> Option<NodeId> {
        resolve_in_scope(&self.index.lock().literals, text, from_scope)
    }

    pub fn find_function_by_name(&self, name: &str, from_scope: &[String]) -> Option<NodeId> {
        resolve_in_scope(&self.index.lock().functions, name, from_scope)
    }

    pub fn resolve_variable_in_scope(&self, name: &str, from_scope: &[String]) -> Option<NodeId> {
        resolve_in_scope(&self.index.lock().variables, name, from_scope)
    }

    pub fn resolve_parameter_in_scope(&self, name: &str, from_scope: &[String]) -> Option<NodeId> {
        resolve_in_scope(&self.index.lock().parameters, name, from_scope)
    }

    /// A candidate scope is reachable from `from_scope` when it is a prefix of
    /// it — the scope chain walks from the innermost scope outward.
    pub fn scope_paths_match(&self, candidate: &[String], from_scope: &[String]) -> bool {
        candidate.len() <= from_scope.len() && from_scope[..candidate.len()] == *candidate
    }
}

/// Walks `from_scope` outward (full path, then each shorter prefix down to
/// global) and returns the first entry registered at exactly that prefix.
fn resolve_in_scope(
    table: &HashMap<String, Vec<ScopedEntry>>,
    name: &str,
    from_scope: &[String],
) -> Option<NodeId> {
    let entries = table.get(name)?;
    for depth in (0..=from_scope.len()).rev() {
        let prefix = &from_scope[..depth];
        if let Some(entry) = entries.iter().find(|e| e.scope_path == prefix) {
            return Some(entry.id.clone());
        }
    }
    None
}
