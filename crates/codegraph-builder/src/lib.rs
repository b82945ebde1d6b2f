//! The per-module graph builder: turns one file's `ASTCollections`
//! into buffered nodes and edges through a fixed four-phase build order.
//!
//! 1. Buffer every node a record implies directly, registering each in the
//!    scope index ([`phase_nodes::buffer_all_nodes`]).
//! 2. Run the ten domain builders, resolving names against the scope index
//!    built in phase 1 ([`edges::all_builders`]).
//! 3. The MODULE node's whole-attribute overwrite: re-mints it with
//!    `top_level_await`/`import_meta` metadata now that the whole file has
//!    been walked ([`apply_module_runtime_overwrite`]).
//! 4. Flush nodes, then edges, through the [`StorageFacade`].

mod context;
mod edges;
mod phase_nodes;

use codegraph_core::{GraphStore, Location, NodeId, Result};
use codegraph_ids::ScopeContext;
use codegraph_records::ASTCollections;
use codegraph_storage::StorageFacade;

pub use context::BuildContext;

/// Identifies the module a builder run is producing nodes for: the scope
/// context rooted at the module (empty scope path) and the MODULE node's own
/// id, computed once up front so every domain builder can address it without
/// recomputing.
#[derive(Debug, Clone)]
pub struct ModuleHandle {
    pub ctx: ScopeContext,
    pub id: NodeId,
}

impl ModuleHandle {
    pub fn new(file: impl Into<String>) -> Result<Self> {
        let ctx = ScopeContext::new(file.into());
        let id = codegraph_ids::compute_id(&codegraph_core::NodeType::Module, &ctx.file, &ctx)?;
        Ok(Self { ctx, id })
    }
}

/// Nodes and edges buffered, then flushed, for one module.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub nodes_written: usize,
    pub edges_written: usize,
    pub failures: Vec<String>,
}

/// Runs the full four-phase build for one module's AST collections against
/// `facade`, flushing at the end of the run.
pub async fn build_module<S: GraphStore + 'static>(
    module: &ModuleHandle,
    data: &ASTCollections,
    facade: &StorageFacade<S>,
) -> Result<BuildReport> {
    let ctx = BuildContext::new(facade);

    phase_nodes::buffer_all_nodes(&module.ctx, data, &ctx)?;

    for builder in edges::all_builders::<S>() {
        builder.buffer(module, data, &ctx)?;
    }

    apply_module_runtime_overwrite(module, data, &ctx)?;

    let node_report = facade.flush_nodes().await;
    let edge_report = facade.flush_edges().await;

    let mut failures: Vec<String> = node_report
        .failures
        .into_iter()
        .chain(edge_report.failures)
        .map(|f| format!("{}: {}", f.id, f.reason))
        .collect();
    failures.sort();

    Ok(BuildReport {
        nodes_written: node_report.nodes_written,
        edges_written: edge_report.edges_written,
        failures,
    })
}

/// Re-mints the MODULE node with `top_level_await`/`import_meta` metadata
/// recorded once the whole file has been walked, replacing the bare node
/// phase 1 buffered — the facade's node flush dedupes by id, last write
/// wins, so this is a whole-attribute overwrite rather than a patch.
fn apply_module_runtime_overwrite<S: GraphStore>(
    module: &ModuleHandle,
    data: &ASTCollections,
    ctx: &BuildContext<'_, S>,
) -> Result<()> {
    let mut node = codegraph_nodes::create_module(&module.ctx, Location::default())?;
    node.metadata = node
        .metadata
        .with("top_level_await", data.module_runtime_usage.has_top_level_await)
        .with("import_meta", data.module_runtime_usage.has_import_meta);
    ctx.buffer_node(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_records::{
        ClassDeclarationInfo, ClassInstantiationInfo, FunctionInfo, LiteralInfo, LiteralKind,
        RhsExpr, VariableAssignmentInfo, VariableDeclarationInfo, YieldExpressionInfo,
    };
    use codegraph_storage::mem::MemoryGraphStore;
    use codegraph_core::Location;
    use std::sync::Arc;

    fn loc(line: u32, col: u32) -> Location {
        Location {
            line: Some(line),
            column: Some(col),
            end_column: Some(col + 1),
        }
    }

    fn facade() -> StorageFacade<MemoryGraphStore> {
        StorageFacade::new(Arc::new(MemoryGraphStore::default()))
    }

    /// A single file declaring a class and instantiating it
    /// produces an `INSTANCE_OF` edge from the variable to the class, with
    /// the class id keyed on the file's basename.
    #[tokio::test]
    async fn single_file_instance_of_resolves() {
        let module = ModuleHandle::new("src/widget.js").unwrap();
        let mut data = ASTCollections::default();
        data.class_declarations.push(ClassDeclarationInfo {
            scope: module.ctx.clone(),
            name: "Widget".to_string(),
            location: loc(1, 0),
            superclass: None,
            implements: vec![],
            is_expression: false,
        });
        data.variable_declarations.push(VariableDeclarationInfo {
            scope: module.ctx.clone(),
            name: "w".to_string(),
            location: loc(2, 0),
            is_const: true,
            is_class_property: false,
        });
        data.class_instantiations.push(ClassInstantiationInfo {
            scope: module.ctx.clone(),
            variable_name: "w".to_string(),
            class_name: "Widget".to_string(),
            location: loc(2, 4),
        });

        let f = facade();
        let report = build_module(&module, &data, &f).await.unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.nodes_written, 3);
        assert!(report.edges_written >= 1);
    }

    /// `yield 1` inside a generator produces a `YIELDS`
    /// edge from the literal to the enclosing function, reusing the literal
    /// node phase 1 already buffered rather than minting a duplicate.
    #[tokio::test]
    async fn generator_yield_reuses_buffered_literal() {
        let module = ModuleHandle::new("src/gen.js").unwrap();
        let fn_scope = module.ctx.push("g");
        let mut data = ASTCollections::default();
        data.functions.push(FunctionInfo {
            scope: module.ctx.clone(),
            name: "g".to_string(),
            location: loc(1, 0),
            is_generator: true,
            is_async: false,
            params: vec![],
        });
        data.literals.push(LiteralInfo {
            scope: fn_scope.clone(),
            kind: LiteralKind::Number,
            text: "1".to_string(),
            location: loc(2, 8),
        });
        data.yield_expressions.push(YieldExpressionInfo {
            scope: fn_scope.clone(),
            function_name: "g".to_string(),
            rhs: Some(RhsExpr::Literal {
                kind: LiteralKind::Number,
                text: "1".to_string(),
            }),
            is_delegate: false,
            location: loc(2, 8),
        });

        let f = facade();
        let report = build_module(&module, &data, &f).await.unwrap();
        assert!(report.failures.is_empty());
        // One LITERAL node only: the yield's RHS resolution must have found
        // and reused the node phase 1 buffered, not minted a second one.
        assert_eq!(report.nodes_written, 2);
        assert_eq!(report.edges_written, 1);
    }

    /// A plain assignment from a declared variable produces a single
    /// `ASSIGNED_FROM` edge resolving through the scope chain.
    #[tokio::test]
    async fn assignment_resolves_variable_source() {
        let module = ModuleHandle::new("src/plain.js").unwrap();
        let mut data = ASTCollections::default();
        data.variable_declarations.push(VariableDeclarationInfo {
            scope: module.ctx.clone(),
            name: "a".to_string(),
            location: loc(1, 0),
            is_const: false,
            is_class_property: false,
        });
        data.variable_declarations.push(VariableDeclarationInfo {
            scope: module.ctx.clone(),
            name: "b".to_string(),
            location: loc(2, 0),
            is_const: false,
            is_class_property: false,
        });
        data.variable_assignments.push(VariableAssignmentInfo {
            scope: module.ctx.clone(),
            variable_name: "b".to_string(),
            rhs: RhsExpr::VariableRef("a".to_string()),
            location: loc(2, 4),
        });

        let f = facade();
        let report = build_module(&module, &data, &f).await.unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.edges_written, 1);
    }
}
