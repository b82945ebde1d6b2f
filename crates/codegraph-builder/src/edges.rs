//! Phase 2: the ten domain-specific edge builders. Each implements
//! [`DomainBuilder::buffer`] against the nodes phase 1 already buffered and
//! registered in the [`BuildContext`] scope index.

use crate::context::BuildContext;
use crate::phase_nodes::location_tag;
use crate::ModuleHandle;
use codegraph_core::{EdgeRecord, EdgeType, GraphStore, Location, NodeId, NodeRecord, NodeType, Result};
use codegraph_ids::ScopeContext;
use codegraph_records::{ASTCollections, ComplexExprKind, PromiseResolutionKind, RhsExpr};

pub trait DomainBuilder<S: GraphStore> {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()>;
}

/// The nearest enclosing FUNCTION/CLASS node for a scope path, falling back to
/// the MODULE node when the scope is global or its owner was never resolved
/// (dangling is acceptable here — it falls back to the global context).
fn owner_id<S: GraphStore>(module: &ModuleHandle, ctx: &BuildContext<'_, S>, scope_path: &[String]) -> NodeId {
    let Some(owner_name) = scope_path.last() else {
        return module.id.clone();
    };
    let parent = &scope_path[..scope_path.len() - 1];
    if let Some(id) = ctx.find_function_by_name(owner_name, parent) {
        return id;
    }
    if let Some(id) = ctx.find_class_by_name(owner_name) {
        return id;
    }
    module.id.clone()
}

/// Resolves a source name (the RHS of an assignment/return/yield) to the node
/// it refers to, trying variable, then parameter, then function, then class —
/// in that order. Returns a global-scope id for
/// the name when nothing resolves, producing a dangling edge rather than
/// blocking the build.
fn resolve_source<S: GraphStore>(
    ctx: &BuildContext<'_, S>,
    module_ctx: &ScopeContext,
    name: &str,
    from_scope: &[String],
) -> NodeId {
    if let Some(id) = ctx.resolve_variable_in_scope(name, from_scope) {
        return id;
    }
    if let Some(id) = ctx.resolve_parameter_in_scope(name, from_scope) {
        return id;
    }
    if let Some(id) = ctx.find_function_by_name(name, from_scope) {
        return id;
    }
    if let Some(id) = ctx.find_class_by_name(name) {
        return id;
    }
    codegraph_ids::compute_id(&NodeType::Variable, name, &ScopeContext::new(module_ctx.file.clone()))
        .unwrap_or_else(|_| format!("{}->global->VARIABLE->{name}", module_ctx.file))
}

/// Resolves an `RhsExpr` to the node id it should connect from. Literal
/// lookups reuse the node phase 1 already buffered for that exact text in
/// scope; `Complex` expressions buffer a synthetic EXPRESSION node plus its
/// DERIVES_FROM edges and return that node's id.
fn resolve_rhs<S: GraphStore>(
    ctx: &BuildContext<'_, S>,
    module_ctx: &ScopeContext,
    rhs: &RhsExpr,
    location: &Location,
    from_scope: &[String],
) -> Result<NodeId> {
    match rhs {
        RhsExpr::Literal { text, .. } => {
            if let Some(id) = ctx.find_literal_in_scope(text, from_scope) {
                return Ok(id);
            }
            let scope = ScopeContext::with_scope(module_ctx.file.clone(), from_scope.to_vec());
            let discriminator = location_tag(location);
            let node = codegraph_nodes::create_literal(&scope, text, location.clone(), discriminator.as_deref())?;
            let id = node.id.clone();
            ctx.buffer_node(node);
            Ok(id)
        }
        RhsExpr::VariableRef(name) => Ok(resolve_source(ctx, module_ctx, name, from_scope)),
        RhsExpr::Call { callee } => {
            let scope = ScopeContext::with_scope(module_ctx.file.clone(), from_scope.to_vec());
            let node = codegraph_nodes::create_call(&scope, callee, location.clone())?;
            Ok(node.id)
        }
        RhsExpr::MethodCall { object, method } => {
            let scope = ScopeContext::with_scope(module_ctx.file.clone(), from_scope.to_vec());
            let node = codegraph_nodes::create_method_call(&scope, object, method, location.clone())?;
            Ok(node.id)
        }
        RhsExpr::Member { object, .. } => Ok(resolve_source(ctx, module_ctx, object, from_scope)),
        RhsExpr::New { class_name } => Ok(ctx
            .find_class_by_name(class_name)
            .unwrap_or_else(|| format!("{}->global->CLASS->{class_name}", module_ctx.file))),
        RhsExpr::Complex { kind, operand_names } => {
            let scope = ScopeContext::with_scope(module_ctx.file.clone(), from_scope.to_vec());
            let label = complex_kind_label(*kind);
            let discriminator = location_tag(location);
            let node = codegraph_nodes::create_expression(&scope, label, location.clone(), discriminator.as_deref())?;
            let expr_id = node.id.clone();
            ctx.buffer_node(node);
            for operand in operand_names {
                let src = resolve_source(ctx, module_ctx, operand, from_scope);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::DerivesFrom, expr_id.clone(), src));
            }
            Ok(expr_id)
        }
    }
}

fn complex_kind_label(kind: ComplexExprKind) -> &'static str {
    match kind {
        ComplexExprKind::Binary => "binary",
        ComplexExprKind::Conditional => "conditional",
        ComplexExprKind::Unary => "unary",
        ComplexExprKind::Template => "template",
        ComplexExprKind::Logical => "logical",
    }
}

fn basename_of(file: &str) -> String {
    file.rsplit('/').next().unwrap_or(file).to_string()
}

/// Functions, scopes, variables, calls, method calls, literals, object/array
/// literals: the structural CONTAINS edges from each entity's owning scope.
pub struct CoreBuilder;

impl<S: GraphStore> DomainBuilder<S> for CoreBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for function in &data.functions {
            let owner = owner_id(module, ctx, &function.scope.scope_path);
            if let Some(id) = ctx.find_function_by_name(&function.name, &function.scope.scope_path) {
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, id.clone()));
                for param in &function.params {
                    if let Some(param_id) = ctx.resolve_parameter_in_scope(&param.name, &param.scope.scope_path) {
                        ctx.buffer_edge(EdgeRecord::new(EdgeType::HasParameter, id.clone(), param_id));
                    }
                }
            }
        }

        for decl in &data.variable_declarations {
            let owner = owner_id(module, ctx, &decl.scope.scope_path);
            if let Some(id) = ctx.resolve_variable_in_scope(&decl.name, &decl.scope.scope_path) {
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, id));
            }
        }

        for class in &data.class_declarations {
            let owner = owner_id(module, ctx, &class.scope.scope_path);
            if let Some(id) = ctx.find_class_by_name(&class.name) {
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, id));
            }
        }

        Ok(())
    }
}

/// Loops, branches, try/catch/finally, discriminants.
pub struct ControlFlowBuilder;

impl<S: GraphStore> DomainBuilder<S> for ControlFlowBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for loop_info in &data.loops {
            let discriminator = location_tag(&loop_info.location);
            let loop_node = codegraph_nodes::create_loop(&loop_info.scope, loop_info.location.clone(), discriminator.as_deref())?;
            let owner = owner_id(module, ctx, &loop_info.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, loop_node.id.clone()));
            if let Some(name) = &loop_info.iterable_name {
                let src = resolve_source(ctx, &module.ctx, name, &loop_info.scope.scope_path);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::IteratesOver, loop_node.id, src));
            }
        }

        for branch in &data.branches {
            let discriminator = location_tag(&branch.location);
            let branch_node = codegraph_nodes::create_branch(&branch.scope, branch.location.clone(), discriminator.as_deref())?;
            let owner = owner_id(module, ctx, &branch.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, branch_node.id.clone()));
            let condition = branch.condition_text.trim();
            let looks_like_identifier =
                !condition.is_empty() && condition.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
            if looks_like_identifier {
                let src = resolve_source(ctx, &module.ctx, condition, &branch.scope.scope_path);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::HasCondition, branch_node.id, src));
            }
        }

        for try_block in &data.try_blocks {
            let discriminator = location_tag(&try_block.location);
            let try_node = codegraph_nodes::create_try(&try_block.scope, try_block.location.clone(), discriminator.as_deref())?;
            let owner = owner_id(module, ctx, &try_block.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, try_node.id.clone()));

            if try_block.has_catch {
                let catch_node = codegraph_nodes::create_catch(
                    &try_block.scope,
                    try_block.catch_param.as_deref(),
                    try_block.location.clone(),
                    discriminator.as_deref(),
                )?;
                ctx.buffer_edge(EdgeRecord::new(EdgeType::HandledBy, try_node.id.clone(), catch_node.id));
            }
            if try_block.has_finally {
                let finally_node =
                    codegraph_nodes::create_finally(&try_block.scope, try_block.location.clone(), discriminator.as_deref())?;
                ctx.buffer_edge(EdgeRecord::new(EdgeType::HandledBy, try_node.id, finally_node.id));
            }
        }

        Ok(())
    }
}

/// The single large assignment-edge buffer: `ASSIGNED_FROM` for every
/// `VariableAssignmentInfo`.
pub struct AssignmentBuilder;

impl<S: GraphStore> DomainBuilder<S> for AssignmentBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for assignment in &data.variable_assignments {
            let Some(target) =
                ctx.resolve_variable_in_scope(&assignment.variable_name, &assignment.scope.scope_path)
            else {
                tracing::debug!(variable = %assignment.variable_name, "no declaration found for assignment target");
                continue;
            };
            let source = resolve_rhs(
                ctx,
                &module.ctx,
                &assignment.rhs,
                &assignment.location,
                &assignment.scope.scope_path,
            )?;
            ctx.buffer_edge(EdgeRecord::new(EdgeType::AssignedFrom, target, source));
        }
        Ok(())
    }
}

/// Call arguments and object-property access edges.
pub struct CallFlowBuilder;

impl<S: GraphStore> DomainBuilder<S> for CallFlowBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for call in &data.call_sites {
            let Some(callee_id) = ctx.find_function_by_name(&call.callee_name, &call.scope.scope_path) else {
                continue;
            };
            for argument in &call.argument_names {
                let src = resolve_source(ctx, &module.ctx, argument, &call.scope.scope_path);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::PassesArgument, callee_id.clone(), src));
            }
        }
        for call in &data.method_calls {
            let src = resolve_source(ctx, &module.ctx, &call.object_name, &call.scope.scope_path);
            let owner = owner_id(module, ctx, &call.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::InteractsWith, owner, src));
        }
        Ok(())
    }
}

/// Array/object mutations, reassignments, FLOWS_INTO.
pub struct MutationBuilder;

impl<S: GraphStore> DomainBuilder<S> for MutationBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for call in &data.method_calls {
            if !matches!(call.method_name.as_str(), "push" | "pop" | "splice" | "shift" | "unshift") {
                continue;
            }
            let Some(target) = ctx.resolve_variable_in_scope(&call.object_name, &call.scope.scope_path) else {
                continue;
            };
            for argument in &call.argument_names {
                let src = resolve_source(ctx, &module.ctx, argument, &call.scope.scope_path);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::FlowsInto, target.clone(), src));
            }
        }
        Ok(())
    }
}

/// `++`/`--`: MODIFIES edges from the UPDATE_EXPRESSION node to its target.
pub struct UpdateExpressionBuilder;

impl<S: GraphStore> DomainBuilder<S> for UpdateExpressionBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for update in &data.update_expressions {
            let scope = ScopeContext::with_scope(module.ctx.file.clone(), update.scope.scope_path.clone());
            let node_id = codegraph_ids::compute_id(&NodeType::UpdateExpression, &update.target_name, &scope)?;
            let target = resolve_source(ctx, &module.ctx, &update.target_name, &update.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Modifies, node_id, target));
        }
        Ok(())
    }
}

/// RETURNS edges from a return statement's source expression to the
/// enclosing function.
pub struct ReturnBuilder;

impl<S: GraphStore> DomainBuilder<S> for ReturnBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for ret in &data.returns {
            let Some(rhs) = &ret.rhs else { continue };
            let enclosing_scope = enclosing_function_scope(&ret.scope.scope_path);
            let Some(function_id) = ctx.find_function_by_name(&ret.function_name, enclosing_scope) else {
                continue;
            };
            let source = resolve_rhs(ctx, &module.ctx, rhs, &ret.location, &ret.scope.scope_path)?;
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Returns, source, function_id));
        }
        Ok(())
    }
}

/// YIELDS / DELEGATES_TO edges from a yield expression's source to the
/// enclosing generator function.
pub struct YieldBuilder;

impl<S: GraphStore> DomainBuilder<S> for YieldBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for yld in &data.yield_expressions {
            let Some(rhs) = &yld.rhs else { continue };
            let enclosing_scope = enclosing_function_scope(&yld.scope.scope_path);
            let Some(function_id) = ctx.find_function_by_name(&yld.function_name, enclosing_scope) else {
                continue;
            };
            let source = resolve_rhs(ctx, &module.ctx, rhs, &yld.location, &yld.scope.scope_path)?;
            let edge_type = if yld.is_delegate { EdgeType::DelegatesTo } else { EdgeType::Yields };
            ctx.buffer_edge(EdgeRecord::new(edge_type, source, function_id));
        }
        Ok(())
    }
}

/// A return/yield's own scope is the function's body scope (`[..., fn_name]`);
/// the function itself was registered one level up, at its *declaring* scope.
fn enclosing_function_scope(body_scope_path: &[String]) -> &[String] {
    &body_scope_path[..body_scope_path.len().saturating_sub(1)]
}

/// Classes, interfaces, types, enums, decorators, type parameters,
/// implements/extends, instance-of, promise resolution.
pub struct TypeSystemBuilder;

impl<S: GraphStore> DomainBuilder<S> for TypeSystemBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for class in &data.class_declarations {
            let Some(class_id) = ctx.find_class_by_name(&class.name) else {
                continue;
            };
            if let Some(superclass) = &class.superclass {
                let parent_id = ctx
                    .find_class_by_name(superclass)
                    .unwrap_or_else(|| format!("{}->global->CLASS->{superclass}", module.ctx.file));
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Extends, class_id.clone(), parent_id));
            }
            for interface in &class.implements {
                let iface_id = format!("{}->global->INTERFACE->{interface}", module.ctx.file);
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Implements, class_id.clone(), iface_id));
            }
        }

        // The CLASS node id is keyed on the
        // declaring file's basename, recomputed here rather than reused from
        // `module.ctx.file` (which is root-prefixed).
        let basename = basename_of(&module.ctx.file);
        for instantiation in &data.class_instantiations {
            let Some(variable_id) =
                ctx.resolve_variable_in_scope(&instantiation.variable_name, &instantiation.scope.scope_path)
            else {
                continue;
            };
            let class_scope = ScopeContext::new(basename.clone());
            let class_id = codegraph_ids::compute_id(&NodeType::Class, &instantiation.class_name, &class_scope)?;
            ctx.buffer_edge(EdgeRecord::new(EdgeType::InstanceOf, variable_id, class_id));
        }

        for resolution in &data.promise_resolutions {
            if resolution.kind != PromiseResolutionKind::Catch {
                continue;
            }
            let source = resolve_source(ctx, &module.ctx, &resolution.promise_source_name, &resolution.scope.scope_path);
            let owner = owner_id(module, ctx, &resolution.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Rejects, source, owner));
        }

        Ok(())
    }
}

/// Imports, exports, stdio, events, HTTP, fs, db, catches-from. HTTP_REQUEST
/// and stdio go through the singleton registry: the first occurrence across
/// the whole build buffers the singleton node and marks it created, and
/// every occurrence (the first included) adds its own `CALLS` edge to it.
pub struct ModuleRuntimeBuilder;

impl<S: GraphStore> DomainBuilder<S> for ModuleRuntimeBuilder {
    fn buffer(&self, module: &ModuleHandle, data: &ASTCollections, ctx: &BuildContext<'_, S>) -> Result<()> {
        for export in &data.exports {
            let export_id = codegraph_ids::compute_id(&NodeType::Export, &export.name, &module.ctx)?;
            ctx.buffer_edge(EdgeRecord::new(EdgeType::ExportsFrom, module.id.clone(), export_id));
        }
        for import in &data.imports {
            let owner = owner_id(module, ctx, &import.scope.scope_path);
            for specifier in &import.specifiers {
                let import_id = codegraph_ids::compute_id(&NodeType::Import, &specifier.imported_name, &import.scope)?;
                ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner.clone(), import_id));
            }
        }

        for http in &data.http_requests {
            let discriminator = location_tag(&http.location);
            let node = codegraph_nodes::create_http_request(&http.scope, http.location.clone(), discriminator.as_deref())?;
            ensure_singleton(ctx, codegraph_ids::NET_REQUEST_SINGLETON_ID, codegraph_nodes::create_net_request_singleton);
            ctx.buffer_edge(EdgeRecord::new(
                EdgeType::Calls,
                node.id,
                codegraph_ids::NET_REQUEST_SINGLETON_ID.to_string(),
            ));
        }

        for stdio in &data.stdio_usages {
            ensure_singleton(ctx, codegraph_ids::STDIO_SINGLETON_ID, codegraph_nodes::create_stdio_singleton);
            let owner = owner_id(module, ctx, &stdio.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(
                EdgeType::Calls,
                owner,
                codegraph_ids::STDIO_SINGLETON_ID.to_string(),
            ));
        }

        for listener in &data.event_listeners {
            let discriminator = location_tag(&listener.location);
            let node = codegraph_nodes::create_event_listener(
                &listener.scope,
                &listener.event_name,
                listener.location.clone(),
                discriminator.as_deref(),
            )?;
            let owner = owner_id(module, ctx, &listener.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, node.id));
        }

        for fs_op in &data.fs_operations {
            let discriminator = location_tag(&fs_op.location);
            let node = codegraph_nodes::create_fs_operation(&fs_op.scope, &fs_op.op_name, fs_op.location.clone(), discriminator.as_deref())?;
            let owner = owner_id(module, ctx, &fs_op.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, node.id));
        }

        for db in &data.db_queries {
            let discriminator = location_tag(&db.location);
            let node = codegraph_nodes::create_db_query(&db.scope, db.location.clone(), discriminator.as_deref())?;
            let owner = owner_id(module, ctx, &db.scope.scope_path);
            ctx.buffer_edge(EdgeRecord::new(EdgeType::Contains, owner, node.id));
        }

        Ok(())
    }
}

/// Buffers `singleton_id`'s node the first time the shared build context
/// sees it and marks it created, so later calls (this module or a later one,
/// since the registry lives on the facade shared across the whole run) are
/// no-ops.
fn ensure_singleton<S: GraphStore>(ctx: &BuildContext<'_, S>, singleton_id: &str, make: impl Fn() -> NodeRecord) {
    if !ctx.is_created(singleton_id) {
        ctx.buffer_node(make());
        ctx.mark_created(singleton_id);
    }
}

/// All ten domain builders, in the order phase 2 runs them.
pub fn all_builders<S: GraphStore + 'static>() -> Vec<Box<dyn DomainBuilder<S>>> {
    vec![
        Box::new(CoreBuilder),
        Box::new(ControlFlowBuilder),
        Box::new(AssignmentBuilder),
        Box::new(CallFlowBuilder),
        Box::new(MutationBuilder),
        Box::new(UpdateExpressionBuilder),
        Box::new(ReturnBuilder),
        Box::new(YieldBuilder),
        Box::new(TypeSystemBuilder),
        Box::new(ModuleRuntimeBuilder),
    ]
}
