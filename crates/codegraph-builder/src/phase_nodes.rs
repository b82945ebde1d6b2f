//! Phase 1: buffer every node implied directly by an
//! info record, and register each in the `BuildContext` scope index so phase
//! 2's domain builders can resolve names without touching the store.

use crate::context::BuildContext;
use codegraph_core::{GraphStore, Location, Result};
use codegraph_ids::ScopeContext;
use codegraph_records::ASTCollections;

/// Literal/loop/branch/try-family nodes are disambiguated by source location
/// rather than a creation-order counter, so the exact same id falls out
/// whenever the same occurrence is recomputed independently (phase 1's node
/// sweep vs. phase 2's RHS resolution) — a pure function of the inputs,
/// per the id service's own contract.
pub(crate) fn location_tag(location: &Location) -> Option<String> {
    location.line.map(|line| format!("{line}:{}", location.column.unwrap_or(0)))
}

pub fn buffer_all_nodes<S: GraphStore>(
    module_ctx: &ScopeContext,
    data: &ASTCollections,
    build_ctx: &BuildContext<'_, S>,
) -> Result<()> {
    let module_node = codegraph_nodes::create_module(module_ctx, Location::default())?;
    build_ctx.buffer_node(module_node);

    for scope in &data.scopes {
        let node = codegraph_nodes::create_scope(
            &scope.scope,
            scope.scope.scope_path.last().map(String::as_str).unwrap_or("module"),
            scope.location.clone(),
        )?;
        build_ctx.buffer_node(node);
    }

    for function in &data.functions {
        let node = codegraph_nodes::create_function(
            &function.scope,
            &function.name,
            function.location.clone(),
            function.is_async,
            function.is_generator,
        )?;
        build_ctx.register_function(&function.name, &function.scope.scope_path, node.id.clone());
        build_ctx.buffer_node(node);

        for param in &function.params {
            let param_node = codegraph_nodes::create_parameter(
                &param.scope,
                &param.name,
                param.location.clone(),
                &param.function_name,
            )?;
            build_ctx.register_parameter(&param.name, &param.scope.scope_path, param_node.id.clone());
            build_ctx.buffer_node(param_node);
        }
    }

    for decl in &data.variable_declarations {
        let node = if decl.is_class_property {
            codegraph_nodes::create_variable(&decl.scope, &decl.name, decl.location.clone(), true)?
        } else if decl.is_const {
            codegraph_nodes::create_constant(&decl.scope, &decl.name, decl.location.clone())?
        } else {
            codegraph_nodes::create_variable(&decl.scope, &decl.name, decl.location.clone(), false)?
        };
        build_ctx.register_variable(&decl.name, &decl.scope.scope_path, node.id.clone());
        build_ctx.buffer_node(node);
    }

    for call in &data.call_sites {
        let node = codegraph_nodes::create_call(&call.scope, &call.callee_name, call.location.clone())?;
        build_ctx.buffer_node(node);
    }

    for call in &data.method_calls {
        let node = codegraph_nodes::create_method_call(
            &call.scope,
            &call.object_name,
            &call.method_name,
            call.location.clone(),
        )?;
        build_ctx.buffer_node(node);
    }

    for class in &data.class_declarations {
        let node = codegraph_nodes::create_class(
            &class.scope,
            &class.name,
            class.location.clone(),
            class.superclass.as_deref(),
            &class.implements,
        )?;
        build_ctx.register_class(&class.name, node.id.clone());
        build_ctx.buffer_node(node);
    }

    for import in &data.imports {
        for specifier in &import.specifiers {
            let location = Location {
                line: import.location.line,
                column: Some(specifier.column),
                end_column: Some(specifier.end_column),
            };
            let node = codegraph_nodes::create_import(
                &import.scope,
                &specifier.imported_name,
                location,
                &import.source,
            )?;
            build_ctx.buffer_node(node);
        }
    }

    for export in &data.exports {
        let node = codegraph_nodes::create_export(&export.scope, &export.name, export.location.clone())?;
        build_ctx.buffer_node(node);
    }

    for loop_info in &data.loops {
        let discriminator = location_tag(&loop_info.location);
        let node = codegraph_nodes::create_loop(&loop_info.scope, loop_info.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for branch in &data.branches {
        let discriminator = location_tag(&branch.location);
        let node = codegraph_nodes::create_branch(&branch.scope, branch.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for try_block in &data.try_blocks {
        let discriminator = location_tag(&try_block.location);
        let node = codegraph_nodes::create_try(&try_block.scope, try_block.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);

        if try_block.has_catch {
            let catch_node = codegraph_nodes::create_catch(
                &try_block.scope,
                try_block.catch_param.as_deref(),
                try_block.location.clone(),
                discriminator.as_deref(),
            )?;
            build_ctx.buffer_node(catch_node);
        }
        if try_block.has_finally {
            let finally_node =
                codegraph_nodes::create_finally(&try_block.scope, try_block.location.clone(), discriminator.as_deref())?;
            build_ctx.buffer_node(finally_node);
        }
    }

    for literal in &data.literals {
        let discriminator = location_tag(&literal.location);
        let node = codegraph_nodes::create_literal(&literal.scope, &literal.text, literal.location.clone(), discriminator.as_deref())?;
        build_ctx.register_literal(&literal.text, &literal.scope.scope_path, node.id.clone());
        build_ctx.buffer_node(node);
    }

    for object_literal in &data.object_literals {
        let discriminator = location_tag(&object_literal.location);
        let node = codegraph_nodes::create_object_literal(&object_literal.scope, object_literal.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for array_literal in &data.array_literals {
        let discriminator = location_tag(&array_literal.location);
        let node = codegraph_nodes::create_array_literal(&array_literal.scope, array_literal.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for update in &data.update_expressions {
        let node = codegraph_nodes::create_update_expression(
            &update.scope,
            &update.target_name,
            update.location.clone(),
            &update.operator,
        )?;
        build_ctx.buffer_node(node);
    }

    // HTTP_REQUEST/EVENT_LISTENER/FS_OPERATION/DB_QUERY each mint their own
    // per-occurrence node here; the singleton bookkeeping and the edges that
    // connect them are phase 2's `ModuleRuntimeBuilder`'s job, same as how
    // loops/branches/try-blocks above are minted in phase 1 and re-minted by
    // `ControlFlowBuilder` in phase 2 to get an id to wire edges from.
    for http in &data.http_requests {
        let discriminator = location_tag(&http.location);
        let node = codegraph_nodes::create_http_request(&http.scope, http.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for listener in &data.event_listeners {
        let discriminator = location_tag(&listener.location);
        let node = codegraph_nodes::create_event_listener(
            &listener.scope,
            &listener.event_name,
            listener.location.clone(),
            discriminator.as_deref(),
        )?;
        build_ctx.buffer_node(node);
    }

    for fs_op in &data.fs_operations {
        let discriminator = location_tag(&fs_op.location);
        let node = codegraph_nodes::create_fs_operation(&fs_op.scope, &fs_op.op_name, fs_op.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    for db in &data.db_queries {
        let discriminator = location_tag(&db.location);
        let node = codegraph_nodes::create_db_query(&db.scope, db.location.clone(), discriminator.as_deref())?;
        build_ctx.buffer_node(node);
    }

    Ok(())
}
