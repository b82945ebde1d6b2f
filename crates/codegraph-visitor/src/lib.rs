//! AST visitor framework: scope tracking plus the info-record emission
//! surface. Per-language analyzers (e.g. `codegraph-lang-js`) drive the
//! actual parser traversal and call into a `Collector` as they go; this
//! crate owns none of the tree-sitter-specific dispatch, only the
//! language-neutral bookkeeping — a cursor walk split from the per-language
//! collector it dispatches to, with the collector accumulating info records
//! instead of building graph nodes directly.

use codegraph_core::Location;
use codegraph_ids::ScopeContext;
pub use codegraph_records::*;

/// A stack of `{ name, kind }` scope frames, pushed on entering a
/// function/class/block scope and popped on exit. `current_context` projects
/// the stack into the `{ file, scope_path }` that every emitted info record
/// captures.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    file: String,
    stack: Vec<ScopeFrame>,
}

#[derive(Debug, Clone)]
pub struct ScopeFrame {
    pub name: String,
    pub kind: ScopeKind,
}

impl ScopeTracker {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            stack: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, kind: ScopeKind) {
        self.stack.push(ScopeFrame {
            name: name.into(),
            kind,
        });
    }

    pub fn pop(&mut self) -> Option<ScopeFrame> {
        self.stack.pop()
    }

    pub fn current_context(&self) -> ScopeContext {
        ScopeContext::with_scope(
            self.file.clone(),
            self.stack.iter().map(|f| f.name.clone()).collect(),
        )
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn file(&self) -> &str {
        &self.file
    }
}

/// Accumulates info records for one module. Each `emit_*` call captures
/// `current_context()` at the moment it runs.
#[derive(Debug, Default)]
pub struct Collector {
    pub scopes: ScopeTracker,
    collections: ASTCollections,
}

impl Collector {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            scopes: ScopeTracker::new(file),
            collections: ASTCollections::default(),
        }
    }

    pub fn enter_scope(&mut self, name: impl Into<String>, kind: ScopeKind, location: Location) {
        let name = name.into();
        self.collections.scopes.push(ScopeInfo {
            scope: self.scopes.current_context(),
            kind,
            location,
        });
        self.scopes.push(name, kind);
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn context(&self) -> ScopeContext {
        self.scopes.current_context()
    }

    pub fn emit_function(
        &mut self,
        name: impl Into<String>,
        location: Location,
        is_generator: bool,
        is_async: bool,
        params: Vec<(String, Location)>,
    ) {
        let scope = self.scopes.current_context();
        let name = name.into();
        let params = params
            .into_iter()
            .map(|(pname, ploc)| ParameterInfo {
                scope: scope.clone(),
                function_name: name.clone(),
                name: pname,
                location: ploc,
            })
            .collect();
        self.collections.functions.push(FunctionInfo {
            scope,
            name,
            location,
            is_generator,
            is_async,
            params,
        });
    }

    pub fn emit_variable_declaration(
        &mut self,
        name: impl Into<String>,
        location: Location,
        is_const: bool,
        is_class_property: bool,
    ) {
        self.collections
            .variable_declarations
            .push(VariableDeclarationInfo {
                scope: self.scopes.current_context(),
                name: name.into(),
                location,
                is_const,
                is_class_property,
            });
    }

    pub fn emit_call_site(
        &mut self,
        callee_name: impl Into<String>,
        location: Location,
        argument_names: Vec<String>,
    ) {
        self.collections.call_sites.push(CallSiteInfo {
            scope: self.scopes.current_context(),
            callee_name: callee_name.into(),
            location,
            argument_names,
        });
    }

    pub fn emit_method_call(
        &mut self,
        object_name: impl Into<String>,
        method_name: impl Into<String>,
        location: Location,
        argument_names: Vec<String>,
    ) {
        self.collections.method_calls.push(MethodCallInfo {
            scope: self.scopes.current_context(),
            object_name: object_name.into(),
            method_name: method_name.into(),
            location,
            argument_names,
        });
    }

    pub fn emit_variable_assignment(
        &mut self,
        variable_name: impl Into<String>,
        rhs: RhsExpr,
        location: Location,
    ) {
        self.collections
            .variable_assignments
            .push(VariableAssignmentInfo {
                scope: self.scopes.current_context(),
                variable_name: variable_name.into(),
                rhs,
                location,
            });
    }

    pub fn emit_return(
        &mut self,
        function_name: impl Into<String>,
        rhs: Option<RhsExpr>,
        location: Location,
    ) {
        self.collections.returns.push(ReturnStatementInfo {
            scope: self.scopes.current_context(),
            function_name: function_name.into(),
            rhs,
            location,
        });
    }

    pub fn emit_yield(
        &mut self,
        function_name: impl Into<String>,
        rhs: Option<RhsExpr>,
        is_delegate: bool,
        location: Location,
    ) {
        self.collections.yield_expressions.push(YieldExpressionInfo {
            scope: self.scopes.current_context(),
            function_name: function_name.into(),
            rhs,
            is_delegate,
            location,
        });
    }

    pub fn emit_class_declaration(
        &mut self,
        name: impl Into<String>,
        location: Location,
        superclass: Option<String>,
        implements: Vec<String>,
        is_expression: bool,
    ) {
        self.collections.class_declarations.push(ClassDeclarationInfo {
            scope: self.scopes.current_context(),
            name: name.into(),
            location,
            superclass,
            implements,
            is_expression,
        });
    }

    pub fn emit_class_instantiation(
        &mut self,
        variable_name: impl Into<String>,
        class_name: impl Into<String>,
        location: Location,
    ) {
        self.collections
            .class_instantiations
            .push(ClassInstantiationInfo {
                scope: self.scopes.current_context(),
                variable_name: variable_name.into(),
                class_name: class_name.into(),
                location,
            });
    }

    pub fn emit_import(
        &mut self,
        source: impl Into<String>,
        specifiers: Vec<ImportSpecifierInfo>,
        location: Location,
        is_external_package: bool,
    ) {
        self.collections.imports.push(ImportInfo {
            scope: self.scopes.current_context(),
            source: source.into(),
            specifiers,
            location,
            is_external_package,
        });
    }

    pub fn emit_export(
        &mut self,
        name: impl Into<String>,
        location: Location,
        is_re_export: bool,
        re_export_source: Option<String>,
    ) {
        self.collections.exports.push(ExportInfo {
            scope: self.scopes.current_context(),
            name: name.into(),
            location,
            is_re_export,
            re_export_source,
        });
    }

    pub fn emit_loop(&mut self, location: Location, iterable_name: Option<String>) {
        self.collections.loops.push(LoopInfo {
            scope: self.scopes.current_context(),
            location,
            iterable_name,
        });
    }

    pub fn emit_branch(&mut self, location: Location, condition_text: impl Into<String>) {
        self.collections.branches.push(BranchInfo {
            scope: self.scopes.current_context(),
            location,
            condition_text: condition_text.into(),
        });
    }

    pub fn emit_try_block(
        &mut self,
        location: Location,
        has_catch: bool,
        has_finally: bool,
        catch_param: Option<String>,
    ) {
        self.collections.try_blocks.push(TryBlockInfo {
            scope: self.scopes.current_context(),
            location,
            has_catch,
            has_finally,
            catch_param,
        });
    }

    pub fn emit_literal(&mut self, kind: LiteralKind, text: impl Into<String>, location: Location) {
        self.collections.literals.push(LiteralInfo {
            scope: self.scopes.current_context(),
            kind,
            text: text.into(),
            location,
        });
    }

    pub fn emit_object_literal(&mut self, location: Location, property_names: Vec<String>) {
        self.collections.object_literals.push(ObjectLiteralInfo {
            scope: self.scopes.current_context(),
            location,
            property_names,
        });
    }

    pub fn emit_array_literal(&mut self, location: Location, element_count: usize) {
        self.collections.array_literals.push(ArrayLiteralInfo {
            scope: self.scopes.current_context(),
            location,
            element_count,
        });
    }

    pub fn emit_update_expression(
        &mut self,
        target_name: impl Into<String>,
        operator: impl Into<String>,
        is_prefix: bool,
        location: Location,
    ) {
        self.collections
            .update_expressions
            .push(UpdateExpressionInfo {
                scope: self.scopes.current_context(),
                target_name: target_name.into(),
                operator: operator.into(),
                is_prefix,
                location,
            });
    }

    pub fn emit_promise_resolution(
        &mut self,
        promise_source_name: impl Into<String>,
        kind: PromiseResolutionKind,
        location: Location,
    ) {
        self.collections
            .promise_resolutions
            .push(PromiseResolutionInfo {
                scope: self.scopes.current_context(),
                promise_source_name: promise_source_name.into(),
                kind,
                location,
            });
    }

    pub fn emit_http_request(&mut self, location: Location) {
        self.collections.http_requests.push(HttpRequestInfo {
            scope: self.scopes.current_context(),
            location,
        });
    }

    pub fn emit_stdio_usage(&mut self, location: Location) {
        self.collections.stdio_usages.push(StdioInfo {
            scope: self.scopes.current_context(),
            location,
        });
    }

    pub fn emit_event_listener(&mut self, event_name: impl Into<String>, location: Location) {
        self.collections.event_listeners.push(EventListenerInfo {
            scope: self.scopes.current_context(),
            event_name: event_name.into(),
            location,
        });
    }

    pub fn emit_fs_operation(&mut self, op_name: impl Into<String>, location: Location) {
        self.collections.fs_operations.push(FsOperationInfo {
            scope: self.scopes.current_context(),
            op_name: op_name.into(),
            location,
        });
    }

    pub fn emit_db_query(&mut self, location: Location) {
        self.collections.db_queries.push(DbQueryInfo {
            scope: self.scopes.current_context(),
            location,
        });
    }

    pub fn mark_top_level_await(&mut self) {
        self.collections.module_runtime_usage.has_top_level_await = true;
    }

    pub fn mark_import_meta(&mut self) {
        self.collections.module_runtime_usage.has_import_meta = true;
    }

    pub fn into_collections(self) -> ASTCollections {
        self.collections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_scopes_project_into_scope_path() {
        let mut c = Collector::new("a.js");
        c.enter_scope("Outer", ScopeKind::Function, Location::default());
        c.enter_scope("inner", ScopeKind::Block, Location::default());
        let ctx = c.context();
        assert_eq!(ctx.scope_path, vec!["Outer".to_string(), "inner".to_string()]);
        c.exit_scope();
        assert_eq!(c.context().scope_path, vec!["Outer".to_string()]);
        c.exit_scope();
        assert!(c.context().scope_path.is_empty());
    }

    #[test]
    fn emitted_records_capture_context_at_emission_time() {
        let mut c = Collector::new("a.js");
        c.emit_variable_declaration("top", Location::default(), true, false);
        c.enter_scope("f", ScopeKind::Function, Location::default());
        c.emit_variable_declaration("inner", Location::default(), false, false);
        let collections = c.into_collections();
        assert!(collections.variable_declarations[0].scope.scope_path.is_empty());
        assert_eq!(
            collections.variable_declarations[1].scope.scope_path,
            vec!["f".to_string()]
        );
    }
}
