//! Info-record schema: language-neutral descriptor structs emitted
//! by visitors and consumed by builders. Info records are never persisted —
//! they exist only for the duration of one module's analysis and are
//! discarded once the graph builder flushes.

use codegraph_core::Location;
use codegraph_ids::ScopeContext;

/// Classifies the RHS of an assignment, return, or yield so the builder can
/// emit an ASSIGNED_FROM/RETURNS/YIELDS edge without re-traversing the AST.
#[derive(Debug, Clone)]
pub enum RhsExpr {
    Literal { kind: LiteralKind, text: String },
    VariableRef(String),
    Call { callee: String },
    MethodCall { object: String, method: String },
    Member { object: String, property: String },
    New { class_name: String },
    /// Binary/conditional/unary/template/logical expressions: the builder
    /// emits a synthetic EXPRESSION node plus a DERIVES_FROM edge to each name
    /// in `operand_names`.
    Complex {
        kind: ComplexExprKind,
        operand_names: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Regex,
    Template,
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexExprKind {
    Binary,
    Conditional,
    Unary,
    Template,
    Logical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Block,
}

#[derive(Debug, Clone)]
pub struct ScopeInfo {
    pub scope: ScopeContext,
    pub kind: ScopeKind,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub scope: ScopeContext,
    pub function_name: String,
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub scope: ScopeContext,
    pub name: String,
    pub location: Location,
    pub is_generator: bool,
    pub is_async: bool,
    pub params: Vec<ParameterInfo>,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarationInfo {
    pub scope: ScopeContext,
    pub name: String,
    pub location: Location,
    pub is_const: bool,
    /// Set for `class C { x; }` fields with no initializer — the data-flow
    /// validator must not flag these as `ERR_MISSING_ASSIGNMENT`.
    pub is_class_property: bool,
}

#[derive(Debug, Clone)]
pub struct CallSiteInfo {
    pub scope: ScopeContext,
    pub callee_name: String,
    pub location: Location,
    pub argument_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MethodCallInfo {
    pub scope: ScopeContext,
    pub object_name: String,
    pub method_name: String,
    pub location: Location,
    pub argument_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VariableAssignmentInfo {
    pub scope: ScopeContext,
    pub variable_name: String,
    pub rhs: RhsExpr,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ReturnStatementInfo {
    pub scope: ScopeContext,
    pub function_name: String,
    pub rhs: Option<RhsExpr>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct YieldExpressionInfo {
    pub scope: ScopeContext,
    pub function_name: String,
    pub rhs: Option<RhsExpr>,
    /// `yield*` — becomes a DELEGATES_TO edge instead of YIELDS.
    pub is_delegate: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ClassDeclarationInfo {
    pub scope: ScopeContext,
    pub name: String,
    pub location: Location,
    pub superclass: Option<String>,
    pub implements: Vec<String>,
    /// True for `class C { ... }` used as an expression RHS rather than a
    /// top-level declaration; traversal is otherwise identical.
    pub is_expression: bool,
}

#[derive(Debug, Clone)]
pub struct ClassInstantiationInfo {
    pub scope: ScopeContext,
    pub variable_name: String,
    pub class_name: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ImportSpecifierInfo {
    pub imported_name: String,
    pub local_name: String,
    /// Exclusive-end column range for this specifier, falling back to `0`
    /// when the parser has no source-map info.
    pub column: u32,
    pub end_column: u32,
}

#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub scope: ScopeContext,
    pub source: String,
    pub specifiers: Vec<ImportSpecifierInfo>,
    pub location: Location,
    pub is_external_package: bool,
}

#[derive(Debug, Clone)]
pub struct ExportInfo {
    pub scope: ScopeContext,
    pub name: String,
    pub location: Location,
    pub is_re_export: bool,
    pub re_export_source: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoopInfo {
    pub scope: ScopeContext,
    pub location: Location,
    pub iterable_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BranchInfo {
    pub scope: ScopeContext,
    pub location: Location,
    pub condition_text: String,
}

#[derive(Debug, Clone)]
pub struct TryBlockInfo {
    pub scope: ScopeContext,
    pub location: Location,
    pub has_catch: bool,
    pub has_finally: bool,
    pub catch_param: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LiteralInfo {
    pub scope: ScopeContext,
    pub kind: LiteralKind,
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ObjectLiteralInfo {
    pub scope: ScopeContext,
    pub location: Location,
    pub property_names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArrayLiteralInfo {
    pub scope: ScopeContext,
    pub location: Location,
    pub element_count: usize,
}

#[derive(Debug, Clone)]
pub struct UpdateExpressionInfo {
    pub scope: ScopeContext,
    pub target_name: String,
    pub operator: String,
    pub is_prefix: bool,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseResolutionKind {
    Then,
    Catch,
    Finally,
    AwaitResolved,
    AwaitRejected,
}

#[derive(Debug, Clone)]
pub struct PromiseResolutionInfo {
    pub scope: ScopeContext,
    pub promise_source_name: String,
    pub kind: PromiseResolutionKind,
    pub location: Location,
}

/// One `fetch(...)`/`http.request(...)`/`http.get(...)` call site. Each
/// occurrence becomes its own HTTP_REQUEST node that the builder wires with
/// a `CALLS` edge to the shared NET_REQUEST singleton.
#[derive(Debug, Clone)]
pub struct HttpRequestInfo {
    pub scope: ScopeContext,
    pub location: Location,
}

/// One `process.stdin`/`process.stdout`/`process.stderr` access. Unlike HTTP
/// requests, stdio usage does not mint its own node — the builder emits a
/// `CALLS` edge straight from the enclosing function/module to the shared
/// NET_STDIO singleton.
#[derive(Debug, Clone)]
pub struct StdioInfo {
    pub scope: ScopeContext,
    pub location: Location,
}

/// One `target.addEventListener("click", ...)` call.
#[derive(Debug, Clone)]
pub struct EventListenerInfo {
    pub scope: ScopeContext,
    pub event_name: String,
    pub location: Location,
}

/// One `fs.readFile`/`fs.writeFileSync`/... call.
#[derive(Debug, Clone)]
pub struct FsOperationInfo {
    pub scope: ScopeContext,
    pub op_name: String,
    pub location: Location,
}

/// One `<client>.query(...)`/`<client>.execute(...)` call.
#[derive(Debug, Clone)]
pub struct DbQueryInfo {
    pub scope: ScopeContext,
    pub location: Location,
}

/// Module-wide runtime usage, not tied to any single occurrence: whether the
/// file contains a top-level `await` (outside any function body) or
/// references `import.meta`. The builder overwrites the MODULE node's
/// metadata with these once the whole file has been walked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleRuntimeUsage {
    pub has_top_level_await: bool,
    pub has_import_meta: bool,
}

/// The bag of info records handed from the visitor framework to the graph
/// builder for one module.
#[derive(Debug, Clone, Default)]
pub struct ASTCollections {
    pub functions: Vec<FunctionInfo>,
    pub scopes: Vec<ScopeInfo>,
    pub variable_declarations: Vec<VariableDeclarationInfo>,
    pub call_sites: Vec<CallSiteInfo>,
    pub method_calls: Vec<MethodCallInfo>,
    pub returns: Vec<ReturnStatementInfo>,
    pub yield_expressions: Vec<YieldExpressionInfo>,
    pub variable_assignments: Vec<VariableAssignmentInfo>,
    pub class_declarations: Vec<ClassDeclarationInfo>,
    pub class_instantiations: Vec<ClassInstantiationInfo>,
    pub imports: Vec<ImportInfo>,
    pub exports: Vec<ExportInfo>,
    pub loops: Vec<LoopInfo>,
    pub branches: Vec<BranchInfo>,
    pub try_blocks: Vec<TryBlockInfo>,
    pub literals: Vec<LiteralInfo>,
    pub object_literals: Vec<ObjectLiteralInfo>,
    pub array_literals: Vec<ArrayLiteralInfo>,
    pub update_expressions: Vec<UpdateExpressionInfo>,
    pub promise_resolutions: Vec<PromiseResolutionInfo>,
    pub http_requests: Vec<HttpRequestInfo>,
    pub stdio_usages: Vec<StdioInfo>,
    pub event_listeners: Vec<EventListenerInfo>,
    pub fs_operations: Vec<FsOperationInfo>,
    pub db_queries: Vec<DbQueryInfo>,
    pub module_runtime_usage: ModuleRuntimeUsage,
}
