use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A node id is the semantic identifier string, never an opaque integer
/// or UUID — see `codegraph-ids` for construction.
pub type NodeId = String;

/// The closed set of node kinds a node's `type` tag may carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Module,
    Function,
    Class,
    Variable,
    Constant,
    Parameter,
    Call,
    MethodCall,
    Literal,
    ArrayLiteral,
    ObjectLiteral,
    Expression,
    Import,
    Export,
    Scope,
    Loop,
    Branch,
    Case,
    Try,
    Catch,
    Finally,
    Interface,
    Type,
    Enum,
    Decorator,
    TypeParameter,
    EventListener,
    HttpRequest,
    NetRequest,
    NetStdio,
    FsOperation,
    DbQuery,
    UpdateExpression,
    /// Framework-specific tags, e.g. `react:component`, `browser:timer`.
    Framework(FrameworkTag),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameworkTag {
    ReactComponent,
    ReactEffect,
    ReactState,
    BrowserTimer,
    IssueStaleClosure,
    IssueMissingCleanup,
}

impl fmt::Display for FrameworkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameworkTag::ReactComponent => "react:component",
            FrameworkTag::ReactEffect => "react:effect",
            FrameworkTag::ReactState => "react:state",
            FrameworkTag::BrowserTimer => "browser:timer",
            FrameworkTag::IssueStaleClosure => "issue:stale-closure",
            FrameworkTag::IssueMissingCleanup => "issue:missing-cleanup",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Module => "MODULE",
            NodeType::Function => "FUNCTION",
            NodeType::Class => "CLASS",
            NodeType::Variable => "VARIABLE",
            NodeType::Constant => "CONSTANT",
            NodeType::Parameter => "PARAMETER",
            NodeType::Call => "CALL",
            NodeType::MethodCall => "METHOD_CALL",
            NodeType::Literal => "LITERAL",
            NodeType::ArrayLiteral => "ARRAY_LITERAL",
            NodeType::ObjectLiteral => "OBJECT_LITERAL",
            NodeType::Expression => "EXPRESSION",
            NodeType::Import => "IMPORT",
            NodeType::Export => "EXPORT",
            NodeType::Scope => "SCOPE",
            NodeType::Loop => "LOOP",
            NodeType::Branch => "BRANCH",
            NodeType::Case => "CASE",
            NodeType::Try => "TRY",
            NodeType::Catch => "CATCH",
            NodeType::Finally => "FINALLY",
            NodeType::Interface => "INTERFACE",
            NodeType::Type => "TYPE",
            NodeType::Enum => "ENUM",
            NodeType::Decorator => "DECORATOR",
            NodeType::TypeParameter => "TYPE_PARAMETER",
            NodeType::EventListener => "EVENT_LISTENER",
            NodeType::HttpRequest => "HTTP_REQUEST",
            NodeType::NetRequest => "NET_REQUEST",
            NodeType::NetStdio => "NET_STDIO",
            NodeType::FsOperation => "FS_OPERATION",
            NodeType::DbQuery => "DB_QUERY",
            NodeType::UpdateExpression => "UPDATE_EXPRESSION",
            NodeType::Framework(tag) => return write!(f, "{}", tag),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "MODULE" => NodeType::Module,
            "FUNCTION" => NodeType::Function,
            "CLASS" => NodeType::Class,
            "VARIABLE" => NodeType::Variable,
            "CONSTANT" => NodeType::Constant,
            "PARAMETER" => NodeType::Parameter,
            "CALL" => NodeType::Call,
            "METHOD_CALL" => NodeType::MethodCall,
            "LITERAL" => NodeType::Literal,
            "ARRAY_LITERAL" => NodeType::ArrayLiteral,
            "OBJECT_LITERAL" => NodeType::ObjectLiteral,
            "EXPRESSION" => NodeType::Expression,
            "IMPORT" => NodeType::Import,
            "EXPORT" => NodeType::Export,
            "SCOPE" => NodeType::Scope,
            "LOOP" => NodeType::Loop,
            "BRANCH" => NodeType::Branch,
            "CASE" => NodeType::Case,
            "TRY" => NodeType::Try,
            "CATCH" => NodeType::Catch,
            "FINALLY" => NodeType::Finally,
            "INTERFACE" => NodeType::Interface,
            "TYPE" => NodeType::Type,
            "ENUM" => NodeType::Enum,
            "DECORATOR" => NodeType::Decorator,
            "TYPE_PARAMETER" => NodeType::TypeParameter,
            "EVENT_LISTENER" => NodeType::EventListener,
            "HTTP_REQUEST" => NodeType::HttpRequest,
            "NET_REQUEST" => NodeType::NetRequest,
            "NET_STDIO" => NodeType::NetStdio,
            "FS_OPERATION" => NodeType::FsOperation,
            "DB_QUERY" => NodeType::DbQuery,
            "UPDATE_EXPRESSION" => NodeType::UpdateExpression,
            "react:component" => NodeType::Framework(FrameworkTag::ReactComponent),
            "react:effect" => NodeType::Framework(FrameworkTag::ReactEffect),
            "react:state" => NodeType::Framework(FrameworkTag::ReactState),
            "browser:timer" => NodeType::Framework(FrameworkTag::BrowserTimer),
            "issue:stale-closure" => NodeType::Framework(FrameworkTag::IssueStaleClosure),
            "issue:missing-cleanup" => NodeType::Framework(FrameworkTag::IssueMissingCleanup),
            other => return Err(format!("unknown node type tag: {other}")),
        })
    }
}

/// The closed set of edge kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Contains,
    HasParent,
    Calls,
    InstanceOf,
    DerivesFrom,
    Extends,
    Implements,
    AssignedFrom,
    Returns,
    Yields,
    DelegatesTo,
    ResolvesTo,
    PassesArgument,
    ReceivesArgument,
    FlowsInto,
    ReadsFrom,
    Modifies,
    ImportsFrom,
    ExportsFrom,
    ReExports,
    UsesBinding,
    Throws,
    CatchesFrom,
    Rejects,
    HasParameter,
    HasTypeParameter,
    HasBody,
    IteratesOver,
    HasCondition,
    HasDiscriminant,
    HasConsequent,
    HasAlternate,
    HasTest,
    HandledBy,
    OriginatesFrom,
    InteractsWith,
    WritesTo,
    Renders,
    PassesProp,
    DecoratedBy,
    Governs,
    Violates,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeType::Contains => "CONTAINS",
            EdgeType::HasParent => "HAS_PARENT",
            EdgeType::Calls => "CALLS",
            EdgeType::InstanceOf => "INSTANCE_OF",
            EdgeType::DerivesFrom => "DERIVES_FROM",
            EdgeType::Extends => "EXTENDS",
            EdgeType::Implements => "IMPLEMENTS",
            EdgeType::AssignedFrom => "ASSIGNED_FROM",
            EdgeType::Returns => "RETURNS",
            EdgeType::Yields => "YIELDS",
            EdgeType::DelegatesTo => "DELEGATES_TO",
            EdgeType::ResolvesTo => "RESOLVES_TO",
            EdgeType::PassesArgument => "PASSES_ARGUMENT",
            EdgeType::ReceivesArgument => "RECEIVES_ARGUMENT",
            EdgeType::FlowsInto => "FLOWS_INTO",
            EdgeType::ReadsFrom => "READS_FROM",
            EdgeType::Modifies => "MODIFIES",
            EdgeType::ImportsFrom => "IMPORTS_FROM",
            EdgeType::ExportsFrom => "EXPORTS_FROM",
            EdgeType::ReExports => "RE_EXPORTS",
            EdgeType::UsesBinding => "USES_BINDING",
            EdgeType::Throws => "THROWS",
            EdgeType::CatchesFrom => "CATCHES_FROM",
            EdgeType::Rejects => "REJECTS",
            EdgeType::HasParameter => "HAS_PARAMETER",
            EdgeType::HasTypeParameter => "HAS_TYPE_PARAMETER",
            EdgeType::HasBody => "HAS_BODY",
            EdgeType::IteratesOver => "ITERATES_OVER",
            EdgeType::HasCondition => "HAS_CONDITION",
            EdgeType::HasDiscriminant => "HAS_DISCRIMINANT",
            EdgeType::HasConsequent => "HAS_CONSEQUENT",
            EdgeType::HasAlternate => "HAS_ALTERNATE",
            EdgeType::HasTest => "HAS_TEST",
            EdgeType::HandledBy => "HANDLED_BY",
            EdgeType::OriginatesFrom => "ORIGINATES_FROM",
            EdgeType::InteractsWith => "INTERACTS_WITH",
            EdgeType::WritesTo => "WRITES_TO",
            EdgeType::Renders => "RENDERS",
            EdgeType::PassesProp => "PASSES_PROP",
            EdgeType::DecoratedBy => "DECORATED_BY",
            EdgeType::Governs => "GOVERNS",
            EdgeType::Violates => "VIOLATES",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metadata {
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Metadata {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Location info threaded from the parser through to the node record. `column`
/// and `end_column` are exclusive-end byte/char offsets on their line, used by
/// cursor/UI consumers for precise specifier lookup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Location {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub end_column: Option<u32>,
}

/// A node as written to the graph store. `file` is always root-prefixed,
/// workspace-relative — note this is *not* always the same string that
/// went into the node's own id's `<file>` segment: CLASS nodes additionally
/// carry a `declaring_basename` in metadata for the file-prefix reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub node_type: NodeType,
    pub name: String,
    pub file: String,
    pub location: Location,
    pub metadata: Metadata,
}

/// An edge as written to the graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub edge_type: EdgeType,
    pub src: NodeId,
    pub dst: NodeId,
    pub metadata: Metadata,
}

impl EdgeRecord {
    pub fn new(edge_type: EdgeType, src: impl Into<NodeId>, dst: impl Into<NodeId>) -> Self {
        Self {
            edge_type,
            src: src.into(),
            dst: dst.into(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}
