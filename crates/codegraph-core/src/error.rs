use thiserror::Error;

/// Error taxonomy per the orchestrator's error-handling design: fatal errors
/// abort a run, plugin-local and validation failures are captured as data by
/// callers and never turned into a propagated `Err`.
#[derive(Error, Debug)]
pub enum CodeGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Enrichment error: {0}")]
    Enrichment(String),

    #[error("Threading error: {0}")]
    Threading(String),
}

pub type Result<T> = std::result::Result<T, CodeGraphError>;
