use thiserror::Error;

/// Top-level engine error that composes all subsystem errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Graph store errors
    #[error("graph store error: {0}")]
    Graph(#[from] sandgraph_graph::GraphStoreError),

    /// Audit store errors
    #[error("audit store error: {0}")]
    Audit(#[from] sandgraph_audit::AuditStoreError),

    /// Annotation store errors
    #[error("annotation store error: {0}")]
    Annotation(#[from] crate::annotations::AnnotationError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Generic engine error
    #[error("{0}")]
    Other(String),
}
