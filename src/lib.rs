mod annotations;
pub mod config;
mod error;
mod logger;
mod observability;
mod ontology;
mod services;
mod work_queue;

#[cfg(test)]
mod tests;

pub use annotations::{
    AnnotationError, DetectedObjectRecord, DetectedObjectRepository,
    InMemoryDetectedObjectRepository, InMemoryTermMentionRepository, TermMentionRecord,
    TermMentionRepository,
};
pub use config::{Config, ConfigError, LogFormat, LoggerConfig, PublishConfig};
pub use error::EngineError;
pub use logger::initialize_logger;
pub use ontology::{InMemoryOntologyRepository, OntologyProperty, OntologyRepository};
pub use services::{
    AuditPropagator, DiffItem, EdgeDiffItem, PropertyDiffItem, PublishError, PublishFailure,
    PublishOutcome, PublishReport, PublishService, VertexDiffItem, VisibilityService,
    WorkspaceDiffService,
};
pub use work_queue::{InMemoryWorkQueue, WorkQueue, WorkQueueMessage};
