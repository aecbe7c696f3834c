mod audit_propagator;
mod diff;
mod publish;
mod visibility_service;

pub use audit_propagator::AuditPropagator;
pub use diff::{DiffItem, EdgeDiffItem, PropertyDiffItem, VertexDiffItem, WorkspaceDiffService};
pub use publish::{
    PublishError, PublishFailure, PublishOutcome, PublishReport, PublishService,
};
pub use visibility_service::VisibilityService;
