mod audit;
mod authorizations;
mod publish;
mod sandbox_status;
mod visibility;
mod workspace;

pub use audit::AuditAction;
pub use authorizations::Authorizations;
pub use publish::{PublishAction, PublishRequestItem, PublishTarget};
pub use sandbox_status::SandboxStatus;
pub use visibility::{
    DefaultVisibilityTranslator, VisibilityDescriptor, VisibilityLabel, VisibilityTranslator,
    DESCRIPTOR_METADATA_KEY, JSON_WORKSPACES,
};
pub use workspace::{Workspace, WorkspaceEntity, WorkspaceId};
