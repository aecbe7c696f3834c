use async_trait::async_trait;
use sandgraph_domain::{AuditAction, VisibilityLabel};
use serde_json::Value;

use crate::{context::AuditReadContext, error::Result, record::AuditRecord};

/// Write durability of an audit mutation.
///
/// Visibility rewrites are confidentiality-critical corrections and must
/// use `Flush`; plain appends may defer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Flush,
    Defer,
}

/// The append-only audit log seam.
///
/// Records are keyed by subject element id prefix. Appends happen on every
/// mutation of a graph element or property; records are never deleted.
/// The only post-hoc mutation is the visibility label rewrite.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append a record for a vertex-level action.
    async fn audit_vertex(
        &self,
        action: AuditAction,
        vertex_id: &str,
        process: &str,
        comment: &str,
        actor: &str,
        durability: Durability,
        visibility: &VisibilityLabel,
    ) -> Result<AuditRecord>;

    /// Append a record for a property-level action on an entity.
    #[allow(clippy::too_many_arguments)]
    async fn audit_entity_property(
        &self,
        action: AuditAction,
        subject_id: &str,
        key: &str,
        name: &str,
        old_value: Value,
        new_value: Value,
        process: &str,
        comment: &str,
        actor: &str,
        visibility: &VisibilityLabel,
    ) -> Result<AuditRecord>;

    /// Append records for a relationship-level action: one under the edge
    /// and one under each endpoint, so each subject's history is complete.
    #[allow(clippy::too_many_arguments)]
    async fn audit_relationship(
        &self,
        action: AuditAction,
        source_id: &str,
        dest_id: &str,
        edge_id: &str,
        process: &str,
        comment: &str,
        actor: &str,
        visibility: &VisibilityLabel,
    ) -> Result<Vec<AuditRecord>>;

    /// Append a record for an element-level mutation (visibility or
    /// descriptor change applied through a pending mutation).
    async fn audit_element_mutation(
        &self,
        action: AuditAction,
        element_id: &str,
        process: &str,
        actor: &str,
        visibility: &VisibilityLabel,
    ) -> Result<AuditRecord>;

    /// All records whose row key is prefixed by `subject_id`, oldest first.
    /// A user context filters by record visibility; the system context does
    /// not.
    async fn find_by_row_prefix(
        &self,
        subject_id: &str,
        context: &AuditReadContext,
    ) -> Result<Vec<AuditRecord>>;

    /// Rewrite one record's visibility label in place. Content untouched.
    async fn update_visibility(
        &self,
        record: &AuditRecord,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
        durability: Durability,
    ) -> Result<()>;
}
