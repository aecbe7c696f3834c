use std::sync::Arc;

use sandgraph_audit::{
    AuditReadContext, AuditRepository, AuditStoreError, Durability, SystemAuditContext,
};
use sandgraph_domain::VisibilityLabel;

use crate::observability::record_audit_visibility_rewrite;

/// Rewrites the visibility of a subject's audit history after a publish,
/// so the trail does not leak a stale private label.
///
/// Scans run under the explicit system capability token: the audit log
/// must stay internally consistent regardless of who can currently read
/// the subject. Rewrites are flush-on-write; they are confidentiality
/// corrections, not batchable bookkeeping.
pub struct AuditPropagator {
    audit: Arc<dyn AuditRepository>,
    system_context: SystemAuditContext,
}

impl AuditPropagator {
    pub fn new(audit: Arc<dyn AuditRepository>, system_context: SystemAuditContext) -> Self {
        Self {
            audit,
            system_context,
        }
    }

    /// Rewrite every audit record of `subject_id` from `old_visibility` to
    /// `new_visibility`. Returns the number of records touched.
    pub async fn rewrite_visibility(
        &self,
        subject_id: &str,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
    ) -> Result<usize, AuditStoreError> {
        let context = AuditReadContext::system(&self.system_context);
        let records = self.audit.find_by_row_prefix(subject_id, &context).await?;
        for record in &records {
            self.audit
                .update_visibility(record, old_visibility, new_visibility, Durability::Flush)
                .await?;
        }

        record_audit_visibility_rewrite(records.len());
        tracing::debug!(
            subject = subject_id,
            records = records.len(),
            "rewrote audit history visibility"
        );
        Ok(records.len())
    }
}
