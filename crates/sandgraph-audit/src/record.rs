use chrono::{DateTime, Utc};
use sandgraph_domain::{AuditAction, VisibilityLabel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Type-specific detail carried by an audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuditDetail {
    Property {
        key: String,
        name: String,
        old_value: Value,
        new_value: Value,
    },
    Relationship {
        source_id: String,
        dest_id: String,
    },
}

/// One append-only audit entry.
///
/// Row keys are prefixed by the subject element id so a subject's full
/// history is one prefix scan. Record content never changes after append;
/// only the visibility label is mutable, so the history's confidentiality
/// can follow the subject's current label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    id: Uuid,
    row_key: String,
    subject_id: String,
    action: AuditAction,
    actor: String,
    process: String,
    comment: String,
    detail: Option<AuditDetail>,
    visibility: VisibilityLabel,
    occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        row_key: String,
        subject_id: String,
        action: AuditAction,
        actor: String,
        process: String,
        comment: String,
        detail: Option<AuditDetail>,
        visibility: VisibilityLabel,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            row_key,
            subject_id,
            action,
            actor,
            process,
            comment,
            detail,
            visibility,
            occurred_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn action(&self) -> AuditAction {
        self.action
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn process(&self) -> &str {
        &self.process
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn detail(&self) -> Option<&AuditDetail> {
        self.detail.as_ref()
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub(crate) fn set_visibility(&mut self, visibility: VisibilityLabel) {
        self.visibility = visibility;
    }
}
