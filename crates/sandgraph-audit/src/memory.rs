use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use sandgraph_domain::{Authorizations, AuditAction, VisibilityLabel};
use serde_json::Value;

use crate::{
    context::AuditReadContext,
    error::{AuditStoreError, Result},
    record::{AuditDetail, AuditRecord},
    repository::{AuditRepository, Durability},
};

/// In-process audit log backend, keyed by subject id.
///
/// Appends are ordered by a monotonic sequence embedded in the row key, so
/// prefix scans return a subject's history oldest first.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    records: DashMap<String, Vec<AuditRecord>>,
    sequence: AtomicU64,
}

impl InMemoryAuditRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_row_key(&self, subject_id: &str) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{subject_id}\u{0}{sequence:020}")
    }

    fn append(
        &self,
        subject_id: &str,
        action: AuditAction,
        actor: &str,
        process: &str,
        comment: &str,
        detail: Option<AuditDetail>,
        visibility: &VisibilityLabel,
    ) -> AuditRecord {
        let record = AuditRecord::new(
            self.next_row_key(subject_id),
            subject_id.to_string(),
            action,
            actor.to_string(),
            process.to_string(),
            comment.to_string(),
            detail,
            visibility.clone(),
        );
        self.records
            .entry(subject_id.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    fn readable(record: &AuditRecord, context: &AuditReadContext) -> bool {
        match context {
            AuditReadContext::System(_) => true,
            AuditReadContext::User(authorizations) => can_read(authorizations, record),
        }
    }
}

fn can_read(authorizations: &Authorizations, record: &AuditRecord) -> bool {
    authorizations.can_read(record.visibility())
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn audit_vertex(
        &self,
        action: AuditAction,
        vertex_id: &str,
        process: &str,
        comment: &str,
        actor: &str,
        _durability: Durability,
        visibility: &VisibilityLabel,
    ) -> Result<AuditRecord> {
        Ok(self.append(vertex_id, action, actor, process, comment, None, visibility))
    }

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
    ) -> Result<AuditRecord> {
        let detail = AuditDetail::Property {
            key: key.to_string(),
            name: name.to_string(),
            old_value,
            new_value,
        };
        Ok(self.append(
            subject_id,
            action,
            actor,
            process,
            comment,
            Some(detail),
            visibility,
        ))
    }

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
    ) -> Result<Vec<AuditRecord>> {
        let detail = AuditDetail::Relationship {
            source_id: source_id.to_string(),
            dest_id: dest_id.to_string(),
        };
        let records = vec![
            self.append(
                edge_id,
                action,
                actor,
                process,
                comment,
                Some(detail.clone()),
                visibility,
            ),
            self.append(
                source_id,
                action,
                actor,
                process,
                comment,
                Some(detail.clone()),
                visibility,
            ),
            self.append(
                dest_id,
                action,
                actor,
                process,
                comment,
                Some(detail),
                visibility,
            ),
        ];
        Ok(records)
    }

    async fn audit_element_mutation(
        &self,
        action: AuditAction,
        element_id: &str,
        process: &str,
        actor: &str,
        visibility: &VisibilityLabel,
    ) -> Result<AuditRecord> {
        Ok(self.append(element_id, action, actor, process, "", None, visibility))
    }

    async fn find_by_row_prefix(
        &self,
        subject_id: &str,
        context: &AuditReadContext,
    ) -> Result<Vec<AuditRecord>> {
        let records = self
            .records
            .get(subject_id)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|record| Self::readable(record, context))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn update_visibility(
        &self,
        record: &AuditRecord,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
        _durability: Durability,
    ) -> Result<()> {
        let mut entry = self.records.get_mut(record.subject_id()).ok_or_else(|| {
            AuditStoreError::NotFound {
                row_key: record.row_key().to_string(),
            }
        })?;
        let stored = entry
            .iter_mut()
            .find(|candidate| candidate.row_key() == record.row_key())
            .ok_or_else(|| AuditStoreError::NotFound {
                row_key: record.row_key().to_string(),
            })?;
        if stored.visibility() != old_visibility {
            tracing::debug!(
                row_key = record.row_key(),
                "audit visibility rewrite raced another writer; applying anyway"
            );
        }
        stored.set_visibility(new_visibility.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sandgraph_domain::WorkspaceId;

    use super::*;
    use crate::context::SystemAuditContext;

    fn sandbox_label() -> VisibilityLabel {
        VisibilityLabel::from_terms(["WORKSPACE_1"])
    }

    #[tokio::test]
    async fn prefix_scan_returns_history_oldest_first() {
        let repository = InMemoryAuditRepository::new();
        repository
            .audit_vertex(
                AuditAction::Create,
                "v1",
                "",
                "",
                "analyst1",
                Durability::Defer,
                &sandbox_label(),
            )
            .await
            .unwrap();
        repository
            .audit_vertex(
                AuditAction::Publish,
                "v1",
                "",
                "",
                "analyst1",
                Durability::Flush,
                &VisibilityLabel::public(),
            )
            .await
            .unwrap();

        let context = AuditReadContext::system(&SystemAuditContext::new());
        let records = repository.find_by_row_prefix("v1", &context).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action(), AuditAction::Create);
        assert_eq!(records[1].action(), AuditAction::Publish);
    }

    #[tokio::test]
    async fn user_context_filters_by_visibility() {
        let repository = InMemoryAuditRepository::new();
        repository
            .audit_vertex(
                AuditAction::Create,
                "v1",
                "",
                "",
                "analyst1",
                Durability::Defer,
                &sandbox_label(),
            )
            .await
            .unwrap();

        let outsider = AuditReadContext::user(Authorizations::default());
        assert!(repository
            .find_by_row_prefix("v1", &outsider)
            .await
            .unwrap()
            .is_empty());

        let member = AuditReadContext::user(
            Authorizations::default().with_workspace(&WorkspaceId::new("WORKSPACE_1")),
        );
        assert_eq!(
            repository
                .find_by_row_prefix("v1", &member)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn update_visibility_rewrites_label_only() {
        let repository = InMemoryAuditRepository::new();
        let record = repository
            .audit_vertex(
                AuditAction::Create,
                "v1",
                "",
                "created",
                "analyst1",
                Durability::Defer,
                &sandbox_label(),
            )
            .await
            .unwrap();

        repository
            .update_visibility(
                &record,
                &sandbox_label(),
                &VisibilityLabel::public(),
                Durability::Flush,
            )
            .await
            .unwrap();

        let context = AuditReadContext::user(Authorizations::default());
        let records = repository.find_by_row_prefix("v1", &context).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comment(), "created");
        assert!(records[0].visibility().is_public());
    }
}
