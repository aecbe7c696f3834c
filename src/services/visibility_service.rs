use std::sync::Arc;

use sandgraph_audit::AuditRepository;
use sandgraph_domain::{
    AuditAction, Authorizations, SandboxStatus, VisibilityTranslator, WorkspaceId,
};
use sandgraph_graph::{
    element_sandbox_status, Element, ElementKind, ElementMutation, ElementRef, GraphStore,
};
use serde_json::json;

use crate::{
    error::EngineError,
    work_queue::{WorkQueue, WorkQueueMessage},
};

/// Rewrites the user-chosen visibility source component of an element.
///
/// A sandboxed element keeps its workspace restriction across the source
/// change; only the source component of the descriptor is replaced. The
/// enforced label is recomputed through the translator and downstream
/// workers are notified of the change.
pub struct VisibilityService {
    graph: Arc<dyn GraphStore>,
    translator: Arc<dyn VisibilityTranslator>,
    audit: Arc<dyn AuditRepository>,
    work_queue: Arc<dyn WorkQueue>,
}

impl VisibilityService {
    pub fn new(
        graph: Arc<dyn GraphStore>,
        translator: Arc<dyn VisibilityTranslator>,
        audit: Arc<dyn AuditRepository>,
        work_queue: Arc<dyn WorkQueue>,
    ) -> Self {
        Self {
            graph,
            translator,
            audit,
            work_queue,
        }
    }

    pub async fn update_element_visibility_source(
        &self,
        element: &ElementRef,
        visibility_source: &str,
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<Element, EngineError> {
        let current = self.resolve(element, authorizations).await?;

        tracing::info!(
            element = %element.id,
            source = visibility_source,
            "changing element visibility source"
        );

        let sandbox_status = element_sandbox_status(&current, workspace_id);
        let mut descriptor = current
            .visibility_descriptor()
            .cloned()
            .unwrap_or_default();
        descriptor.set_source(visibility_source);
        if sandbox_status != SandboxStatus::Public {
            // Still sandboxed: the workspace restriction survives the
            // source change.
            descriptor.add_workspace(workspace_id.clone());
        }

        let new_visibility = self.translator.to_visibility(&descriptor);
        let mutation = ElementMutation::new(element.clone())
            .alter_element_visibility(new_visibility.clone())
            .set_visibility_descriptor(descriptor.clone());
        let updated = self.graph.save(mutation, authorizations).await?;

        self.audit
            .audit_element_mutation(AuditAction::Update, &element.id, "", actor, &new_visibility)
            .await?;

        self.graph.flush().await?;

        self.work_queue
            .push(WorkQueueMessage::ElementVisibilityChange(json!({
                "id": element.id,
                "kind": element.kind.to_string(),
                "visibilityDescriptor": descriptor.encode(),
            })))
            .await;

        Ok(updated)
    }

    async fn resolve(
        &self,
        element: &ElementRef,
        authorizations: &Authorizations,
    ) -> Result<Element, EngineError> {
        let resolved = match element.kind {
            ElementKind::Vertex => self
                .graph
                .get_vertex(&element.id, authorizations)
                .await?
                .map(Element::Vertex),
            ElementKind::Edge => self
                .graph
                .get_edge(&element.id, authorizations)
                .await?
                .map(Element::Edge),
        };
        resolved.ok_or_else(|| {
            EngineError::Graph(sandgraph_graph::GraphStoreError::NotFound {
                id: element.id.clone(),
            })
        })
    }
}
