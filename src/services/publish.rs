use std::{sync::Arc, time::Instant};

use sandgraph_audit::{AuditRepository, AuditStoreError, Durability, SystemAuditContext};
use sandgraph_domain::{
    AuditAction, Authorizations, PublishAction, PublishRequestItem, PublishTarget, SandboxStatus,
    VisibilityDescriptor, VisibilityLabel, VisibilityTranslator, WorkspaceId,
    DESCRIPTOR_METADATA_KEY,
};
use sandgraph_graph::{
    edge_sandbox_status, property_sandbox_statuses, vertex_sandbox_status, Edge, ElementMutation,
    GraphStore, GraphStoreError, Property, Vertex,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    annotations::{AnnotationError, DetectedObjectRepository, TermMentionRepository},
    config::PublishConfig,
    observability::{record_publish_batch, record_publish_item},
    ontology::OntologyRepository,
    services::audit_propagator::AuditPropagator,
    work_queue::{WorkQueue, WorkQueueMessage},
};

/// Why a single batch item failed. Scoped to that item; sibling items and
/// later phases proceed regardless.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{}", already_public_message(.delete, .kind, .id))]
    AlreadyPublic {
        kind: &'static str,
        id: String,
        delete: bool,
    },

    #[error("cannot publish edge '{edge_id}': source and destination vertices are not public")]
    EndpointsNotPublic { edge_id: String },

    #[error("{kind} with id '{id}' is not local to workspace '{workspace_id}'")]
    NotLocalToWorkspace {
        kind: &'static str,
        id: String,
        workspace_id: String,
    },

    #[error("cannot publish a property modification on a private vertex: {vertex_id}")]
    OwnerNotPublic { vertex_id: String },

    #[error("could not find ontology property '{name}'")]
    MissingOntologyMetadata { name: String },

    #[error("graph store error: {0}")]
    Graph(#[from] GraphStoreError),

    #[error("audit store error: {0}")]
    Audit(#[from] AuditStoreError),

    #[error("annotation store error: {0}")]
    Annotation(#[from] AnnotationError),

    #[error("internal: {0}")]
    Internal(String),
}

fn already_public_message(delete: &bool, kind: &str, id: &str) -> String {
    if *delete {
        format!("cannot delete public {kind} '{id}'")
    } else {
        format!("{kind} '{id}' is already public")
    }
}

/// One failed batch item: the echoed request plus the reason.
#[derive(Debug)]
pub struct PublishFailure {
    pub item: PublishRequestItem,
    pub error: PublishError,
}

/// Per-item result of a publish batch.
#[derive(Debug)]
pub enum PublishOutcome {
    Success {
        item: PublishRequestItem,
        /// The item's new enforced label. `None` for deletes.
        new_visibility: Option<VisibilityLabel>,
    },
    Failure(PublishFailure),
}

/// Result of one publish batch, in processing order (vertex items, then
/// edge items, then property items).
#[derive(Debug, Default)]
pub struct PublishReport {
    outcomes: Vec<PublishOutcome>,
}

impl PublishReport {
    pub fn outcomes(&self) -> &[PublishOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &PublishFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            PublishOutcome::Failure(failure) => Some(failure),
            PublishOutcome::Success { .. } => None,
        })
    }

    /// True iff zero failures were recorded across all three phases.
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The wire response: every failing item echoed back with a
    /// human-readable reason. Partial success is normal, not an error.
    pub fn to_response_json(&self) -> Value {
        let failures: Vec<Value> = self
            .failures()
            .map(|failure| {
                let mut value = serde_json::to_value(&failure.item).unwrap_or_else(|_| json!({}));
                if let Some(object) = value.as_object_mut() {
                    object.insert("error_msg".to_string(), json!(failure.error.to_string()));
                }
                value
            })
            .collect();
        json!({ "failures": failures, "success": self.all_succeeded() })
    }
}

/// Executes publish/unpublish batches against the graph.
///
/// Processing order is fixed and significant: all vertex items, then all
/// edge items, then all property items. Each phase is isolated (one
/// phase's failures do not block the next) and ends with a graph flush, so
/// elements published in an earlier phase are read-visible to later ones
/// — edge publication checks its endpoints, property publication operates
/// on resolved elements.
///
/// There is no cross-item transaction. Concurrent batches touching the
/// same element race at the store's mutation layer and the last writer's
/// label wins; this layer adds no optimistic concurrency control.
pub struct PublishService {
    graph: Arc<dyn GraphStore>,
    translator: Arc<dyn VisibilityTranslator>,
    ontology: Arc<dyn OntologyRepository>,
    audit: Arc<dyn AuditRepository>,
    audit_propagator: AuditPropagator,
    term_mentions: Arc<dyn TermMentionRepository>,
    detected_objects: Arc<dyn DetectedObjectRepository>,
    work_queue: Arc<dyn WorkQueue>,
    system_context: SystemAuditContext,
    config: PublishConfig,
}

impl PublishService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: Arc<dyn GraphStore>,
        translator: Arc<dyn VisibilityTranslator>,
        ontology: Arc<dyn OntologyRepository>,
        audit: Arc<dyn AuditRepository>,
        term_mentions: Arc<dyn TermMentionRepository>,
        detected_objects: Arc<dyn DetectedObjectRepository>,
        work_queue: Arc<dyn WorkQueue>,
        system_context: SystemAuditContext,
        config: PublishConfig,
    ) -> Self {
        let audit_propagator =
            AuditPropagator::new(Arc::clone(&audit), system_context.clone());
        Self {
            graph,
            translator,
            ontology,
            audit,
            audit_propagator,
            term_mentions,
            detected_objects,
            work_queue,
            system_context,
            config,
        }
    }

    /// Validate and execute a batch. Per-item failures are collected, not
    /// propagated; only a failed flush barrier aborts the batch.
    pub async fn publish(
        &self,
        batch: &[PublishRequestItem],
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<PublishReport, GraphStoreError> {
        let started = Instant::now();
        tracing::debug!(items = batch.len(), workspace = %workspace_id, "publishing batch");

        let mut report = PublishReport::default();
        self.publish_vertices(batch, workspace_id, actor, authorizations, &mut report)
            .await?;
        self.publish_edges(batch, workspace_id, actor, authorizations, &mut report)
            .await?;
        self.publish_properties(batch, workspace_id, actor, authorizations, &mut report)
            .await?;

        let failures = report.failures().count();
        record_publish_batch(started.elapsed(), failures);
        tracing::debug!(
            items = batch.len(),
            failures,
            workspace = %workspace_id,
            "publish batch finished"
        );
        Ok(report)
    }

    async fn publish_vertices(
        &self,
        batch: &[PublishRequestItem],
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
        report: &mut PublishReport,
    ) -> Result<(), GraphStoreError> {
        for item in batch {
            let PublishTarget::Vertex { vertex_id } = &item.target else {
                continue;
            };
            let started = Instant::now();
            let result = self
                .publish_vertex_item(item, vertex_id, workspace_id, actor, authorizations)
                .await;
            record_outcome(report, item, result, started);
        }
        self.graph.flush().await
    }

    async fn publish_edges(
        &self,
        batch: &[PublishRequestItem],
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
        report: &mut PublishReport,
    ) -> Result<(), GraphStoreError> {
        for item in batch {
            let PublishTarget::Relationship {
                edge_id,
                source_id,
                dest_id,
            } = &item.target
            else {
                continue;
            };
            let started = Instant::now();
            let result = self
                .publish_edge_item(
                    item,
                    edge_id,
                    source_id,
                    dest_id,
                    workspace_id,
                    actor,
                    authorizations,
                )
                .await;
            record_outcome(report, item, result, started);
        }
        self.graph.flush().await
    }

    async fn publish_properties(
        &self,
        batch: &[PublishRequestItem],
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
        report: &mut PublishReport,
    ) -> Result<(), GraphStoreError> {
        for item in batch {
            let PublishTarget::Property {
                vertex_id,
                key,
                name,
            } = &item.target
            else {
                continue;
            };
            let started = Instant::now();
            let result = self
                .publish_property_item(
                    item,
                    vertex_id,
                    key,
                    name,
                    workspace_id,
                    actor,
                    authorizations,
                )
                .await;
            record_outcome(report, item, result, started);
        }
        self.graph.flush().await
    }

    async fn publish_vertex_item(
        &self,
        item: &PublishRequestItem,
        vertex_id: &str,
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<VisibilityLabel>, PublishError> {
        let vertex = self
            .graph
            .get_vertex(vertex_id, authorizations)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                kind: "vertex",
                id: vertex_id.to_string(),
            })?;

        if item.status == SandboxStatus::Public {
            return Err(PublishError::AlreadyPublic {
                kind: "vertex",
                id: vertex_id.to_string(),
                delete: item.action == PublishAction::Delete,
            });
        }

        if item.action == PublishAction::Delete {
            // The caller's status claim is not trusted for deletes; a
            // public vertex cannot be removed through this path.
            if vertex_sandbox_status(&vertex, workspace_id) == SandboxStatus::Public {
                return Err(PublishError::AlreadyPublic {
                    kind: "vertex",
                    id: vertex_id.to_string(),
                    delete: true,
                });
            }
            self.graph.remove_vertex(vertex_id, authorizations).await?;
            return Ok(None);
        }

        tracing::debug!(vertex = vertex_id, visibility = %vertex.visibility(), "publishing vertex");

        let descriptor = self.local_descriptor(
            vertex.visibility_descriptor(),
            "vertex",
            vertex_id,
            workspace_id,
        )?;
        let old_visibility = vertex.visibility().clone();
        let reduced = descriptor.without_workspace(workspace_id);
        let new_visibility = self.translator.to_visibility(&reduced);

        let mut mutation = ElementMutation::new(vertex.element_ref())
            .alter_element_visibility(new_visibility.clone())
            .set_visibility_descriptor(reduced);

        // Non-user-visible properties ride along with the vertex; the
        // glyph icon is published with its has-image edge instead.
        self.check_cascade_budget(vertex.properties())?;
        for property in vertex.properties() {
            let ontology_property = self
                .ontology
                .property_by_name(property.name())
                .await
                .ok_or_else(|| PublishError::MissingOntologyMetadata {
                    name: property.name().to_string(),
                })?;
            if !ontology_property.user_visible()
                && property.name() != self.config.glyph_icon_property_name
            {
                let (next, _) = self
                    .apply_property_publish(mutation, vertex.id(), property, workspace_id, actor)
                    .await?;
                mutation = next;
            }
        }

        self.graph.save(mutation, authorizations).await?;

        self.audit
            .audit_vertex(
                AuditAction::Publish,
                vertex_id,
                "",
                "",
                actor,
                Durability::Flush,
                &new_visibility,
            )
            .await?;
        self.audit_propagator
            .rewrite_visibility(vertex_id, &old_visibility, &new_visibility)
            .await?;

        Ok(Some(new_visibility))
    }

    #[allow(clippy::too_many_arguments)]
    async fn publish_edge_item(
        &self,
        item: &PublishRequestItem,
        edge_id: &str,
        source_id: &str,
        dest_id: &str,
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<VisibilityLabel>, PublishError> {
        let edge = self
            .graph
            .get_edge(edge_id, authorizations)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                kind: "edge",
                id: edge_id.to_string(),
            })?;
        let source_vertex = self.graph.get_vertex(source_id, authorizations).await?;
        let dest_vertex = self.graph.get_vertex(dest_id, authorizations).await?;

        if item.status == SandboxStatus::Public {
            return Err(PublishError::AlreadyPublic {
                kind: "edge",
                id: edge_id.to_string(),
                delete: item.action == PublishAction::Delete,
            });
        }

        if item.action == PublishAction::Delete {
            if edge_sandbox_status(&edge, workspace_id) == SandboxStatus::Public {
                return Err(PublishError::AlreadyPublic {
                    kind: "edge",
                    id: edge_id.to_string(),
                    delete: true,
                });
            }
            self.graph.remove_edge(edge_id, authorizations).await?;
            return Ok(None);
        }

        if let (Some(source_vertex), Some(dest_vertex)) = (&source_vertex, &dest_vertex) {
            if vertex_sandbox_status(source_vertex, workspace_id) != SandboxStatus::Public
                && vertex_sandbox_status(dest_vertex, workspace_id) != SandboxStatus::Public
            {
                return Err(PublishError::EndpointsNotPublic {
                    edge_id: edge_id.to_string(),
                });
            }
        }

        tracing::debug!(edge = edge_id, visibility = %edge.visibility(), "publishing edge");

        let descriptor =
            self.local_descriptor(edge.visibility_descriptor(), "edge", edge_id, workspace_id)?;

        if edge.label() == self.config.has_image_edge_label {
            self.publish_glyph_icon_property(
                &edge,
                source_vertex.as_ref(),
                workspace_id,
                actor,
                authorizations,
            )
            .await?;
        }

        let old_visibility = edge.visibility().clone();
        let reduced = descriptor.without_workspace(workspace_id);
        let new_visibility = self.translator.to_visibility(&reduced);

        let mut mutation = ElementMutation::new(edge.element_ref())
            .alter_element_visibility(new_visibility.clone())
            .set_visibility_descriptor(reduced);

        self.check_cascade_budget(edge.properties())?;
        for property in edge.properties() {
            let (next, _) = self
                .apply_property_publish(mutation, edge.id(), property, workspace_id, actor)
                .await?;
            mutation = next;
        }

        self.audit
            .audit_element_mutation(AuditAction::Publish, edge_id, "", actor, &new_visibility)
            .await?;

        self.graph.save(mutation, authorizations).await?;

        self.audit
            .audit_relationship(
                AuditAction::Publish,
                source_id,
                dest_id,
                edge_id,
                "",
                "",
                actor,
                &new_visibility,
            )
            .await?;
        self.audit_propagator
            .rewrite_visibility(edge_id, &old_visibility, &new_visibility)
            .await?;

        if let Some(dest_vertex) = &dest_vertex {
            self.update_derived_annotations(
                dest_vertex,
                &old_visibility,
                &new_visibility,
                workspace_id,
                authorizations,
            )
            .await?;
        }

        Ok(Some(new_visibility))
    }

    #[allow(clippy::too_many_arguments)]
    async fn publish_property_item(
        &self,
        item: &PublishRequestItem,
        vertex_id: &str,
        key: &str,
        name: &str,
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<VisibilityLabel>, PublishError> {
        let vertex = self
            .graph
            .get_vertex(vertex_id, authorizations)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                kind: "vertex",
                id: vertex_id.to_string(),
            })?;

        if item.status == SandboxStatus::Public {
            return Err(PublishError::AlreadyPublic {
                kind: "property",
                id: format!("{key}:{name}"),
                delete: item.action == PublishAction::Delete,
            });
        }

        // A property modification only publishes against an already-public
        // vertex; a private vertex publishes its properties with itself.
        if vertex_sandbox_status(&vertex, workspace_id) != SandboxStatus::Public {
            return Err(PublishError::OwnerNotPublic {
                vertex_id: vertex_id.to_string(),
            });
        }

        let statuses = property_sandbox_statuses(vertex.properties(), workspace_id);
        let mut candidates = vertex
            .properties()
            .iter()
            .zip(&statuses)
            .filter(|(property, _)| property.matches(key, name));

        let sandboxed_property = candidates
            .clone()
            .find(|(_, status)| **status != SandboxStatus::Public)
            .map(|(property, _)| property);

        if candidates.next().is_none() {
            return Err(PublishError::NotFound {
                kind: "property",
                id: format!("{key}:{name} on vertex '{vertex_id}'"),
            });
        }

        if item.action == PublishAction::Delete {
            let Some(sandboxed_property) = sandboxed_property else {
                return Err(PublishError::AlreadyPublic {
                    kind: "property",
                    id: format!("{key}:{name}"),
                    delete: true,
                });
            };
            self.graph
                .remove_property(
                    &vertex.element_ref(),
                    key,
                    name,
                    sandboxed_property.visibility(),
                    authorizations,
                )
                .await?;
            return Ok(None);
        }

        let not_local = || PublishError::NotLocalToWorkspace {
            kind: "property",
            id: format!("{key}:{name}"),
            workspace_id: workspace_id.to_string(),
        };
        let sandboxed_property = sandboxed_property.ok_or_else(not_local)?;

        let mutation = ElementMutation::new(vertex.element_ref());
        let (mutation, published) = self
            .apply_property_publish(mutation, vertex.id(), sandboxed_property, workspace_id, actor)
            .await?;
        let new_visibility = published.ok_or_else(not_local)?;

        self.graph.save(mutation, authorizations).await?;
        Ok(Some(new_visibility))
    }

    /// Stage one property's publish onto a pending mutation: strip the
    /// workspace from its descriptor, recompute its label, rewrite its
    /// embedded metadata, and append the property audit record.
    ///
    /// Returns the new label, or `None` when the property carries no
    /// descriptor or is sandboxed to a different workspace — such
    /// properties are skipped, not failed.
    async fn apply_property_publish(
        &self,
        mutation: ElementMutation,
        element_id: &str,
        property: &Property,
        workspace_id: &WorkspaceId,
        actor: &str,
    ) -> Result<(ElementMutation, Option<VisibilityLabel>), PublishError> {
        let Some(descriptor) = property.visibility_descriptor() else {
            tracing::debug!(
                key = property.key(),
                name = property.name(),
                "skipping property without visibility descriptor"
            );
            return Ok((mutation, None));
        };
        if !descriptor.contains_workspace(workspace_id) {
            tracing::debug!(
                key = property.key(),
                name = property.name(),
                workspace = %workspace_id,
                "skipping property sandboxed to a different workspace"
            );
            return Ok((mutation, None));
        }

        tracing::debug!(
            key = property.key(),
            name = property.name(),
            visibility = %property.visibility(),
            "publishing property"
        );

        let reduced = descriptor.without_workspace(workspace_id);
        let new_visibility = self.translator.to_visibility(&reduced);

        let mutation = mutation
            .alter_property_visibility(property, new_visibility.clone())
            .alter_property_metadata(property, DESCRIPTOR_METADATA_KEY, reduced.encode());

        self.audit
            .audit_entity_property(
                AuditAction::Publish,
                element_id,
                property.key(),
                property.name(),
                property.value().clone(),
                property.value().clone(),
                "",
                "",
                actor,
                &new_visibility,
            )
            .await?;

        Ok((mutation, Some(new_visibility)))
    }

    /// A has-image edge carries the glyph-icon property on its source
    /// vertex along with it.
    async fn publish_glyph_icon_property(
        &self,
        edge: &Edge,
        source_vertex: Option<&Vertex>,
        workspace_id: &WorkspaceId,
        actor: &str,
        authorizations: &Authorizations,
    ) -> Result<(), PublishError> {
        let Some(entity_vertex) = source_vertex else {
            tracing::warn!(
                edge = edge.id(),
                source = edge.source_id(),
                "has-image edge source vertex is not readable; glyph icon not published"
            );
            return Ok(());
        };

        let mut mutation = ElementMutation::new(entity_vertex.element_ref());
        for glyph_icon_property in
            entity_vertex.properties_named(&self.config.glyph_icon_property_name)
        {
            let (next, published) = self
                .apply_property_publish(
                    mutation,
                    entity_vertex.id(),
                    glyph_icon_property,
                    workspace_id,
                    actor,
                )
                .await?;
            if published.is_some() {
                self.graph.save(next, authorizations).await?;
                return Ok(());
            }
            mutation = next;
        }

        tracing::warn!(
            vertex = entity_vertex.id(),
            "has-image edge without a glyph icon property set on its source vertex"
        );
        Ok(())
    }

    /// Locate the derived annotation record (term mention or detected
    /// object) keyed by the destination vertex's row-key property and
    /// bring its visibility in line with the published edge, notifying the
    /// work queue of detected-object changes.
    async fn update_derived_annotations(
        &self,
        dest_vertex: &Vertex,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
        workspace_id: &WorkspaceId,
        authorizations: &Authorizations,
    ) -> Result<(), PublishError> {
        for row_key_property in dest_vertex.properties_named(&self.config.row_key_property_name) {
            let Some(row_key) = row_key_property.value().as_str() else {
                continue;
            };

            if let Some(term_mention) = self
                .term_mentions
                .find_by_row_key(row_key, &self.system_context)
                .await?
            {
                self.term_mentions
                    .update_visibility(&term_mention, old_visibility, new_visibility)
                    .await?;
                continue;
            }

            let Some(detected_object) = self
                .detected_objects
                .find_by_row_key(row_key, &self.system_context)
                .await?
            else {
                tracing::warn!(
                    vertex = dest_vertex.id(),
                    row_key,
                    "no term mention or detected object found for vertex"
                );
                continue;
            };

            self.detected_objects
                .update_visibility(&detected_object, old_visibility, new_visibility)
                .await?;

            let Some(artifact_vertex) = self
                .graph
                .get_vertex(detected_object.artifact_vertex_id(), authorizations)
                .await?
            else {
                tracing::warn!(
                    artifact = detected_object.artifact_vertex_id(),
                    "artifact vertex for detected object is not readable"
                );
                continue;
            };

            let detected = self
                .detected_objects
                .find_by_artifact(artifact_vertex.id(), &self.system_context)
                .await?;
            let payload = json!({
                "id": artifact_vertex.id(),
                "workspaceId": workspace_id.as_str(),
                "detectedObjects": detected
                    .iter()
                    .map(|record| record.data().clone())
                    .collect::<Vec<_>>(),
            });
            self.work_queue
                .push(WorkQueueMessage::DetectedObjectChange(payload))
                .await;
        }
        Ok(())
    }

    fn local_descriptor(
        &self,
        descriptor: Option<&VisibilityDescriptor>,
        kind: &'static str,
        id: &str,
        workspace_id: &WorkspaceId,
    ) -> Result<VisibilityDescriptor, PublishError> {
        let not_local = || PublishError::NotLocalToWorkspace {
            kind,
            id: id.to_string(),
            workspace_id: workspace_id.to_string(),
        };
        let descriptor = descriptor.ok_or_else(not_local)?;
        if !descriptor.contains_workspace(workspace_id) {
            return Err(not_local());
        }
        Ok(descriptor.clone())
    }

    fn check_cascade_budget(&self, properties: &[Property]) -> Result<(), PublishError> {
        if properties.len() > self.config.max_cascade_properties {
            return Err(PublishError::Internal(format!(
                "property cascade exceeds limit of {}",
                self.config.max_cascade_properties
            )));
        }
        Ok(())
    }
}

fn record_outcome(
    report: &mut PublishReport,
    item: &PublishRequestItem,
    result: Result<Option<VisibilityLabel>, PublishError>,
    started: Instant,
) {
    match result {
        Ok(new_visibility) => {
            record_publish_item(item.target.type_name(), "ok", started.elapsed());
            report.outcomes.push(PublishOutcome::Success {
                item: item.clone(),
                new_visibility,
            });
        }
        Err(error) => {
            tracing::warn!(
                item_type = item.target.type_name(),
                id = item.target.element_id(),
                error = %error,
                "publish item failed"
            );
            record_publish_item(item.target.type_name(), "error", started.elapsed());
            report
                .outcomes
                .push(PublishOutcome::Failure(PublishFailure {
                    item: item.clone(),
                    error,
                }));
        }
    }
}
