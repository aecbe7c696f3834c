use std::sync::Arc;

use sandgraph_audit::{AuditRepository, InMemoryAuditRepository, SystemAuditContext};
use sandgraph_domain::{
    Authorizations, DefaultVisibilityTranslator, PublishAction, PublishRequestItem, PublishTarget,
    SandboxStatus, VisibilityDescriptor, VisibilityLabel, VisibilityTranslator, Workspace,
    WorkspaceId,
};
use sandgraph_graph::{Edge, GraphStore, InMemoryGraphStore, Property, Vertex};
use serde_json::Value;

use crate::{
    annotations::{
        DetectedObjectRepository, InMemoryDetectedObjectRepository, InMemoryTermMentionRepository,
        TermMentionRepository,
    },
    config::PublishConfig,
    ontology::{InMemoryOntologyRepository, OntologyProperty, OntologyRepository},
    services::{PublishService, VisibilityService, WorkspaceDiffService},
    work_queue::{InMemoryWorkQueue, WorkQueue},
};

pub(crate) const WORKSPACE: &str = "WORKSPACE_1";
pub(crate) const OTHER_WORKSPACE: &str = "WORKSPACE_2";
pub(crate) const ACTOR: &str = "analyst1";

pub(crate) struct EngineFixture {
    pub graph: Arc<InMemoryGraphStore>,
    pub audit: Arc<InMemoryAuditRepository>,
    pub ontology: Arc<InMemoryOntologyRepository>,
    pub term_mentions: Arc<InMemoryTermMentionRepository>,
    pub detected_objects: Arc<InMemoryDetectedObjectRepository>,
    pub work_queue: Arc<InMemoryWorkQueue>,
    pub translator: Arc<DefaultVisibilityTranslator>,
    pub system_context: SystemAuditContext,
}

impl EngineFixture {
    pub fn new() -> Self {
        Self {
            graph: Arc::new(InMemoryGraphStore::new()),
            audit: Arc::new(InMemoryAuditRepository::new()),
            ontology: Arc::new(InMemoryOntologyRepository::new()),
            term_mentions: Arc::new(InMemoryTermMentionRepository::new()),
            detected_objects: Arc::new(InMemoryDetectedObjectRepository::new()),
            work_queue: Arc::new(InMemoryWorkQueue::new()),
            translator: Arc::new(DefaultVisibilityTranslator),
            system_context: SystemAuditContext::new(),
        }
    }

    pub fn publish_service(&self) -> PublishService {
        PublishService::new(
            Arc::clone(&self.graph) as Arc<dyn GraphStore>,
            Arc::clone(&self.translator) as Arc<dyn VisibilityTranslator>,
            Arc::clone(&self.ontology) as Arc<dyn OntologyRepository>,
            Arc::clone(&self.audit) as Arc<dyn AuditRepository>,
            Arc::clone(&self.term_mentions) as Arc<dyn TermMentionRepository>,
            Arc::clone(&self.detected_objects) as Arc<dyn DetectedObjectRepository>,
            Arc::clone(&self.work_queue) as Arc<dyn WorkQueue>,
            self.system_context.clone(),
            PublishConfig::default(),
        )
    }

    pub fn diff_service(&self) -> WorkspaceDiffService {
        WorkspaceDiffService::new(Arc::clone(&self.graph) as Arc<dyn GraphStore>)
    }

    pub fn visibility_service(&self) -> VisibilityService {
        VisibilityService::new(
            Arc::clone(&self.graph) as Arc<dyn GraphStore>,
            Arc::clone(&self.translator) as Arc<dyn VisibilityTranslator>,
            Arc::clone(&self.audit) as Arc<dyn AuditRepository>,
            Arc::clone(&self.work_queue) as Arc<dyn WorkQueue>,
        )
    }

    pub fn define_property(&self, name: &str, user_visible: bool) {
        self.ontology.define(OntologyProperty::new(name, user_visible));
    }

    pub fn label_for(&self, descriptor: &VisibilityDescriptor) -> VisibilityLabel {
        self.translator.to_visibility(descriptor)
    }

    /// A vertex sandboxed to [`WORKSPACE`].
    pub fn sandboxed_vertex(&self, id: &str) -> Vertex {
        let descriptor = sandbox_descriptor();
        let label = self.label_for(&descriptor);
        Vertex::new(id, label).with_visibility_descriptor(descriptor)
    }

    /// A property value sandboxed to [`WORKSPACE`].
    pub fn sandboxed_property(&self, key: &str, name: &str, value: Value) -> Property {
        let descriptor = sandbox_descriptor();
        let label = self.label_for(&descriptor);
        let mut property = Property::new(key, name, value, label);
        property.set_visibility_descriptor(&descriptor);
        property
    }

    /// An edge sandboxed to [`WORKSPACE`].
    pub fn sandboxed_edge(&self, id: &str, label: &str, source_id: &str, dest_id: &str) -> Edge {
        let descriptor = sandbox_descriptor();
        let visibility = self.label_for(&descriptor);
        Edge::new(id, label, source_id, dest_id, visibility).with_visibility_descriptor(descriptor)
    }
}

pub(crate) fn workspace_id() -> WorkspaceId {
    WorkspaceId::new(WORKSPACE)
}

pub(crate) fn workspace() -> Workspace {
    Workspace::new(workspace_id(), "Investigation", ACTOR)
}

pub(crate) fn sandbox_descriptor() -> VisibilityDescriptor {
    VisibilityDescriptor::sandboxed(workspace_id())
}

/// Authorizations of a workspace member.
pub(crate) fn member_auths() -> Authorizations {
    Authorizations::default().with_workspace(&workspace_id())
}

/// Authorizations of a user outside the workspace.
pub(crate) fn outsider_auths() -> Authorizations {
    Authorizations::default()
}

pub(crate) fn public_vertex(id: &str) -> Vertex {
    Vertex::new(id, VisibilityLabel::public())
}

pub(crate) fn public_property(key: &str, name: &str, value: Value) -> Property {
    Property::new(key, name, value, VisibilityLabel::public())
}

pub(crate) fn publish_vertex_item(vertex_id: &str, status: SandboxStatus) -> PublishRequestItem {
    PublishRequestItem {
        target: PublishTarget::Vertex {
            vertex_id: vertex_id.to_string(),
        },
        action: PublishAction::Publish,
        status,
    }
}

pub(crate) fn delete_vertex_item(vertex_id: &str, status: SandboxStatus) -> PublishRequestItem {
    PublishRequestItem {
        target: PublishTarget::Vertex {
            vertex_id: vertex_id.to_string(),
        },
        action: PublishAction::Delete,
        status,
    }
}

pub(crate) fn publish_edge_item(
    edge_id: &str,
    source_id: &str,
    dest_id: &str,
    status: SandboxStatus,
) -> PublishRequestItem {
    PublishRequestItem {
        target: PublishTarget::Relationship {
            edge_id: edge_id.to_string(),
            source_id: source_id.to_string(),
            dest_id: dest_id.to_string(),
        },
        action: PublishAction::Publish,
        status,
    }
}

pub(crate) fn publish_property_item(
    vertex_id: &str,
    key: &str,
    name: &str,
    status: SandboxStatus,
) -> PublishRequestItem {
    PublishRequestItem {
        target: PublishTarget::Property {
            vertex_id: vertex_id.to_string(),
            key: key.to_string(),
            name: name.to_string(),
        },
        action: PublishAction::Publish,
        status,
    }
}

pub(crate) fn delete_property_item(
    vertex_id: &str,
    key: &str,
    name: &str,
    status: SandboxStatus,
) -> PublishRequestItem {
    PublishRequestItem {
        target: PublishTarget::Property {
            vertex_id: vertex_id.to_string(),
            key: key.to_string(),
            name: name.to_string(),
        },
        action: PublishAction::Delete,
        status,
    }
}
