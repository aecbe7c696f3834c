use std::{sync::Arc, time::Instant};

use sandgraph_domain::{Authorizations, SandboxStatus, Workspace, WorkspaceEntity};
use sandgraph_graph::{
    edge_sandbox_status, find_existing_property, property_sandbox_statuses,
    vertex_sandbox_status, Edge, ElementRef, GraphStore, Property, Result, Vertex,
};
use serde::Serialize;

use crate::observability::record_diff;

/// A sandboxed vertex staged in the workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VertexDiffItem {
    pub vertex: Vertex,
    pub sandbox_status: SandboxStatus,
    /// The workspace's user-set visible flag for this entity.
    pub visible: bool,
}

/// A sandboxed edge staged in the workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDiffItem {
    pub edge: Edge,
    pub sandbox_status: SandboxStatus,
}

/// A sandboxed property value staged in the workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDiffItem {
    pub element: ElementRef,
    pub property: Property,
    /// The public value this edit would overwrite, if one exists.
    pub existing_property: Option<Property>,
    pub sandbox_status: SandboxStatus,
}

/// One unit of workspace-local divergence from the public graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DiffItem {
    Vertex(VertexDiffItem),
    Edge(EdgeDiffItem),
    Property(PropertyDiffItem),
}

/// Computes a workspace's diff against the public baseline.
///
/// Read-only and side-effect-free; safe to run concurrently with itself
/// and with publish batches. Callers must not assume snapshot isolation:
/// a concurrent publish may be observed in either state.
pub struct WorkspaceDiffService {
    graph: Arc<dyn GraphStore>,
}

impl WorkspaceDiffService {
    pub fn new(graph: Arc<dyn GraphStore>) -> Self {
        Self { graph }
    }

    /// Everything non-public reachable from the workspace, in insertion
    /// order: vertex-derived items in workspace-entity order, then
    /// edge-derived items in workspace-edge order; within an element, the
    /// element's own item precedes its property items.
    pub async fn diff(
        &self,
        workspace: &Workspace,
        workspace_entities: &[WorkspaceEntity],
        workspace_edges: &[Edge],
        authorizations: &Authorizations,
    ) -> Result<Vec<DiffItem>> {
        let started = Instant::now();
        let mut result = Vec::new();

        for workspace_entity in workspace_entities {
            self.diff_workspace_entity(workspace, workspace_entity, authorizations, &mut result)
                .await?;
        }

        for workspace_edge in workspace_edges {
            diff_edge(workspace, workspace_edge, &mut result);
        }

        record_diff(started.elapsed(), result.len());
        Ok(result)
    }

    async fn diff_workspace_entity(
        &self,
        workspace: &Workspace,
        workspace_entity: &WorkspaceEntity,
        authorizations: &Authorizations,
        result: &mut Vec<DiffItem>,
    ) -> Result<()> {
        let entity_vertex = self
            .graph
            .get_vertex(workspace_entity.entity_vertex_id(), authorizations)
            .await?;

        // The vertex resolves to nothing when the user lacks read access
        // to the entity; that is not an error, the entity just has no diff.
        let Some(entity_vertex) = entity_vertex else {
            return Ok(());
        };

        let sandbox_status = vertex_sandbox_status(&entity_vertex, workspace.id());
        if sandbox_status != SandboxStatus::Public {
            result.push(DiffItem::Vertex(VertexDiffItem {
                visible: workspace_entity.is_visible(),
                sandbox_status,
                vertex: entity_vertex.clone(),
            }));
        }

        diff_properties(
            workspace,
            entity_vertex.element_ref(),
            entity_vertex.properties(),
            result,
        );
        Ok(())
    }
}

fn diff_edge(workspace: &Workspace, edge: &Edge, result: &mut Vec<DiffItem>) {
    let sandbox_status = edge_sandbox_status(edge, workspace.id());
    if sandbox_status != SandboxStatus::Public {
        result.push(DiffItem::Edge(EdgeDiffItem {
            edge: edge.clone(),
            sandbox_status,
        }));
    }

    diff_properties(workspace, edge.element_ref(), edge.properties(), result);
}

fn diff_properties(
    workspace: &Workspace,
    element: ElementRef,
    properties: &[Property],
    result: &mut Vec<DiffItem>,
) {
    let statuses = property_sandbox_statuses(properties, workspace.id());
    for (property, status) in properties.iter().zip(&statuses) {
        if *status != SandboxStatus::Public {
            let existing_property =
                find_existing_property(properties, &statuses, property).cloned();
            result.push(DiffItem::Property(PropertyDiffItem {
                element: element.clone(),
                property: property.clone(),
                existing_property,
                sandbox_status: *status,
            }));
        }
    }
}
