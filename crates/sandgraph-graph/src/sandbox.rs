//! Sandbox-status classification of elements and properties against a
//! workspace.
//!
//! Status is derived from visibility descriptors, never stored. An item
//! with no descriptor, or whose descriptor does not include the workspace,
//! is public from that workspace's point of view.

use std::collections::HashMap;

use sandgraph_domain::{SandboxStatus, VisibilityDescriptor, WorkspaceId};

use crate::types::{Edge, Element, Property, Vertex};

fn descriptor_status(
    descriptor: Option<&VisibilityDescriptor>,
    workspace_id: &WorkspaceId,
) -> SandboxStatus {
    match descriptor {
        Some(descriptor) if descriptor.contains_workspace(workspace_id) => SandboxStatus::Private,
        _ => SandboxStatus::Public,
    }
}

/// Classify a vertex or edge against a workspace.
///
/// Elements are either public or private; only properties can be partial,
/// since partiality means a private edit shadowing a public sibling value.
pub fn element_sandbox_status(element: &Element, workspace_id: &WorkspaceId) -> SandboxStatus {
    descriptor_status(element.visibility_descriptor(), workspace_id)
}

pub fn vertex_sandbox_status(vertex: &Vertex, workspace_id: &WorkspaceId) -> SandboxStatus {
    descriptor_status(vertex.visibility_descriptor(), workspace_id)
}

pub fn edge_sandbox_status(edge: &Edge, workspace_id: &WorkspaceId) -> SandboxStatus {
    descriptor_status(edge.visibility_descriptor(), workspace_id)
}

fn property_base_status(property: &Property, workspace_id: &WorkspaceId) -> SandboxStatus {
    descriptor_status(property.visibility_descriptor().as_ref(), workspace_id)
}

/// Classify every property of an element against a workspace, in input
/// order.
///
/// A private property whose (key, name) also has a public representative
/// among its siblings is reported as partial: the workspace has shadowed a
/// public value with a private edit. The sibling set is scanned once, not
/// per pair.
pub fn property_sandbox_statuses(
    properties: &[Property],
    workspace_id: &WorkspaceId,
) -> Vec<SandboxStatus> {
    let statuses: Vec<SandboxStatus> = properties
        .iter()
        .map(|property| property_base_status(property, workspace_id))
        .collect();

    // (key, name) -> number of public representatives among the siblings.
    // More than one is a storage inconsistency: report it, first one wins.
    let mut public_siblings: HashMap<(&str, &str), u32> = HashMap::new();
    for (property, status) in properties.iter().zip(&statuses) {
        if *status == SandboxStatus::Public {
            let count = public_siblings
                .entry((property.key(), property.name()))
                .or_insert(0);
            *count += 1;
            if *count == 2 {
                tracing::warn!(
                    key = property.key(),
                    name = property.name(),
                    "multiple public representatives for one property key/name"
                );
            }
        }
    }

    properties
        .iter()
        .zip(statuses)
        .map(|(property, status)| {
            if status == SandboxStatus::Private
                && public_siblings.contains_key(&(property.key(), property.name()))
            {
                SandboxStatus::Partial
            } else {
                status
            }
        })
        .collect()
}

/// Locate the public counterpart of a workspace property among its
/// classified siblings, for displaying what a publish would overwrite.
pub fn find_existing_property<'a>(
    properties: &'a [Property],
    statuses: &[SandboxStatus],
    workspace_property: &Property,
) -> Option<&'a Property> {
    properties
        .iter()
        .zip(statuses)
        .find(|(property, status)| {
            property.matches(workspace_property.key(), workspace_property.name())
                && **status == SandboxStatus::Public
        })
        .map(|(property, _)| property)
}
