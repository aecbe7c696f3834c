use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use async_trait::async_trait;
use dashmap::DashMap;
use sandgraph_domain::{Authorizations, VisibilityLabel};

use crate::{
    error::{GraphStoreError, Result},
    metrics::record_store_operation,
    mutation::ElementMutation,
    store::GraphStore,
    types::{Edge, Element, ElementKind, ElementRef, Property, Vertex},
};

/// In-process graph store backend.
///
/// Enforces visibility labels on every read: an element or property is
/// returned only if the caller holds all of its required terms. Used by
/// tests and by embedders that do not run a remote graph service.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    vertices: DashMap<String, Vertex>,
    edges: DashMap<String, Edge>,
    flushes: AtomicU64,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a vertex, bypassing visibility checks.
    pub fn insert_vertex(&self, vertex: Vertex) {
        self.vertices.insert(vertex.id().to_string(), vertex);
    }

    /// Seed an edge, bypassing visibility checks.
    pub fn insert_edge(&self, edge: Edge) {
        self.edges.insert(edge.id().to_string(), edge);
    }

    /// Number of flush barriers issued so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::SeqCst)
    }

    fn visible_vertex(vertex: &Vertex, authorizations: &Authorizations) -> Option<Vertex> {
        if !authorizations.can_read(vertex.visibility()) {
            return None;
        }
        let mut filtered = Vertex::new(vertex.id(), vertex.visibility().clone());
        if let Some(descriptor) = vertex.visibility_descriptor() {
            filtered = filtered.with_visibility_descriptor(descriptor.clone());
        }
        for property in vertex.properties() {
            if authorizations.can_read(property.visibility()) {
                filtered = filtered.with_property(property.clone());
            }
        }
        Some(filtered)
    }

    fn visible_edge(edge: &Edge, authorizations: &Authorizations) -> Option<Edge> {
        if !authorizations.can_read(edge.visibility()) {
            return None;
        }
        let mut filtered = Edge::new(
            edge.id(),
            edge.label(),
            edge.source_id(),
            edge.dest_id(),
            edge.visibility().clone(),
        );
        if let Some(descriptor) = edge.visibility_descriptor() {
            filtered = filtered.with_visibility_descriptor(descriptor.clone());
        }
        for property in edge.properties() {
            if authorizations.can_read(property.visibility()) {
                filtered = filtered.with_property(property.clone());
            }
        }
        Some(filtered)
    }

    fn apply_to_properties(
        properties: &mut Vec<Property>,
        mutation: &ElementMutation,
        element_id: &str,
    ) -> Result<()> {
        // Metadata changes address properties by their pre-change label, so
        // they must land before any visibility changes do.
        for change in &mutation.property_metadata_changes {
            let property = properties
                .iter_mut()
                .find(|property| {
                    property.matches(&change.key, &change.name)
                        && property.visibility() == &change.current_visibility
                })
                .ok_or_else(|| GraphStoreError::PropertyNotFound {
                    element_id: element_id.to_string(),
                    key: change.key.clone(),
                    name: change.name.clone(),
                })?;
            property.set_metadata_value(change.metadata_key.clone(), change.value.clone());
        }

        for change in &mutation.property_visibility_changes {
            let target_index = properties
                .iter()
                .position(|property| {
                    property.matches(&change.key, &change.name)
                        && property.visibility() == &change.current_visibility
                })
                .ok_or_else(|| GraphStoreError::PropertyNotFound {
                    element_id: element_id.to_string(),
                    key: change.key.clone(),
                    name: change.name.clone(),
                })?;
            properties[target_index].set_visibility(change.new_visibility.clone());

            // A label change landing on an existing sibling overwrites it:
            // the relabeled value replaces the one it shadowed.
            let mut index = 0;
            properties.retain(|property| {
                let collides = index != target_index
                    && property.matches(&change.key, &change.name)
                    && property.visibility() == &change.new_visibility;
                index += 1;
                !collides
            });
        }

        for new_property in &mutation.set_properties {
            match properties.iter_mut().find(|property| {
                property.matches(new_property.key(), new_property.name())
                    && property.visibility() == new_property.visibility()
            }) {
                Some(existing) => *existing = new_property.clone(),
                None => properties.push(new_property.clone()),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn get_vertex(
        &self,
        vertex_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Vertex>> {
        let started = Instant::now();
        let vertex = self
            .vertices
            .get(vertex_id)
            .and_then(|vertex| Self::visible_vertex(&vertex, authorizations));
        record_store_operation("get_vertex", "ok", started.elapsed());
        Ok(vertex)
    }

    async fn get_edge(
        &self,
        edge_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Edge>> {
        let started = Instant::now();
        let edge = self
            .edges
            .get(edge_id)
            .and_then(|edge| Self::visible_edge(&edge, authorizations));
        record_store_operation("get_edge", "ok", started.elapsed());
        Ok(edge)
    }

    async fn remove_vertex(&self, vertex_id: &str, authorizations: &Authorizations) -> Result<()> {
        let started = Instant::now();
        let readable = self
            .vertices
            .get(vertex_id)
            .map(|vertex| authorizations.can_read(vertex.visibility()))
            .unwrap_or(false);
        if !readable {
            record_store_operation("remove_vertex", "error", started.elapsed());
            return Err(GraphStoreError::NotFound {
                id: vertex_id.to_string(),
            });
        }
        self.vertices.remove(vertex_id);
        // Removing a vertex removes its incident edges.
        self.edges
            .retain(|_, edge| edge.source_id() != vertex_id && edge.dest_id() != vertex_id);
        record_store_operation("remove_vertex", "ok", started.elapsed());
        Ok(())
    }

    async fn remove_edge(&self, edge_id: &str, authorizations: &Authorizations) -> Result<()> {
        let started = Instant::now();
        let readable = self
            .edges
            .get(edge_id)
            .map(|edge| authorizations.can_read(edge.visibility()))
            .unwrap_or(false);
        if !readable {
            record_store_operation("remove_edge", "error", started.elapsed());
            return Err(GraphStoreError::NotFound {
                id: edge_id.to_string(),
            });
        }
        self.edges.remove(edge_id);
        record_store_operation("remove_edge", "ok", started.elapsed());
        Ok(())
    }

    async fn remove_property(
        &self,
        element: &ElementRef,
        key: &str,
        name: &str,
        visibility: &VisibilityLabel,
        _authorizations: &Authorizations,
    ) -> Result<()> {
        let started = Instant::now();
        let removed = match element.kind {
            ElementKind::Vertex => self.vertices.get_mut(&element.id).map(|mut vertex| {
                remove_matching_property(vertex.properties_vec_mut(), key, name, visibility)
            }),
            ElementKind::Edge => self.edges.get_mut(&element.id).map(|mut edge| {
                remove_matching_property(edge.properties_vec_mut(), key, name, visibility)
            }),
        };

        match removed {
            Some(true) => {
                record_store_operation("remove_property", "ok", started.elapsed());
                Ok(())
            }
            Some(false) => {
                record_store_operation("remove_property", "error", started.elapsed());
                Err(GraphStoreError::PropertyNotFound {
                    element_id: element.id.clone(),
                    key: key.to_string(),
                    name: name.to_string(),
                })
            }
            None => {
                record_store_operation("remove_property", "error", started.elapsed());
                Err(GraphStoreError::NotFound {
                    id: element.id.clone(),
                })
            }
        }
    }

    async fn save(
        &self,
        mutation: ElementMutation,
        _authorizations: &Authorizations,
    ) -> Result<Element> {
        let started = Instant::now();
        let element_ref = mutation.element().clone();
        let result = (|| match element_ref.kind {
            ElementKind::Vertex => {
                let mut entry = self.vertices.get_mut(&element_ref.id).ok_or_else(|| {
                    GraphStoreError::NotFound {
                        id: element_ref.id.clone(),
                    }
                })?;
                let vertex = entry.value_mut();
                Self::apply_to_properties(vertex.properties_vec_mut(), &mutation, &element_ref.id)?;
                if let Some(descriptor) = mutation.set_element_descriptor {
                    vertex.set_visibility_descriptor_value(Some(descriptor));
                }
                if let Some(visibility) = mutation.alter_element_visibility {
                    vertex.set_element_visibility(visibility);
                }
                Ok(Element::Vertex(vertex.clone()))
            }
            ElementKind::Edge => {
                let mut entry = self.edges.get_mut(&element_ref.id).ok_or_else(|| {
                    GraphStoreError::NotFound {
                        id: element_ref.id.clone(),
                    }
                })?;
                let edge = entry.value_mut();
                Self::apply_to_properties(edge.properties_vec_mut(), &mutation, &element_ref.id)?;
                if let Some(descriptor) = mutation.set_element_descriptor {
                    edge.set_visibility_descriptor_value(Some(descriptor));
                }
                if let Some(visibility) = mutation.alter_element_visibility {
                    edge.set_element_visibility(visibility);
                }
                Ok(Element::Edge(edge.clone()))
            }
        })();

        let status = if result.is_ok() { "ok" } else { "error" };
        record_store_operation("save", status, started.elapsed());
        result
    }

    async fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn remove_matching_property(
    properties: &mut Vec<Property>,
    key: &str,
    name: &str,
    visibility: &VisibilityLabel,
) -> bool {
    let before = properties.len();
    properties
        .retain(|property| !(property.matches(key, name) && property.visibility() == visibility));
    properties.len() != before
}

#[cfg(test)]
mod tests {
    use sandgraph_domain::{VisibilityDescriptor, WorkspaceId};
    use serde_json::json;

    use super::*;

    fn workspace() -> WorkspaceId {
        WorkspaceId::new("WORKSPACE_1")
    }

    fn member_auths() -> Authorizations {
        Authorizations::default().with_workspace(&workspace())
    }

    fn sandbox_label() -> VisibilityLabel {
        VisibilityLabel::from_terms(["WORKSPACE_1"])
    }

    #[tokio::test]
    async fn reads_enforce_element_and_property_labels() {
        let store = InMemoryGraphStore::new();
        let vertex = Vertex::new("v1", VisibilityLabel::public())
            .with_property(Property::new(
                "k1",
                "fullName",
                json!("Alice"),
                VisibilityLabel::public(),
            ))
            .with_property(Property::new(
                "k1",
                "notes",
                json!("draft"),
                sandbox_label(),
            ));
        store.insert_vertex(vertex);
        store.insert_vertex(Vertex::new("v2", sandbox_label()));

        let outsider_view = store
            .get_vertex("v1", &Authorizations::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outsider_view.properties().len(), 1);

        assert!(store
            .get_vertex("v2", &Authorizations::default())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .get_vertex("v2", &member_auths())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn save_applies_metadata_before_relabeling() {
        let store = InMemoryGraphStore::new();
        let descriptor = VisibilityDescriptor::sandboxed(workspace());
        let mut property = Property::new("k1", "fullName", json!("Alice"), sandbox_label());
        property.set_visibility_descriptor(&descriptor);
        store.insert_vertex(Vertex::new("v1", VisibilityLabel::public()).with_property(property));

        let vertex = store
            .get_vertex("v1", &member_auths())
            .await
            .unwrap()
            .unwrap();
        let property = &vertex.properties()[0];
        let reduced = descriptor.without_workspace(&workspace());
        let mutation = ElementMutation::new(vertex.element_ref())
            .alter_property_visibility(property, VisibilityLabel::public())
            .alter_property_metadata(
                property,
                sandgraph_domain::DESCRIPTOR_METADATA_KEY,
                reduced.encode(),
            );

        let saved = store.save(mutation, &member_auths()).await.unwrap();
        let saved_property = &saved.properties()[0];
        assert!(saved_property.visibility().is_public());
        assert_eq!(
            saved_property.visibility_descriptor().unwrap(),
            reduced
        );
    }

    #[tokio::test]
    async fn relabeling_onto_a_sibling_overwrites_it() {
        let store = InMemoryGraphStore::new();
        let vertex = Vertex::new("v1", VisibilityLabel::public())
            .with_property(Property::new(
                "k1",
                "fullName",
                json!("old"),
                VisibilityLabel::public(),
            ))
            .with_property(Property::new("k1", "fullName", json!("new"), sandbox_label()));
        store.insert_vertex(vertex);

        let vertex = store
            .get_vertex("v1", &member_auths())
            .await
            .unwrap()
            .unwrap();
        let sandboxed = vertex
            .properties()
            .iter()
            .find(|property| !property.visibility().is_public())
            .unwrap();
        let mutation = ElementMutation::new(vertex.element_ref())
            .alter_property_visibility(sandboxed, VisibilityLabel::public());

        let saved = store.save(mutation, &member_auths()).await.unwrap();
        assert_eq!(saved.properties().len(), 1);
        assert_eq!(saved.properties()[0].value(), &json!("new"));
    }

    #[tokio::test]
    async fn remove_property_targets_one_label_only() {
        let store = InMemoryGraphStore::new();
        let vertex = Vertex::new("v1", VisibilityLabel::public())
            .with_property(Property::new(
                "k1",
                "fullName",
                json!("public"),
                VisibilityLabel::public(),
            ))
            .with_property(Property::new(
                "k1",
                "fullName",
                json!("private"),
                sandbox_label(),
            ));
        store.insert_vertex(vertex);

        store
            .remove_property(
                &ElementRef::vertex("v1"),
                "k1",
                "fullName",
                &sandbox_label(),
                &member_auths(),
            )
            .await
            .unwrap();

        let vertex = store
            .get_vertex("v1", &member_auths())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(vertex.properties().len(), 1);
        assert_eq!(vertex.properties()[0].value(), &json!("public"));
    }

    #[tokio::test]
    async fn removing_a_vertex_drops_incident_edges() {
        let store = InMemoryGraphStore::new();
        store.insert_vertex(Vertex::new("v1", VisibilityLabel::public()));
        store.insert_vertex(Vertex::new("v2", VisibilityLabel::public()));
        store.insert_edge(Edge::new(
            "e1",
            "knows",
            "v1",
            "v2",
            VisibilityLabel::public(),
        ));

        store
            .remove_vertex("v1", &Authorizations::default())
            .await
            .unwrap();

        assert!(store
            .get_edge("e1", &Authorizations::default())
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.remove_vertex("v1", &Authorizations::default()).await,
            Err(GraphStoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn flush_is_counted() {
        let store = InMemoryGraphStore::new();
        store.flush().await.unwrap();
        store.flush().await.unwrap();
        assert_eq!(store.flush_count(), 2);
    }
}
