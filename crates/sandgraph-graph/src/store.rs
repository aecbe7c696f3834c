use async_trait::async_trait;
use sandgraph_domain::{Authorizations, VisibilityLabel};

use crate::{
    error::Result,
    mutation::ElementMutation,
    types::{Edge, Element, ElementRef, Vertex},
};

/// The graph storage engine seam.
///
/// Backends are remote services in production; all calls are async I/O.
/// A single `save` is atomic at the store. `flush` is a durability and
/// read-visibility barrier: writes issued before it are visible to reads
/// issued after it returns.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Resolve a vertex under the caller's authorizations. `None` means
    /// missing or not readable; the two are indistinguishable by design.
    async fn get_vertex(&self, vertex_id: &str, authorizations: &Authorizations)
        -> Result<Option<Vertex>>;

    async fn get_edge(&self, edge_id: &str, authorizations: &Authorizations)
        -> Result<Option<Edge>>;

    async fn remove_vertex(&self, vertex_id: &str, authorizations: &Authorizations) -> Result<()>;

    async fn remove_edge(&self, edge_id: &str, authorizations: &Authorizations) -> Result<()>;

    /// Remove the property identified by (key, name) whose visibility label
    /// equals `visibility`. Visibility siblings with the same (key, name)
    /// under other labels are untouched.
    async fn remove_property(
        &self,
        element: &ElementRef,
        key: &str,
        name: &str,
        visibility: &VisibilityLabel,
        authorizations: &Authorizations,
    ) -> Result<()>;

    /// Apply a pending mutation atomically and return the updated element.
    async fn save(&self, mutation: ElementMutation, authorizations: &Authorizations)
        -> Result<Element>;

    /// Durability / read-visibility barrier.
    async fn flush(&self) -> Result<()>;
}
