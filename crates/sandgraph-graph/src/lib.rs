pub mod error;
mod memory;
mod metrics;
mod mutation;
mod sandbox;
mod store;
mod types;

pub use error::{GraphStoreError, Result};
pub use sandgraph_domain::Authorizations;
pub use memory::InMemoryGraphStore;
pub use mutation::ElementMutation;
pub use sandbox::{
    edge_sandbox_status, element_sandbox_status, find_existing_property,
    property_sandbox_statuses, vertex_sandbox_status,
};
pub use store::GraphStore;
pub use types::{Edge, Element, ElementKind, ElementRef, Property, Vertex};
