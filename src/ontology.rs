use async_trait::async_trait;
use dashmap::DashMap;

/// The slice of an ontology property definition the publish decision
/// needs: whether the property is shown to (and edited by) users.
///
/// Non-user-visible properties ride along with their owning element when
/// it is published; user-visible ones are published item by item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyProperty {
    name: String,
    user_visible: bool,
}

impl OntologyProperty {
    pub fn new(name: impl Into<String>, user_visible: bool) -> Self {
        Self {
            name: name.into(),
            user_visible,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_visible(&self) -> bool {
        self.user_visible
    }
}

/// Ontology metadata lookup seam.
#[async_trait]
pub trait OntologyRepository: Send + Sync {
    /// Resolve a property definition by name. `None` means the ontology
    /// has no such property.
    async fn property_by_name(&self, name: &str) -> Option<OntologyProperty>;
}

/// In-process ontology registry for tests and embedders.
#[derive(Debug, Default)]
pub struct InMemoryOntologyRepository {
    properties: DashMap<String, OntologyProperty>,
}

impl InMemoryOntologyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&self, property: OntologyProperty) {
        self.properties.insert(property.name().to_string(), property);
    }
}

#[async_trait]
impl OntologyRepository for InMemoryOntologyRepository {
    async fn property_by_name(&self, name: &str) -> Option<OntologyProperty> {
        self.properties.get(name).map(|entry| entry.value().clone())
    }
}
