use std::collections::BTreeMap;

use sandgraph_domain::{VisibilityDescriptor, VisibilityLabel, DESCRIPTOR_METADATA_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single property entry on a graph element.
///
/// Multiple properties may share a name but differ by key. A workspace
/// edit that shadows a public value produces a second entry with the same
/// (key, name) under a different visibility label, so physical uniqueness
/// is (key, name, visibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    key: String,
    name: String,
    value: Value,
    visibility: VisibilityLabel,
    metadata: BTreeMap<String, Value>,
}

impl Property {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        value: Value,
        visibility: VisibilityLabel,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            value,
            visibility,
            metadata: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    pub fn set_metadata_value(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub(crate) fn set_visibility(&mut self, visibility: VisibilityLabel) {
        self.visibility = visibility;
    }

    /// The embedded visibility descriptor, if the reserved metadata key
    /// holds a well-formed one.
    pub fn visibility_descriptor(&self) -> Option<VisibilityDescriptor> {
        VisibilityDescriptor::decode(self.metadata.get(DESCRIPTOR_METADATA_KEY))
    }

    pub fn set_visibility_descriptor(&mut self, descriptor: &VisibilityDescriptor) {
        self.metadata
            .insert(DESCRIPTOR_METADATA_KEY.to_string(), descriptor.encode());
    }

    pub fn matches(&self, key: &str, name: &str) -> bool {
        self.key == key && self.name == name
    }
}

/// Which of the two element kinds an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::Edge => write!(f, "edge"),
        }
    }
}

/// Kind + id reference to an element, used to address mutations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: String,
}

impl ElementRef {
    pub fn vertex(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Vertex,
            id: id.into(),
        }
    }

    pub fn edge(id: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Edge,
            id: id.into(),
        }
    }
}

/// A graph vertex as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    id: String,
    visibility: VisibilityLabel,
    visibility_descriptor: Option<VisibilityDescriptor>,
    properties: Vec<Property>,
}

impl Vertex {
    pub fn new(id: impl Into<String>, visibility: VisibilityLabel) -> Self {
        Self {
            id: id.into(),
            visibility,
            visibility_descriptor: None,
            properties: Vec::new(),
        }
    }

    pub fn with_visibility_descriptor(mut self, descriptor: VisibilityDescriptor) -> Self {
        self.visibility_descriptor = Some(descriptor);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }

    pub fn visibility_descriptor(&self) -> Option<&VisibilityDescriptor> {
        self.visibility_descriptor.as_ref()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |property| property.name() == name)
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef::vertex(self.id.clone())
    }

    pub(crate) fn properties_vec_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    pub(crate) fn set_element_visibility(&mut self, visibility: VisibilityLabel) {
        self.visibility = visibility;
    }

    pub(crate) fn set_visibility_descriptor_value(
        &mut self,
        descriptor: Option<VisibilityDescriptor>,
    ) {
        self.visibility_descriptor = descriptor;
    }
}

/// A graph edge as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    id: String,
    label: String,
    source_id: String,
    dest_id: String,
    visibility: VisibilityLabel,
    visibility_descriptor: Option<VisibilityDescriptor>,
    properties: Vec<Property>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        source_id: impl Into<String>,
        dest_id: impl Into<String>,
        visibility: VisibilityLabel,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source_id: source_id.into(),
            dest_id: dest_id.into(),
            visibility,
            visibility_descriptor: None,
            properties: Vec::new(),
        }
    }

    pub fn with_visibility_descriptor(mut self, descriptor: VisibilityDescriptor) -> Self {
        self.visibility_descriptor = Some(descriptor);
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Relationship label of this edge.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn dest_id(&self) -> &str {
        &self.dest_id
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }

    pub fn visibility_descriptor(&self) -> Option<&VisibilityDescriptor> {
        self.visibility_descriptor.as_ref()
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef::edge(self.id.clone())
    }

    pub(crate) fn properties_vec_mut(&mut self) -> &mut Vec<Property> {
        &mut self.properties
    }

    pub(crate) fn set_element_visibility(&mut self, visibility: VisibilityLabel) {
        self.visibility = visibility;
    }

    pub(crate) fn set_visibility_descriptor_value(
        &mut self,
        descriptor: Option<VisibilityDescriptor>,
    ) {
        self.visibility_descriptor = descriptor;
    }
}

/// A graph element: vertex or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    pub fn id(&self) -> &str {
        match self {
            Self::Vertex(vertex) => vertex.id(),
            Self::Edge(edge) => edge.id(),
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Vertex(_) => ElementKind::Vertex,
            Self::Edge(_) => ElementKind::Edge,
        }
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        match self {
            Self::Vertex(vertex) => vertex.visibility(),
            Self::Edge(edge) => edge.visibility(),
        }
    }

    pub fn visibility_descriptor(&self) -> Option<&VisibilityDescriptor> {
        match self {
            Self::Vertex(vertex) => vertex.visibility_descriptor(),
            Self::Edge(edge) => edge.visibility_descriptor(),
        }
    }

    pub fn properties(&self) -> &[Property] {
        match self {
            Self::Vertex(vertex) => vertex.properties(),
            Self::Edge(edge) => edge.properties(),
        }
    }

    pub fn element_ref(&self) -> ElementRef {
        match self {
            Self::Vertex(vertex) => vertex.element_ref(),
            Self::Edge(edge) => edge.element_ref(),
        }
    }

    pub fn into_vertex(self) -> Option<Vertex> {
        match self {
            Self::Vertex(vertex) => Some(vertex),
            Self::Edge(_) => None,
        }
    }

    pub fn into_edge(self) -> Option<Edge> {
        match self {
            Self::Edge(edge) => Some(edge),
            Self::Vertex(_) => None,
        }
    }
}
