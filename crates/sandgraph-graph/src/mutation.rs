use sandgraph_domain::{VisibilityDescriptor, VisibilityLabel};
use serde_json::Value;

use crate::types::{ElementRef, Property};

/// A pending change to one property's visibility label. The property is
/// addressed by (key, name, current visibility) since visibility siblings
/// share (key, name).
#[derive(Debug, Clone)]
pub(crate) struct PropertyVisibilityChange {
    pub key: String,
    pub name: String,
    pub current_visibility: VisibilityLabel,
    pub new_visibility: VisibilityLabel,
}

/// A pending change to one entry of a property's metadata map.
#[derive(Debug, Clone)]
pub(crate) struct PropertyMetadataChange {
    pub key: String,
    pub name: String,
    pub current_visibility: VisibilityLabel,
    pub metadata_key: String,
    pub value: Value,
}

/// Field-level changes to an existing element, collected first and applied
/// by the store in one atomic `save` call.
///
/// This is the "pending mutation" value: distinct from the applied element
/// so unsaved state cannot leak. Building one performs no I/O.
#[derive(Debug, Clone)]
pub struct ElementMutation {
    element: ElementRef,
    pub(crate) alter_element_visibility: Option<VisibilityLabel>,
    pub(crate) set_element_descriptor: Option<VisibilityDescriptor>,
    pub(crate) property_visibility_changes: Vec<PropertyVisibilityChange>,
    pub(crate) property_metadata_changes: Vec<PropertyMetadataChange>,
    pub(crate) set_properties: Vec<Property>,
}

impl ElementMutation {
    pub fn new(element: ElementRef) -> Self {
        Self {
            element,
            alter_element_visibility: None,
            set_element_descriptor: None,
            property_visibility_changes: Vec::new(),
            property_metadata_changes: Vec::new(),
            set_properties: Vec::new(),
        }
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    /// Replace the element's enforced visibility label.
    pub fn alter_element_visibility(mut self, visibility: VisibilityLabel) -> Self {
        self.alter_element_visibility = Some(visibility);
        self
    }

    /// Replace the element's visibility descriptor.
    pub fn set_visibility_descriptor(mut self, descriptor: VisibilityDescriptor) -> Self {
        self.set_element_descriptor = Some(descriptor);
        self
    }

    /// Replace the visibility label of the property identified by
    /// (key, name, current visibility).
    pub fn alter_property_visibility(
        mut self,
        property: &Property,
        visibility: VisibilityLabel,
    ) -> Self {
        self.property_visibility_changes.push(PropertyVisibilityChange {
            key: property.key().to_string(),
            name: property.name().to_string(),
            current_visibility: property.visibility().clone(),
            new_visibility: visibility,
        });
        self
    }

    /// Replace one metadata entry of the property identified by
    /// (key, name, current visibility).
    pub fn alter_property_metadata(
        mut self,
        property: &Property,
        metadata_key: impl Into<String>,
        value: Value,
    ) -> Self {
        self.property_metadata_changes.push(PropertyMetadataChange {
            key: property.key().to_string(),
            name: property.name().to_string(),
            current_visibility: property.visibility().clone(),
            metadata_key: metadata_key.into(),
            value,
        });
        self
    }

    /// Set (add or replace by key+name+visibility) a property.
    pub fn set_property(mut self, property: Property) -> Self {
        self.set_properties.push(property);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.alter_element_visibility.is_none()
            && self.set_element_descriptor.is_none()
            && self.property_visibility_changes.is_empty()
            && self.property_metadata_changes.is_empty()
            && self.set_properties.is_empty()
    }
}
