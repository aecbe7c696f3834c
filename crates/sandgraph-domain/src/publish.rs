use serde::{Deserialize, Serialize};

use crate::sandbox_status::SandboxStatus;

/// What a publish batch item asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishAction {
    Publish,
    Delete,
}

/// The graph item a publish request targets, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PublishTarget {
    Vertex {
        #[serde(rename = "vertexId")]
        vertex_id: String,
    },
    Relationship {
        #[serde(rename = "edgeId")]
        edge_id: String,
        #[serde(rename = "sourceId")]
        source_id: String,
        #[serde(rename = "destId")]
        dest_id: String,
    },
    Property {
        #[serde(rename = "vertexId")]
        vertex_id: String,
        key: String,
        name: String,
    },
}

impl PublishTarget {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Vertex { .. } => "vertex",
            Self::Relationship { .. } => "relationship",
            Self::Property { .. } => "property",
        }
    }

    /// Identifier of the element this item resolves through: the vertex id
    /// for vertex and property items, the edge id for relationships.
    pub fn element_id(&self) -> &str {
        match self {
            Self::Vertex { vertex_id } => vertex_id,
            Self::Relationship { edge_id, .. } => edge_id,
            Self::Property { vertex_id, .. } => vertex_id,
        }
    }
}

/// One caller-supplied entry of a publish batch.
///
/// `status` echoes the item's current sandbox status as the caller last saw
/// it; it is validated against live graph state before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequestItem {
    #[serde(flatten)]
    pub target: PublishTarget,
    pub action: PublishAction,
    pub status: SandboxStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vertex_item_wire_shape() {
        let item: PublishRequestItem = serde_json::from_value(json!({
            "type": "vertex",
            "action": "publish",
            "status": "PRIVATE",
            "vertexId": "v1",
        }))
        .expect("deserialize");

        assert_eq!(
            item.target,
            PublishTarget::Vertex {
                vertex_id: "v1".to_string()
            }
        );
        assert_eq!(item.action, PublishAction::Publish);
        assert_eq!(item.status, SandboxStatus::Private);
    }

    #[test]
    fn relationship_item_wire_shape() {
        let item: PublishRequestItem = serde_json::from_value(json!({
            "type": "relationship",
            "action": "delete",
            "status": "PRIVATE",
            "edgeId": "e1",
            "sourceId": "v1",
            "destId": "v2",
        }))
        .expect("deserialize");

        assert_eq!(item.target.type_name(), "relationship");
        assert_eq!(item.target.element_id(), "e1");
        assert_eq!(item.action, PublishAction::Delete);
    }

    #[test]
    fn property_item_round_trips() {
        let item = PublishRequestItem {
            target: PublishTarget::Property {
                vertex_id: "v1".to_string(),
                key: "k1".to_string(),
                name: "fullName".to_string(),
            },
            action: PublishAction::Publish,
            status: SandboxStatus::Partial,
        };

        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value.get("type").and_then(|v| v.as_str()), Some("property"));
        assert_eq!(value.get("vertexId").and_then(|v| v.as_str()), Some("v1"));
        let back: PublishRequestItem = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, item);
    }
}
