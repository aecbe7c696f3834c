use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::workspace::WorkspaceId;

/// Reserved metadata key under which a property's visibility descriptor
/// is embedded.
pub const DESCRIPTOR_METADATA_KEY: &str = "visibilityDescriptor";

/// JSON field holding the workspace id list inside a descriptor.
pub const JSON_WORKSPACES: &str = "workspaces";

/// The structured, workspace-aware visibility metadata from which the
/// enforced access-control label is derived.
///
/// An empty workspace set means the item is public. A non-empty set means
/// the item is sandboxed to those workspaces (normally exactly one).
/// Fields other than `workspaces` (such as the user-chosen visibility
/// source) are carried opaquely through encode/decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityDescriptor {
    #[serde(default)]
    pub workspaces: Vec<WorkspaceId>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl VisibilityDescriptor {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn sandboxed(workspace_id: WorkspaceId) -> Self {
        Self {
            workspaces: vec![workspace_id],
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.workspaces.is_empty()
    }

    pub fn contains_workspace(&self, workspace_id: &WorkspaceId) -> bool {
        self.workspaces.contains(workspace_id)
    }

    /// Strip one workspace membership, used during publish.
    pub fn without_workspace(&self, workspace_id: &WorkspaceId) -> Self {
        Self {
            workspaces: self
                .workspaces
                .iter()
                .filter(|id| *id != workspace_id)
                .cloned()
                .collect(),
            extra: self.extra.clone(),
        }
    }

    pub fn add_workspace(&mut self, workspace_id: WorkspaceId) {
        if !self.workspaces.contains(&workspace_id) {
            self.workspaces.push(workspace_id);
        }
    }

    /// The user-chosen visibility source component, if any.
    pub fn source(&self) -> Option<&str> {
        self.extra.get("source").and_then(Value::as_str)
    }

    pub fn set_source(&mut self, source: impl Into<String>) {
        self.extra
            .insert("source".to_string(), Value::String(source.into()));
    }

    /// Decode a descriptor from its embedded JSON form.
    ///
    /// Absent or malformed input yields `None` ("no descriptor"), which is
    /// distinct from an empty workspace set. Callers skip such items rather
    /// than misclassify them as public edits.
    pub fn decode(value: Option<&Value>) -> Option<Self> {
        let value = value?;
        match serde_json::from_value::<Self>(value.clone()) {
            Ok(descriptor) => Some(descriptor),
            Err(error) => {
                tracing::debug!(error = %error, "skipping malformed visibility descriptor");
                None
            }
        }
    }

    pub fn encode(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Null)
    }
}

/// Opaque visibility label enforced by the graph store's access checks.
///
/// The engine never inspects a label; it only compares, clones, and hands
/// labels back to the store. Store backends read the required authorization
/// terms to gate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisibilityLabel {
    required: BTreeSet<String>,
}

impl VisibilityLabel {
    /// The bare public label: readable by anyone.
    pub fn public() -> Self {
        Self::default()
    }

    pub fn from_terms<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            required: terms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.required.is_empty()
    }

    /// Authorization terms a reader must hold, all of them, to see an item
    /// carrying this label. Consumed by store backends only.
    pub fn required_terms(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }
}

impl std::fmt::Display for VisibilityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for term in &self.required {
            if !first {
                f.write_str("&")?;
            }
            f.write_str(term)?;
            first = false;
        }
        Ok(())
    }
}

/// The visibility-label translation algebra.
///
/// Turns a structured descriptor into the opaque label the store enforces.
/// Production deployments plug in their own translator; the default one is
/// deterministic and sufficient for embedded stores.
pub trait VisibilityTranslator: Send + Sync {
    fn to_visibility(&self, descriptor: &VisibilityDescriptor) -> VisibilityLabel;
}

/// Deterministic translator: one required term per sandboxing workspace,
/// plus the visibility source term when one is set.
#[derive(Debug, Default, Clone)]
pub struct DefaultVisibilityTranslator;

impl VisibilityTranslator for DefaultVisibilityTranslator {
    fn to_visibility(&self, descriptor: &VisibilityDescriptor) -> VisibilityLabel {
        let mut terms: Vec<String> = descriptor
            .workspaces
            .iter()
            .map(|id| id.as_str().to_string())
            .collect();
        if let Some(source) = descriptor.source() {
            if !source.is_empty() {
                terms.push(source.to_string());
            }
        }
        VisibilityLabel::from_terms(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_missing_descriptor_is_none() {
        assert_eq!(VisibilityDescriptor::decode(None), None);
    }

    #[test]
    fn decode_malformed_descriptor_is_none() {
        let value = json!({ "workspaces": "not-an-array" });
        assert_eq!(VisibilityDescriptor::decode(Some(&value)), None);
    }

    #[test]
    fn decode_empty_set_is_public_not_absent() {
        let value = json!({ "workspaces": [] });
        let descriptor = VisibilityDescriptor::decode(Some(&value)).expect("descriptor");
        assert!(descriptor.is_public());
        assert!(descriptor.encode().get(JSON_WORKSPACES).is_some());
    }

    #[test]
    fn extra_fields_round_trip() {
        let value = json!({ "workspaces": ["w1"], "source": "CONFIDENTIAL" });
        let descriptor = VisibilityDescriptor::decode(Some(&value)).expect("descriptor");
        assert_eq!(descriptor.source(), Some("CONFIDENTIAL"));
        assert_eq!(descriptor.encode(), value);
    }

    #[test]
    fn without_workspace_strips_one_membership() {
        let mut descriptor = VisibilityDescriptor::sandboxed(WorkspaceId::new("w1"));
        descriptor.add_workspace(WorkspaceId::new("w2"));

        let reduced = descriptor.without_workspace(&WorkspaceId::new("w1"));
        assert!(!reduced.contains_workspace(&WorkspaceId::new("w1")));
        assert!(reduced.contains_workspace(&WorkspaceId::new("w2")));
    }

    #[test]
    fn default_translator_public_descriptor_is_bare_label() {
        let translator = DefaultVisibilityTranslator;
        let label = translator.to_visibility(&VisibilityDescriptor::public());
        assert!(label.is_public());
        assert_eq!(label.to_string(), "");
    }

    #[test]
    fn default_translator_requires_workspace_terms() {
        let translator = DefaultVisibilityTranslator;
        let label =
            translator.to_visibility(&VisibilityDescriptor::sandboxed(WorkspaceId::new("w1")));
        assert!(!label.is_public());
        assert_eq!(label.required_terms().collect::<Vec<_>>(), vec!["w1"]);
    }
}
