use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{visibility::VisibilityLabel, workspace::WorkspaceId};

/// The authorization terms a caller holds.
///
/// Store backends gate reads on these: an item is readable iff the caller
/// holds every term its visibility label requires. The engine itself never
/// evaluates labels against authorizations; it passes both through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizations {
    terms: BTreeSet<String>,
}

impl Authorizations {
    pub fn new<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }

    /// Authorizations for a user working inside a workspace: their own
    /// terms plus the workspace id.
    pub fn with_workspace(mut self, workspace_id: &WorkspaceId) -> Self {
        self.terms.insert(workspace_id.as_str().to_string());
        self
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Whether an item carrying `label` is readable under these terms.
    pub fn can_read(&self, label: &VisibilityLabel) -> bool {
        label.required_terms().all(|term| self.terms.contains(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_label_is_readable_by_anyone() {
        let auths = Authorizations::default();
        assert!(auths.can_read(&VisibilityLabel::public()));
    }

    #[test]
    fn sandboxed_label_requires_the_workspace_term() {
        let label = VisibilityLabel::from_terms(["w1"]);
        assert!(!Authorizations::default().can_read(&label));
        assert!(Authorizations::default()
            .with_workspace(&WorkspaceId::new("w1"))
            .can_read(&label));
    }
}
