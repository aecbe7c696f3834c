use serde::{Deserialize, Serialize};

/// Classification of an element or property relative to a workspace.
///
/// Derived, never stored; recomputed from the item's visibility descriptor
/// and the requesting workspace id every time it is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SandboxStatus {
    /// Visible to everyone; no workspace holds a private edit.
    Public,
    /// Visible only inside the given workspace.
    Private,
    /// The workspace has shadowed a public value with a private edit.
    Partial,
}

impl std::fmt::Display for SandboxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::Private => write!(f, "PRIVATE"),
            Self::Partial => write!(f, "PARTIAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_are_uppercase() {
        assert_eq!(
            serde_json::to_string(&SandboxStatus::Public).unwrap(),
            "\"PUBLIC\""
        );
        assert_eq!(
            serde_json::from_str::<SandboxStatus>("\"PARTIAL\"").unwrap(),
            SandboxStatus::Partial
        );
        assert_eq!(SandboxStatus::Private.to_string(), "PRIVATE");
    }
}
