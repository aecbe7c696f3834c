use thiserror::Error;

/// Graph store specific errors
#[derive(Error, Debug)]
pub enum GraphStoreError {
    /// Referenced element does not exist (or is not readable)
    #[error("element not found: {id}")]
    NotFound { id: String },

    /// Referenced property does not exist on the element
    #[error("no property with key '{key}' and name '{name}' on element '{element_id}'")]
    PropertyNotFound {
        element_id: String,
        key: String,
        name: String,
    },

    /// A mutation addressed an element of the wrong kind
    #[error("element '{id}' is not a {expected}")]
    KindMismatch { id: String, expected: &'static str },

    /// Underlying store I/O failure
    #[error("graph store unavailable: {0}")]
    Unavailable(String),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, GraphStoreError>;
