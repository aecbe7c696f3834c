//! Derived annotation records: term mentions and detected objects.
//!
//! Both are keyed by the row-key property of the vertex they were derived
//! for. When a has-image edge (or any edge resolving an annotation) is
//! published, the annotation's visibility label must follow the edge's.

use async_trait::async_trait;
use dashmap::DashMap;
use sandgraph_audit::SystemAuditContext;
use sandgraph_domain::VisibilityLabel;
use serde_json::Value;
use thiserror::Error;

/// Annotation store specific errors
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("annotation record not found: {row_key}")]
    NotFound { row_key: String },

    #[error("annotation store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;

/// A term mention derived from text of an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct TermMentionRecord {
    row_key: String,
    artifact_vertex_id: String,
    visibility: VisibilityLabel,
}

impl TermMentionRecord {
    pub fn new(
        row_key: impl Into<String>,
        artifact_vertex_id: impl Into<String>,
        visibility: VisibilityLabel,
    ) -> Self {
        Self {
            row_key: row_key.into(),
            artifact_vertex_id: artifact_vertex_id.into(),
            visibility,
        }
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn artifact_vertex_id(&self) -> &str {
        &self.artifact_vertex_id
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }
}

/// An object detected inside an artifact (image or video frame).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObjectRecord {
    row_key: String,
    artifact_vertex_id: String,
    visibility: VisibilityLabel,
    data: Value,
}

impl DetectedObjectRecord {
    pub fn new(
        row_key: impl Into<String>,
        artifact_vertex_id: impl Into<String>,
        visibility: VisibilityLabel,
        data: Value,
    ) -> Self {
        Self {
            row_key: row_key.into(),
            artifact_vertex_id: artifact_vertex_id.into(),
            visibility,
            data,
        }
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn artifact_vertex_id(&self) -> &str {
        &self.artifact_vertex_id
    }

    pub fn visibility(&self) -> &VisibilityLabel {
        &self.visibility
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// Term mention store seam. Lookups run under the system context: the
/// engine corrects annotation visibility regardless of who triggered the
/// publish.
#[async_trait]
pub trait TermMentionRepository: Send + Sync {
    async fn find_by_row_key(
        &self,
        row_key: &str,
        context: &SystemAuditContext,
    ) -> Result<Option<TermMentionRecord>>;

    async fn update_visibility(
        &self,
        record: &TermMentionRecord,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
    ) -> Result<()>;
}

/// Detected object store seam.
#[async_trait]
pub trait DetectedObjectRepository: Send + Sync {
    async fn find_by_row_key(
        &self,
        row_key: &str,
        context: &SystemAuditContext,
    ) -> Result<Option<DetectedObjectRecord>>;

    async fn find_by_artifact(
        &self,
        artifact_vertex_id: &str,
        context: &SystemAuditContext,
    ) -> Result<Vec<DetectedObjectRecord>>;

    async fn update_visibility(
        &self,
        record: &DetectedObjectRecord,
        old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
    ) -> Result<()>;
}

/// In-process term mention store.
#[derive(Debug, Default)]
pub struct InMemoryTermMentionRepository {
    records: DashMap<String, TermMentionRecord>,
}

impl InMemoryTermMentionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: TermMentionRecord) {
        self.records.insert(record.row_key().to_string(), record);
    }
}

#[async_trait]
impl TermMentionRepository for InMemoryTermMentionRepository {
    async fn find_by_row_key(
        &self,
        row_key: &str,
        _context: &SystemAuditContext,
    ) -> Result<Option<TermMentionRecord>> {
        Ok(self.records.get(row_key).map(|entry| entry.value().clone()))
    }

    async fn update_visibility(
        &self,
        record: &TermMentionRecord,
        _old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
    ) -> Result<()> {
        let mut entry =
            self.records
                .get_mut(record.row_key())
                .ok_or_else(|| AnnotationError::NotFound {
                    row_key: record.row_key().to_string(),
                })?;
        entry.visibility = new_visibility.clone();
        Ok(())
    }
}

/// In-process detected object store.
#[derive(Debug, Default)]
pub struct InMemoryDetectedObjectRepository {
    records: DashMap<String, DetectedObjectRecord>,
}

impl InMemoryDetectedObjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: DetectedObjectRecord) {
        self.records.insert(record.row_key().to_string(), record);
    }
}

#[async_trait]
impl DetectedObjectRepository for InMemoryDetectedObjectRepository {
    async fn find_by_row_key(
        &self,
        row_key: &str,
        _context: &SystemAuditContext,
    ) -> Result<Option<DetectedObjectRecord>> {
        Ok(self.records.get(row_key).map(|entry| entry.value().clone()))
    }

    async fn find_by_artifact(
        &self,
        artifact_vertex_id: &str,
        _context: &SystemAuditContext,
    ) -> Result<Vec<DetectedObjectRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| entry.artifact_vertex_id() == artifact_vertex_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn update_visibility(
        &self,
        record: &DetectedObjectRecord,
        _old_visibility: &VisibilityLabel,
        new_visibility: &VisibilityLabel,
    ) -> Result<()> {
        let mut entry =
            self.records
                .get_mut(record.row_key())
                .ok_or_else(|| AnnotationError::NotFound {
                    row_key: record.row_key().to_string(),
                })?;
        entry.visibility = new_visibility.clone();
        Ok(())
    }
}
