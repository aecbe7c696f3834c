use serde::{Deserialize, Serialize};

/// Identifier of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkspaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A graph vertex staged inside a workspace, with the user-set
/// "visible" flag controlling whether it shows on the workspace canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEntity {
    entity_vertex_id: String,
    visible: bool,
}

impl WorkspaceEntity {
    pub fn new(entity_vertex_id: impl Into<String>, visible: bool) -> Self {
        Self {
            entity_vertex_id: entity_vertex_id.into(),
            visible,
        }
    }

    pub fn entity_vertex_id(&self) -> &str {
        &self.entity_vertex_id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// A private scratch context in which an analyst stages graph edits
/// before publication.
///
/// Not versioned; deleting a workspace is dropping the value. Membership
/// is an ordered set keyed by entity vertex id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    id: WorkspaceId,
    title: String,
    created_by: String,
    entities: Vec<WorkspaceEntity>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, title: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            created_by: created_by.into(),
            entities: Vec::new(),
        }
    }

    pub fn id(&self) -> &WorkspaceId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn entities(&self) -> &[WorkspaceEntity] {
        &self.entities
    }

    /// Add an entity to the workspace. Re-adding an existing entity
    /// updates its visible flag instead of duplicating the membership.
    pub fn add_entity(&mut self, entity_vertex_id: impl Into<String>, visible: bool) {
        let entity_vertex_id = entity_vertex_id.into();
        if let Some(existing) = self
            .entities
            .iter_mut()
            .find(|entity| entity.entity_vertex_id == entity_vertex_id)
        {
            existing.visible = visible;
            return;
        }
        self.entities
            .push(WorkspaceEntity::new(entity_vertex_id, visible));
    }

    /// Remove an entity from the workspace. Returns true if it was a member.
    pub fn remove_entity(&mut self, entity_vertex_id: &str) -> bool {
        let before = self.entities.len();
        self.entities
            .retain(|entity| entity.entity_vertex_id != entity_vertex_id);
        self.entities.len() != before
    }

    pub fn set_entity_visible(&mut self, entity_vertex_id: &str, visible: bool) -> bool {
        match self
            .entities
            .iter_mut()
            .find(|entity| entity.entity_vertex_id == entity_vertex_id)
        {
            Some(entity) => {
                entity.visible = visible;
                true
            }
            None => false,
        }
    }
}
