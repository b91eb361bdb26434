//! Node and document identifiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a document instance.
/// Uses UUID v4 so handles from two documents can never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random DocumentId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for DocumentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Handle to a node slot in a document's arena.
///
/// The generation is bumped every time a slot is freed, so a handle that
/// outlives its node resolves to nothing instead of to the slot's next tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    document: DocumentId,
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(document: DocumentId, index: u32, generation: u32) -> Self {
        Self {
            document,
            index,
            generation,
        }
    }

    /// The document whose arena this handle points into
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Slot index in the arena
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}
