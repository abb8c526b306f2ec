//! Error types for the document model
//!
//! Provides error handling for:
//! - Path navigation and in-place edits
//! - Document loading and id validation

use crate::block::BlockType;
use crate::path::{BlockPath, PathError, Segment, Slot};

/// Errors while addressing or replacing a block by path
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Root path does not address a block
    #[error("the root path does not address a block")]
    RootPath,

    /// Path string could not be decoded
    #[error("malformed path: {0}")]
    Malformed(#[from] PathError),

    /// Segment of the wrong kind at this position
    #[error("unexpected segment '{segment}' in path '{path}'")]
    UnexpectedSegment { path: BlockPath, segment: Segment },

    /// Index past the end of a child list
    #[error("index {index} out of bounds (len {len}) in path '{path}'")]
    IndexOutOfBounds {
        path: BlockPath,
        index: usize,
        len: usize,
    },

    /// Block has no such child list
    #[error("block '{block_type}' has no slot '{slot}' in path '{path}'")]
    NoSuchSlot {
        path: BlockPath,
        slot: Slot,
        block_type: BlockType,
    },

    /// Path ends on a slot instead of a block
    #[error("path '{0}' ends on a slot, not a block")]
    DanglingSlot(BlockPath),
}

impl EditError {
    /// Create index out of bounds error
    pub fn out_of_bounds(path: &BlockPath, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            path: path.clone(),
            index,
            len,
        }
    }
}

/// Errors while loading or validating a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Serialized document does not match the block shape
    #[error("invalid document: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Field or query id is empty or uses disallowed characters
    #[error("invalid id '{id}' at '{path}' (must be non-empty ASCII alphanumeric, '_' or '-')")]
    InvalidId { path: BlockPath, id: String },

    /// Two fields of one form share an id
    #[error("duplicate field id '{id}' at '{path}'")]
    DuplicateFieldId { path: BlockPath, id: String },

    /// Two queries of one provider share an id
    #[error("duplicate query id '{id}' at '{path}'")]
    DuplicateQueryId { path: BlockPath, id: String },
}
