//! Structural paths for addressing blocks inside a document
//!
//! Provides [`BlockPath`] for locating a block within the current tree shape.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between path segments
///
/// Never valid inside a segment: indices are decimal digits and slot names
/// are plain identifiers.
pub const SEPARATOR: char = '.';

/// Named child list of a container block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// `blocks` of card, dialog, form and query-provider
    Blocks,
    /// `leftBlocks` of two-columns
    LeftBlocks,
    /// `rightBlocks` of two-columns
    RightBlocks,
}

impl Slot {
    /// Name used in paths and in the serialized document
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::LeftBlocks => "leftBlocks",
            Self::RightBlocks => "rightBlocks",
        }
    }

    /// Look up a slot by its name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blocks" => Some(Self::Blocks),
            "leftBlocks" => Some(Self::LeftBlocks),
            "rightBlocks" => Some(Self::RightBlocks),
            _ => None,
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a block path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Position inside a child list
    Index(usize),
    /// Named child list
    Slot(Slot),
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Slot> for Segment {
    fn from(slot: Slot) -> Self {
        Self::Slot(slot)
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Slot(slot) => f.write_str(slot.as_str()),
        }
    }
}

/// Path of a block within the current document shape
///
/// Derived on every compile pass and never persisted. A path is only valid
/// for the tree it was computed against.
///
/// # Examples
/// - `0` → first top-level block
/// - `1.leftBlocks.0` → first block of the left column of the second block
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockPath(String);

impl BlockPath {
    /// Empty path (document root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Raw string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a segment, returning new path
    #[must_use]
    pub fn append(&self, segment: impl Into<Segment>) -> Self {
        let mut new = self.clone();
        new.push(segment.into());
        new
    }

    /// Append multiple segments, returning new path
    #[must_use]
    pub fn append_all(&self, segments: &[Segment]) -> Self {
        let mut new = self.clone();
        for segment in segments {
            new.push(*segment);
        }
        new
    }

    /// Path of the `index`-th block inside `slot` of this block
    #[inline]
    #[must_use]
    pub fn child(&self, slot: Slot, index: usize) -> Self {
        self.append_all(&[Segment::Slot(slot), Segment::Index(index)])
    }

    fn push(&mut self, segment: Segment) {
        if !self.0.is_empty() {
            self.0.push(SEPARATOR);
        }
        self.0.push_str(&segment.to_string());
    }

    /// Decode segments from root to leaf
    ///
    /// # Errors
    /// Returns error if a segment is neither an index nor a known slot
    pub fn segments(&self) -> Result<Vec<Segment>, PathError> {
        if self.0.is_empty() {
            return Ok(Vec::new());
        }
        self.0.split(SEPARATOR).map(parse_segment).collect()
    }

    /// Check if this path is a strict ancestor of another
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        if self.0.is_empty() {
            return !other.0.is_empty();
        }
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(SEPARATOR)
    }
}

fn parse_segment(raw: &str) -> Result<Segment, PathError> {
    if raw.is_empty() {
        return Err(PathError::EmptySegment);
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw
            .parse()
            .map(Segment::Index)
            .map_err(|_| PathError::InvalidSegment(raw.to_string()));
    }
    Slot::from_name(raw)
        .map(Segment::Slot)
        .ok_or_else(|| PathError::InvalidSegment(raw.to_string()))
}

impl Display for BlockPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BlockPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = Self(s.to_string());
        path.segments()?;
        Ok(path)
    }
}

/// Errors related to block paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Segment is neither an index nor a slot name
    #[error("invalid segment: {0} (must be an index or a slot name)")]
    InvalidSegment(String),
}
