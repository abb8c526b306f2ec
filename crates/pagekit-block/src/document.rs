//! Page documents
//!
//! A [`Document`] is the ordered list of top-level blocks. It is immutable
//! while a page is live; the authoring surface replaces whole blocks at a
//! [`BlockPath`] and leaves siblings untouched.

use crate::block::{Block, BlockType};
use crate::error::{DocumentError, EditError};
use crate::path::{BlockPath, Segment};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Declarative page document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Top-level blocks
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Document {
    /// Create document from top-level blocks
    #[inline]
    #[must_use]
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Parse serialized document
    ///
    /// # Errors
    /// Returns error if the JSON does not match the block shape
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Block addressed by `path`
    ///
    /// # Errors
    /// Returns error if the path does not address a block of this document
    pub fn get(&self, path: &BlockPath) -> Result<&Block, EditError> {
        let mut segments = path.segments()?.into_iter();
        let Some(first) = segments.next() else {
            return Err(EditError::RootPath);
        };
        let mut block = index_into(&self.blocks, Some(first), path)?;
        while let Some(segment) = segments.next() {
            let Segment::Slot(slot) = segment else {
                return Err(EditError::UnexpectedSegment {
                    path: path.clone(),
                    segment,
                });
            };
            let list = block.slot(slot).ok_or_else(|| EditError::NoSuchSlot {
                path: path.clone(),
                slot,
                block_type: block.block_type(),
            })?;
            block = index_into(list, segments.next(), path)?;
        }
        Ok(block)
    }

    /// Mutable block addressed by `path`
    ///
    /// # Errors
    /// Returns error if the path does not address a block of this document
    pub fn get_mut(&mut self, path: &BlockPath) -> Result<&mut Block, EditError> {
        let mut segments = path.segments()?.into_iter();
        let Some(first) = segments.next() else {
            return Err(EditError::RootPath);
        };
        let mut block = index_into_mut(&mut self.blocks, Some(first), path)?;
        while let Some(segment) = segments.next() {
            let Segment::Slot(slot) = segment else {
                return Err(EditError::UnexpectedSegment {
                    path: path.clone(),
                    segment,
                });
            };
            let parent = block;
            let block_type = parent.block_type();
            let list = parent.slot_mut(slot).ok_or_else(|| EditError::NoSuchSlot {
                path: path.clone(),
                slot,
                block_type,
            })?;
            block = index_into_mut(list, segments.next(), path)?;
        }
        Ok(block)
    }

    /// New document with the block at `path` replaced
    ///
    /// # Errors
    /// Returns error if the path does not address a block of this document
    pub fn replace(&self, path: &BlockPath, replacement: Block) -> Result<Self, EditError> {
        let mut next = self.clone();
        *next.get_mut(path)? = replacement;
        Ok(next)
    }

    /// Every block path with its block type, depth-first
    #[must_use]
    pub fn paths(&self) -> Vec<(BlockPath, BlockType)> {
        let mut out = Vec::new();
        collect_paths(&self.blocks, &BlockPath::root(), None, &mut out);
        out
    }

    /// Check field and query ids
    ///
    /// Ids must be non-empty ASCII alphanumerics, `_` or `-`. Field ids are
    /// unique within their nearest form; query ids within their provider.
    ///
    /// # Errors
    /// Returns the first violation found, depth-first
    pub fn validate(&self) -> Result<(), DocumentError> {
        validate_blocks(&self.blocks, &BlockPath::root(), None, &mut None)
    }
}

fn index_into<'a>(
    list: &'a [Block],
    segment: Option<Segment>,
    path: &BlockPath,
) -> Result<&'a Block, EditError> {
    match segment {
        Some(Segment::Index(index)) => list
            .get(index)
            .ok_or_else(|| EditError::out_of_bounds(path, index, list.len())),
        Some(segment) => Err(EditError::UnexpectedSegment {
            path: path.clone(),
            segment,
        }),
        None => Err(EditError::DanglingSlot(path.clone())),
    }
}

fn index_into_mut<'a>(
    list: &'a mut [Block],
    segment: Option<Segment>,
    path: &BlockPath,
) -> Result<&'a mut Block, EditError> {
    match segment {
        Some(Segment::Index(index)) => {
            let len = list.len();
            list.get_mut(index)
                .ok_or_else(|| EditError::out_of_bounds(path, index, len))
        }
        Some(segment) => Err(EditError::UnexpectedSegment {
            path: path.clone(),
            segment,
        }),
        None => Err(EditError::DanglingSlot(path.clone())),
    }
}

fn block_path(parent: &BlockPath, slot: Option<crate::path::Slot>, index: usize) -> BlockPath {
    match slot {
        Some(slot) => parent.child(slot, index),
        None => parent.append(index),
    }
}

fn collect_paths(
    blocks: &[Block],
    parent: &BlockPath,
    slot: Option<crate::path::Slot>,
    out: &mut Vec<(BlockPath, BlockType)>,
) {
    for (index, block) in blocks.iter().enumerate() {
        let path = block_path(parent, slot, index);
        out.push((path.clone(), block.block_type()));
        for (child_slot, children) in block.children() {
            collect_paths(children, &path, Some(child_slot), out);
        }
    }
}

/// Check if `id` is usable as a field or query id
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_blocks(
    blocks: &[Block],
    parent: &BlockPath,
    slot: Option<crate::path::Slot>,
    form_ids: &mut Option<HashSet<String>>,
) -> Result<(), DocumentError> {
    for (index, block) in blocks.iter().enumerate() {
        let path = block_path(parent, slot, index);

        if let Some(field) = block.field() {
            if !is_valid_id(&field.id) {
                return Err(DocumentError::InvalidId {
                    path,
                    id: field.id.clone(),
                });
            }
            if let Some(ids) = form_ids.as_mut() {
                if !ids.insert(field.id.clone()) {
                    return Err(DocumentError::DuplicateFieldId {
                        path,
                        id: field.id.clone(),
                    });
                }
            }
        }

        if let Block::QueryProvider(provider) = block {
            let mut seen = HashSet::new();
            for query in &provider.queries {
                if !is_valid_id(&query.id) {
                    return Err(DocumentError::InvalidId {
                        path,
                        id: query.id.clone(),
                    });
                }
                if !seen.insert(query.id.as_str()) {
                    return Err(DocumentError::DuplicateQueryId {
                        path,
                        id: query.id.clone(),
                    });
                }
            }
        }

        // Fields belong to their nearest enclosing form
        let mut nested_form = matches!(block, Block::Form(_)).then(HashSet::new);
        let scope = if nested_form.is_some() {
            &mut nested_form
        } else {
            &mut *form_ids
        };
        for (child_slot, children) in block.children() {
            validate_blocks(children, &path, Some(child_slot), scope)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TextBlock;
    use crate::path::Slot;
    use serde_json::json;

    fn sample() -> Document {
        serde_json::from_value(json!({
            "blocks": [
                { "type": "text", "text": "title" },
                {
                    "type": "two-columns",
                    "leftBlocks": [{ "type": "text", "text": "left" }],
                    "rightBlocks": [
                        {
                            "type": "card",
                            "title": "card",
                            "blocks": [{ "type": "text", "text": "inside" }]
                        }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn text(block: &Block) -> &str {
        match block {
            Block::Text(t) => t.text.as_str(),
            other => panic!("expected text block, got {other:?}"),
        }
    }

    #[test]
    fn get_top_level() {
        let doc = sample();
        assert_eq!(text(doc.get(&"0".parse().unwrap()).unwrap()), "title");
    }

    #[test]
    fn get_nested() {
        let doc = sample();
        let path: BlockPath = "1.rightBlocks.0.blocks.0".parse().unwrap();
        assert_eq!(text(doc.get(&path).unwrap()), "inside");
    }

    #[test]
    fn get_root_fails() {
        let doc = sample();
        assert!(matches!(doc.get(&BlockPath::root()), Err(EditError::RootPath)));
    }

    #[test]
    fn get_out_of_bounds() {
        let doc = sample();
        let result = doc.get(&"1.leftBlocks.4".parse().unwrap());
        assert!(matches!(
            result,
            Err(EditError::IndexOutOfBounds { index: 4, len: 1, .. })
        ));
    }

    #[test]
    fn get_wrong_slot() {
        let doc = sample();
        let result = doc.get(&"1.blocks.0".parse().unwrap());
        assert!(matches!(
            result,
            Err(EditError::NoSuchSlot {
                slot: Slot::Blocks,
                block_type: BlockType::TwoColumns,
                ..
            })
        ));
    }

    #[test]
    fn get_dangling_slot() {
        let doc = sample();
        let result = doc.get(&"1.leftBlocks".parse().unwrap());
        assert!(matches!(result, Err(EditError::DanglingSlot(_))));
    }

    #[test]
    fn replace_leaves_siblings_untouched() {
        let doc = sample();
        let path: BlockPath = "1.leftBlocks.0".parse().unwrap();
        let replacement = Block::Text(TextBlock {
            text: "replaced".into(),
        });

        let next = doc.replace(&path, replacement).unwrap();

        assert_eq!(text(next.get(&path).unwrap()), "replaced");
        assert_eq!(next.blocks[0], doc.blocks[0]);
        assert_eq!(
            next.get(&"1.rightBlocks.0".parse().unwrap()).unwrap(),
            doc.get(&"1.rightBlocks.0".parse().unwrap()).unwrap()
        );
        // Original is unchanged
        assert_eq!(text(doc.get(&path).unwrap()), "left");
    }

    #[test]
    fn paths_depth_first() {
        let doc = sample();
        let paths: Vec<String> = doc.paths().into_iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "0",
                "1",
                "1.leftBlocks.0",
                "1.rightBlocks.0",
                "1.rightBlocks.0.blocks.0"
            ]
        );
    }

    #[test]
    fn validate_duplicate_field_ids_in_form() {
        let doc: Document = serde_json::from_value(json!({
            "blocks": [{
                "type": "form",
                "mutation": { "id": "save", "method": "POST", "url": "/save" },
                "blocks": [
                    { "type": "form-string-input", "id": "name", "label": "Name" },
                    { "type": "card", "title": "more", "blocks": [
                        { "type": "form-textarea", "id": "name", "label": "Name again" }
                    ]}
                ]
            }]
        }))
        .unwrap();

        let result = doc.validate();
        assert!(matches!(result, Err(DocumentError::DuplicateFieldId { ref id, .. }) if id == "name"));
    }

    #[test]
    fn validate_same_field_id_in_separate_forms() {
        let form = json!({
            "type": "form",
            "mutation": { "id": "save", "method": "POST", "url": "/save" },
            "blocks": [{ "type": "form-string-input", "id": "name", "label": "Name" }]
        });
        let doc: Document = serde_json::from_value(json!({ "blocks": [form.clone(), form] })).unwrap();
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn validate_invalid_query_id() {
        let doc: Document = serde_json::from_value(json!({
            "blocks": [{
                "type": "query-provider",
                "queries": [{ "id": "user.profile", "endpoint": "/me" }],
                "blocks": []
            }]
        }))
        .unwrap();
        assert!(matches!(doc.validate(), Err(DocumentError::InvalidId { .. })));
    }

    #[test]
    fn valid_ids() {
        assert!(is_valid_id("account_balance-2"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("a.b"));
        assert!(!is_valid_id("with space"));
    }
}
