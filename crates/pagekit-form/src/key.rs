//! Transportable field names
//!
//! A field's name inside native form submission is derived from
//! `(block type, field id, optional)`. Block types are kebab-case and field
//! ids are ASCII alphanumerics, `_` or `-`, so [`KEY_SEPARATOR`] never
//! occurs inside a part.

use crate::error::FormError;
use pagekit_block::{Block, BlockType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between the parts of an encoded key
pub const KEY_SEPARATOR: char = '.';

/// Identity of a form field inside a submission
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldKey {
    /// Field block type
    pub block_type: BlockType,
    /// Field id
    pub id: String,
    /// Whether the field may be left empty
    pub optional: bool,
}

impl FieldKey {
    /// Create field key
    #[inline]
    #[must_use]
    pub fn new(block_type: BlockType, id: impl Into<String>, optional: bool) -> Self {
        Self {
            block_type,
            id: id.into(),
            optional,
        }
    }

    /// Key of a form field block, `None` for other blocks
    #[must_use]
    pub fn of_block(block: &Block) -> Option<Self> {
        block
            .field()
            .map(|field| Self::new(block.block_type(), field.id.clone(), field.optional))
    }

    /// Encode into a transportable name
    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.block_type.as_str(),
            self.id,
            self.optional,
            sep = KEY_SEPARATOR
        )
    }

    /// Decode a transportable name
    ///
    /// # Errors
    /// Returns [`FormError::Decode`] unless `key` has exactly three parts: a
    /// form field block type, a non-empty id and `true`/`false`
    pub fn decode(key: &str) -> Result<Self, FormError> {
        let malformed = || FormError::decode(key);

        let mut parts = key.split(KEY_SEPARATOR);
        let (Some(block_type), Some(id), Some(optional), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let block_type = BlockType::from_str(block_type).map_err(|_| malformed())?;
        if !block_type.is_form_field() || id.is_empty() {
            return Err(malformed());
        }
        let optional = match optional {
            "true" => true,
            "false" => false,
            _ => return Err(malformed()),
        };

        Ok(Self::new(block_type, id, optional))
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for FieldKey {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// Keys of every field owned by a form, in document order
///
/// Descends through containers but not into nested forms, whose fields
/// belong to them.
#[must_use]
pub fn field_keys(blocks: &[Block]) -> Vec<FieldKey> {
    let mut out = Vec::new();
    collect_keys(blocks, &mut out);
    out
}

fn collect_keys(blocks: &[Block], out: &mut Vec<FieldKey>) {
    for block in blocks {
        if let Some(key) = FieldKey::of_block(block) {
            out.push(key);
            continue;
        }
        if matches!(block, Block::Form(_)) {
            continue;
        }
        for (_, children) in block.children() {
            collect_keys(children, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_layout() {
        let key = FieldKey::new(BlockType::FormNumberInput, "amount", false);
        assert_eq!(key.encode(), "form-number-input.amount.false");
    }

    #[test]
    fn decode_roundtrip() {
        let key = FieldKey::new(BlockType::FormCheckbox, "agree_terms", true);
        assert_eq!(FieldKey::decode(&key.encode()).unwrap(), key);
    }

    #[test]
    fn decode_rejects_malformed() {
        for raw in [
            "",
            "form-checkbox",
            "form-checkbox.id",
            "form-checkbox.id.yes",
            "form-checkbox.id.true.extra",
            "form-checkbox..true",
            "text.id.true",
            "form-slider.id.true",
        ] {
            let err = FieldKey::decode(raw).unwrap_err();
            assert_eq!(err.to_string(), format!("could not decode key \"{raw}\""));
        }
    }

    #[test]
    fn field_keys_skip_nested_forms() {
        let blocks: Vec<Block> = serde_json::from_value(json!([
            { "type": "form-string-input", "id": "name", "label": "Name" },
            { "type": "two-columns",
              "leftBlocks": [{ "type": "form-checkbox", "id": "ok", "label": "Ok", "optional": true,
                               "defaultValue": { "type": "boolean", "value": false } }],
              "rightBlocks": [{
                  "type": "form",
                  "mutation": { "id": "inner", "method": "POST", "url": "/inner" },
                  "blocks": [{ "type": "form-textarea", "id": "inner_only", "label": "x" }]
              }]
            }
        ]))
        .unwrap();

        let keys: Vec<String> = field_keys(&blocks).iter().map(FieldKey::encode).collect();
        assert_eq!(
            keys,
            vec!["form-string-input.name.false", "form-checkbox.ok.true"]
        );
    }
}
