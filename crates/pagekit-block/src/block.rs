//! Block tagged union
//!
//! One variant struct per block kind. Container variants hold ordered child
//! lists addressed by [`Slot`]; leaf variants hold only scalar properties.

use crate::field::{
    CheckboxField, DateInputField, FieldBase, InputField, NumberInputField, SelectField,
    StringInputField, TextareaField,
};
use crate::path::Slot;
use crate::procedure::{Mutation, Query};
use crate::template::TemplateString;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Node of a page document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Block {
    Text(TextBlock),
    Card(CardBlock),
    Dialog(DialogBlock),
    TwoColumns(TwoColumnsBlock),
    QueryProvider(QueryProviderBlock),
    Form(FormBlock),
    FormCheckbox(CheckboxField),
    FormInput(InputField),
    FormNumberInput(NumberInputField),
    FormSelect(SelectField),
    FormStringInput(StringInputField),
    FormTextarea(TextareaField),
    FormDateInput(DateInputField),
}

/// `text` properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: TemplateString,
}

/// `card` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardBlock {
    pub title: TemplateString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TemplateString>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// `dialog` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogBlock {
    pub title: TemplateString,
    pub trigger_label: TemplateString,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// `two-columns` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoColumnsBlock {
    #[serde(default)]
    pub left_blocks: Vec<Block>,
    #[serde(default)]
    pub right_blocks: Vec<Block>,
}

/// `query-provider` properties
///
/// Exposes the `query` namespace to its subtree once every query settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryProviderBlock {
    #[serde(default)]
    pub queries: Vec<Query>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// `form` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormBlock {
    pub mutation: Mutation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<TemplateString>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Block kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockType {
    Text,
    Card,
    Dialog,
    TwoColumns,
    QueryProvider,
    Form,
    FormCheckbox,
    FormInput,
    FormNumberInput,
    FormSelect,
    FormStringInput,
    FormTextarea,
    FormDateInput,
}

impl BlockType {
    /// Every block type, in declaration order
    pub const ALL: [Self; 13] = [
        Self::Text,
        Self::Card,
        Self::Dialog,
        Self::TwoColumns,
        Self::QueryProvider,
        Self::Form,
        Self::FormCheckbox,
        Self::FormInput,
        Self::FormNumberInput,
        Self::FormSelect,
        Self::FormStringInput,
        Self::FormTextarea,
        Self::FormDateInput,
    ];

    /// Serialized tag
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Card => "card",
            Self::Dialog => "dialog",
            Self::TwoColumns => "two-columns",
            Self::QueryProvider => "query-provider",
            Self::Form => "form",
            Self::FormCheckbox => "form-checkbox",
            Self::FormInput => "form-input",
            Self::FormNumberInput => "form-number-input",
            Self::FormSelect => "form-select",
            Self::FormStringInput => "form-string-input",
            Self::FormTextarea => "form-textarea",
            Self::FormDateInput => "form-date-input",
        }
    }

    /// Check if blocks of this type are form fields
    #[inline]
    #[must_use]
    pub fn is_form_field(self) -> bool {
        matches!(
            self,
            Self::FormCheckbox
                | Self::FormInput
                | Self::FormNumberInput
                | Self::FormSelect
                | Self::FormStringInput
                | Self::FormTextarea
                | Self::FormDateInput
        )
    }

    /// Child slots of this block type
    #[must_use]
    pub fn slots(self) -> &'static [Slot] {
        match self {
            Self::Card | Self::Dialog | Self::QueryProvider | Self::Form => &[Slot::Blocks],
            Self::TwoColumns => &[Slot::LeftBlocks, Slot::RightBlocks],
            _ => &[],
        }
    }
}

impl Display for BlockType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown block type tag
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

impl Block {
    /// Kind of this block
    #[must_use]
    pub fn block_type(&self) -> BlockType {
        match self {
            Self::Text(_) => BlockType::Text,
            Self::Card(_) => BlockType::Card,
            Self::Dialog(_) => BlockType::Dialog,
            Self::TwoColumns(_) => BlockType::TwoColumns,
            Self::QueryProvider(_) => BlockType::QueryProvider,
            Self::Form(_) => BlockType::Form,
            Self::FormCheckbox(_) => BlockType::FormCheckbox,
            Self::FormInput(_) => BlockType::FormInput,
            Self::FormNumberInput(_) => BlockType::FormNumberInput,
            Self::FormSelect(_) => BlockType::FormSelect,
            Self::FormStringInput(_) => BlockType::FormStringInput,
            Self::FormTextarea(_) => BlockType::FormTextarea,
            Self::FormDateInput(_) => BlockType::FormDateInput,
        }
    }

    /// Field base if this block is a form field
    #[must_use]
    pub fn field(&self) -> Option<&FieldBase> {
        match self {
            Self::FormCheckbox(b) => Some(&b.field),
            Self::FormInput(b) => Some(&b.field),
            Self::FormNumberInput(b) => Some(&b.field),
            Self::FormSelect(b) => Some(&b.field),
            Self::FormStringInput(b) => Some(&b.field),
            Self::FormTextarea(b) => Some(&b.field),
            Self::FormDateInput(b) => Some(&b.field),
            Self::Text(_)
            | Self::Card(_)
            | Self::Dialog(_)
            | Self::TwoColumns(_)
            | Self::QueryProvider(_)
            | Self::Form(_) => None,
        }
    }

    /// Child list stored in `slot`, if this block has it
    #[must_use]
    pub fn slot(&self, slot: Slot) -> Option<&Vec<Block>> {
        match (self, slot) {
            (Self::Card(b), Slot::Blocks) => Some(&b.blocks),
            (Self::Dialog(b), Slot::Blocks) => Some(&b.blocks),
            (Self::QueryProvider(b), Slot::Blocks) => Some(&b.blocks),
            (Self::Form(b), Slot::Blocks) => Some(&b.blocks),
            (Self::TwoColumns(b), Slot::LeftBlocks) => Some(&b.left_blocks),
            (Self::TwoColumns(b), Slot::RightBlocks) => Some(&b.right_blocks),
            _ => None,
        }
    }

    /// Mutable child list stored in `slot`, if this block has it
    pub fn slot_mut(&mut self, slot: Slot) -> Option<&mut Vec<Block>> {
        match (self, slot) {
            (Self::Card(b), Slot::Blocks) => Some(&mut b.blocks),
            (Self::Dialog(b), Slot::Blocks) => Some(&mut b.blocks),
            (Self::QueryProvider(b), Slot::Blocks) => Some(&mut b.blocks),
            (Self::Form(b), Slot::Blocks) => Some(&mut b.blocks),
            (Self::TwoColumns(b), Slot::LeftBlocks) => Some(&mut b.left_blocks),
            (Self::TwoColumns(b), Slot::RightBlocks) => Some(&mut b.right_blocks),
            _ => None,
        }
    }

    /// All child lists with their slots, in slot order
    #[must_use]
    pub fn children(&self) -> Vec<(Slot, &[Block])> {
        self.block_type()
            .slots()
            .iter()
            .filter_map(|slot| self.slot(*slot).map(|blocks| (*slot, blocks.as_slice())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::BooleanSource;
    use serde_json::json;

    #[test]
    fn block_type_tags_roundtrip_through_from_str() {
        for block_type in BlockType::ALL {
            assert_eq!(block_type.as_str().parse::<BlockType>().unwrap(), block_type);
        }
    }

    #[test]
    fn unknown_block_type() {
        let result = "carousel".parse::<BlockType>();
        assert_eq!(result, Err(UnknownBlockType("carousel".to_string())));
    }

    #[test]
    fn deserialize_two_columns() {
        let block: Block = serde_json::from_value(json!({
            "type": "two-columns",
            "leftBlocks": [{ "type": "text", "text": "left" }],
            "rightBlocks": []
        }))
        .unwrap();

        assert_eq!(block.block_type(), BlockType::TwoColumns);
        assert_eq!(block.slot(Slot::LeftBlocks).unwrap().len(), 1);
        assert!(block.slot(Slot::Blocks).is_none());
    }

    #[test]
    fn deserialize_checkbox_with_flattened_base() {
        let block: Block = serde_json::from_value(json!({
            "type": "form-checkbox",
            "id": "active",
            "label": "Active",
            "description": "",
            "optional": true,
            "defaultValue": { "type": "boolean", "value": true }
        }))
        .unwrap();

        let Block::FormCheckbox(checkbox) = &block else {
            panic!("expected checkbox, got {block:?}");
        };
        assert_eq!(checkbox.default_value, BooleanSource::Boolean(true));
        assert!(block.field().unwrap().optional);
    }

    #[test]
    fn field_types_are_form_fields() {
        let fields: Vec<_> = BlockType::ALL.iter().filter(|t| t.is_form_field()).collect();
        assert_eq!(fields.len(), 7);
        assert!(!BlockType::Form.is_form_field());
    }

    #[test]
    fn children_lists_slots_in_order() {
        let block: Block = serde_json::from_value(json!({
            "type": "two-columns",
            "leftBlocks": [],
            "rightBlocks": [{ "type": "text", "text": "r" }]
        }))
        .unwrap();

        let children = block.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].0, Slot::LeftBlocks);
        assert_eq!(children[1].1.len(), 1);
    }
}
