//! Form field properties
//!
//! Shared field base plus the variant-specific default value shapes. Some
//! defaults are either a literal or a `{ "type": "variable" }` wrapper that
//! must be resolved before render.

use crate::template::TemplateString;
use serde::{Deserialize, Serialize};

/// Properties common to every form field block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBase {
    /// Field id, the key of the value in the `this` namespace
    pub id: String,
    /// Label template
    pub label: TemplateString,
    /// Description template
    #[serde(default)]
    pub description: TemplateString,
    /// Whether the field may be left empty
    #[serde(default)]
    pub optional: bool,
}

impl FieldBase {
    /// Create required field base with empty description
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<TemplateString>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: TemplateString::default(),
            optional: false,
        }
    }

    /// Mark as optional
    #[inline]
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Boolean literal or variable reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum BooleanSource {
    /// Literal value
    Boolean(bool),
    /// Dotted path such as `query.user.data.active`
    Variable(String),
}

/// Number literal or variable reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum NumberSource {
    /// Literal value
    Number(f64),
    /// Dotted path such as `query.user.data.accountBalance`
    Variable(String),
}

/// String list literal or variable reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum StringArraySource {
    /// Literal list
    StringArray(Vec<String>),
    /// Dotted path to an array of strings
    Variable(String),
}

/// Native input type of a `form-input`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Plain text
    #[default]
    Text,
    /// Email address
    Email,
    /// Masked password
    Password,
    /// URL
    Url,
    /// Telephone number
    Tel,
}

/// `form-checkbox` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxField {
    #[serde(flatten)]
    pub field: FieldBase,
    pub default_value: BooleanSource,
}

/// `form-input` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub default_value: TemplateString,
}

/// `form-number-input` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberInputField {
    #[serde(flatten)]
    pub field: FieldBase,
    pub default_value: NumberSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

/// `form-select` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectField {
    #[serde(flatten)]
    pub field: FieldBase,
    pub options: StringArraySource,
    #[serde(default)]
    pub default_value: TemplateString,
}

/// `form-string-input` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringInputField {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default)]
    pub default_value: TemplateString,
}

/// `form-textarea` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextareaField {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default)]
    pub default_value: TemplateString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

/// `form-date-input` properties
///
/// The resolved default must be empty or an ISO date (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateInputField {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default)]
    pub default_value: TemplateString,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_source_literal() {
        let source: BooleanSource =
            serde_json::from_value(json!({ "type": "boolean", "value": true })).unwrap();
        assert_eq!(source, BooleanSource::Boolean(true));
    }

    #[test]
    fn number_source_variable() {
        let source: NumberSource = serde_json::from_value(json!({
            "type": "variable",
            "value": "query.user.data.accountBalance"
        }))
        .unwrap();
        assert_eq!(
            source,
            NumberSource::Variable("query.user.data.accountBalance".to_string())
        );
    }

    #[test]
    fn string_array_source_literal() {
        let source: StringArraySource =
            serde_json::from_value(json!({ "type": "string-array", "value": ["a", "b"] }))
                .unwrap();
        assert_eq!(
            source,
            StringArraySource::StringArray(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn field_base_defaults() {
        let field: StringInputField =
            serde_json::from_value(json!({ "id": "name", "label": "Name" })).unwrap();
        assert_eq!(field.field.id, "name");
        assert!(!field.field.optional);
        assert!(field.field.description.is_empty());
        assert!(field.default_value.is_empty());
    }
}
