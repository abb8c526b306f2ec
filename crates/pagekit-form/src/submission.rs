//! Submission extraction and required-field detection
//!
//! Everything here is pure: no network I/O and no external state, so the
//! same functions serve live submissions and edit-time variable shapes.

use crate::error::FormError;
use crate::key::FieldKey;
use pagekit_block::BlockType;
use pagekit_template::{format_f64, format_number};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Raw name/value pairs of one submission, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    entries: Vec<(String, String)>,
}

impl Submission {
    /// Create empty submission
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from raw pairs
    #[must_use]
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    /// Append a raw pair
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace the value of `name`, appending it if absent
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Replace the value of the field with id `id`
    ///
    /// Returns `false` if no entry decodes to that id.
    pub fn set_field(&mut self, id: &str, value: impl Into<String>) -> bool {
        let entry = self
            .entries
            .iter_mut()
            .find(|(name, _)| FieldKey::decode(name).is_ok_and(|key| key.id == id));
        match entry {
            Some(entry) => {
                entry.1 = value.into();
                true
            }
            None => false,
        }
    }

    /// Raw value submitted under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Raw pairs in order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Check if submission has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Typed value of a raw submitted string
///
/// - `form-checkbox`: `true` for `"true"`/`"on"`, `false` otherwise
/// - `form-number-input`: finite float, `null` when empty or unparsable
/// - everything else: the string verbatim
#[must_use]
pub fn coerce_value(block_type: BlockType, raw: &str) -> Value {
    match block_type {
        BlockType::FormCheckbox => Value::Bool(matches!(raw, "true" | "on")),
        BlockType::FormNumberInput => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number),
        _ => Value::String(raw.to_string()),
    }
}

/// Raw string a rendered input would submit for `value`
#[must_use]
pub fn raw_value(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Raw string for a number input
#[must_use]
pub fn raw_number(value: f64) -> String {
    format_f64(value)
}

/// Check if a required field's coerced value counts as missing
///
/// Optional fields are never missing. Checkboxes are missing when `false`;
/// other fields when `null` or empty.
#[must_use]
pub fn is_missing(key: &FieldKey, value: &Value) -> bool {
    if key.optional {
        return false;
    }
    match key.block_type {
        BlockType::FormCheckbox => !matches!(value, Value::Bool(true)),
        _ => match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        },
    }
}

/// One decoded and coerced field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub key: FieldKey,
    pub value: Value,
}

/// Result of extracting a submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    fields: Vec<ExtractedField>,
}

impl Extraction {
    /// Decoded fields in submission order, one per id
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[ExtractedField] {
        &self.fields
    }

    /// Coerced value of field `id`
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.key.id == id)
            .map(|f| &f.value)
    }

    /// Flat object keyed by field id, the `this` namespace
    #[must_use]
    pub fn variables(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.key.id.clone(), f.value.clone()))
            .collect()
    }

    /// Ids of required fields with a missing value, in submission order
    #[must_use]
    pub fn missing(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| is_missing(&f.key, &f.value))
            .map(|f| f.key.id.clone())
            .collect()
    }
}

/// Decode and coerce every entry of `submission`
///
/// The first entry for a field id wins; later duplicates are ignored.
///
/// # Errors
/// Returns [`FormError::Decode`] on the first name that does not decode
pub fn extract(submission: &Submission) -> Result<Extraction, FormError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(submission.entries.len());

    for (name, raw) in &submission.entries {
        let key = FieldKey::decode(name)?;
        if !seen.insert(key.id.clone()) {
            tracing::debug!(field = %key.id, "ignoring repeated submission entry");
            continue;
        }
        let value = coerce_value(key.block_type, raw);
        fields.push(ExtractedField { key, value });
    }

    Ok(Extraction { fields })
}

/// Ids of required fields missing from `submission`
///
/// # Errors
/// Returns [`FormError::Decode`] if a name does not decode
pub fn missing_fields(submission: &Submission) -> Result<Vec<String>, FormError> {
    Ok(extract(submission)?.missing())
}

/// `submission` with an empty entry for each of `fields` it leaves out
///
/// Native forms omit some inputs, unchecked checkboxes among them. An empty
/// raw value coerces like a cleared input, so a required field that was
/// never submitted is reported as missing.
///
/// # Errors
/// Returns [`FormError::Decode`] if a submitted name does not decode
pub fn complete_submission(
    submission: &Submission,
    fields: &[FieldKey],
) -> Result<Submission, FormError> {
    let present = extract(submission)?;
    let mut complete = submission.clone();
    for key in fields {
        if present.get(&key.id).is_none() {
            complete.push(key.encode(), "");
        }
    }
    Ok(complete)
}

/// Submission a freshly rendered form would post
///
/// Encodes each key and writes the raw form of its default value.
#[must_use]
pub fn default_submission<'a>(
    defaults: impl IntoIterator<Item = (&'a FieldKey, &'a Value)>,
) -> Submission {
    Submission {
        entries: defaults
            .into_iter()
            .map(|(key, value)| (key.encode(), raw_value(value)))
            .collect(),
    }
}
