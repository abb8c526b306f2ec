//! Key/value list resolution
//!
//! Runs every value through string interpolation while keeping keys and
//! order. Resolution is all-or-nothing for a list.

use crate::error::TemplateError;
use crate::template::interpolate;
use crate::variable::Scope;
use pagekit_block::KeyValue;
use serde::{Deserialize, Serialize};

/// Key/value pair with its value interpolated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedKeyValue {
    /// Key, unchanged
    pub key: String,
    /// Interpolated value
    pub value: String,
}

impl ResolvedKeyValue {
    /// Create resolved pair
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Resolve every value of `pairs` against `scope`
///
/// # Errors
/// Returns the first template failure; no partial result is produced
pub fn resolve_key_values(
    pairs: &[KeyValue],
    scope: &Scope,
) -> Result<Vec<ResolvedKeyValue>, TemplateError> {
    pairs
        .iter()
        .map(|pair| {
            Ok(ResolvedKeyValue {
                key: pair.key.clone(),
                value: interpolate(&pair.value, scope)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn scope() -> Scope {
        let Value::Object(query) = json!({ "user": { "data": { "id": 7, "tags": [] } } }) else {
            unreachable!()
        };
        let mut this = Map::new();
        this.insert("name".to_string(), json!("Ada"));
        Scope::empty().with_query(query).with_this(this)
    }

    #[test]
    fn keeps_keys_order_and_repeats() {
        let pairs = vec![
            KeyValue::new("id", "{{query.user.data.id}}"),
            KeyValue::new("tag", "a"),
            KeyValue::new("tag", "b"),
            KeyValue::new("name", "{{this.name}}"),
        ];

        let resolved = resolve_key_values(&pairs, &scope()).unwrap();

        assert_eq!(
            resolved,
            vec![
                ResolvedKeyValue::new("id", "7"),
                ResolvedKeyValue::new("tag", "a"),
                ResolvedKeyValue::new("tag", "b"),
                ResolvedKeyValue::new("name", "Ada"),
            ]
        );
    }

    #[test]
    fn all_or_nothing() {
        let pairs = vec![
            KeyValue::new("ok", "fine"),
            KeyValue::new("bad", "{{query.user.data.tags}}"),
            KeyValue::new("missing", "{{query.nope}}"),
        ];

        let err = resolve_key_values(&pairs, &scope()).unwrap_err();
        assert!(matches!(err, TemplateError::NotStringifiable { .. }));
    }

    #[test]
    fn empty_list() {
        assert!(resolve_key_values(&[], &Scope::empty()).unwrap().is_empty());
    }
}
