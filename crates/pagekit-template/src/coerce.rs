//! Typed coercion of resolved values
//!
//! Single-placeholder properties that expect a non-string type are strict:
//! the resolved value's runtime type must match exactly.

use crate::error::TemplateError;
use crate::variable::{Scope, VariablePath};
use chrono::{DateTime, NaiveDate};
use pagekit_block::{BooleanSource, NumberSource, StringArraySource};
use serde_json::{Number, Value};
use std::borrow::Cow;

/// Text form of a scalar value
///
/// Strings, numbers, booleans and `null` stringify; arrays and objects do
/// not.
///
/// # Errors
/// Returns [`TemplateError::NotStringifiable`] for arrays and objects
pub fn stringify<'a>(path: &VariablePath, value: &'a Value) -> Result<Cow<'a, str>, TemplateError> {
    match value {
        Value::String(s) => Ok(Cow::Borrowed(s)),
        Value::Number(n) => Ok(Cow::Owned(format_number(n))),
        Value::Bool(b) => Ok(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Ok(Cow::Borrowed("null")),
        Value::Array(_) | Value::Object(_) => Err(TemplateError::NotStringifiable {
            path: path.as_str().to_string(),
        }),
    }
}

/// Format a number the way a browser would print it
///
/// Integral values print without a fractional part (`1`, not `1.0`).
#[must_use]
pub fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    n.as_f64().map_or_else(|| n.to_string(), format_f64)
}

/// Format a float the way a browser would print it
///
/// Shortest round-trip digits; exponent form below `1e-6` and from `1e21`
/// (`1e+21`, `1e-7`).
#[must_use]
pub fn format_f64(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest digits as `d[.ddd]e<exp>`
    let scientific = format!("{:e}", f.abs());
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return f.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return f.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    let n = exponent + 1;
    let zeros = |count: i32| "0".repeat(usize::try_from(count).unwrap_or(0));

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", zeros(n - k))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(n).unwrap_or(0));
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", zeros(-n))
    } else {
        let (first, rest) = digits.split_at(1);
        let sign = if n > 0 { '+' } else { '-' };
        let exp = (n - 1).abs();
        if rest.is_empty() {
            format!("{first}e{sign}{exp}")
        } else {
            format!("{first}.{rest}e{sign}{exp}")
        }
    };

    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

/// Resolve `path` to a boolean
///
/// # Errors
/// Returns a reference error or [`TemplateError::NotBoolean`]
pub fn resolve_boolean(path: &VariablePath, scope: &Scope) -> Result<bool, TemplateError> {
    match scope.lookup(path)? {
        Value::Bool(b) => Ok(*b),
        _ => Err(TemplateError::NotBoolean {
            path: path.as_str().to_string(),
        }),
    }
}

/// Resolve `path` to a finite number
///
/// # Errors
/// Returns a reference error or [`TemplateError::NotNumber`]
pub fn resolve_number(path: &VariablePath, scope: &Scope) -> Result<f64, TemplateError> {
    match scope.lookup(path)? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).ok_or_else(|| {
            TemplateError::NotNumber {
                path: path.as_str().to_string(),
            }
        }),
        _ => Err(TemplateError::NotNumber {
            path: path.as_str().to_string(),
        }),
    }
}

/// Resolve `path` to an array of strings
///
/// # Errors
/// Returns a reference error or [`TemplateError::NotStringArray`]
pub fn resolve_string_array(
    path: &VariablePath,
    scope: &Scope,
) -> Result<Vec<String>, TemplateError> {
    let not_array = || TemplateError::NotStringArray {
        path: path.as_str().to_string(),
    };
    match scope.lookup(path)? {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(not_array))
            .collect(),
        _ => Err(not_array()),
    }
}

/// Resolve a boolean default value
///
/// # Errors
/// Propagates variable resolution failures
pub fn resolve_boolean_source(source: &BooleanSource, scope: &Scope) -> Result<bool, TemplateError> {
    match source {
        BooleanSource::Boolean(b) => Ok(*b),
        BooleanSource::Variable(path) => resolve_boolean(&VariablePath::parse(path), scope),
    }
}

/// Resolve a number default value
///
/// # Errors
/// Propagates variable resolution failures
pub fn resolve_number_source(source: &NumberSource, scope: &Scope) -> Result<f64, TemplateError> {
    match source {
        NumberSource::Number(n) => Ok(*n),
        NumberSource::Variable(path) => resolve_number(&VariablePath::parse(path), scope),
    }
}

/// Resolve a string list
///
/// # Errors
/// Propagates variable resolution failures
pub fn resolve_string_array_source(
    source: &StringArraySource,
    scope: &Scope,
) -> Result<Vec<String>, TemplateError> {
    match source {
        StringArraySource::StringArray(items) => Ok(items.clone()),
        StringArraySource::Variable(path) => {
            resolve_string_array(&VariablePath::parse(path), scope)
        }
    }
}

/// Normalize an ISO date
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (whose date is kept).
/// Empty input stays empty.
///
/// # Errors
/// Returns [`TemplateError::NotDate`] for anything else
pub fn normalize_iso_date(raw: &str) -> Result<String, TemplateError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.format("%Y-%m-%d").to_string());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .map_err(|_| TemplateError::NotDate {
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn scope() -> Scope {
        let Value::Object(query) = json!({
            "user": { "data": {
                "accountBalance": 19.99,
                "balanceText": "19.99",
                "active": true,
                "activeText": "true",
                "count": 3,
                "roles": ["admin", "ops"],
                "mixed": ["a", 1]
            }}
        }) else {
            unreachable!()
        };
        Scope::empty().with_query(query).with_this(Map::new())
    }

    #[test]
    fn boolean_strict() {
        let scope = scope();
        assert!(resolve_boolean(&VariablePath::parse("query.user.data.active"), &scope).unwrap());
        let err = resolve_boolean(&VariablePath::parse("query.user.data.activeText"), &scope)
            .unwrap_err();
        assert!(err.to_string().ends_with("is pointing to a value that is not a boolean"));
    }

    #[test]
    fn number_strict() {
        let scope = scope();
        let n = resolve_number(&VariablePath::parse("query.user.data.accountBalance"), &scope)
            .unwrap();
        assert!((n - 19.99).abs() < f64::EPSILON);

        let err = resolve_number(&VariablePath::parse("query.user.data.balanceText"), &scope)
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::NotNumber {
                path: "query.user.data.balanceText".to_string()
            }
        );
    }

    #[test]
    fn number_source_variable_with_braces() {
        let source = NumberSource::Variable("{{query.user.data.count}}".to_string());
        assert!((resolve_number_source(&source, &scope()).unwrap() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn boolean_source_literal_needs_no_scope() {
        let source = BooleanSource::Boolean(true);
        assert!(resolve_boolean_source(&source, &Scope::empty()).unwrap());
    }

    #[test]
    fn string_array() {
        let scope = scope();
        let roles =
            resolve_string_array(&VariablePath::parse("query.user.data.roles"), &scope).unwrap();
        assert_eq!(roles, vec!["admin", "ops"]);

        let err = resolve_string_array(&VariablePath::parse("query.user.data.mixed"), &scope)
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotStringArray { .. }));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(&Number::from(42)), "42");
        assert_eq!(format_f64(1.0), "1");
        assert_eq!(format_f64(19.99), "19.99");
        assert_eq!(format_f64(-0.5), "-0.5");
    }

    #[test]
    fn number_formatting_switches_to_exponent_like_browsers() {
        assert_eq!(format_f64(1e21), "1e+21");
        assert_eq!(format_f64(1.5e22), "1.5e+22");
        assert_eq!(format_f64(1e20), "100000000000000000000");
        assert_eq!(format_f64(1e-7), "1e-7");
        assert_eq!(format_f64(-2.5e-8), "-2.5e-8");
        assert_eq!(format_f64(0.000_001), "0.000001");
        assert_eq!(format_f64(0.1), "0.1");
        assert_eq!(format_f64(123.456), "123.456");
        assert_eq!(format_f64(-0.0), "0");
    }

    #[test]
    fn iso_dates() {
        assert_eq!(normalize_iso_date("2024-02-29").unwrap(), "2024-02-29");
        assert_eq!(
            normalize_iso_date("2024-03-01T10:00:00Z").unwrap(),
            "2024-03-01"
        );
        assert_eq!(normalize_iso_date("").unwrap(), "");
        assert!(matches!(
            normalize_iso_date("03/01/2024"),
            Err(TemplateError::NotDate { .. })
        ));
        assert!(normalize_iso_date("2023-02-29").is_err());
    }
}
