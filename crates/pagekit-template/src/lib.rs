//! pagekit Template Engine
//!
//! Resolves `{{namespace.dotted.path}}` placeholders inside block properties
//! against two read-only namespaces:
//!
//! - `query.*`: settled results of the enclosing query-provider
//! - `this.*`: values of the submitting form, only inside its submission
//!
//! Resolution is a pure function of the template and the [`Scope`]. Failures
//! are typed [`TemplateError`]s, never blank output.
//!
//! # Example
//!
//! ```rust
//! use pagekit_template::{interpolate, Scope};
//! use serde_json::json;
//!
//! let mut query = serde_json::Map::new();
//! query.insert("user".into(), json!({ "data": { "name": "Ada" } }));
//! let scope = Scope::empty().with_query(query);
//!
//! let text = interpolate(&"Hello {{query.user.data.name}}".into(), &scope).unwrap();
//! assert_eq!(text, "Hello Ada");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod coerce;
mod error;
mod key_value;
mod template;
mod variable;

// Re-exports
pub use coerce::{
    format_f64, format_number, normalize_iso_date, resolve_boolean, resolve_boolean_source,
    resolve_number, resolve_number_source, resolve_string_array, resolve_string_array_source,
    stringify,
};
pub use error::TemplateError;
pub use key_value::{resolve_key_values, ResolvedKeyValue};
pub use template::{interpolate, Part, Template};
pub use variable::{Namespace, Scope, VariablePath};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
