//! pagekit Form Engine
//!
//! Makes declared form fields addressable inside native form submission and
//! rebuilds typed values from a raw submission.
//!
//! # Core Concepts
//!
//! - [`FieldKey`]: `(block type, field id, optional)` encoded as a single name
//! - [`Submission`]: raw name/value pairs in form order
//! - [`Extraction`]: decoded, coerced values; the `this` namespace of a mutation
//!
//! # Example
//!
//! ```rust
//! use pagekit_block::BlockType;
//! use pagekit_form::{extract, FieldKey, Submission};
//!
//! let name = FieldKey::new(BlockType::FormStringInput, "name", false);
//! let submission = Submission::from_pairs([(name.encode(), "")]);
//!
//! let extraction = extract(&submission).unwrap();
//! assert_eq!(extraction.missing(), vec!["name".to_string()]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod key;
mod submission;

// Re-exports
pub use error::FormError;
pub use key::{field_keys, FieldKey, KEY_SEPARATOR};
pub use submission::{
    coerce_value, complete_submission, default_submission, extract, is_missing, missing_fields,
    raw_number, raw_value, ExtractedField, Extraction, Submission,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
