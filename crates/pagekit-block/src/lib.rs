//! pagekit Block Model
//!
//! Typed page documents with structural addressing for in-place editing.
//!
//! # Core Concepts
//!
//! - [`Block`]: Tagged union of every block kind
//! - [`Document`]: Ordered list of top-level blocks
//! - [`BlockPath`]: Derived, never persisted address of a block
//! - [`TemplateString`]: Property text with `{{namespace.path}}` placeholders
//! - [`Query`] / [`Mutation`]: Declarative network read and write descriptors
//!
//! # Example
//!
//! ```rust
//! use pagekit_block::{Block, BlockPath, Document, Slot};
//!
//! let doc = Document::from_json(r#"{
//!     "blocks": [
//!         { "type": "card", "title": "Profile", "blocks": [
//!             { "type": "text", "text": "Hello {{query.user.data.name}}" }
//!         ]}
//!     ]
//! }"#).unwrap();
//!
//! let path = BlockPath::root().append(0).child(Slot::Blocks, 0);
//! assert!(matches!(doc.get(&path), Ok(Block::Text(_))));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod block;
mod document;
mod error;
mod field;
mod path;
mod procedure;
mod template;

// Re-exports
pub use block::{
    Block, BlockType, CardBlock, DialogBlock, FormBlock, QueryProviderBlock, TextBlock,
    TwoColumnsBlock, UnknownBlockType,
};
pub use document::{is_valid_id, Document};
pub use error::{DocumentError, EditError};
pub use field::{
    BooleanSource, CheckboxField, DateInputField, FieldBase, InputField, InputType,
    NumberInputField, NumberSource, SelectField, StringArraySource, StringInputField,
    TextareaField,
};
pub use path::{BlockPath, PathError, Segment, Slot, SEPARATOR};
pub use procedure::{HttpMethod, KeyValue, Mutation, Query};
pub use template::TemplateString;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
