//! pagekit Runtime
//!
//! Compiles a block document into a render tree and runs its forms.
//!
//! # Core Concepts
//!
//! - [`Page`]: one session over a document, owning its query cache
//! - [`RenderNode`]: compiled block with every property resolved
//! - [`RenderedForm`]: compiled form carrying what its submission needs
//! - [`ErrorBoundary`]: failure caught at the smallest containing block
//!
//! # Example
//!
//! ```no_run
//! use pagekit_block::Document;
//! use pagekit_runtime::{Page, PageConfig};
//!
//! # async fn run(raw: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::from_json(raw)?;
//! let page = Page::connect(document, PageConfig::new().with_base_url("https://api.test/"))?;
//! for node in page.render().await {
//!     println!("{}", node.path());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod compile;
mod config;
mod error;
mod node;
mod page;

// Re-exports
pub use compile::DEFAULT_SUBMIT_LABEL;
pub use config::{ConfigError, PageConfig};
pub use error::{ErrorKind, RuntimeError};
pub use node::{find_form, find_node, ErrorBoundary, FieldValue, RenderNode, RenderedField, RenderedForm};
pub use page::{Page, SessionId, SubmitOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
