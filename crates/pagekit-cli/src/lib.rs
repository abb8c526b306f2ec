//! pagekit command-line front end
//!
//! - `pagekit render <doc.json> [--config page.toml] [--json]`
//! - `pagekit paths <doc.json>`
//! - `pagekit submit <doc.json> --form <path> [--field name=value]...`

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cli;
mod report;
mod session;

// Re-exports
pub use cli::{command, init_tracing, run};
pub use report::{block_references, describe_outcome, outline, path_listing};
pub use session::{load_config, load_document, parse_field, submit_form};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
