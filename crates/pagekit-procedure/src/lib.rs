//! pagekit Procedures
//!
//! Turns declarative [`Query`](pagekit_block::Query) and
//! [`Mutation`](pagekit_block::Mutation) descriptors into network calls.
//!
//! # Core Concepts
//!
//! - [`RequestDefaults`]: base URL and headers shared by a page session
//! - [`Transport`]: network seam; [`ReqwestTransport`] in production
//! - [`QueryCache`]: single-flight cache keyed by `(id, url)`, invalidated wholesale
//! - [`QueryClient`]: query fetching and mutation execution over one cache
//!
//! # Query lifecycle
//!
//! `pending -> settled | failed`. A second reference to the same `(id, url)`
//! while pending or settled shares the first call.
//!
//! # Mutation lifecycle
//!
//! `idle -> submitting -> success | error`. Success invalidates every cached
//! query so dependent subtrees fetch again.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cache;
mod client;
mod error;
mod request;
mod transport;

// Re-exports
pub use cache::{QueryCache, QueryKey, QueryResult, QueryState, SharedQuery};
pub use client::{MutationResponse, MutationState, QueryClient};
pub use error::{FailureReason, ProcedureError, TransportError};
pub use request::{body_object, build_url, HttpRequest, HttpResponse, Method, RequestDefaults};
pub use transport::{ReqwestTransport, Transport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
