//! ingress-modernizr - Ingress to Gateway API post-renderer
//!
//! Reads a multi-document Kubernetes manifest stream, hands it to
//! `ingress2gateway` when it contains Ingress resources, and writes back every
//! non-Ingress resource followed by the converted Gateway API resources.
//!
//! # Architecture
//!
//! ```text
//! input ─► codec::decode ─► classify ─► Converter ─► recombine ─► codec::encode ─► stdout
//! ```
//!
//! - Non-Ingress documents pass through unchanged and in their original order
//! - Converted documents are appended after them
//! - The converter is an external process reached only through a staged file,
//!   its stdout and its exit status
//!
//! # Modules
//!
//! - [`manifest`] - Schema-less manifest type and kind classification
//! - [`manifest::codec`] - Multi-document YAML/JSON decode and YAML encode
//! - [`convert`] - Converter trait and the `ingress2gateway` subprocess implementation
//! - [`pipeline`] - Decode, classify, convert, recombine, encode
//! - [`config`] - Converter binary and deadline resolution
//! - [`cli`] - Command-line surface
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod manifest;
pub mod pipeline;

pub use cli::Cli;
pub use convert::{CommandConverter, Converter};
pub use error::Error;
pub use manifest::{Manifest, INGRESS_KIND};
pub use pipeline::{Outcome, Pipeline};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Prefix for diagnostics printed to stderr
pub const TOOL_NAME: &str = "ingress-modernizr";
