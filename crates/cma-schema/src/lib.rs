//! Schema metadata lookup for the content API client.
//!
//! The block traversal engine needs to know, for every block it meets,
//! which fields that block's model declares. This crate answers that
//! question through a [`SchemaRepository`]: a per-session cache in front of
//! a [`SchemaSource`] (normally the content API itself).
//!
//! # Key Types
//!
//! - [`SchemaSource`]: async trait over the backing schema reads
//! - [`SchemaRepository`]: lazily loaded, monotonic, coalescing cache
//! - [`InMemorySchemaSource`]: counting in-memory source for tests and tooling
//! - [`SchemaError`]: not-found and source failures

pub mod error;
pub mod memory;
pub mod repository;
pub mod source;

pub use error::{SchemaError, SchemaResult};
pub use memory::{InMemorySchemaSource, SchemaSnapshot};
pub use repository::{FieldList, SchemaRepository};
pub use source::SchemaSource;
