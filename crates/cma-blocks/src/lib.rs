//! Block traversal for the content API client.
//!
//! Blocks live inside three kinds of field value: a list (`rich_text`), a
//! single block (`single_block`), and a structured-text document
//! (`structured_text`), whose `block` and `inlineBlock` nodes carry one
//! block each. This crate offers one operation family over them (visit,
//! map, filter, find, find all, reduce, some, every) at two depths:
//!
//! - [`nonrecursive`] and [`nonrecursive_async`] touch only the blocks
//!   directly embedded in a field value.
//! - [`BlockTraverser`] descends into nested blocks by asking a
//!   [`SchemaRepository`](cma_schema::SchemaRepository) for each block
//!   model's fields. It is asynchronous only.
//!
//! # Key Types
//!
//! - [`BlockEntry`]: a block item with its path
//! - [`BlockTraverser`]: the recursive engine
//! - [`TraversalDirection`]: ancestor-first or descendant-first map/filter
//! - [`BlocksError`]: shape, schema, and abort failures
//!
//! Callbacks are fallible and generic over the caller's error type `E`,
//! which must implement `From<BlocksError>`. The first `Err` ends the
//! traversal and is returned as is.

pub mod error;
pub mod nonrecursive;
pub mod nonrecursive_async;
pub mod options;
pub mod record;
pub mod shape;
pub mod traverser;

#[cfg(test)]
mod fixtures;

pub use error::{BlocksError, BlocksResult};
pub use nonrecursive::{
    every_block, filter_blocks, find_all_blocks, find_block, map_blocks, reduce_blocks, some_blocks,
    visit_blocks,
};
pub use nonrecursive_async::{
    every_block_async, filter_blocks_async, find_all_blocks_async, find_block_async, map_blocks_async,
    reduce_blocks_async, some_blocks_async, visit_blocks_async,
};
pub use options::{TraversalDirection, TraversalOptions};
pub use shape::{block_node_item, iterate_blocks, BlockEntry};
pub use traverser::BlockTraverser;
