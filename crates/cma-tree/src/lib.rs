//! Pre-order tree primitives for structured-text documents.
//!
//! Documents are plain [`serde_json::Value`] trees. A node has children iff
//! it carries a `children` array; every other node is a leaf. All
//! operations walk parent-before-children, siblings left to right, and
//! report each node's path from the root (`children[0].children[2]`).
//!
//! Each operation has a synchronous form in [`walk`] and an `_async` twin in
//! [`walk_async`] that awaits its callback at the same points in the same
//! order.
//!
//! ```rust
//! use cma_tree::{find_all_nodes, node_type};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "type": "root",
//!     "children": [ { "type": "block", "item": "b1" } ]
//! });
//! let blocks = find_all_nodes::<_, std::convert::Infallible>(&doc, |node, _, _| {
//!     Ok(node_type(node) == Some("block"))
//! })
//! .unwrap();
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].path.to_string(), "children[0]");
//! ```

pub mod node;
pub mod walk;
pub mod walk_async;

pub use node::{children_of, has_children, node_type, NodeMatch, CHILDREN};
pub use walk::{
    every_node, filter_nodes, find_all_nodes, find_node, map_nodes, reduce_nodes, some_node,
    visit_nodes,
};
pub use walk_async::{
    every_node_async, filter_nodes_async, find_all_nodes_async, find_node_async, map_nodes_async,
    reduce_nodes_async, some_node_async, visit_nodes_async,
};
