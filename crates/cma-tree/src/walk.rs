//! Synchronous pre-order operations.
//!
//! Every callback receives the node, its parent (`None` for the root), and
//! the node's path from the root. Callbacks are fallible; the first `Err`
//! aborts the walk and is returned unchanged.

use serde_json::Value;

use cma_types::Path;

use crate::node::{preorder, push_children, reassemble_filtered, reassemble_mapped, NodeEntry, NodeMatch};

/// Call `visitor` on every node in pre-order.
pub fn visit_nodes<F, E>(root: &Value, mut visitor: F) -> Result<(), E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<(), E>,
{
    for entry in preorder(root) {
        visitor(entry.node, entry.parent, &entry.path)?;
    }
    Ok(())
}

/// Replace every node with the mapper's result.
///
/// The mapper sees original (unmapped) nodes. Children of a node are mapped
/// regardless of what the mapper returned for the node itself; they are
/// reattached if that result is an object.
pub fn map_nodes<F, E>(root: &Value, mut mapper: F) -> Result<Value, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<Value, E>,
{
    let mut mapped = Vec::new();
    for entry in preorder(root) {
        mapped.push(mapper(entry.node, entry.parent, &entry.path)?);
    }
    Ok(reassemble_mapped(root, &mut mapped.into_iter()))
}

/// Keep the nodes accepted by `predicate`.
///
/// Rejecting a node drops its whole subtree; the predicate is never called
/// on its descendants. Returns `None` if the root itself is rejected.
pub fn filter_nodes<F, E>(root: &Value, mut predicate: F) -> Result<Option<Value>, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    let mut decisions = Vec::new();
    let mut stack = vec![NodeEntry::root(root)];
    while let Some(entry) = stack.pop() {
        let keep = predicate(entry.node, entry.parent, &entry.path)?;
        decisions.push(keep);
        if keep {
            push_children(&mut stack, &entry);
        }
    }
    Ok(reassemble_filtered(root, &mut decisions.into_iter()))
}

/// The first node, in pre-order, accepted by `predicate`.
pub fn find_node<'a, F, E>(root: &'a Value, mut predicate: F) -> Result<Option<NodeMatch<'a>>, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path)? {
            return Ok(Some(entry.into_match()));
        }
    }
    Ok(None)
}

/// Every node accepted by `predicate`, in pre-order.
pub fn find_all_nodes<'a, F, E>(root: &'a Value, mut predicate: F) -> Result<Vec<NodeMatch<'a>>, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    let mut found = Vec::new();
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path)? {
            found.push(entry.into_match());
        }
    }
    Ok(found)
}

/// Fold every node, in pre-order, into an accumulator.
pub fn reduce_nodes<A, F, E>(root: &Value, init: A, mut reducer: F) -> Result<A, E>
where
    F: FnMut(A, &Value, Option<&Value>, &Path) -> Result<A, E>,
{
    let mut acc = init;
    for entry in preorder(root) {
        acc = reducer(acc, entry.node, entry.parent, &entry.path)?;
    }
    Ok(acc)
}

/// `true` as soon as one node satisfies `predicate`.
pub fn some_node<F, E>(root: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if predicate(entry.node, entry.parent, &entry.path)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// `false` as soon as one node fails `predicate`.
pub fn every_node<F, E>(root: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(&Value, Option<&Value>, &Path) -> Result<bool, E>,
{
    for entry in preorder(root) {
        if !predicate(entry.node, entry.parent, &entry.path)? {
            return Ok(false);
        }
    }
    Ok(true)
}
