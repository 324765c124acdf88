//! Node inspection helpers and the pre-order walk shared by every operation.

use serde_json::Value;

use cma_types::Path;

/// Property holding a node's children.
pub const CHILDREN: &str = "children";

/// The children of `node`, if it carries a `children` array.
///
/// A node without a `children` property, or whose `children` is not an
/// array, is a leaf.
pub fn children_of(node: &Value) -> Option<&Vec<Value>> {
    node.get(CHILDREN)?.as_array()
}

pub fn has_children(node: &Value) -> bool {
    children_of(node).is_some()
}

/// The node's `type` tag, if present.
pub fn node_type(node: &Value) -> Option<&str> {
    node.get("type")?.as_str()
}

/// A node found by [`find_node`](crate::find_node) or
/// [`find_all_nodes`](crate::find_all_nodes), with its path from the root.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMatch<'a> {
    pub node: &'a Value,
    pub path: Path,
}

/// A node scheduled for a callback during a walk.
#[derive(Clone, Debug)]
pub(crate) struct NodeEntry<'a> {
    pub node: &'a Value,
    pub parent: Option<&'a Value>,
    pub path: Path,
}

impl<'a> NodeEntry<'a> {
    pub fn root(node: &'a Value) -> Self {
        Self {
            node,
            parent: None,
            path: Path::root(),
        }
    }

    pub fn into_match(self) -> NodeMatch<'a> {
        NodeMatch {
            node: self.node,
            path: self.path,
        }
    }
}

/// Push the children of `entry` so that popping yields them left to right.
pub(crate) fn push_children<'a>(stack: &mut Vec<NodeEntry<'a>>, entry: &NodeEntry<'a>) {
    if let Some(children) = children_of(entry.node) {
        for (i, child) in children.iter().enumerate().rev() {
            stack.push(NodeEntry {
                node: child,
                parent: Some(entry.node),
                path: entry.path.child(CHILDREN).child(i),
            });
        }
    }
}

/// Every node of the tree in pre-order (parent before children, siblings
/// left to right).
pub(crate) fn preorder(root: &Value) -> Vec<NodeEntry<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![NodeEntry::root(root)];
    while let Some(entry) = stack.pop() {
        push_children(&mut stack, &entry);
        out.push(entry);
    }
    out
}

/// Rebuild a tree from mapped nodes produced in pre-order.
///
/// Each node is replaced by the next mapped value; if the original node had
/// children and the replacement is an object, the mapped children are
/// reattached under `children`. Children are consumed either way so the
/// iterator stays aligned with the pre-order sequence.
pub(crate) fn reassemble_mapped(node: &Value, mapped: &mut impl Iterator<Item = Value>) -> Value {
    let mut out = mapped.next().unwrap_or(Value::Null);
    if let Some(children) = children_of(node) {
        let new_children: Vec<Value> = children
            .iter()
            .map(|child| reassemble_mapped(child, mapped))
            .collect();
        if let Value::Object(map) = &mut out {
            map.insert(CHILDREN.to_string(), Value::Array(new_children));
        }
    }
    out
}

/// Rebuild a tree from keep/drop decisions taken in pruned pre-order: a
/// dropped node's subtree was never visited and has no decisions.
pub(crate) fn reassemble_filtered(
    node: &Value,
    decisions: &mut impl Iterator<Item = bool>,
) -> Option<Value> {
    if !decisions.next().unwrap_or(false) {
        return None;
    }
    let mut out = node.clone();
    if let Some(children) = children_of(node) {
        let kept: Vec<Value> = children
            .iter()
            .filter_map(|child| reassemble_filtered(child, decisions))
            .collect();
        if let Value::Object(map) = &mut out {
            map.insert(CHILDREN.to_string(), Value::Array(kept));
        }
    }
    Some(out)
}
