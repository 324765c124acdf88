//! Locating block items inside a field value, and rebuilding the value
//! once those items have been replaced or dropped.

use std::collections::HashMap;

use serde_json::{Map, Value};

use cma_tree::{filter_nodes, map_nodes, node_type, visit_nodes, CHILDREN};
use cma_types::{BlockItem, FieldShape, FieldType, Path, TypeError};

use crate::error::BlocksResult;

/// Member of a structured-text value holding the root node.
pub const DOCUMENT: &str = "document";

/// Document node kinds that carry a block in their `item` property.
pub const ITEM_NODE_TYPES: [&str; 3] = ["block", "inlineBlock", "inline-block"];

/// A block item found in a field value, with its path relative to that
/// value.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockEntry {
    pub item: BlockItem,
    pub path: Path,
}

impl BlockEntry {
    pub fn new(item: BlockItem, path: Path) -> Self {
        Self { item, path }
    }
}

/// The `item` of a document node, if the node is a block node.
pub fn block_node_item(node: &Value) -> Option<&Value> {
    let kind = node_type(node)?;
    if ITEM_NODE_TYPES.contains(&kind) {
        node.get("item")
    } else {
        None
    }
}

fn document_root<'a>(field_type: &FieldType, value: &'a Value) -> BlocksResult<Option<&'a Value>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => match map.get(DOCUMENT) {
            Some(Value::Null) | None => Ok(None),
            Some(root @ Value::Object(_)) => Ok(Some(root)),
            Some(_) => Err(TypeError::malformed_value(field_type, "`document` is not a node").into()),
        },
        _ => Err(TypeError::malformed_value(field_type, "expected an object with a `document` root").into()),
    }
}

/// The top-level block items of a field value, in order.
///
/// Does not look inside the items themselves. Values of non-block-bearing
/// field types, and `null`, yield nothing.
pub fn iterate_blocks(field_type: &FieldType, value: &Value) -> BlocksResult<Vec<BlockEntry>> {
    match field_type.shape() {
        FieldShape::ListOfBlocks => match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| -> BlocksResult<BlockEntry> {
                    Ok(BlockEntry::new(BlockItem::from_value(item.clone())?, Path::root().child(i)))
                })
                .collect(),
            _ => Err(TypeError::malformed_value(field_type, "expected an array of blocks").into()),
        },
        FieldShape::SingleBlock => match value {
            Value::Null => Ok(Vec::new()),
            item => Ok(vec![BlockEntry::new(BlockItem::from_value(item.clone())?, Path::root())]),
        },
        FieldShape::Document => {
            let Some(root) = document_root(field_type, value)? else {
                return Ok(Vec::new());
            };
            let mut entries = Vec::new();
            visit_nodes(root, |node, _, path| {
                if let Some(item) = block_node_item(node) {
                    entries.push(BlockEntry::new(BlockItem::from_value(item.clone())?, path.clone()));
                }
                Ok::<(), crate::BlocksError>(())
            })?;
            Ok(entries)
        }
        FieldShape::Other => Ok(Vec::new()),
    }
}

/// Copy of a node without its children, which `map_nodes` reattaches.
fn without_children(node: &Value) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != CHILDREN)
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}

/// Rebuild `value` with its block items replaced, in iteration order.
///
/// `replacements` must be aligned with [`iterate_blocks`] on the same value.
pub(crate) fn replace_items(
    field_type: &FieldType,
    value: Value,
    replacements: Vec<Value>,
) -> BlocksResult<Value> {
    match field_type.shape() {
        FieldShape::ListOfBlocks => match value {
            Value::Null => Ok(Value::Null),
            _ => Ok(Value::Array(replacements)),
        },
        FieldShape::SingleBlock => Ok(replacements.into_iter().next().unwrap_or(Value::Null)),
        FieldShape::Document => {
            if document_root(field_type, &value)?.is_none() {
                return Ok(value);
            }
            let mut map = match value {
                Value::Object(map) => map,
                other => return Ok(other),
            };
            let mut replacements = replacements.into_iter();
            let root = map.get(DOCUMENT).unwrap_or(&Value::Null);
            let document = map_nodes(root, |node, _, _| {
                let mut out = without_children(node);
                if block_node_item(node).is_some() {
                    if let (Some(replacement), Value::Object(obj)) = (replacements.next(), &mut out) {
                        obj.insert("item".to_string(), replacement);
                    }
                }
                Ok::<_, crate::BlocksError>(out)
            })?;
            map.insert(DOCUMENT.to_string(), document);
            Ok(Value::Object(map))
        }
        FieldShape::Other => Ok(value),
    }
}

/// Rebuild `value` keeping only the block items whose decision is `true`.
///
/// `decisions` must be aligned with [`iterate_blocks`] on the same value.
/// A single block collapses to `null` when rejected; a rejected document
/// block node takes its whole subtree with it.
pub(crate) fn retain_items(field_type: &FieldType, value: Value, decisions: &[bool]) -> BlocksResult<Value> {
    match field_type.shape() {
        FieldShape::ListOfBlocks => match value {
            Value::Array(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .zip(decisions.iter().copied())
                    .filter_map(|(item, keep)| keep.then_some(item))
                    .collect(),
            )),
            other => Ok(other),
        },
        FieldShape::SingleBlock => match decisions.first() {
            Some(true) => Ok(value),
            _ => Ok(Value::Null),
        },
        FieldShape::Document => {
            let Some(root) = document_root(field_type, &value)? else {
                return Ok(value);
            };
            let paths = iterate_blocks(field_type, &value)?.into_iter().map(|entry| entry.path);
            let keep: HashMap<Path, bool> = paths.zip(decisions.iter().copied()).collect();
            let filtered = filter_nodes(root, |node, _, path| {
                if block_node_item(node).is_some() {
                    Ok::<_, crate::BlocksError>(keep.get(path).copied().unwrap_or(false))
                } else {
                    Ok(true)
                }
            })?;
            let Some(document) = filtered else {
                return Ok(Value::Null);
            };
            let Value::Object(mut map) = value else {
                return Ok(Value::Null);
            };
            map.insert(DOCUMENT.to_string(), document);
            Ok(Value::Object(map))
        }
        FieldShape::Other => Ok(value),
    }
}

/// Whether `path` lies strictly below one of the `rejected` paths.
///
/// Document filters never evaluate blocks inside a rejected block node.
pub(crate) fn under_rejected(path: &Path, rejected: &[Path]) -> bool {
    rejected
        .iter()
        .any(|prefix| path.len() > prefix.len() && path.starts_with(prefix))
}
