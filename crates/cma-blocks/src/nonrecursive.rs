//! One-level block accessors.
//!
//! These operate on the block items directly embedded in a field value and
//! never look inside a block's own attributes. Callbacks receive the item
//! and its path within the value (`[2]` in a list, the empty path for a
//! single block, the node path for a structured-text document).

use serde_json::Value;

use cma_types::{BlockItem, FieldType, Path};

use crate::error::BlocksError;
use crate::shape::{iterate_blocks, replace_items, retain_items, under_rejected, BlockEntry};

pub fn visit_blocks<F, E>(field_type: &FieldType, value: &Value, mut visitor: F) -> Result<(), E>
where
    F: FnMut(&BlockItem, &Path) -> Result<(), E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        visitor(&entry.item, &entry.path)?;
    }
    Ok(())
}

/// Replace every block item with the mapper's result, keeping the shape of
/// the field value.
pub fn map_blocks<F, E>(field_type: &FieldType, value: &Value, mut mapper: F) -> Result<Value, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
    E: From<BlocksError>,
{
    let mut mapped = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        let item = mapper(&entry.item, &entry.path)?;
        mapped.push(item.to_value().map_err(BlocksError::from)?);
    }
    Ok(replace_items(field_type, value.clone(), mapped)?)
}

/// Keep the block items accepted by `predicate`.
///
/// Lists keep their order, a rejected single block becomes `null`, and a
/// rejected document block node is removed with its subtree (blocks inside
/// it are not offered to the predicate).
pub fn filter_blocks<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<Value, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    let mut decisions = Vec::new();
    let mut rejected = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        let keep = !under_rejected(&entry.path, &rejected) && predicate(&entry.item, &entry.path)?;
        if !keep {
            rejected.push(entry.path);
        }
        decisions.push(keep);
    }
    Ok(retain_items(field_type, value.clone(), &decisions)?)
}

pub fn find_block<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<Option<BlockEntry>, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path)? {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

pub fn find_all_blocks<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<Vec<BlockEntry>, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    let mut found = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path)? {
            found.push(entry);
        }
    }
    Ok(found)
}

pub fn reduce_blocks<A, F, E>(field_type: &FieldType, value: &Value, init: A, mut reducer: F) -> Result<A, E>
where
    F: FnMut(A, &BlockItem, &Path) -> Result<A, E>,
    E: From<BlocksError>,
{
    let mut acc = init;
    for entry in iterate_blocks(field_type, value)? {
        acc = reducer(acc, &entry.item, &entry.path)?;
    }
    Ok(acc)
}

pub fn some_blocks<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn every_block<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: FnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if !predicate(&entry.item, &entry.path)? {
            return Ok(false);
        }
    }
    Ok(true)
}
