//! Asynchronous twins of [`crate::nonrecursive`].
//!
//! Items are offered to the callback one at a time, in the same order as
//! the synchronous accessors; the next callback starts only after the
//! previous one has completed.

use serde_json::Value;

use cma_types::{BlockItem, FieldType, Path};

use crate::error::BlocksError;
use crate::shape::{iterate_blocks, replace_items, retain_items, under_rejected, BlockEntry};

pub async fn visit_blocks_async<F, E>(field_type: &FieldType, value: &Value, mut visitor: F) -> Result<(), E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<(), E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        visitor(&entry.item, &entry.path).await?;
    }
    Ok(())
}

pub async fn map_blocks_async<F, E>(field_type: &FieldType, value: &Value, mut mapper: F) -> Result<Value, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
    E: From<BlocksError>,
{
    let mut mapped = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        let item = mapper(&entry.item, &entry.path).await?;
        mapped.push(item.to_value().map_err(BlocksError::from)?);
    }
    Ok(replace_items(field_type, value.clone(), mapped)?)
}

pub async fn filter_blocks_async<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<Value, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    let mut decisions = Vec::new();
    let mut rejected = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        let keep = if under_rejected(&entry.path, &rejected) {
            false
        } else {
            predicate(&entry.item, &entry.path).await?
        };
        if !keep {
            rejected.push(entry.path);
        }
        decisions.push(keep);
    }
    Ok(retain_items(field_type, value.clone(), &decisions)?)
}

pub async fn find_block_async<F, E>(
    field_type: &FieldType,
    value: &Value,
    mut predicate: F,
) -> Result<Option<BlockEntry>, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path).await? {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}

pub async fn find_all_blocks_async<F, E>(
    field_type: &FieldType,
    value: &Value,
    mut predicate: F,
) -> Result<Vec<BlockEntry>, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    let mut found = Vec::new();
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path).await? {
            found.push(entry);
        }
    }
    Ok(found)
}

pub async fn reduce_blocks_async<A, F, E>(
    field_type: &FieldType,
    value: &Value,
    init: A,
    mut reducer: F,
) -> Result<A, E>
where
    F: AsyncFnMut(A, &BlockItem, &Path) -> Result<A, E>,
    E: From<BlocksError>,
{
    let mut acc = init;
    for entry in iterate_blocks(field_type, value)? {
        acc = reducer(acc, &entry.item, &entry.path).await?;
    }
    Ok(acc)
}

pub async fn some_blocks_async<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if predicate(&entry.item, &entry.path).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub async fn every_block_async<F, E>(field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
where
    F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
    E: From<BlocksError>,
{
    for entry in iterate_blocks(field_type, value)? {
        if !predicate(&entry.item, &entry.path).await? {
            return Ok(false);
        }
    }
    Ok(true)
}
