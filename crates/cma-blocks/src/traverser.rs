//! The recursive, schema-aware block engine.
//!
//! [`BlockTraverser`] applies the accessor operations to a field value and,
//! transitively, to every block nested inside the blocks it finds. To
//! descend into a request or resolved block it asks the
//! [`SchemaRepository`] for the fields of the block's model and recurses
//! into each block-bearing attribute. Reference items are leaves and never
//! trigger a schema lookup.
//!
//! Every operation is asynchronous, since schema lookups may suspend.
//! Blocks are processed strictly one after another; sibling callbacks never
//! overlap.
//!
//! Paths are absolute from the traversal root: a block at index 0 of the
//! `rich_text` attribute of the block at index 0 is reported at
//! `[0].attributes.rich_text[0]`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use cma_schema::{FieldList, SchemaRepository};
use cma_types::{BlockItem, Field, FieldType, Path};

use crate::error::{BlocksError, BlocksResult};
use crate::options::{TraversalDirection, TraversalOptions};
use crate::shape::{iterate_blocks, replace_items, retain_items, under_rejected, BlockEntry};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Pending blocks of a pre-order walk. A block's nested blocks are only
/// pushed once the caller has processed the block itself, so a walk that
/// stops early never looks up the schema of blocks it did not reach.
struct PreOrder {
    stack: Vec<BlockEntry>,
}

impl PreOrder {
    fn new(field_type: &FieldType, value: &Value, prefix: &Path) -> BlocksResult<Self> {
        let mut stack: Vec<BlockEntry> = iterate_blocks(field_type, value)?
            .into_iter()
            .map(|entry| BlockEntry::new(entry.item, prefix.join(&entry.path)))
            .collect();
        stack.reverse();
        Ok(Self { stack })
    }

    fn pop(&mut self) -> Option<BlockEntry> {
        self.stack.pop()
    }

    async fn descend(&mut self, traverser: &BlockTraverser, entry: &BlockEntry) -> BlocksResult<()> {
        let nested = traverser.nested_entries(entry).await?;
        self.stack.extend(nested.into_iter().rev());
        Ok(())
    }
}

/// Recursive block engine bound to one schema repository.
#[derive(Clone, Debug)]
pub struct BlockTraverser {
    repository: Arc<SchemaRepository>,
    options: TraversalOptions,
}

impl BlockTraverser {
    pub fn new(repository: Arc<SchemaRepository>) -> Self {
        Self {
            repository,
            options: TraversalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TraversalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_direction(mut self, direction: TraversalDirection) -> Self {
        self.options.direction = direction;
        self
    }

    pub fn repository(&self) -> &Arc<SchemaRepository> {
        &self.repository
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    pub fn direction(&self) -> TraversalDirection {
        self.options.direction
    }

    /// Fields of the block's model, or `None` for a reference.
    async fn block_fields(&self, item: &BlockItem) -> BlocksResult<Option<FieldList>> {
        let Some(entity_type) = item.entity_type_id() else {
            return Ok(None);
        };
        Ok(Some(self.repository.get_fields_by_entity_type_id(entity_type).await?))
    }

    /// The blocks directly nested in `entry`'s attributes, with absolute
    /// paths, in field order.
    async fn nested_entries(&self, entry: &BlockEntry) -> BlocksResult<Vec<BlockEntry>> {
        let Some(fields) = self.block_fields(&entry.item).await? else {
            return Ok(Vec::new());
        };
        trace!(path = %entry.path, fields = fields.len(), "descending into block");
        let mut nested = Vec::new();
        for field in fields.iter() {
            let Some(value) = entry.item.attribute(&field.api_key) else {
                continue;
            };
            let prefix = entry.path.attribute(&field.api_key);
            for inner in iterate_blocks(&field.field_type, value)? {
                nested.push(BlockEntry::new(inner.item, prefix.join(&inner.path)));
            }
        }
        Ok(nested)
    }

    // ---------------------------------------------------------------
    // Read-only operations
    // ---------------------------------------------------------------

    /// Call `visitor` on every block, at any depth, in pre-order.
    pub async fn visit_blocks<F, E>(&self, field_type: &FieldType, value: &Value, mut visitor: F) -> Result<(), E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<(), E>,
        E: From<BlocksError>,
    {
        self.visit_blocks_at(field_type, value, &Path::root(), &mut visitor).await
    }

    pub(crate) async fn visit_blocks_at<F, E>(
        &self,
        field_type: &FieldType,
        value: &Value,
        prefix: &Path,
        visitor: &mut F,
    ) -> Result<(), E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<(), E>,
        E: From<BlocksError>,
    {
        let mut walk = PreOrder::new(field_type, value, prefix)?;
        while let Some(entry) = walk.pop() {
            visitor(&entry.item, &entry.path).await?;
            walk.descend(self, &entry).await?;
        }
        Ok(())
    }

    /// The first block, in pre-order, accepted by `predicate`.
    pub async fn find_block<F, E>(
        &self,
        field_type: &FieldType,
        value: &Value,
        mut predicate: F,
    ) -> Result<Option<BlockEntry>, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        let mut walk = PreOrder::new(field_type, value, &Path::root())?;
        while let Some(entry) = walk.pop() {
            if predicate(&entry.item, &entry.path).await? {
                return Ok(Some(entry));
            }
            walk.descend(self, &entry).await?;
        }
        Ok(None)
    }

    /// Every block, at any depth, accepted by `predicate`, in pre-order.
    pub async fn find_all_blocks<F, E>(
        &self,
        field_type: &FieldType,
        value: &Value,
        mut predicate: F,
    ) -> Result<Vec<BlockEntry>, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        let mut found = Vec::new();
        let mut walk = PreOrder::new(field_type, value, &Path::root())?;
        while let Some(entry) = walk.pop() {
            let matched = predicate(&entry.item, &entry.path).await?;
            walk.descend(self, &entry).await?;
            if matched {
                found.push(entry);
            }
        }
        Ok(found)
    }

    pub async fn reduce_blocks<A, F, E>(
        &self,
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
        let mut walk = PreOrder::new(field_type, value, &Path::root())?;
        while let Some(entry) = walk.pop() {
            acc = reducer(acc, &entry.item, &entry.path).await?;
            walk.descend(self, &entry).await?;
        }
        Ok(acc)
    }

    pub async fn some_blocks<F, E>(&self, field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        let mut walk = PreOrder::new(field_type, value, &Path::root())?;
        while let Some(entry) = walk.pop() {
            if predicate(&entry.item, &entry.path).await? {
                return Ok(true);
            }
            walk.descend(self, &entry).await?;
        }
        Ok(false)
    }

    pub async fn every_block<F, E>(&self, field_type: &FieldType, value: &Value, mut predicate: F) -> Result<bool, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        let mut walk = PreOrder::new(field_type, value, &Path::root())?;
        while let Some(entry) = walk.pop() {
            if !predicate(&entry.item, &entry.path).await? {
                return Ok(false);
            }
            walk.descend(self, &entry).await?;
        }
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Map
    // ---------------------------------------------------------------

    /// Replace every block, at any depth, with the mapper's result.
    ///
    /// In [`TraversalDirection::AncestorFirst`] the mapper sees each block
    /// with its original nested blocks; in
    /// [`TraversalDirection::DescendantFirst`] it sees them already mapped.
    /// The nested fields of a block are those of its original model, and
    /// are only rewritten where the mapped block still carries them.
    pub async fn map_blocks<F, E>(&self, field_type: &FieldType, value: &Value, mut mapper: F) -> Result<Value, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        self.map_field(field_type.clone(), value.clone(), Path::root(), &mut mapper)
            .await
    }

    /// [`map_blocks`](Self::map_blocks) in `direction`, whatever this
    /// traverser's own direction is.
    pub async fn map_blocks_with<F, E>(
        &self,
        direction: TraversalDirection,
        field_type: &FieldType,
        value: &Value,
        mapper: F,
    ) -> Result<Value, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        self.clone()
            .with_direction(direction)
            .map_blocks(field_type, value, mapper)
            .await
    }

    pub(crate) fn map_field<'a, F, E>(
        &'a self,
        field_type: FieldType,
        value: Value,
        prefix: Path,
        mapper: &'a mut F,
    ) -> BoxFuture<'a, Result<Value, E>>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError> + 'a,
    {
        Box::pin(async move {
            let entries = iterate_blocks(&field_type, &value)?;
            let mut mapped = Vec::with_capacity(entries.len());
            for entry in entries {
                let path = prefix.join(&entry.path);
                let item = match self.options.direction {
                    TraversalDirection::AncestorFirst => {
                        self.map_ancestor_first(entry.item, path, &mut *mapper).await?
                    }
                    TraversalDirection::DescendantFirst => {
                        self.map_descendant_first(entry.item, path, &mut *mapper).await?
                    }
                };
                mapped.push(item.to_value().map_err(BlocksError::from)?);
            }
            Ok(replace_items(&field_type, value, mapped)?)
        })
    }

    async fn map_ancestor_first<F, E>(&self, item: BlockItem, path: Path, mapper: &mut F) -> Result<BlockItem, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        let fields = self.block_fields(&item).await?;
        let mut mapped = mapper(&item, &path).await?;
        if let Some(fields) = fields {
            self.map_attributes(&mut mapped, &fields, &path, mapper).await?;
        }
        Ok(mapped)
    }

    async fn map_descendant_first<F, E>(&self, item: BlockItem, path: Path, mapper: &mut F) -> Result<BlockItem, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        let mut item = item;
        if let Some(fields) = self.block_fields(&item).await? {
            self.map_attributes(&mut item, &fields, &path, mapper).await?;
        }
        mapper(&item, &path).await
    }

    async fn map_attributes<F, E>(
        &self,
        item: &mut BlockItem,
        fields: &[Field],
        path: &Path,
        mapper: &mut F,
    ) -> Result<(), E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        trace!(path = %path, "mapping nested blocks");
        for field in fields {
            if !field.field_type.shape().is_block_bearing() {
                continue;
            }
            let Some(current) = item.attribute(&field.api_key).cloned() else {
                continue;
            };
            let next = self
                .map_field(field.field_type.clone(), current, path.attribute(&field.api_key), mapper)
                .await?;
            if let Some(attributes) = item.attributes_mut() {
                attributes.insert(field.api_key.clone(), next);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Filter
    // ---------------------------------------------------------------

    /// Keep the blocks, at any depth, accepted by `predicate`.
    ///
    /// Every block's nested fields are filtered whether or not the block
    /// itself is kept. In [`TraversalDirection::AncestorFirst`] the
    /// predicate sees a block before its nested blocks are filtered; in
    /// [`TraversalDirection::DescendantFirst`] it sees the filtered result,
    /// after every sibling has been processed.
    pub async fn filter_blocks<F, E>(&self, field_type: &FieldType, value: &Value, mut predicate: F) -> Result<Value, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        self.filter_field(field_type.clone(), value.clone(), Path::root(), &mut predicate)
            .await
    }

    /// [`filter_blocks`](Self::filter_blocks) in `direction`, whatever this
    /// traverser's own direction is.
    pub async fn filter_blocks_with<F, E>(
        &self,
        direction: TraversalDirection,
        field_type: &FieldType,
        value: &Value,
        predicate: F,
    ) -> Result<Value, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        self.clone()
            .with_direction(direction)
            .filter_blocks(field_type, value, predicate)
            .await
    }

    fn filter_field<'a, F, E>(
        &'a self,
        field_type: FieldType,
        value: Value,
        prefix: Path,
        predicate: &'a mut F,
    ) -> BoxFuture<'a, Result<Value, E>>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError> + 'a,
    {
        Box::pin(async move {
            let entries = iterate_blocks(&field_type, &value)?;
            let mut processed = Vec::with_capacity(entries.len());
            let mut decisions = Vec::with_capacity(entries.len());
            let mut rejected = Vec::new();
            match self.options.direction {
                TraversalDirection::AncestorFirst => {
                    for entry in entries {
                        let path = prefix.join(&entry.path);
                        let keep = !under_rejected(&entry.path, &rejected)
                            && predicate(&entry.item, &path).await?;
                        if !keep {
                            rejected.push(entry.path);
                        }
                        let item = self.filter_attributes(entry.item, &path, &mut *predicate).await?;
                        processed.push(item.to_value().map_err(BlocksError::from)?);
                        decisions.push(keep);
                    }
                }
                TraversalDirection::DescendantFirst => {
                    let mut filtered = Vec::with_capacity(entries.len());
                    for entry in entries {
                        let path = prefix.join(&entry.path);
                        let item = self.filter_attributes(entry.item, &path, &mut *predicate).await?;
                        filtered.push((entry.path, path, item));
                    }
                    for (relative, path, item) in filtered {
                        let keep = !under_rejected(&relative, &rejected) && predicate(&item, &path).await?;
                        if !keep {
                            rejected.push(relative);
                        }
                        processed.push(item.to_value().map_err(BlocksError::from)?);
                        decisions.push(keep);
                    }
                }
            }
            let replaced = replace_items(&field_type, value, processed)?;
            Ok(retain_items(&field_type, replaced, &decisions)?)
        })
    }

    async fn filter_attributes<F, E>(&self, item: BlockItem, path: &Path, predicate: &mut F) -> Result<BlockItem, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<bool, E>,
        E: From<BlocksError>,
    {
        let mut item = item;
        let Some(fields) = self.block_fields(&item).await? else {
            return Ok(item);
        };
        trace!(path = %path, "filtering nested blocks");
        for field in fields.iter() {
            if !field.field_type.shape().is_block_bearing() {
                continue;
            }
            let Some(current) = item.attribute(&field.api_key).cloned() else {
                continue;
            };
            let next = self
                .filter_field(field.field_type.clone(), current, path.attribute(&field.api_key), predicate)
                .await?;
            if let Some(attributes) = item.attributes_mut() {
                attributes.insert(field.api_key.clone(), next);
            }
        }
        Ok(item)
    }
}
