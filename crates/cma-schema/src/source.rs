use async_trait::async_trait;

use cma_types::{EntityType, EntityTypeId, Field, Plugin};

use crate::error::SchemaResult;

/// Backing source of schema metadata, usually the content API itself.
///
/// Every method is an idempotent read returning a complete snapshot of
/// the current schema. No ordering guarantee is required beyond that;
/// [`SchemaRepository`](crate::SchemaRepository) preserves whatever order
/// the source returns.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Every entity type: models and block models alike.
    async fn list_entity_types(&self) -> SchemaResult<Vec<EntityType>>;

    /// The fields of one entity type.
    async fn list_fields(&self, entity_type: &EntityTypeId) -> SchemaResult<Vec<Field>>;

    /// Every installed plugin.
    async fn list_plugins(&self) -> SchemaResult<Vec<Plugin>>;
}
