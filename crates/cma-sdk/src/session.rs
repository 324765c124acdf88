use std::sync::Arc;

use tracing::{debug, info};

use cma_blocks::BlockTraverser;
use cma_schema::{SchemaRepository, SchemaSource};

use crate::config::SdkConfig;
use crate::error::SdkResult;

/// One logical session against a fixed schema.
///
/// Owns a [`SchemaRepository`] and a [`BlockTraverser`] sharing it. Start a
/// new session when the schema may have changed.
#[derive(Clone, Debug)]
pub struct Session {
    config: SdkConfig,
    repository: Arc<SchemaRepository>,
    traverser: BlockTraverser,
}

impl Session {
    /// Create a session without loading anything.
    pub fn new(source: Arc<dyn SchemaSource>, config: SdkConfig) -> Self {
        let repository = Arc::new(SchemaRepository::new(source));
        let traverser = BlockTraverser::new(repository.clone()).with_options(config.traversal_options());
        Self {
            config,
            repository,
            traverser,
        }
    }

    /// Create a session and run the configured prefetch.
    pub async fn connect(source: Arc<dyn SchemaSource>, config: SdkConfig) -> SdkResult<Self> {
        let session = Self::new(source, config);
        session.prefetch().await?;
        info!(direction = %session.config.traversal.direction, "session ready");
        Ok(session)
    }

    /// Load whatever the `[schema]` config asks for.
    pub async fn prefetch(&self) -> SdkResult<()> {
        let schema = &self.config.schema;
        if schema.prefetch_fields {
            self.repository.prefetch_all_fields().await?;
        } else if schema.prefetch_entity_types {
            let entity_types = self.repository.get_all_entity_types().await?;
            debug!(count = entity_types.len(), "prefetched entity types");
        }
        if schema.prefetch_plugins {
            let plugins = self.repository.get_all_plugins().await?;
            debug!(count = plugins.len(), "prefetched plugins");
        }
        Ok(())
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn schema(&self) -> &Arc<SchemaRepository> {
        &self.repository
    }

    pub fn blocks(&self) -> &BlockTraverser {
        &self.traverser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cma_blocks::TraversalDirection;
    use cma_schema::InMemorySchemaSource;
    use cma_types::{EntityType, Field, FieldType, Plugin};

    fn source() -> Arc<InMemorySchemaSource> {
        let source = InMemorySchemaSource::new();
        source.add_entity_type(
            EntityType::model("p", "product"),
            vec![Field::new("f1", "content", FieldType::RichText)],
        );
        source.add_entity_type(EntityType::block("cb", "content_block"), Vec::new());
        source.add_plugin(Plugin::new("pl", "Star rating"));
        Arc::new(source)
    }

    #[tokio::test]
    async fn new_session_loads_nothing() {
        let src = source();
        let session = Session::new(src.clone(), SdkConfig::default());
        assert_eq!(session.blocks().direction(), TraversalDirection::AncestorFirst);
        assert_eq!(src.entity_type_fetches(), 0);
        assert_eq!(src.plugin_fetches(), 0);
    }

    #[tokio::test]
    async fn connect_runs_configured_prefetch() {
        let src = source();
        let mut config = SdkConfig::default().with_direction(TraversalDirection::DescendantFirst);
        config.schema.prefetch_fields = true;
        config.schema.prefetch_plugins = true;

        let session = Session::connect(src.clone(), config).await.unwrap();
        assert_eq!(session.blocks().direction(), TraversalDirection::DescendantFirst);
        assert_eq!(src.entity_type_fetches(), 1);
        assert_eq!(src.total_field_fetches(), 2);
        assert_eq!(src.plugin_fetches(), 1);
        assert!(session.schema().cached_fields(&"cb".into()).is_some());
    }

    #[tokio::test]
    async fn entity_type_prefetch_leaves_fields_lazy() {
        let src = source();
        let mut config = SdkConfig::default();
        config.schema.prefetch_entity_types = true;

        let session = Session::connect(src.clone(), config).await.unwrap();
        assert_eq!(src.entity_type_fetches(), 1);
        assert_eq!(src.total_field_fetches(), 0);
        assert!(session.schema().cached_fields(&"p".into()).is_none());
    }
}
