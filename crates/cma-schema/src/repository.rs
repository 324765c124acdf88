//! The caching schema repository.
//!
//! [`SchemaRepository`] resolves entity types, their fields, and plugins
//! through a [`SchemaSource`], loading each lazily and memoizing it for the
//! repository's lifetime.
//!
//! # Invariants
//!
//! - Caches only grow: once an entry is set it is never evicted or replaced.
//! - The entity type list, each entity type's fields, and the plugin list
//!   load independently of one another.
//! - Concurrent first requests for the same entry share one in-flight fetch.
//! - A failed fetch is not cached; the next request retries it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::debug;

use cma_types::{EntityType, EntityTypeId, Field, Plugin, PluginId};

use crate::error::{SchemaError, SchemaResult};
use crate::source::SchemaSource;

/// Shared, immutable field list of one entity type.
pub type FieldList = Arc<Vec<Field>>;

/// Loaded entity types, indexed by id and api key.
struct EntityTypeIndex {
    ordered: Vec<Arc<EntityType>>,
    by_id: HashMap<EntityTypeId, Arc<EntityType>>,
    by_api_key: HashMap<String, Arc<EntityType>>,
}

impl EntityTypeIndex {
    fn new(entity_types: Vec<EntityType>) -> Self {
        let ordered: Vec<Arc<EntityType>> = entity_types.into_iter().map(Arc::new).collect();
        let by_id = ordered
            .iter()
            .map(|et| (et.id.clone(), Arc::clone(et)))
            .collect();
        let by_api_key = ordered
            .iter()
            .map(|et| (et.api_key.clone(), Arc::clone(et)))
            .collect();
        Self {
            ordered,
            by_id,
            by_api_key,
        }
    }
}

/// Loaded plugins, indexed by id and package name.
struct PluginIndex {
    ordered: Vec<Arc<Plugin>>,
    by_id: HashMap<PluginId, Arc<Plugin>>,
    by_package_name: HashMap<String, Arc<Plugin>>,
}

impl PluginIndex {
    fn new(plugins: Vec<Plugin>) -> Self {
        let ordered: Vec<Arc<Plugin>> = plugins.into_iter().map(Arc::new).collect();
        let by_id = ordered
            .iter()
            .map(|p| (p.id.clone(), Arc::clone(p)))
            .collect();
        let by_package_name = ordered
            .iter()
            .filter_map(|p| Some((p.package_name.clone()?, Arc::clone(p))))
            .collect();
        Self {
            ordered,
            by_id,
            by_package_name,
        }
    }
}

/// Point-in-time cache of a schema.
///
/// The repository assumes the schema does not change during its lifetime.
/// There is no refresh: construct a new repository to observe a new
/// schema.
pub struct SchemaRepository {
    source: Arc<dyn SchemaSource>,
    entity_types: OnceCell<EntityTypeIndex>,
    plugins: OnceCell<PluginIndex>,
    fields: Mutex<HashMap<EntityTypeId, Arc<OnceCell<FieldList>>>>,
}

impl SchemaRepository {
    /// Create an empty repository reading from `source`.
    pub fn new(source: Arc<dyn SchemaSource>) -> Self {
        Self {
            source,
            entity_types: OnceCell::new(),
            plugins: OnceCell::new(),
            fields: Mutex::new(HashMap::new()),
        }
    }

    // ---------------------------------------------------------------
    // Entity types
    // ---------------------------------------------------------------

    async fn entity_type_index(&self) -> SchemaResult<&EntityTypeIndex> {
        self.entity_types
            .get_or_try_init(|| async {
                debug!("loading entity types");
                let entity_types = self.source.list_entity_types().await?;
                debug!(count = entity_types.len(), "entity types loaded");
                Ok(EntityTypeIndex::new(entity_types))
            })
            .await
    }

    /// Every entity type, in source order.
    pub async fn get_all_entity_types(&self) -> SchemaResult<Vec<Arc<EntityType>>> {
        Ok(self.entity_type_index().await?.ordered.clone())
    }

    /// Every entity type that is not a block model.
    pub async fn get_all_models(&self) -> SchemaResult<Vec<Arc<EntityType>>> {
        let index = self.entity_type_index().await?;
        Ok(index
            .ordered
            .iter()
            .filter(|et| !et.is_block_model())
            .cloned()
            .collect())
    }

    /// Every block model.
    pub async fn get_all_block_models(&self) -> SchemaResult<Vec<Arc<EntityType>>> {
        let index = self.entity_type_index().await?;
        Ok(index
            .ordered
            .iter()
            .filter(|et| et.is_block_model())
            .cloned()
            .collect())
    }

    pub async fn get_entity_type_by_id(&self, id: &EntityTypeId) -> SchemaResult<Arc<EntityType>> {
        let index = self.entity_type_index().await?;
        index
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::EntityTypeNotFound(id.to_string()))
    }

    pub async fn get_entity_type_by_api_key(&self, api_key: &str) -> SchemaResult<Arc<EntityType>> {
        let index = self.entity_type_index().await?;
        index
            .by_api_key
            .get(api_key)
            .cloned()
            .ok_or_else(|| SchemaError::EntityTypeNotFound(api_key.to_string()))
    }

    // ---------------------------------------------------------------
    // Fields
    // ---------------------------------------------------------------

    fn fields_cell(&self, id: &EntityTypeId) -> Arc<OnceCell<FieldList>> {
        let mut cells = self.fields.lock().expect("lock poisoned");
        Arc::clone(cells.entry(id.clone()).or_default())
    }

    /// The fields of `entity_type`, in source order.
    pub async fn get_fields(&self, entity_type: &EntityType) -> SchemaResult<FieldList> {
        self.get_fields_by_entity_type_id(&entity_type.id).await
    }

    /// The fields of the entity type with this id.
    ///
    /// Does not require the entity type list to be loaded. The first call
    /// per id fetches from the source; concurrent first calls wait on the
    /// same fetch; later calls return the cached list without suspending.
    pub async fn get_fields_by_entity_type_id(&self, id: &EntityTypeId) -> SchemaResult<FieldList> {
        let cell = self.fields_cell(id);
        let fields = cell
            .get_or_try_init(|| async {
                debug!(entity_type = %id, "loading fields");
                let fields = self.source.list_fields(id).await?;
                Ok::<_, SchemaError>(Arc::new(fields))
            })
            .await?;
        Ok(Arc::clone(fields))
    }

    /// The cached fields of an entity type, without fetching.
    pub fn cached_fields(&self, id: &EntityTypeId) -> Option<FieldList> {
        let cells = self.fields.lock().expect("lock poisoned");
        cells.get(id).and_then(|cell| cell.get().cloned())
    }

    /// Load the entity type list and then every entity type's fields,
    /// one entity type at a time.
    pub async fn prefetch_all_fields(&self) -> SchemaResult<()> {
        let entity_types = self.get_all_entity_types().await?;
        for entity_type in &entity_types {
            self.get_fields(entity_type).await?;
        }
        debug!(count = entity_types.len(), "prefetched fields of all entity types");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Plugins
    // ---------------------------------------------------------------

    async fn plugin_index(&self) -> SchemaResult<&PluginIndex> {
        self.plugins
            .get_or_try_init(|| async {
                debug!("loading plugins");
                let plugins = self.source.list_plugins().await?;
                Ok(PluginIndex::new(plugins))
            })
            .await
    }

    pub async fn get_all_plugins(&self) -> SchemaResult<Vec<Arc<Plugin>>> {
        Ok(self.plugin_index().await?.ordered.clone())
    }

    pub async fn get_plugin_by_id(&self, id: &PluginId) -> SchemaResult<Arc<Plugin>> {
        let index = self.plugin_index().await?;
        index
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| SchemaError::PluginNotFound(id.to_string()))
    }

    pub async fn get_plugin_by_package_name(&self, package_name: &str) -> SchemaResult<Arc<Plugin>> {
        let index = self.plugin_index().await?;
        index
            .by_package_name
            .get(package_name)
            .cloned()
            .ok_or_else(|| SchemaError::PluginNotFound(package_name.to_string()))
    }
}

impl std::fmt::Debug for SchemaRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached_fields = self
            .fields
            .lock()
            .expect("lock poisoned")
            .values()
            .filter(|cell| cell.initialized())
            .count();
        f.debug_struct("SchemaRepository")
            .field("entity_types_loaded", &self.entity_types.initialized())
            .field("plugins_loaded", &self.plugins.initialized())
            .field("cached_field_lists", &cached_fields)
            .finish()
    }
}
