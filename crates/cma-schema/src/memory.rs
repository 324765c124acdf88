use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cma_types::{EntityType, EntityTypeId, Field, Plugin};

use crate::error::{SchemaError, SchemaResult};
use crate::source::SchemaSource;

/// A serializable dump of a whole schema, as loaded by
/// [`InMemorySchemaSource::from_snapshot`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
    /// Fields keyed by entity type id.
    #[serde(default)]
    pub fields: HashMap<EntityTypeId, Vec<Field>>,
    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

/// In-memory schema source.
///
/// Intended for tests and offline tooling. Every call is counted so that
/// caching behaviour can be asserted, and an optional latency makes each
/// call suspend before answering.
pub struct InMemorySchemaSource {
    entity_types: RwLock<Vec<EntityType>>,
    fields: RwLock<HashMap<EntityTypeId, Vec<Field>>>,
    plugins: RwLock<Vec<Plugin>>,
    latency: Option<Duration>,
    entity_type_fetches: AtomicUsize,
    plugin_fetches: AtomicUsize,
    field_fetches: Mutex<HashMap<EntityTypeId, usize>>,
}

impl InMemorySchemaSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self {
            entity_types: RwLock::new(Vec::new()),
            fields: RwLock::new(HashMap::new()),
            plugins: RwLock::new(Vec::new()),
            latency: None,
            entity_type_fetches: AtomicUsize::new(0),
            plugin_fetches: AtomicUsize::new(0),
            field_fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Create a source pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: SchemaSnapshot) -> Self {
        let source = Self::new();
        *source.entity_types.write().expect("lock poisoned") = snapshot.entity_types;
        *source.fields.write().expect("lock poisoned") = snapshot.fields;
        *source.plugins.write().expect("lock poisoned") = snapshot.plugins;
        source
    }

    /// Parse a JSON-encoded [`SchemaSnapshot`].
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let snapshot: SchemaSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Make every call sleep for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register an entity type together with its fields.
    pub fn add_entity_type(&self, entity_type: EntityType, fields: Vec<Field>) {
        self.fields
            .write()
            .expect("lock poisoned")
            .insert(entity_type.id.clone(), fields);
        self.entity_types
            .write()
            .expect("lock poisoned")
            .push(entity_type);
    }

    pub fn add_plugin(&self, plugin: Plugin) {
        self.plugins.write().expect("lock poisoned").push(plugin);
    }

    /// Number of `list_entity_types` calls served.
    pub fn entity_type_fetches(&self) -> usize {
        self.entity_type_fetches.load(Ordering::SeqCst)
    }

    /// Number of `list_plugins` calls served.
    pub fn plugin_fetches(&self) -> usize {
        self.plugin_fetches.load(Ordering::SeqCst)
    }

    /// Number of `list_fields` calls for one entity type.
    pub fn field_fetches(&self, entity_type: &EntityTypeId) -> usize {
        self.field_fetches
            .lock()
            .expect("lock poisoned")
            .get(entity_type)
            .copied()
            .unwrap_or(0)
    }

    /// Number of `list_fields` calls across all entity types.
    pub fn total_field_fetches(&self) -> usize {
        self.field_fetches
            .lock()
            .expect("lock poisoned")
            .values()
            .sum()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Default for InMemorySchemaSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaSource for InMemorySchemaSource {
    async fn list_entity_types(&self) -> SchemaResult<Vec<EntityType>> {
        self.entity_type_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.entity_types.read().expect("lock poisoned").clone())
    }

    async fn list_fields(&self, entity_type: &EntityTypeId) -> SchemaResult<Vec<Field>> {
        *self
            .field_fetches
            .lock()
            .expect("lock poisoned")
            .entry(entity_type.clone())
            .or_insert(0) += 1;
        self.simulate_latency().await;
        self.fields
            .read()
            .expect("lock poisoned")
            .get(entity_type)
            .cloned()
            .ok_or_else(|| SchemaError::EntityTypeNotFound(entity_type.to_string()))
    }

    async fn list_plugins(&self) -> SchemaResult<Vec<Plugin>> {
        self.plugin_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self.plugins.read().expect("lock poisoned").clone())
    }
}

impl std::fmt::Debug for InMemorySchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entity_types.read().expect("lock poisoned").len();
        f.debug_struct("InMemorySchemaSource")
            .field("entity_type_count", &count)
            .field("latency", &self.latency)
            .finish()
    }
}
