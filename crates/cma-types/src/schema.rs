use serde::{Deserialize, Serialize};

use crate::field::FieldType;
use crate::ids::{EntityTypeId, FieldId, PluginId};

/// Descriptor of an entity type: either a model (top-level records) or a
/// block model (records embedded in block-bearing fields).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    pub id: EntityTypeId,
    pub api_key: String,
    #[serde(default)]
    pub name: String,
    /// `true` for block models.
    #[serde(default)]
    pub modular_block: bool,
    #[serde(default)]
    pub singleton: bool,
}

impl EntityType {
    /// A top-level model descriptor.
    pub fn model(id: impl Into<EntityTypeId>, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        Self {
            id: id.into(),
            name: api_key.clone(),
            api_key,
            modular_block: false,
            singleton: false,
        }
    }

    /// A block model descriptor.
    pub fn block(id: impl Into<EntityTypeId>, api_key: impl Into<String>) -> Self {
        Self {
            modular_block: true,
            ..Self::model(id, api_key)
        }
    }

    pub fn is_block_model(&self) -> bool {
        self.modular_block
    }
}

/// Descriptor of a single field of an entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub api_key: String,
    #[serde(default)]
    pub label: String,
    pub field_type: FieldType,
    /// Whether values are stored as a locale-keyed mapping.
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub position: u32,
}

impl Field {
    pub fn new(id: impl Into<FieldId>, api_key: impl Into<String>, field_type: FieldType) -> Self {
        let api_key = api_key.into();
        Self {
            id: id.into(),
            label: api_key.clone(),
            api_key,
            field_type,
            localized: false,
            position: 0,
        }
    }

    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    pub fn at_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }
}

/// Descriptor of an installed plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: PluginId,
    pub name: String,
    /// npm package name; absent for private plugins installed by URL.
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Plugin {
    pub fn new(id: impl Into<PluginId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            package_name: None,
            url: None,
        }
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }
}
