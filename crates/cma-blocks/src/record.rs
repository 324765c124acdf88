//! Whole-record helpers.
//!
//! A record's attributes hold one value per field, keyed by api key;
//! localized fields hold a locale mapping. These helpers run the recursive
//! engine over every block-bearing field of a record, once per locale.
//! Reported paths start at the field: `content.en[0]` for a localized field,
//! `hero` for a non-localized one.

use serde_json::{Map, Value};

use cma_types::localization::{from_entries, to_entries};
use cma_types::{BlockItem, EntityType, Field, LocalizedEntry, Path};

use crate::error::BlocksError;
use crate::traverser::BlockTraverser;

fn locale_prefix(field: &Field, locale: Option<&str>) -> Path {
    let mut prefix = Path::root().child(field.api_key.as_str());
    if let Some(locale) = locale {
        prefix.push(locale);
    }
    prefix
}

impl BlockTraverser {
    /// Visit every block, at any depth, in every locale of every field of a
    /// record of `entity_type`.
    pub async fn visit_record_blocks<F, E>(
        &self,
        entity_type: &EntityType,
        attributes: &Map<String, Value>,
        mut visitor: F,
    ) -> Result<(), E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<(), E>,
        E: From<BlocksError>,
    {
        let fields = self
            .repository()
            .get_fields(entity_type)
            .await
            .map_err(BlocksError::from)?;
        for field in fields.iter() {
            if !field.field_type.shape().is_block_bearing() {
                continue;
            }
            let Some(value) = attributes.get(&field.api_key) else {
                continue;
            };
            for entry in to_entries(field, value).map_err(BlocksError::from)? {
                let prefix = locale_prefix(field, entry.locale());
                self.visit_blocks_at(&field.field_type, &entry.value, &prefix, &mut visitor)
                    .await?;
            }
        }
        Ok(())
    }

    /// Map every block, at any depth, in every locale of every field of a
    /// record of `entity_type`, returning the rewritten attributes.
    ///
    /// Attributes that are not block-bearing fields are copied unchanged.
    pub async fn map_record_blocks<F, E>(
        &self,
        entity_type: &EntityType,
        attributes: &Map<String, Value>,
        mut mapper: F,
    ) -> Result<Map<String, Value>, E>
    where
        F: AsyncFnMut(&BlockItem, &Path) -> Result<BlockItem, E>,
        E: From<BlocksError>,
    {
        let fields = self
            .repository()
            .get_fields(entity_type)
            .await
            .map_err(BlocksError::from)?;
        let mut out = attributes.clone();
        for field in fields.iter() {
            if !field.field_type.shape().is_block_bearing() {
                continue;
            }
            let Some(value) = attributes.get(&field.api_key) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            let mut mapped = Vec::new();
            for entry in to_entries(field, value).map_err(BlocksError::from)? {
                let prefix = locale_prefix(field, entry.locale());
                let next = self
                    .map_field(field.field_type.clone(), entry.value, prefix, &mut mapper)
                    .await?;
                mapped.push(LocalizedEntry::new(entry.locale, next));
            }
            let rebuilt = from_entries(field, mapped).map_err(BlocksError::from)?;
            out.insert(field.api_key.clone(), rebuilt);
        }
        Ok(out)
    }
}
