//! Content API client core.
//!
//! Ties the lower crates together for applications: a [`Session`] owns one
//! schema repository and a block traverser configured from [`SdkConfig`],
//! and [`init_tracing`] installs logging from the same config.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cma_sdk::{FieldType, InMemorySchemaSource, SdkConfig, Session};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let source = Arc::new(InMemorySchemaSource::from_json(r#"{ "entity_types": [] }"#)?);
//! let session = Session::connect(source, SdkConfig::default()).await?;
//! let value = serde_json::json!(["block-id"]);
//! let count = session
//!     .blocks()
//!     .reduce_blocks::<_, _, anyhow::Error>(&FieldType::RichText, &value, 0, async |n, _, _| Ok(n + 1))
//!     .await?;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use config::{LogConfig, SchemaConfig, SdkConfig, TraversalConfig};
pub use error::{SdkError, SdkResult};
pub use logging::init_tracing;
pub use session::Session;

// Re-export key types
pub use cma_blocks::{BlockEntry, BlockTraverser, BlocksError, TraversalDirection, TraversalOptions};
pub use cma_schema::{InMemorySchemaSource, SchemaError, SchemaRepository, SchemaSource};
pub use cma_types::{BlockItem, BlockItemForm, EntityType, Field, FieldShape, FieldType, Path, PathSegment};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use cma_types::localization::{from_entries, map_localized, to_entries};
    use serde_json::{json, Value};

    /// Product (`rich_text` content) and ContentBlock (title plus a nested
    /// `rich_text` of the same block model).
    fn catalog() -> Arc<InMemorySchemaSource> {
        let source = InMemorySchemaSource::new();
        source.add_entity_type(
            EntityType::model("product", "product"),
            vec![
                Field::new("f1", "name", FieldType::String).localized(),
                Field::new("f2", "content", FieldType::RichText),
            ],
        );
        source.add_entity_type(
            EntityType::block("content_block", "content_block"),
            vec![
                Field::new("f3", "title", FieldType::String),
                Field::new("f4", "rich_text", FieldType::RichText),
            ],
        );
        Arc::new(source)
    }

    fn content_block(id: &str, title: &str, children: Vec<Value>) -> Value {
        json!({
            "id": id,
            "type": "item",
            "attributes": { "title": title, "rich_text": children },
            "relationships": { "item_type": { "data": { "id": "content_block", "type": "item_type" } } },
            "meta": { "created_at": "2024-01-01T00:00:00Z" }
        })
    }

    fn product_content() -> Value {
        json!([content_block("parent", "Parent", vec![content_block("child", "Child", vec![])])])
    }

    fn title(item: &BlockItem) -> Option<&str> {
        item.attribute("title")?.as_str()
    }

    #[tokio::test]
    async fn finds_nested_child_block() -> anyhow::Result<()> {
        let source = catalog();
        let session = Session::connect(source.clone(), SdkConfig::default()).await?;
        let content = product_content();

        let has_child = session
            .blocks()
            .some_blocks::<_, anyhow::Error>(&FieldType::RichText, &content, async |item, _| {
                Ok(title(item) == Some("Child"))
            })
            .await?;
        assert!(has_child);

        let found = session
            .blocks()
            .find_all_blocks::<_, anyhow::Error>(&FieldType::RichText, &content, async |item, _| {
                Ok(title(item) == Some("Child"))
            })
            .await?;
        assert_eq!(found.len(), 1);
        assert_eq!(
            found[0].path,
            Path::from(vec![
                PathSegment::Index(0),
                PathSegment::key("attributes"),
                PathSegment::key("rich_text"),
                PathSegment::Index(0),
            ])
        );
        assert_eq!(found[0].item.as_resolved()?.id.as_str(), "child");

        // both traversals shared one fetch of the block model's fields
        assert_eq!(source.field_fetches(&"content_block".into()), 1);
        Ok(())
    }

    #[tokio::test]
    async fn record_helpers_cover_localized_and_nested_fields() -> anyhow::Result<()> {
        let session = Session::new(catalog(), SdkConfig::default());
        let product = session.schema().get_entity_type_by_api_key("product").await?;
        let attributes = json!({
            "name": { "en": "Desk", "it": "Scrivania" },
            "content": product_content()
        });
        let attributes = attributes.as_object().cloned().unwrap_or_default();

        let mut paths = Vec::new();
        session
            .blocks()
            .visit_record_blocks::<_, anyhow::Error>(&product, &attributes, async |_, path| {
                paths.push(path.to_string());
                Ok(())
            })
            .await?;
        assert_eq!(paths, vec!["content[0]", "content[0].attributes.rich_text[0]"]);

        let upper = session
            .blocks()
            .map_record_blocks::<_, anyhow::Error>(&product, &attributes, async |item, _| {
                let mut item = item.clone();
                if let Some(attrs) = item.attributes_mut() {
                    let upper = attrs["title"].as_str().unwrap_or_default().to_uppercase();
                    attrs.insert("title".into(), json!(upper));
                }
                Ok(item)
            })
            .await?;
        assert_eq!(upper["content"][0]["attributes"]["title"], "PARENT");
        assert_eq!(upper["content"][0]["attributes"]["rich_text"][0]["attributes"]["title"], "CHILD");
        assert_eq!(upper["name"], attributes["name"]);
        Ok(())
    }

    #[tokio::test]
    async fn descendant_first_session_filters_bottom_up() -> anyhow::Result<()> {
        let config = SdkConfig::from_toml_str("[traversal]\ndirection = \"descendant_first\"\n")?;
        let session = Session::connect(catalog(), config).await?;

        // drop every block without nested blocks; bottom-up, the parent
        // loses its only child first and is then dropped too
        let kept = session
            .blocks()
            .filter_blocks::<_, anyhow::Error>(&FieldType::RichText, &product_content(), async |item, _| {
                let nested = item.attribute("rich_text").and_then(Value::as_array).map_or(0, Vec::len);
                Ok(nested > 0)
            })
            .await?;
        assert_eq!(kept, json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn callback_errors_keep_their_type() {
        let session = Session::new(catalog(), SdkConfig::default());
        let err = session
            .blocks()
            .visit_blocks::<_, anyhow::Error>(&FieldType::RichText, &product_content(), async |item, _| {
                if title(item) == Some("Child") {
                    anyhow::bail!("child reached");
                }
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "child reached");
    }

    #[test]
    fn localized_values_round_trip() {
        let field = Field::new("f1", "name", FieldType::String).localized();
        let value = json!({ "en": "a", "it": "b" });
        let entries = to_entries(&field, &value).unwrap();
        assert_eq!(from_entries(&field, entries).unwrap(), value);

        let plain = Field::new("f2", "sku", FieldType::String);
        let entries = to_entries(&plain, &json!("a")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(from_entries(&plain, entries).unwrap(), json!("a"));

        let shouted = map_localized::<_, SdkError>(&field, &value, |_, v| {
            Ok(json!(v.as_str().unwrap_or_default().to_uppercase()))
        })
        .unwrap();
        assert_eq!(shouted, json!({ "en": "A", "it": "B" }));
    }
}
