//! Shared test data: a two-model schema and block builders.

use std::sync::Arc;

use serde_json::{json, Value};

use cma_schema::{InMemorySchemaSource, SchemaRepository};
use cma_types::{BlockItem, EntityType, Field, FieldType};

/// Block model with a title and three nested block-bearing fields.
pub const CONTENT_BLOCK: &str = "cb";
/// Block model without block-bearing fields.
pub const QUOTE_BLOCK: &str = "qb";

pub fn schema_source() -> Arc<InMemorySchemaSource> {
    let source = InMemorySchemaSource::new();
    source.add_entity_type(
        EntityType::model("p", "product"),
        vec![
            Field::new("p1", "name", FieldType::String).localized(),
            Field::new("p2", "content", FieldType::RichText).localized(),
            Field::new("p3", "hero", FieldType::SingleBlock),
        ],
    );
    source.add_entity_type(
        EntityType::block(CONTENT_BLOCK, "content_block"),
        vec![
            Field::new("c1", "title", FieldType::String),
            Field::new("c2", "rich_text", FieldType::RichText),
            Field::new("c3", "body", FieldType::StructuredText),
            Field::new("c4", "hero", FieldType::SingleBlock),
        ],
    );
    source.add_entity_type(
        EntityType::block(QUOTE_BLOCK, "quote_block"),
        vec![Field::new("q1", "title", FieldType::String)],
    );
    Arc::new(source)
}

pub fn repository(source: &Arc<InMemorySchemaSource>) -> Arc<SchemaRepository> {
    Arc::new(SchemaRepository::new(source.clone()))
}

/// A resolved block with only a title.
pub fn block(id: &str, entity_type: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": "item",
        "attributes": { "title": title },
        "relationships": { "item_type": { "data": { "id": entity_type, "type": "item_type" } } },
        "meta": {}
    })
}

/// A resolved block as the API returns it, with members the block types do
/// not model: a `creator` relationship and top-level `links`.
pub fn api_block(id: &str, entity_type: &str, title: &str) -> Value {
    let mut value = block(id, entity_type, title);
    value["relationships"]["creator"] = json!({ "data": { "id": "u1", "type": "account" } });
    value["links"] = json!({ "self": format!("/items/{id}") });
    value
}

/// A create request that still carries a `meta` member.
pub fn request_with_meta(entity_type: &str, title: &str) -> Value {
    json!({
        "type": "item",
        "attributes": { "title": title },
        "relationships": { "item_type": { "data": { "id": entity_type, "type": "item_type" } } },
        "meta": { "x": 1 }
    })
}

/// A resolved content block whose `rich_text` holds `children`.
pub fn parent(id: &str, title: &str, children: Vec<Value>) -> Value {
    let mut value = block(id, CONTENT_BLOCK, title);
    value["attributes"]["rich_text"] = Value::Array(children);
    value
}

/// A structured-text value whose root holds `children`.
pub fn structured_text(children: Value) -> Value {
    json!({
        "schema": "dast",
        "document": { "type": "root", "children": children }
    })
}

pub fn title_of(item: &BlockItem) -> Option<&str> {
    item.attribute("title")?.as_str()
}
