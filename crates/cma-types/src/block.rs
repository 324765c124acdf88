use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{TypeError, TypeResult};
use crate::ids::{BlockId, EntityTypeId};

fn item_kind() -> String {
    "item".to_string()
}

fn item_type_kind() -> String {
    "item_type".to_string()
}

/// Pointer from a block to the entity type (block model) it instantiates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeRef {
    pub id: EntityTypeId,
    #[serde(rename = "type", default = "item_type_kind")]
    pub kind: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeRelationship {
    pub data: EntityTypeRef,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `relationships` member of a block object. Relationships other than
/// `item_type` (such as `creator`) are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRelationships {
    #[serde(rename = "item_type")]
    pub entity_type: EntityTypeRelationship,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockRelationships {
    pub fn new(entity_type: EntityTypeId) -> Self {
        Self {
            entity_type: EntityTypeRelationship {
                data: EntityTypeRef {
                    id: entity_type,
                    kind: item_type_kind(),
                },
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

/// A block sent to the API: without `id` it creates a new block, with one
/// it updates the existing block.
///
/// Members not modelled here, `meta` included, are kept in `extra` and
/// written back unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BlockId>,
    #[serde(rename = "type", default = "item_kind")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub relationships: BlockRelationships,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockRequest {
    /// A new-block request for the given block model.
    pub fn new(entity_type: impl Into<EntityTypeId>) -> Self {
        Self {
            id: None,
            kind: item_kind(),
            attributes: Map::new(),
            relationships: BlockRelationships::new(entity_type.into()),
            extra: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, api_key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(api_key.into(), value);
        self
    }
}

/// A block as returned by the API, carrying server-assigned metadata.
/// Unmodelled members are kept in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub id: BlockId,
    #[serde(rename = "type", default = "item_kind")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    pub relationships: BlockRelationships,
    pub meta: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedBlock {
    pub fn new(id: impl Into<BlockId>, entity_type: impl Into<EntityTypeId>) -> Self {
        Self {
            id: id.into(),
            kind: item_kind(),
            attributes: Map::new(),
            relationships: BlockRelationships::new(entity_type.into()),
            meta: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn with_attribute(mut self, api_key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(api_key.into(), value);
        self
    }

    /// Strip server metadata, producing an update request for this block.
    pub fn into_request(self) -> BlockRequest {
        BlockRequest {
            id: Some(self.id),
            kind: self.kind,
            attributes: self.attributes,
            relationships: self.relationships,
            extra: self.extra,
        }
    }
}

/// Which of the three block item forms a value has, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockItemForm {
    /// A bare block id: always a traversal leaf.
    Reference,
    /// A full object without server metadata.
    Request,
    /// A full object returned by the API.
    Resolved,
}

impl BlockItemForm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::Request => "request",
            Self::Resolved => "resolved",
        }
    }
}

/// A block embedded in a block-bearing field.
///
/// Only [`BlockItem::Request`] and [`BlockItem::Resolved`] are recursion
/// points; references carry no nested data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockItem {
    Reference(BlockId),
    Resolved(ResolvedBlock),
    Request(BlockRequest),
}

impl BlockItem {
    pub fn reference(id: impl Into<BlockId>) -> Self {
        Self::Reference(id.into())
    }

    /// Decode a block item from its JSON representation.
    pub fn from_value(value: Value) -> TypeResult<Self> {
        serde_json::from_value(value).map_err(|e| TypeError::InvalidBlock(e.to_string()))
    }

    /// Encode this block item as JSON.
    pub fn to_value(&self) -> TypeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn form(&self) -> BlockItemForm {
        match self {
            Self::Reference(_) => BlockItemForm::Reference,
            Self::Request(_) => BlockItemForm::Request,
            Self::Resolved(_) => BlockItemForm::Resolved,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// The block id, if any (absent on create requests).
    pub fn id(&self) -> Option<&BlockId> {
        match self {
            Self::Reference(id) => Some(id),
            Self::Request(req) => req.id.as_ref(),
            Self::Resolved(block) => Some(&block.id),
        }
    }

    /// The block model this item instantiates; `None` for references.
    pub fn entity_type_id(&self) -> Option<&EntityTypeId> {
        match self {
            Self::Reference(_) => None,
            Self::Request(req) => Some(&req.relationships.entity_type.data.id),
            Self::Resolved(block) => Some(&block.relationships.entity_type.data.id),
        }
    }

    pub fn attributes(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Reference(_) => None,
            Self::Request(req) => Some(&req.attributes),
            Self::Resolved(block) => Some(&block.attributes),
        }
    }

    pub fn attributes_mut(&mut self) -> Option<&mut Map<String, Value>> {
        match self {
            Self::Reference(_) => None,
            Self::Request(req) => Some(&mut req.attributes),
            Self::Resolved(block) => Some(&mut block.attributes),
        }
    }

    pub fn attribute(&self, api_key: &str) -> Option<&Value> {
        self.attributes().and_then(|attrs| attrs.get(api_key))
    }

    /// Borrow the resolved block, failing on the other two forms.
    pub fn as_resolved(&self) -> TypeResult<&ResolvedBlock> {
        match self {
            Self::Resolved(block) => Ok(block),
            other => Err(TypeError::MalformedBlock {
                expected: BlockItemForm::Resolved.as_str(),
                found: other.form().as_str(),
            }),
        }
    }

    /// Borrow the attributes of a request or resolved block, failing on a
    /// bare reference.
    pub fn require_attributes(&self) -> TypeResult<&Map<String, Value>> {
        self.attributes().ok_or(TypeError::MalformedBlock {
            expected: "block object",
            found: BlockItemForm::Reference.as_str(),
        })
    }
}

impl From<BlockRequest> for BlockItem {
    fn from(req: BlockRequest) -> Self {
        Self::Request(req)
    }
}

impl From<ResolvedBlock> for BlockItem {
    fn from(block: ResolvedBlock) -> Self {
        Self::Resolved(block)
    }
}
