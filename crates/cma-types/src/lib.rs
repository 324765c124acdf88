//! Foundation types for the content API client.
//!
//! Every other `cma-*` crate depends on `cma-types`. It defines the data
//! model the block traversal engine works on, plus the localization
//! combinators used to treat localized and non-localized field values
//! uniformly.
//!
//! # Key Types
//!
//! - [`FieldType`]: closed set of field type tags, classified by [`FieldType::shape`]
//! - [`FieldShape`]: list-of-blocks, single-block, document, or other
//! - [`BlockItem`]: a block in reference, request, or resolved form
//! - [`Path`]: location of a visited block relative to the traversal root
//! - [`EntityType`], [`Field`], [`Plugin`]: schema descriptors

pub mod block;
pub mod error;
pub mod field;
pub mod ids;
pub mod localization;
pub mod path;
pub mod schema;

pub use block::{
    BlockItem, BlockItemForm, BlockRelationships, BlockRequest, EntityTypeRef,
    EntityTypeRelationship, ResolvedBlock,
};
pub use error::{TypeError, TypeResult};
pub use field::{FieldShape, FieldType};
pub use ids::{BlockId, EntityTypeId, FieldId, PluginId};
pub use localization::LocalizedEntry;
pub use path::{Path, PathSegment};
pub use schema::{EntityType, Field, Plugin};
