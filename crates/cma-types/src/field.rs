use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The block-bearing shape a field value takes, derived from its field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldShape {
    /// An ordered sequence of block items (`rich_text`).
    ListOfBlocks,
    /// Zero or one block item (`single_block`).
    SingleBlock,
    /// A structured-text document whose `block`/`inlineBlock` nodes carry items.
    Document,
    /// Any other field type: never inspected by block traversal.
    Other,
}

impl FieldShape {
    /// Returns `true` for the three shapes that can embed block items.
    pub fn is_block_bearing(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Declared type of a field, as reported by the schema.
///
/// The set of known tags is closed; anything else lands in
/// [`FieldType::Unknown`] so that classification stays total when new
/// field types appear upstream.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Color,
    Date,
    DateTime,
    File,
    Float,
    Gallery,
    Integer,
    Json,
    LatLon,
    Link,
    Links,
    RichText,
    Seo,
    SingleBlock,
    Slug,
    String,
    StructuredText,
    Text,
    Video,
    Unknown(std::string::String),
}

impl FieldType {
    /// Parse a field type tag. Unrecognised tags map to `Unknown`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "boolean" => Self::Boolean,
            "color" => Self::Color,
            "date" => Self::Date,
            "date_time" => Self::DateTime,
            "file" => Self::File,
            "float" => Self::Float,
            "gallery" => Self::Gallery,
            "integer" => Self::Integer,
            "json" => Self::Json,
            "lat_lon" => Self::LatLon,
            "link" => Self::Link,
            "links" => Self::Links,
            "rich_text" => Self::RichText,
            "seo" => Self::Seo,
            "single_block" => Self::SingleBlock,
            "slug" => Self::Slug,
            "string" => Self::String,
            "structured_text" => Self::StructuredText,
            "text" => Self::Text,
            "video" => Self::Video,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The wire tag for this field type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::File => "file",
            Self::Float => "float",
            Self::Gallery => "gallery",
            Self::Integer => "integer",
            Self::Json => "json",
            Self::LatLon => "lat_lon",
            Self::Link => "link",
            Self::Links => "links",
            Self::RichText => "rich_text",
            Self::Seo => "seo",
            Self::SingleBlock => "single_block",
            Self::Slug => "slug",
            Self::String => "string",
            Self::StructuredText => "structured_text",
            Self::Text => "text",
            Self::Video => "video",
            Self::Unknown(tag) => tag,
        }
    }

    /// Classify this field type into its block-bearing shape.
    pub fn shape(&self) -> FieldShape {
        match self {
            Self::RichText => FieldShape::ListOfBlocks,
            Self::SingleBlock => FieldShape::SingleBlock,
            Self::StructuredText => FieldShape::Document,
            Self::Boolean
            | Self::Color
            | Self::Date
            | Self::DateTime
            | Self::File
            | Self::Float
            | Self::Gallery
            | Self::Integer
            | Self::Json
            | Self::LatLon
            | Self::Link
            | Self::Links
            | Self::Seo
            | Self::Slug
            | Self::String
            | Self::Text
            | Self::Video
            | Self::Unknown(_) => FieldShape::Other,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(s))
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = std::string::String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_bearing_tags_classify() {
        assert_eq!(FieldType::from_tag("rich_text").shape(), FieldShape::ListOfBlocks);
        assert_eq!(FieldType::from_tag("single_block").shape(), FieldShape::SingleBlock);
        assert_eq!(FieldType::from_tag("structured_text").shape(), FieldShape::Document);
    }

    #[test]
    fn everything_else_is_other() {
        for tag in ["string", "text", "links", "json", "seo", "gallery"] {
            let shape = FieldType::from_tag(tag).shape();
            assert_eq!(shape, FieldShape::Other, "{tag}");
            assert!(!shape.is_block_bearing());
        }
    }

    #[test]
    fn unknown_tags_keep_their_name() {
        let ft = FieldType::from_tag("hologram");
        assert_eq!(ft, FieldType::Unknown("hologram".into()));
        assert_eq!(ft.as_str(), "hologram");
        assert_eq!(ft.shape(), FieldShape::Other);
    }

    #[test]
    fn serde_uses_wire_tags() {
        let json = serde_json::to_string(&FieldType::StructuredText).unwrap();
        assert_eq!(json, "\"structured_text\"");
        let parsed: FieldType = serde_json::from_str("\"date_time\"").unwrap();
        assert_eq!(parsed, FieldType::DateTime);
    }

    #[test]
    fn tags_round_trip() {
        for tag in ["boolean", "lat_lon", "rich_text", "single_block", "video"] {
            assert_eq!(FieldType::from_tag(tag).as_str(), tag);
        }
    }
}
