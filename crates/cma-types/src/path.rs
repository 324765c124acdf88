//! Addresses of visited blocks and document nodes.
//!
//! A [`Path`] is an ordered list of segments, each either an array index or
//! an object key, locating a value relative to the root the traversal
//! started from. Paths produced by nested traversals are concatenated: the
//! recursive block engine joins a block's own path, the marker
//! `attributes`, `<field-api-key>`, and whatever path the inner field yields.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

/// Location of a value relative to a traversal root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path (the traversal root itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// A new path with every segment of `suffix` appended.
    pub fn join(&self, suffix: &Path) -> Self {
        let mut segments = self.0.clone();
        segments.extend(suffix.0.iter().cloned());
        Self(segments)
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// Returns `true` if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// The path a nested field traversal is rooted at: this path followed
    /// by `attributes`, `<api_key>`.
    pub fn attribute(&self, api_key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::key("attributes"));
        segments.push(PathSegment::key(api_key));
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            match seg {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(k) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
            }
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_marker_extends_path() {
        let outer = Path::root().child(0usize);
        let nested = outer.attribute("rich_text").join(&Path::root().child(0usize));
        assert_eq!(
            nested.segments(),
            &[
                PathSegment::Index(0),
                PathSegment::key("attributes"),
                PathSegment::key("rich_text"),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(nested.to_string(), "[0].attributes.rich_text[0]");
    }

    #[test]
    fn prefix_checks() {
        let a = Path::root().child("children").child(1usize);
        let b = a.child("children").child(0usize);
        assert!(b.starts_with(&a));
        assert!(!a.starts_with(&b));
        assert!(a.starts_with(&Path::root()));
    }

    #[test]
    fn display_of_root_is_empty() {
        assert_eq!(Path::root().to_string(), "");
        assert!(Path::root().is_empty());
    }

    #[test]
    fn serializes_as_mixed_array() {
        let path = Path::root().child(2usize).child("attributes");
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json, serde_json::json!([2, "attributes"]));
        let parsed: Path = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, path);
    }
}
