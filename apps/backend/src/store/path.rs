use std::fmt;

use serde::{Deserialize, Serialize};

use super::StoreError;

/// Path of a document: an even number of non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocPath(String);

/// Path of a collection: an odd number of non-empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath(String);

fn check_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains('/') {
        return Err(StoreError::InvalidPath(format!(
            "segment '{segment}' must be non-empty and contain no '/'"
        )));
    }
    Ok(())
}

impl CollectionPath {
    /// A top-level collection such as `leagues`.
    pub fn root(name: &str) -> Result<Self, StoreError> {
        check_segment(name)?;
        Ok(Self(name.to_string()))
    }

    pub fn doc(&self, id: &str) -> Result<DocPath, StoreError> {
        check_segment(id)?;
        Ok(DocPath(format!("{}/{id}", self.0)))
    }

    /// Last segment; the name collection-group queries match on.
    pub fn collection_id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocPath {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let segments: Vec<&str> = raw.split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{raw}' does not name a document"
            )));
        }
        for segment in &segments {
            check_segment(segment)?;
        }
        Ok(Self(raw.to_string()))
    }

    pub fn collection(&self, name: &str) -> Result<CollectionPath, StoreError> {
        check_segment(name)?;
        Ok(CollectionPath(format!("{}/{name}", self.0)))
    }

    /// Collection containing this document.
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(String::new()),
        }
    }

    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn collection_id(&self) -> String {
        self.parent().collection_id().to_string()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DocPath {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DocPath::parse(&value)
    }
}

impl From<DocPath> for String {
    fn from(value: DocPath) -> Self {
        value.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a (possibly nested) field inside a document.
///
/// Segments are kept separate, so map keys that are user ids may contain
/// any character, dots included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn of<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn field(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
