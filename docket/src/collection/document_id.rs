use crate::errors::{DocketError, DocketResult, ErrorKind};
use std::fmt::{Debug, Display};

/// A unique identifier for a document.
///
/// Identifiers are opaque strings. New ids are random v4 UUIDs rendered
/// without hyphens; ids supplied from outside (an API path parameter, a
/// reference field) only need to be non-blank.
///
/// ```rust,ignore
/// use docket::collection::DocumentId;
///
/// let id = DocumentId::new();
/// let parsed = DocumentId::parse(&id.to_string())?;
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generates a new random id.
    pub fn new() -> Self {
        DocumentId(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Parses an externally supplied id.
    ///
    /// # Errors
    ///
    /// `InvalidId` if the value is empty or only whitespace.
    pub fn parse(value: &str) -> DocketResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            log::error!("Document id must not be blank");
            return Err(DocketError::new(
                "Document id must not be blank",
                ErrorKind::InvalidId,
            ));
        }
        Ok(DocumentId(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        DocumentId::new()
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl TryFrom<&str> for DocumentId {
    type Error = DocketError;

    fn try_from(value: &str) -> DocketResult<Self> {
        DocumentId::parse(value)
    }
}
