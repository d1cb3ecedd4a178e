use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a retrieved passage.
pub const EXCERPT_LIMIT: usize = 200;

/// Marker appended to an excerpt that was cut at [`EXCERPT_LIMIT`].
const ELLIPSIS: &str = "...";

/// One supporting passage returned with a generated answer.
///
/// Serializes to the wire shape `{ s3Uri, preSignedUrl?, excerpt? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalCitation {
    /// Object-store locator of the source document
    #[serde(rename = "s3Uri")]
    source_uri: String,
    /// Time-limited access link, or the raw locator when signing failed
    #[serde(
        rename = "preSignedUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    resolved_link: Option<String>,
    /// Passage text, already truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    excerpt: Option<String>,
}

impl RetrievalCitation {
    /// Creates a citation, truncating the excerpt to [`EXCERPT_LIMIT`] characters.
    pub fn new(
        source_uri: impl Into<String>,
        excerpt: Option<&str>,
        resolved_link: Option<String>,
    ) -> Self {
        Self {
            source_uri: source_uri.into(),
            resolved_link,
            excerpt: excerpt.map(truncate_excerpt),
        }
    }

    /// Returns the object-store locator.
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    /// Returns the access link, if one was resolved.
    pub fn resolved_link(&self) -> Option<&str> {
        self.resolved_link.as_deref()
    }

    /// Returns the truncated excerpt.
    pub fn excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref()
    }
}

/// Cuts `text` to [`EXCERPT_LIMIT`] characters, appending `...` when anything was removed.
pub fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((end, _)) => format!("{}{ELLIPSIS}", &text[..end]),
        None => text.to_string(),
    }
}
