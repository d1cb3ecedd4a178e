/// A passage reference as returned by the knowledge base, before link resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievedReference {
    /// Object-store locator, when the source lives in the object store
    pub uri: Option<String>,
    /// Full passage text
    pub excerpt: Option<String>,
}

impl RetrievedReference {
    /// Creates a reference pointing at `uri`.
    pub fn new(uri: impl Into<String>, excerpt: Option<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            excerpt,
        }
    }
}

/// Raw response of a retrieval-and-generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedAnswer {
    /// Generated answer text, if the service produced any
    pub text: Option<String>,
    /// References flattened across citations, in service order
    pub references: Vec<RetrievedReference>,
    /// True if the service's own guardrail intervened
    pub guardrail_intervened: bool,
}

impl GeneratedAnswer {
    /// Creates a response with answer text and references.
    pub fn new(text: impl Into<String>, references: Vec<RetrievedReference>) -> Self {
        Self {
            text: Some(text.into()),
            references,
            guardrail_intervened: false,
        }
    }

    /// Marks the response as one the service guardrail intervened on.
    #[must_use]
    pub fn intervened(mut self) -> Self {
        self.guardrail_intervened = true;
        self
    }
}
