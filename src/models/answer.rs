use serde::{Deserialize, Serialize};
use std::fmt;

use super::RetrievalCitation;

/// Answer text used when the knowledge base returns no generated text.
pub const NO_ANSWER_FALLBACK: &str = "I couldn't find an answer to that question.";

/// Reason reported when the knowledge base's own guardrail intervened.
pub const GENERATION_GUARDRAIL_REASON: &str = "Response blocked by content guardrail";

/// Which safety check refused to let an answer through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalKind {
    /// The moderation pre-check rejected the question.
    Question,
    /// The knowledge base's in-line guardrail intervened during generation.
    Generation,
    /// The moderation post-check rejected the generated answer.
    Answer,
}

impl RefusalKind {
    /// Returns the fixed refusal text shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::Question => {
                "I cannot answer that question as it violates content safety policies."
            }
            Self::Generation => {
                "I cannot provide an answer to that question as it violates content safety policies."
            }
            Self::Answer => "I cannot provide the answer as it violates content safety policies.",
        }
    }
}

impl fmt::Display for RefusalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Question => write!(f, "question"),
            Self::Generation => write!(f, "generation"),
            Self::Answer => write!(f, "answer"),
        }
    }
}

/// Final structured response to a question.
///
/// Serializes to `{ answer, sources, blocked, blockReason? }`. A blocked
/// result always carries one of the [`RefusalKind`] messages and no sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    #[serde(rename = "answer")]
    answer_text: String,
    #[serde(rename = "sources")]
    citations: Vec<RetrievalCitation>,
    blocked: bool,
    #[serde(
        rename = "blockReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    block_reason: Option<String>,
}

impl AnswerResult {
    /// Creates an unblocked result.
    pub fn answered(answer_text: impl Into<String>, citations: Vec<RetrievalCitation>) -> Self {
        Self {
            answer_text: answer_text.into(),
            citations,
            blocked: false,
            block_reason: None,
        }
    }

    /// Creates a refusal for the given check.
    pub fn refused(kind: RefusalKind, reason: Option<String>) -> Self {
        Self {
            answer_text: kind.message().to_string(),
            citations: Vec::new(),
            blocked: true,
            block_reason: reason,
        }
    }

    /// Returns the answer text (or the refusal text when blocked).
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    /// Returns the citations in retrieval order.
    pub fn citations(&self) -> &[RetrievalCitation] {
        &self.citations
    }

    /// Returns true if a safety check refused the answer.
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// Returns the block reason, if any.
    pub fn block_reason(&self) -> Option<&str> {
        self.block_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_templates_are_distinct() {
        let messages = [
            RefusalKind::Question.message(),
            RefusalKind::Generation.message(),
            RefusalKind::Answer.message(),
        ];
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn refused_result_has_no_citations() {
        let result = AnswerResult::refused(RefusalKind::Answer, Some("unsafe".to_string()));
        assert!(result.is_blocked());
        assert!(result.citations().is_empty());
        assert_eq!(result.answer_text(), RefusalKind::Answer.message());
        assert_eq!(result.block_reason(), Some("unsafe"));
    }

    #[test]
    fn answered_result_serializes_without_block_reason() {
        let result = AnswerResult::answered("You have condition X.", Vec::new());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "answer": "You have condition X.",
                "sources": [],
                "blocked": false
            })
        );
    }

    #[test]
    fn refused_result_serializes_block_reason() {
        let result = AnswerResult::refused(
            RefusalKind::Generation,
            Some(GENERATION_GUARDRAIL_REASON.to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["blocked"], true);
        assert_eq!(json["blockReason"], GENERATION_GUARDRAIL_REASON);
        assert_eq!(json["sources"], serde_json::json!([]));
    }
}
