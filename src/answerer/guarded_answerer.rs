//! Guarded retrieval-augmented answering.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::bedrock::{BedrockError, KnowledgeBaseClientTrait, ModerationClientTrait};
use crate::models::{
    AnswerResult, GENERATION_GUARDRAIL_REASON, GeneratedAnswer, ModerationVerdict,
    NO_ANSWER_FALLBACK, Question, RefusalKind, RetrievalCitation,
};
use crate::storage::PresignerTrait;

/// Lifetime of the access links attached to citations.
pub const LINK_EXPIRY: Duration = Duration::from_secs(15 * 60);

/// Errors surfaced to the caller of [`GuardedAnswerer::answer`].
///
/// Safety refusals are not errors; they come back as a blocked [`AnswerResult`].
#[derive(Debug, Error)]
pub enum AnswerError {
    /// The question was empty or whitespace-only
    #[error("Question is required")]
    EmptyQuestion,

    /// The knowledge base call failed for a reason other than a guardrail
    #[error("Knowledge base request failed: {0}")]
    Retrieval(#[source] BedrockError),
}

/// Answers questions from the knowledge base with a safety check on both sides
/// of generation.
///
/// The answerer holds no mutable state and can be shared across requests.
pub struct GuardedAnswerer {
    moderation: Arc<dyn ModerationClientTrait>,
    knowledge_base: Arc<dyn KnowledgeBaseClientTrait>,
    presigner: Arc<dyn PresignerTrait>,
}

impl GuardedAnswerer {
    /// Creates an answerer over the three collaborators.
    #[must_use]
    pub fn new(
        moderation: Arc<dyn ModerationClientTrait>,
        knowledge_base: Arc<dyn KnowledgeBaseClientTrait>,
        presigner: Arc<dyn PresignerTrait>,
    ) -> Self {
        Self {
            moderation,
            knowledge_base,
            presigner,
        }
    }

    /// Answers a question.
    ///
    /// Runs the moderation pre-check, retrieval-and-generation, the moderation
    /// post-check and citation link resolution, returning early with a refusal
    /// at the first check that blocks.
    ///
    /// # Errors
    ///
    /// Returns [`AnswerError::EmptyQuestion`] before contacting any service if
    /// the question is blank, and [`AnswerError::Retrieval`] if the knowledge
    /// base call fails.
    pub async fn answer(&self, question: &str) -> Result<AnswerResult, AnswerError> {
        let question = Question::parse(question).ok_or(AnswerError::EmptyQuestion)?;
        debug!(question = %question, "answering question");

        let verdict = self.moderate(question.as_str()).await;
        if verdict.is_blocked() {
            info!(stage = %RefusalKind::Question, "question blocked");
            return Ok(AnswerResult::refused(RefusalKind::Question, verdict.into_reason()));
        }

        let generated = match self
            .knowledge_base
            .retrieve_and_generate(question.as_str())
            .await
        {
            Ok(generated) => generated,
            Err(BedrockError::GuardrailIntervened { message }) => {
                info!(stage = %RefusalKind::Generation, "knowledge base guardrail rejected request");
                return Ok(AnswerResult::refused(RefusalKind::Generation, Some(message)));
            }
            Err(e) => {
                warn!(error = %e, "knowledge base request failed");
                return Err(AnswerError::Retrieval(e));
            }
        };

        if generated.guardrail_intervened {
            info!(stage = %RefusalKind::Generation, "knowledge base guardrail intervened");
            return Ok(AnswerResult::refused(
                RefusalKind::Generation,
                Some(GENERATION_GUARDRAIL_REASON.to_string()),
            ));
        }

        let GeneratedAnswer {
            text, references, ..
        } = generated;
        let answer_text = text.unwrap_or_else(|| NO_ANSWER_FALLBACK.to_string());
        debug!(answer = %answer_text, "generated answer");

        let verdict = self.moderate(&answer_text).await;
        if verdict.is_blocked() {
            info!(stage = %RefusalKind::Answer, "generated answer blocked");
            return Ok(AnswerResult::refused(RefusalKind::Answer, verdict.into_reason()));
        }

        let mut citations = Vec::with_capacity(references.len());
        for reference in references {
            let Some(uri) = reference.uri else {
                continue;
            };
            let link = self.resolve_link(&uri).await;
            citations.push(RetrievalCitation::new(uri, reference.excerpt.as_deref(), Some(link)));
        }

        info!(citations = citations.len(), "question answered");
        Ok(AnswerResult::answered(answer_text, citations))
    }

    /// Runs a moderation check, treating a failed call as a block.
    async fn moderate(&self, text: &str) -> ModerationVerdict {
        match self.moderation.check(text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, "moderation check failed, blocking");
                ModerationVerdict::blocked(e.to_string())
            }
        }
    }

    /// Presigns `uri`, falling back to the raw locator.
    async fn resolve_link(&self, uri: &str) -> String {
        match self.presigner.presign(uri, LINK_EXPIRY).await {
            Ok(link) => link,
            Err(e) => {
                warn!(uri, error = %e, "could not presign citation, using raw locator");
                uri.to_string()
            }
        }
    }
}
