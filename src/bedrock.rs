/// Bedrock service clients.
///
/// This module provides the moderation, knowledge base and ingestion
/// collaborators behind traits, so the answer orchestrator can be exercised
/// with test doubles.
mod client;
mod ingestion;
mod knowledge_base;
mod moderation;

pub use client::{
    BedrockError, GUARDRAIL_INTERVENED_CODE, GuardrailRef, IngestionClientTrait, IngestionJob,
    KnowledgeBaseClientTrait, ModerationClientTrait,
};
pub use ingestion::BedrockIngestionClient;
pub use knowledge_base::BedrockKnowledgeBaseClient;
pub use moderation::{
    BedrockModerationClient, DEFAULT_MODERATION_MAX_TOKENS, MODERATION_BLOCK_REASON,
};
