//! Guardrail-backed moderation using the Bedrock Runtime `Converse` API.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, GuardrailConfiguration, InferenceConfiguration, Message,
    StopReason,
};
use tracing::{debug, info};

use super::client::{BedrockError, GuardrailRef, ModerationClientTrait, classify_sdk_error};
use crate::models::ModerationVerdict;

/// Response token cap for the moderation call; only the stop reason matters.
pub const DEFAULT_MODERATION_MAX_TOKENS: i32 = 100;

/// Reason reported when the guardrail stops the conversation.
pub const MODERATION_BLOCK_REASON: &str = "Content blocked by safety guardrail";

/// Moderation client that sends the text as a one-turn conversation with a
/// guardrail attached and inspects the stop reason.
pub struct BedrockModerationClient {
    client: Client,
    model_id: String,
    guardrail: GuardrailRef,
    max_tokens: i32,
}

impl BedrockModerationClient {
    /// Creates a moderation client from shared AWS configuration.
    pub fn new(sdk_config: &SdkConfig, model_id: impl Into<String>, guardrail: GuardrailRef) -> Self {
        Self {
            client: Client::new(sdk_config),
            model_id: model_id.into(),
            guardrail,
            max_tokens: DEFAULT_MODERATION_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl ModerationClientTrait for BedrockModerationClient {
    async fn check(&self, text: &str) -> Result<ModerationVerdict, BedrockError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(text.to_string()))
            .build()?;

        let guardrail = GuardrailConfiguration::builder()
            .guardrail_identifier(&self.guardrail.id)
            .guardrail_version(&self.guardrail.version)
            .build();

        let inference = InferenceConfiguration::builder()
            .max_tokens(self.max_tokens)
            .build();

        debug!(model_id = %self.model_id, chars = text.chars().count(), "sending moderation check");

        let output = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .guardrail_config(guardrail)
            .inference_config(inference)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let verdict = verdict_for(output.stop_reason());
        if verdict.is_blocked() {
            info!(guardrail_id = %self.guardrail.id, "moderation guardrail intervened");
        }
        Ok(verdict)
    }
}

/// Maps the conversation stop reason to a verdict; only a guardrail stop blocks.
fn verdict_for(stop_reason: &StopReason) -> ModerationVerdict {
    if matches!(stop_reason, StopReason::GuardrailIntervened) {
        ModerationVerdict::blocked(MODERATION_BLOCK_REASON)
    } else {
        ModerationVerdict::allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guardrail_stop_blocks() {
        let verdict = verdict_for(&StopReason::GuardrailIntervened);
        assert!(verdict.is_blocked());
        assert_eq!(verdict.reason(), Some(MODERATION_BLOCK_REASON));
    }

    #[test]
    fn other_stop_reasons_allow() {
        for reason in [
            StopReason::EndTurn,
            StopReason::MaxTokens,
            StopReason::ContentFiltered,
        ] {
            assert!(!verdict_for(&reason).is_blocked(), "{reason:?}");
        }
    }
}
