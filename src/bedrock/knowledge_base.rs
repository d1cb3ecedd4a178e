//! Retrieval-and-generation using the Bedrock Agent Runtime API.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagentruntime::Client;
use aws_sdk_bedrockagentruntime::operation::retrieve_and_generate::RetrieveAndGenerateOutput;
use aws_sdk_bedrockagentruntime::types::{
    GenerationConfiguration, GuadrailAction, GuardrailConfiguration,
    KnowledgeBaseRetrieveAndGenerateConfiguration, RetrieveAndGenerateConfiguration,
    RetrieveAndGenerateInput, RetrieveAndGenerateType,
};
use tracing::{debug, info};

use super::client::{BedrockError, GuardrailRef, KnowledgeBaseClientTrait, classify_sdk_error};
use crate::models::{GeneratedAnswer, RetrievedReference};

/// Knowledge base client with the guardrail applied in-line by the service.
pub struct BedrockKnowledgeBaseClient {
    client: Client,
    knowledge_base_id: String,
    model_arn: String,
    guardrail: GuardrailRef,
}

impl BedrockKnowledgeBaseClient {
    /// Creates a knowledge base client from shared AWS configuration.
    pub fn new(
        sdk_config: &SdkConfig,
        knowledge_base_id: impl Into<String>,
        model_arn: impl Into<String>,
        guardrail: GuardrailRef,
    ) -> Self {
        Self {
            client: Client::new(sdk_config),
            knowledge_base_id: knowledge_base_id.into(),
            model_arn: model_arn.into(),
            guardrail,
        }
    }

    fn configuration(&self) -> Result<RetrieveAndGenerateConfiguration, BedrockError> {
        let guardrail = GuardrailConfiguration::builder()
            .guardrail_id(&self.guardrail.id)
            .guardrail_version(&self.guardrail.version)
            .build()?;

        let generation = GenerationConfiguration::builder()
            .guardrail_configuration(guardrail)
            .build();

        let knowledge_base = KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
            .knowledge_base_id(&self.knowledge_base_id)
            .model_arn(&self.model_arn)
            .generation_configuration(generation)
            .build()?;

        Ok(RetrieveAndGenerateConfiguration::builder()
            .r#type(RetrieveAndGenerateType::KnowledgeBase)
            .knowledge_base_configuration(knowledge_base)
            .build()?)
    }
}

#[async_trait]
impl KnowledgeBaseClientTrait for BedrockKnowledgeBaseClient {
    async fn retrieve_and_generate(&self, question: &str) -> Result<GeneratedAnswer, BedrockError> {
        let input = RetrieveAndGenerateInput::builder().text(question).build()?;

        debug!(knowledge_base_id = %self.knowledge_base_id, "sending retrieve-and-generate request");

        let output = self
            .client
            .retrieve_and_generate()
            .input(input)
            .retrieve_and_generate_configuration(self.configuration()?)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let answer = into_generated_answer(&output);
        info!(
            references = answer.references.len(),
            guardrail_intervened = answer.guardrail_intervened,
            "knowledge base responded"
        );
        Ok(answer)
    }
}

/// Flattens citations and their retrieved references, keeping service order.
fn into_generated_answer(output: &RetrieveAndGenerateOutput) -> GeneratedAnswer {
    let guardrail_intervened = matches!(output.guardrail_action(), Some(GuadrailAction::Intervened));

    let text = output
        .output()
        .map(|generated| generated.text().to_string())
        .filter(|text| !text.is_empty());

    let references = output
        .citations()
        .iter()
        .flat_map(|citation| citation.retrieved_references())
        .map(|reference| RetrievedReference {
            uri: reference
                .location()
                .and_then(|location| location.s3_location())
                .and_then(|s3| s3.uri())
                .map(str::to_string),
            excerpt: reference
                .content()
                .map(|content| content.text())
                .map(str::to_string),
        })
        .collect();

    GeneratedAnswer {
        text,
        references,
        guardrail_intervened,
    }
}
