/// Shared Bedrock client plumbing.
///
/// This module holds the error type shared by every Bedrock collaborator, the
/// traits the answer orchestrator consumes, and the classification of raw SDK
/// errors into [`BedrockError`].
use async_trait::async_trait;
use aws_sdk_bedrockruntime::error::{
    BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError,
};
use thiserror::Error;

use crate::models::{GeneratedAnswer, ModerationVerdict};

/// Error code a Bedrock service uses when a guardrail rejects the call outright.
pub const GUARDRAIL_INTERVENED_CODE: &str = "GuardrailIntervened";

/// Errors that can occur when calling a Bedrock service.
#[derive(Debug, Error)]
pub enum BedrockError {
    /// The service rejected or failed the request
    #[error("Bedrock service error: {message}")]
    Service {
        code: Option<String>,
        message: String,
    },

    /// A guardrail rejected the request before any output was produced
    #[error("Guardrail intervened: {message}")]
    GuardrailIntervened { message: String },

    /// The request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A required identifier is not configured
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl From<BuildError> for BedrockError {
    fn from(err: BuildError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Classifies an SDK error by its service error code.
pub(crate) fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> BedrockError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    if code.as_deref() == Some(GUARDRAIL_INTERVENED_CODE) {
        BedrockError::GuardrailIntervened { message }
    } else {
        BedrockError::Service { code, message }
    }
}

/// Identifies a managed guardrail policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardrailRef {
    pub id: String,
    pub version: String,
}

impl GuardrailRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// Content-safety check over a single piece of text.
///
/// Implementations return `Err` only when the service could not be consulted;
/// the caller decides how to treat that.
#[async_trait]
pub trait ModerationClientTrait: Send + Sync {
    /// Checks `text` against the configured guardrail.
    async fn check(&self, text: &str) -> Result<ModerationVerdict, BedrockError>;
}

/// Retrieval-and-generation against an indexed knowledge base.
#[async_trait]
pub trait KnowledgeBaseClientTrait: Send + Sync {
    /// Retrieves passages for `question` and generates an answer from them.
    async fn retrieve_and_generate(&self, question: &str) -> Result<GeneratedAnswer, BedrockError>;
}

/// A started ingestion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionJob {
    pub job_id: Option<String>,
}

/// Starts re-indexing of the knowledge base's data source.
#[async_trait]
pub trait IngestionClientTrait: Send + Sync {
    /// Starts an asynchronous ingestion job.
    async fn start_ingestion_job(&self) -> Result<IngestionJob, BedrockError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_bedrockruntime::error::ErrorMetadata;
    use aws_sdk_bedrockruntime::operation::converse::ConverseError;

    #[test]
    fn service_error_display_includes_message() {
        let err = BedrockError::Service {
            code: Some("ThrottlingException".to_string()),
            message: "Rate exceeded".to_string(),
        };
        assert_eq!(err.to_string(), "Bedrock service error: Rate exceeded");
    }

    #[test]
    fn guardrail_error_display_includes_message() {
        let err = BedrockError::GuardrailIntervened {
            message: "Denied topic".to_string(),
        };
        assert!(err.to_string().contains("Denied topic"));
    }

    #[test]
    fn missing_config_names_the_setting() {
        let err = BedrockError::MissingConfig("KNOWLEDGE_BASE_ID");
        assert_eq!(err.to_string(), "Missing configuration: KNOWLEDGE_BASE_ID");
    }

    fn service_error(code: &str, message: &str) -> SdkError<ConverseError, ()> {
        let meta = ErrorMetadata::builder().code(code).message(message).build();
        SdkError::service_error(ConverseError::generic(meta), ())
    }

    #[test]
    fn guardrail_error_code_is_classified_as_intervention() {
        let err = classify_sdk_error(service_error(GUARDRAIL_INTERVENED_CODE, "Denied topic"));
        assert!(matches!(
            err,
            BedrockError::GuardrailIntervened { ref message } if message == "Denied topic"
        ));
    }

    #[test]
    fn other_error_codes_are_service_errors() {
        let err = classify_sdk_error(service_error("ThrottlingException", "Rate exceeded"));
        match err {
            BedrockError::Service { code, message } => {
                assert_eq!(code.as_deref(), Some("ThrottlingException"));
                assert_eq!(message, "Rate exceeded");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn errors_without_metadata_fall_back_to_display_context() {
        let err: SdkError<ConverseError, ()> = SdkError::construction_failure("boom");
        match classify_sdk_error(err) {
            BedrockError::Service { code, message } => {
                assert_eq!(code, None);
                assert!(message.contains("boom"), "{message}");
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trait_can_be_implemented_by_mock_struct() {
        struct AlwaysAllow;

        #[async_trait]
        impl ModerationClientTrait for AlwaysAllow {
            async fn check(&self, _text: &str) -> Result<ModerationVerdict, BedrockError> {
                Ok(ModerationVerdict::allowed())
            }
        }

        let client: &dyn ModerationClientTrait = &AlwaysAllow;
        let verdict = client.check("hello").await.unwrap();
        assert!(!verdict.is_blocked());
    }
}
