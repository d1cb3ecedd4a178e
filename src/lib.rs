pub mod answerer;
pub mod bedrock;
pub mod config;
pub mod models;
pub mod server;
pub mod storage;

pub use answerer::{AnswerError, GuardedAnswerer};
pub use bedrock::{
    BedrockError, BedrockIngestionClient, BedrockKnowledgeBaseClient, BedrockModerationClient,
    GuardrailRef, IngestionClientTrait, IngestionJob, KnowledgeBaseClientTrait,
    ModerationClientTrait,
};
pub use config::{ConfigError, Settings, SettingsBuilder};
pub use models::{
    AnswerResult, GeneratedAnswer, ModerationVerdict, Question, RefusalKind, RetrievalCitation,
    RetrievedReference,
};
pub use server::AppState;
pub use storage::{PresignerTrait, S3Presigner, StorageError};
