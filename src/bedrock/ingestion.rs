//! Knowledge base ingestion using the Bedrock Agent API.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_bedrockagent::Client;
use tracing::info;

use super::client::{BedrockError, IngestionClientTrait, IngestionJob, classify_sdk_error};

/// Starts ingestion jobs for one knowledge base data source.
pub struct BedrockIngestionClient {
    client: Client,
    knowledge_base_id: String,
    data_source_id: Option<String>,
}

impl BedrockIngestionClient {
    /// Creates an ingestion client. A missing data source id is reported when
    /// a job is started, not here, so the server can run without ingestion.
    pub fn new(
        sdk_config: &SdkConfig,
        knowledge_base_id: impl Into<String>,
        data_source_id: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(sdk_config),
            knowledge_base_id: knowledge_base_id.into(),
            data_source_id,
        }
    }
}

#[async_trait]
impl IngestionClientTrait for BedrockIngestionClient {
    async fn start_ingestion_job(&self) -> Result<IngestionJob, BedrockError> {
        let data_source_id = self
            .data_source_id
            .as_deref()
            .ok_or(BedrockError::MissingConfig("DATA_SOURCE_ID"))?;

        let output = self
            .client
            .start_ingestion_job()
            .knowledge_base_id(&self.knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        let job_id = output
            .ingestion_job()
            .map(|job| job.ingestion_job_id().to_string());
        info!(job_id = job_id.as_deref().unwrap_or("unknown"), "ingestion job started");

        Ok(IngestionJob { job_id })
    }
}
