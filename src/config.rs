//! Service configuration.
//!
//! Every setting is resolved with the same precedence: a value set on the
//! [`SettingsBuilder`], then the matching environment variable, then a default
//! (for optional settings) or a [`ConfigError::Missing`] (for required ones).

use std::fmt;
use std::net::SocketAddr;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use thiserror::Error;
use tracing::warn;

use crate::bedrock::GuardrailRef;

/// Address the HTTP server binds to when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    /// The bind address does not parse
    #[error("Invalid bind address {value}: {reason}")]
    InvalidBindAddr { value: String, reason: String },
}

/// Resolved service settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Model used for moderation checks
    pub model_id: String,
    /// Model used by the knowledge base for generation
    pub model_arn: String,
    pub guardrail: GuardrailRef,
    pub knowledge_base_id: String,
    /// Data source re-indexed by ingestion jobs; ingestion is unavailable without it
    pub data_source_id: Option<String>,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Resolves settings from the environment only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or the bind
    /// address is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        SettingsBuilder::new().build()
    }

    /// Loads the shared AWS configuration.
    ///
    /// Static keys are used when both `ACCESS_KEY_ID` and `SECRET_ACCESS_KEY`
    /// are set; otherwise the default provider chain applies.
    pub async fn load_aws_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }
        loader.load().await
    }

    /// Static credentials from the key pair, if both halves are set.
    fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key_id), Some(secret)) => Some(Credentials::new(
                key_id.clone(),
                secret.clone(),
                None,
                None,
                "medquery-env",
            )),
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "only one of ACCESS_KEY_ID and SECRET_ACCESS_KEY is set; using the default credential chain"
                );
                None
            }
            (None, None) => None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("model_id", &self.model_id)
            .field("model_arn", &self.model_arn)
            .field("guardrail", &self.guardrail)
            .field("knowledge_base_id", &self.knowledge_base_id)
            .field("data_source_id", &self.data_source_id)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

/// Builder for [`Settings`].
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    region: Option<String>,
    model_id: Option<String>,
    model_arn: Option<String>,
    guardrail_id: Option<String>,
    guardrail_version: Option<String>,
    knowledge_base_id: Option<String>,
    data_source_id: Option<String>,
    bind_addr: Option<String>,
}

impl SettingsBuilder {
    /// Creates a builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn model_arn(mut self, model_arn: impl Into<String>) -> Self {
        self.model_arn = Some(model_arn.into());
        self
    }

    pub fn guardrail(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.guardrail_id = Some(id.into());
        self.guardrail_version = Some(version.into());
        self
    }

    pub fn knowledge_base_id(mut self, knowledge_base_id: impl Into<String>) -> Self {
        self.knowledge_base_id = Some(knowledge_base_id.into());
        self
    }

    pub fn data_source_id(mut self, data_source_id: impl Into<String>) -> Self {
        self.data_source_id = Some(data_source_id.into());
        self
    }

    /// Sets the server bind address (e.g. `0.0.0.0:8080`).
    pub fn bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = Some(bind_addr.into());
        self
    }

    /// Resolves the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first required variable that
    /// has no value, or [`ConfigError::InvalidBindAddr`].
    pub fn build(self) -> Result<Settings, ConfigError> {
        let bind_value = self
            .bind_addr
            .or_else(|| optional_env("MEDQUERY_BIND"))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_value
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: bind_value.clone(),
                reason: e.to_string(),
            })?;

        Ok(Settings {
            region: self.region.or_else(|| optional_env("REGION")),
            access_key_id: optional_env("ACCESS_KEY_ID"),
            secret_access_key: optional_env("SECRET_ACCESS_KEY"),
            model_id: required(self.model_id, "MODEL_ID")?,
            model_arn: required(self.model_arn, "MODEL_ARN")?,
            guardrail: GuardrailRef::new(
                required(self.guardrail_id, "GUARDRAIL_ID")?,
                required(self.guardrail_version, "GUARDRAIL_VERSION")?,
            ),
            knowledge_base_id: required(self.knowledge_base_id, "KNOWLEDGE_BASE_ID")?,
            data_source_id: self.data_source_id.or_else(|| optional_env("DATA_SOURCE_ID")),
            bind_addr,
        })
    }
}

/// Reads a variable, treating empty values as unset.
fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .or_else(|| optional_env(name))
        .ok_or(ConfigError::Missing(name))
}
