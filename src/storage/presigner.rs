//! Time-limited read links for objects in S3.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use thiserror::Error;

/// Prefix of every object locator this module accepts.
const S3_SCHEME: &str = "s3://";

/// Errors that can occur while resolving an object locator into a link.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The locator is not a usable `s3://bucket/key` URI
    #[error("Invalid object URI: {0}")]
    InvalidUri(String),

    /// The signing step failed
    #[error("Presign failed: {0}")]
    Presign(String),
}

/// Bucket and key of an object addressed as `s3://bucket/key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
}

impl S3Location {
    /// Parses an `s3://bucket/key` URI.
    ///
    /// The bucket runs up to the first `/`; everything after it is the key,
    /// kept byte for byte (spaces, `#` and `?` are part of object keys).
    pub fn parse(uri: &str) -> Result<Self, StorageError> {
        let rest = uri
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| StorageError::InvalidUri(format!("{uri}: expected s3 scheme")))?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| StorageError::InvalidUri(format!("{uri}: missing key")))?;

        if bucket.is_empty() {
            return Err(StorageError::InvalidUri(format!("{uri}: missing bucket")));
        }
        if key.is_empty() {
            return Err(StorageError::InvalidUri(format!("{uri}: missing key")));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

/// Turns an object locator into a time-limited access link.
#[async_trait]
pub trait PresignerTrait: Send + Sync {
    /// Returns a read link for `uri` that expires after `expires_in`.
    async fn presign(&self, uri: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Presigns `GetObject` requests with the S3 SDK.
pub struct S3Presigner {
    client: Client,
}

impl S3Presigner {
    /// Creates a presigner from shared AWS configuration.
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl PresignerTrait for S3Presigner {
    async fn presign(&self, uri: &str, expires_in: Duration) -> Result<String, StorageError> {
        let location = S3Location::parse(uri)?;
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Presign(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(location.bucket)
            .key(location.key)
            .presigned(config)
            .await
            .map_err(|e| StorageError::Presign(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_bucket_and_key() {
        let location = S3Location::parse("s3://medical-query-bucket/medical-records/a.pdf").unwrap();
        assert_eq!(location.bucket, "medical-query-bucket");
        assert_eq!(location.key, "medical-records/a.pdf");
    }

    #[test]
    fn parse_rejects_other_schemes() {
        let result = S3Location::parse("https://bucket/a.pdf");
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[test]
    fn parse_rejects_missing_key() {
        let result = S3Location::parse("s3://bucket/");
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[test]
    fn parse_keeps_space_in_key_verbatim() {
        let location = S3Location::parse("s3://bucket/medical-records/My Report.pdf").unwrap();
        assert_eq!(location.bucket, "bucket");
        assert_eq!(location.key, "medical-records/My Report.pdf");
    }

    #[test]
    fn parse_keeps_hash_and_question_mark_in_key() {
        assert_eq!(S3Location::parse("s3://bucket/scan#2.pdf").unwrap().key, "scan#2.pdf");
        assert_eq!(S3Location::parse("s3://bucket/a?b.pdf").unwrap().key, "a?b.pdf");
    }

    #[test]
    fn parse_keeps_percent_sequences_undecoded() {
        let location = S3Location::parse("s3://bucket/100%20done.pdf").unwrap();
        assert_eq!(location.key, "100%20done.pdf");
    }

    #[test]
    fn parse_rejects_missing_bucket() {
        let result = S3Location::parse("s3:///a.pdf");
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[test]
    fn parse_rejects_bucket_without_key() {
        let result = S3Location::parse("s3://bucket");
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[test]
    fn parse_rejects_garbage() {
        let result = S3Location::parse("not a uri");
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }

    #[tokio::test]
    async fn s3_presigner_returns_signed_https_link() {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                "AKIDEXAMPLE",
                "secret",
                None,
                None,
                "test",
            ))
            .load()
            .await;
        let presigner = S3Presigner::new(&sdk_config);

        let link = presigner
            .presign("s3://bucket/a.pdf", Duration::from_secs(900))
            .await
            .unwrap();

        assert!(link.starts_with("https://"));
        assert!(link.contains("a.pdf"));
        assert!(link.contains("X-Amz-Expires=900"));
    }

    #[tokio::test]
    async fn s3_presigner_encodes_key_with_space_once() {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(aws_sdk_s3::config::Credentials::new(
                "AKIDEXAMPLE",
                "secret",
                None,
                None,
                "test",
            ))
            .load()
            .await;
        let presigner = S3Presigner::new(&sdk_config);

        let link = presigner
            .presign("s3://bucket/My Report.pdf", Duration::from_secs(900))
            .await
            .unwrap();

        assert!(link.contains("My%20Report.pdf"));
        assert!(!link.contains("%2520"));
    }

    #[tokio::test]
    async fn s3_presigner_rejects_invalid_uri_before_signing() {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .load()
            .await;
        let presigner = S3Presigner::new(&sdk_config);

        let result = presigner.presign("file:///tmp/a.pdf", Duration::from_secs(900)).await;
        assert!(matches!(result, Err(StorageError::InvalidUri(_))));
    }
}
