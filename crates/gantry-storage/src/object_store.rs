//! Bucket/object-key transfers via OpenDAL.

use std::path::Path;

use async_trait::async_trait;
use gantry_transfer::{Locator, Scheme, StorageStrategy, TransferError};
use opendal::{services, Operator};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::operator::{config_error, operator_download, operator_upload};

/// Configuration for one bucket on an object store.
///
/// Unset credential fields fall back to the provider's ambient default
/// lookup (environment variables, instance metadata, application-default
/// credentials) — resolved by the underlying client, not by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
  /// Which object-store scheme this strategy binds: `s3`, `gs`, or `azblob`.
  pub scheme: Scheme,
  /// Bucket or container name.
  pub bucket: String,
  #[serde(default)]
  pub region: Option<String>,
  /// Endpoint override, e.g. an S3-compatible gateway.
  #[serde(default)]
  pub endpoint: Option<String>,
  /// Credential reference: S3 access key id, GCS service-account file path,
  /// or Azure storage account name.
  #[serde(default)]
  pub credential: Option<String>,
  /// Credential secret: S3 secret key or Azure account key. Unused for GCS.
  #[serde(default)]
  pub credential_secret: Option<String>,
}

/// Transfers against bucket/object-key semantics (S3, GCS, Azure Blob).
///
/// The authenticated client is built lazily on first use; concurrent
/// transfers share one initialization and all of them observe an
/// initialization failure.
pub struct ObjectStoreStrategy {
  config: ObjectStoreConfig,
  operator: OnceCell<Operator>,
}

impl ObjectStoreStrategy {
  /// Create a strategy for the configured bucket. The scheme must be an
  /// object-store scheme; anything else is a construction-time error.
  pub fn new(config: ObjectStoreConfig) -> Result<Self, TransferError> {
    match config.scheme {
      Scheme::S3 | Scheme::Gcs | Scheme::Azblob => Ok(Self {
        config,
        operator: OnceCell::new(),
      }),
      other => Err(TransferError::SchemeMismatch {
        scheme: other.as_str().to_string(),
        locator: format!("bucket '{}'", config.bucket),
      }),
    }
  }

  /// Bind a prebuilt operator instead of building one from configuration.
  /// Used by tests (in-memory backend) and callers with custom client
  /// setups.
  pub fn with_operator(scheme: Scheme, bucket: impl Into<String>, operator: Operator) -> Self {
    Self {
      config: ObjectStoreConfig {
        scheme,
        bucket: bucket.into(),
        region: None,
        endpoint: None,
        credential: None,
        credential_secret: None,
      },
      operator: OnceCell::new_with(Some(operator)),
    }
  }

  async fn operator(&self) -> Result<&Operator, TransferError> {
    self
      .operator
      .get_or_try_init(|| async { Self::build_operator(&self.config) })
      .await
  }

  fn build_operator(config: &ObjectStoreConfig) -> Result<Operator, TransferError> {
    let operator = match config.scheme {
      Scheme::S3 => {
        let mut builder = services::S3::default().bucket(&config.bucket);
        if let Some(region) = &config.region {
          builder = builder.region(region);
        }
        if let Some(endpoint) = &config.endpoint {
          builder = builder.endpoint(endpoint);
        }
        if let Some(access_key) = &config.credential {
          builder = builder.access_key_id(access_key);
        }
        if let Some(secret_key) = &config.credential_secret {
          builder = builder.secret_access_key(secret_key);
        }
        Operator::new(builder)
          .map_err(|e| config_error("object-store", e))?
          .finish()
      }
      Scheme::Gcs => {
        let mut builder = services::Gcs::default().bucket(&config.bucket);
        if let Some(endpoint) = &config.endpoint {
          builder = builder.endpoint(endpoint);
        }
        if let Some(credential_path) = &config.credential {
          builder = builder.credential_path(credential_path);
        }
        Operator::new(builder)
          .map_err(|e| config_error("object-store", e))?
          .finish()
      }
      Scheme::Azblob => {
        let mut builder = services::Azblob::default().container(&config.bucket);
        if let Some(endpoint) = &config.endpoint {
          builder = builder.endpoint(endpoint);
        }
        if let Some(account_name) = &config.credential {
          builder = builder.account_name(account_name);
        }
        if let Some(account_key) = &config.credential_secret {
          builder = builder.account_key(account_key);
        }
        Operator::new(builder)
          .map_err(|e| config_error("object-store", e))?
          .finish()
      }
      // Guarded at construction.
      other => {
        return Err(TransferError::SchemeMismatch {
          scheme: other.as_str().to_string(),
          locator: config.bucket.clone(),
        });
      }
    };
    Ok(operator)
  }
}

#[async_trait]
impl StorageStrategy for ObjectStoreStrategy {
  fn name(&self) -> &'static str {
    "object-store"
  }

  fn supports(&self, locator: &Locator) -> bool {
    locator.scheme() == self.config.scheme && locator.authority() == Some(&self.config.bucket)
  }

  async fn download(&self, remote: &Locator, local: &Path) -> Result<(), TransferError> {
    let operator = self.operator().await?;
    operator_download(self.name(), operator, remote.key(), remote, local).await
  }

  async fn upload(&self, local: &Path, remote: &Locator) -> Result<(), TransferError> {
    let operator = self.operator().await?;
    operator_upload(self.name(), operator, remote.key(), remote, local).await
  }
}
