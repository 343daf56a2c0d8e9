//! HTTP(S) endpoint transfers.

use std::path::Path;

use async_trait::async_trait;
use gantry_transfer::{Locator, Scheme, StorageStrategy, TransferError};
use opendal::{services, Operator};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::operator::{config_error, operator_download, operator_upload};

/// Configuration for one HTTP(S) endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
  /// Endpoint root, e.g. `https://data.example.com`. Locators must start
  /// with this prefix.
  pub endpoint: String,
  /// Whether the endpoint declaratively accepts uploads (pre-signed-URL
  /// style). Defaults to read-only.
  #[serde(default)]
  pub writable: bool,
}

/// Download-oriented strategy for `http://` and `https://` locators.
/// Uploads against a read-only configuration are rejected before any
/// network activity.
pub struct HttpStrategy {
  config: HttpConfig,
  operator: OnceCell<Operator>,
}

impl HttpStrategy {
  pub fn new(config: HttpConfig) -> Self {
    Self {
      config,
      operator: OnceCell::new(),
    }
  }

  async fn operator(&self) -> Result<&Operator, TransferError> {
    self
      .operator
      .get_or_try_init(|| async {
        let builder = services::Http::default().endpoint(&self.config.endpoint);
        Ok(
          Operator::new(builder)
            .map_err(|e| config_error("http", e))?
            .finish(),
        )
      })
      .await
  }

  fn key_of(&self, locator: &Locator) -> Result<String, TransferError> {
    match locator.as_str().strip_prefix(&self.config.endpoint) {
      Some(rest) => Ok(rest.trim_start_matches('/').to_string()),
      None => Err(TransferError::SchemeMismatch {
        scheme: locator.scheme().as_str().to_string(),
        locator: locator.as_str().to_string(),
      }),
    }
  }
}

#[async_trait]
impl StorageStrategy for HttpStrategy {
  fn name(&self) -> &'static str {
    "http"
  }

  fn supports(&self, locator: &Locator) -> bool {
    matches!(locator.scheme(), Scheme::Http | Scheme::Https)
      && locator.as_str().starts_with(&self.config.endpoint)
  }

  async fn download(&self, remote: &Locator, local: &Path) -> Result<(), TransferError> {
    let key = self.key_of(remote)?;
    let operator = self.operator().await?;
    operator_download(self.name(), operator, &key, remote, local).await
  }

  async fn upload(&self, local: &Path, remote: &Locator) -> Result<(), TransferError> {
    if !self.config.writable {
      return Err(TransferError::UploadUnsupported {
        strategy: self.name().to_string(),
        locator: remote.as_str().to_string(),
      });
    }
    let key = self.key_of(remote)?;
    let operator = self.operator().await?;
    operator_upload(self.name(), operator, &key, remote, local).await
  }
}
