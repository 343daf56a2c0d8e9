//! Remote-host transfers over an SSH channel.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gantry_transfer::{Locator, Scheme, StorageStrategy, TransferError};
use opendal::{services, Operator};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::operator::{config_error, operator_download, operator_upload};

/// Configuration for one remote host reachable over SSH.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteHostConfig {
  pub host: String,
  #[serde(default)]
  pub port: Option<u16>,
  #[serde(default)]
  pub user: Option<String>,
  /// Private key file used for authentication. Unset falls back to the
  /// ambient SSH agent/default identity resolution.
  #[serde(default)]
  pub identity_file: Option<PathBuf>,
}

/// Strategy for `sftp://host/path` locators. Transfers go over an SFTP
/// channel; downloads are idempotent because the local side is written
/// through the atomic sink (a repeated download after a partial failure
/// never corrupts the destination).
pub struct RemoteHostStrategy {
  config: RemoteHostConfig,
  operator: OnceCell<Operator>,
}

impl RemoteHostStrategy {
  pub fn new(config: RemoteHostConfig) -> Self {
    Self {
      config,
      operator: OnceCell::new(),
    }
  }

  async fn operator(&self) -> Result<&Operator, TransferError> {
    self
      .operator
      .get_or_try_init(|| async {
        let endpoint = match self.config.port {
          Some(port) => format!("ssh://{}:{}", self.config.host, port),
          None => format!("ssh://{}", self.config.host),
        };

        let mut builder = services::Sftp::default().endpoint(&endpoint).root("/");
        if let Some(user) = &self.config.user {
          builder = builder.user(user);
        }
        if let Some(identity_file) = &self.config.identity_file {
          builder = builder.key(&identity_file.display().to_string());
        }

        Ok(
          Operator::new(builder)
            .map_err(|e| config_error("remote-host", e))?
            .finish(),
        )
      })
      .await
  }
}

#[async_trait]
impl StorageStrategy for RemoteHostStrategy {
  fn name(&self) -> &'static str {
    "remote-host"
  }

  fn supports(&self, locator: &Locator) -> bool {
    locator.scheme() == Scheme::Sftp && locator.authority() == Some(&self.config.host)
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn binds_to_its_configured_host() {
    let strategy = RemoteHostStrategy::new(RemoteHostConfig {
      host: "cluster.example.com".to_string(),
      port: None,
      user: Some("worker".to_string()),
      identity_file: None,
    });

    assert!(strategy.supports(&Locator::parse("sftp://cluster.example.com/data/in.bin").unwrap()));
    assert!(!strategy.supports(&Locator::parse("sftp://elsewhere.example.com/in.bin").unwrap()));
    assert!(!strategy.supports(&Locator::parse("s3://cluster.example.com/in.bin").unwrap()));
  }
}
