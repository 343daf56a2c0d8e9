//! Direction-symmetric filesystem copy.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use gantry_transfer::{Locator, Scheme, StorageStrategy, TransferError};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;

use crate::sink::{self, ByteStream};

/// Strategy for locators that are actually local or mounted paths
/// (`file://` or bare, scheme-less paths). No network is involved; the
/// "remote" side is just another filesystem location.
#[derive(Debug, Default, Clone)]
pub struct LocalStrategy;

impl LocalStrategy {
  pub fn new() -> Self {
    Self
  }
}

fn remote_path(remote: &Locator) -> &Path {
  let raw = remote.as_str();
  Path::new(raw.strip_prefix("file://").unwrap_or(raw))
}

#[async_trait]
impl StorageStrategy for LocalStrategy {
  fn name(&self) -> &'static str {
    "local"
  }

  fn supports(&self, locator: &Locator) -> bool {
    locator.scheme() == Scheme::File
  }

  async fn download(&self, remote: &Locator, local: &Path) -> Result<(), TransferError> {
    let source = remote_path(remote);
    let file = File::open(source).await.map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        TransferError::ObjectNotFound {
          locator: remote.as_str().to_string(),
        }
      } else {
        TransferError::LocalIo {
          path: source.display().to_string(),
          message: e.to_string(),
        }
      }
    })?;

    let source_path = source.to_path_buf();
    let stream: ByteStream = Box::pin(ReaderStream::new(file).map(move |chunk| {
      chunk.map_err(|e| TransferError::LocalIo {
        path: source_path.display().to_string(),
        message: e.to_string(),
      })
    }));

    sink::write_atomic(local, stream).await
  }

  async fn upload(&self, local: &Path, remote: &Locator) -> Result<(), TransferError> {
    let dest = remote_path(remote);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)
        .await
        .map_err(|e| TransferError::LocalIo {
          path: parent.display().to_string(),
          message: e.to_string(),
        })?;
    }

    fs::copy(local, dest)
      .await
      .map_err(|e| TransferError::LocalIo {
        path: local.display().to_string(),
        message: e.to_string(),
      })?;
    Ok(())
  }
}
