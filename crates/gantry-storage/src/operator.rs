//! Shared plumbing for OpenDAL-backed strategies.

use std::path::Path;

use futures::StreamExt;
use gantry_transfer::{Locator, TransferError};
use opendal::{ErrorKind, Operator};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};

use crate::sink::{self, ByteStream};

const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Map an OpenDAL error onto the staging error model. Missing objects and
/// credential failures must stay distinguishable.
pub(crate) fn map_operator_error(
  strategy: &'static str,
  locator: &Locator,
  err: opendal::Error,
) -> TransferError {
  match err.kind() {
    ErrorKind::NotFound => TransferError::ObjectNotFound {
      locator: locator.as_str().to_string(),
    },
    ErrorKind::PermissionDenied => TransferError::AuthenticationFailure {
      strategy: strategy.to_string(),
      message: err.to_string(),
    },
    ErrorKind::Unsupported => TransferError::UploadUnsupported {
      strategy: strategy.to_string(),
      locator: locator.as_str().to_string(),
    },
    _ => TransferError::Transport {
      strategy: strategy.to_string(),
      message: err.to_string(),
    },
  }
}

/// A configuration problem detected while building an operator.
pub(crate) fn config_error(strategy: &'static str, err: opendal::Error) -> TransferError {
  TransferError::Transport {
    strategy: strategy.to_string(),
    message: format!("failed to build client: {}", err),
  }
}

/// Stream `key` out of `operator` into `local` through the atomic sink.
pub(crate) async fn operator_download(
  strategy: &'static str,
  operator: &Operator,
  key: &str,
  remote: &Locator,
  local: &Path,
) -> Result<(), TransferError> {
  let reader = operator
    .reader(key)
    .await
    .map_err(|e| map_operator_error(strategy, remote, e))?;
  let byte_stream = reader
    .into_bytes_stream(..)
    .await
    .map_err(|e| map_operator_error(strategy, remote, e))?;

  let stream: ByteStream = Box::pin(byte_stream.map(move |chunk| {
    chunk.map_err(|e| TransferError::Transport {
      strategy: strategy.to_string(),
      message: e.to_string(),
    })
  }));

  sink::write_atomic(local, stream).await
}

/// Stream `local` into `key` on `operator`. Success requires the remote
/// acknowledgment carried by the writer's close, not just local reads.
pub(crate) async fn operator_upload(
  strategy: &'static str,
  operator: &Operator,
  key: &str,
  remote: &Locator,
  local: &Path,
) -> Result<(), TransferError> {
  let file = File::open(local).await.map_err(|e| TransferError::LocalIo {
    path: local.display().to_string(),
    message: e.to_string(),
  })?;
  let mut reader = BufReader::new(file);

  let mut writer = operator
    .writer(key)
    .await
    .map_err(|e| map_operator_error(strategy, remote, e))?;

  let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
  loop {
    let read = reader
      .read(&mut buf)
      .await
      .map_err(|e| TransferError::LocalIo {
        path: local.display().to_string(),
        message: e.to_string(),
      })?;
    if read == 0 {
      break;
    }
    writer
      .write(bytes::Bytes::copy_from_slice(&buf[..read]))
      .await
      .map_err(|e| map_operator_error(strategy, remote, e))?;
  }

  writer
    .close()
    .await
    .map_err(|e| map_operator_error(strategy, remote, e))?;
  Ok(())
}
