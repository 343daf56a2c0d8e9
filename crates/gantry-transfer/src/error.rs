//! Error kinds for staging transfers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while declaring or executing a transfer.
///
/// Construction-time kinds (`SchemeMismatch`, `PathUnresolved`) are reported
/// synchronously before any transfer attempt. The remaining kinds describe a
/// single transfer's failure and are carried on its
/// [`TransferResult`](crate::TransferResult).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TransferError {
  /// The locator's scheme is unknown, or does not match the strategy bound
  /// to the spec.
  #[error("scheme '{scheme}' is not supported for locator '{locator}'")]
  SchemeMismatch { scheme: String, locator: String },

  /// The remote system rejected the configured credentials.
  #[error("authentication against {strategy} failed: {message}")]
  AuthenticationFailure { strategy: String, message: String },

  /// The remote object or bucket does not exist.
  #[error("remote object not found: {locator}")]
  ObjectNotFound { locator: String },

  /// The transfer exceeded its per-spec timeout.
  #[error("transfer timed out after {timeout_ms}ms")]
  NetworkTimeout { timeout_ms: u64 },

  /// Reading or writing the local side of the transfer failed.
  #[error("local i/o failure at '{path}': {message}")]
  LocalIo { path: String, message: String },

  /// A local path was not absolute at spec construction time.
  #[error("local path is not resolved to an absolute path: '{path}'")]
  PathUnresolved { path: String },

  /// The strategy cannot upload to this locator (read-only configuration).
  #[error("{strategy} does not support uploads to '{locator}'")]
  UploadUnsupported { strategy: String, locator: String },

  /// A transport-level failure that is neither a timeout, an authentication
  /// failure, nor a missing object.
  #[error("{strategy} transport error: {message}")]
  Transport { strategy: String, message: String },

  /// The owning task invocation was cancelled while the transfer was in
  /// flight or pending.
  #[error("transfer cancelled")]
  Cancelled,
}
