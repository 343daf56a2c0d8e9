//! The storage strategy contract.

use std::path::Path;

use async_trait::async_trait;

use crate::error::TransferError;
use crate::locator::Locator;

/// Pluggable remote-storage capability.
///
/// A strategy covers one locator scheme family (local filesystem, remote
/// host, object store, HTTP) and moves whole files between a remote locator
/// and a local path. Implementations live in `gantry-storage`; the executor
/// and binder only see this trait.
///
/// Strategies are stateless with respect to individual transfers. A strategy
/// may cache an authenticated client internally; that client is shared
/// read-only across concurrent transfers, and its one-time initialization
/// must be mutually exclusive with failures reported to every waiter.
///
/// Download atomicity: a download either leaves `local` fully populated or
/// leaves no file at `local` at all. Partially written data must never be
/// visible under the final name.
#[async_trait]
pub trait StorageStrategy: Send + Sync {
  /// Short strategy name, used in error messages and log fields.
  fn name(&self) -> &'static str;

  /// Whether this strategy can serve the locator. Binding a spec to a
  /// strategy that does not support its locator is a construction-time
  /// `SchemeMismatch`.
  fn supports(&self, locator: &Locator) -> bool;

  /// Fetch `remote` into `local`, creating intermediate directories.
  async fn download(&self, remote: &Locator, local: &Path) -> Result<(), TransferError>;

  /// Push `local` to `remote`. Success means the remote system acknowledged
  /// the write, not merely that no local error occurred.
  async fn upload(&self, local: &Path, remote: &Locator) -> Result<(), TransferError>;
}
