//! Transfer declarations and invocation-scoped specs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::direction::{Direction, Phase};
use crate::error::TransferError;
use crate::locator::Locator;
use crate::strategy::StorageStrategy;

/// A file movement declared against a task definition.
///
/// Declarations are authoring-time objects: the local side may be relative,
/// in which case it is resolved against the invocation-scoped working
/// directory when the binder turns the declaration into a [`TransferSpec`].
#[derive(Clone)]
pub struct TransferDecl {
  direction: Direction,
  remote: Locator,
  local: PathBuf,
  strategy: Arc<dyn StorageStrategy>,
  skip_on_task_failure: bool,
  timeout: Option<Duration>,
}

impl TransferDecl {
  /// Declare an input: fetch `remote` into `local` before the task runs.
  pub fn to_local(
    remote: Locator,
    local: impl Into<PathBuf>,
    strategy: Arc<dyn StorageStrategy>,
  ) -> Self {
    Self {
      direction: Direction::ToLocal,
      remote,
      local: local.into(),
      strategy,
      skip_on_task_failure: false,
      timeout: None,
    }
  }

  /// Declare an output: push `local` to `remote` after the task completes.
  pub fn to_remote(
    local: impl Into<PathBuf>,
    remote: Locator,
    strategy: Arc<dyn StorageStrategy>,
  ) -> Self {
    Self {
      direction: Direction::ToRemote,
      remote,
      local: local.into(),
      strategy,
      skip_on_task_failure: false,
      timeout: None,
    }
  }

  /// Skip this transfer when the task body fails. Only meaningful for
  /// post-phase (`ToRemote`) declarations; default is to run regardless.
  pub fn skip_on_task_failure(mut self) -> Self {
    self.skip_on_task_failure = true;
    self
  }

  /// Apply a per-transfer timeout. Expiry is reported as `NetworkTimeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// Resolve this declaration against an invocation working directory,
  /// producing a validated spec. Relative local paths are joined onto
  /// `workdir`; absolute paths are kept as declared.
  pub fn resolve(&self, workdir: &Path) -> Result<TransferSpec, TransferError> {
    let local_path = if self.local.is_absolute() {
      self.local.clone()
    } else {
      workdir.join(&self.local)
    };

    let mut spec = TransferSpec::new(
      self.direction,
      self.remote.clone(),
      local_path,
      Arc::clone(&self.strategy),
    )?;
    spec.skip_on_task_failure = self.skip_on_task_failure;
    spec.timeout = self.timeout;
    Ok(spec)
  }
}

impl fmt::Debug for TransferDecl {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TransferDecl")
      .field("direction", &self.direction)
      .field("remote", &self.remote)
      .field("local", &self.local)
      .field("strategy", &self.strategy.name())
      .field("skip_on_task_failure", &self.skip_on_task_failure)
      .field("timeout", &self.timeout)
      .finish()
  }
}

/// An immutable description of one file movement, owned by a single task
/// invocation. The local path is always absolute; specs are never shared
/// across concurrent invocations of the same task.
#[derive(Clone)]
pub struct TransferSpec {
  id: String,
  direction: Direction,
  remote: Locator,
  local_path: PathBuf,
  strategy: Arc<dyn StorageStrategy>,
  skip_on_task_failure: bool,
  timeout: Option<Duration>,
}

impl TransferSpec {
  /// Construct a spec, validating that the local path is absolute
  /// (`PathUnresolved` otherwise) and that the strategy supports the
  /// remote locator's scheme (`SchemeMismatch` otherwise).
  pub fn new(
    direction: Direction,
    remote: Locator,
    local_path: PathBuf,
    strategy: Arc<dyn StorageStrategy>,
  ) -> Result<Self, TransferError> {
    if !local_path.is_absolute() {
      return Err(TransferError::PathUnresolved {
        path: local_path.display().to_string(),
      });
    }
    if !strategy.supports(&remote) {
      return Err(TransferError::SchemeMismatch {
        scheme: remote.scheme().as_str().to_string(),
        locator: remote.as_str().to_string(),
      });
    }

    Ok(Self {
      id: uuid::Uuid::new_v4().to_string(),
      direction,
      remote,
      local_path,
      strategy,
      skip_on_task_failure: false,
      timeout: None,
    })
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  pub fn phase(&self) -> Phase {
    self.direction.phase()
  }

  pub fn remote(&self) -> &Locator {
    &self.remote
  }

  pub fn local_path(&self) -> &Path {
    &self.local_path
  }

  pub fn strategy(&self) -> &Arc<dyn StorageStrategy> {
    &self.strategy
  }

  pub fn skip_on_task_failure(&self) -> bool {
    self.skip_on_task_failure
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout
  }

  /// The `(source, destination)` string pair injected into the task's
  /// arguments: `(remote, local)` for inputs, `(local, remote)` for outputs.
  pub fn source_dest_pair(&self) -> (String, String) {
    let local = self.local_path.display().to_string();
    let remote = self.remote.as_str().to_string();
    match self.direction {
      Direction::ToLocal => (remote, local),
      Direction::ToRemote => (local, remote),
    }
  }
}

impl fmt::Debug for TransferSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TransferSpec")
      .field("id", &self.id)
      .field("direction", &self.direction)
      .field("remote", &self.remote)
      .field("local_path", &self.local_path)
      .field("strategy", &self.strategy.name())
      .field("skip_on_task_failure", &self.skip_on_task_failure)
      .field("timeout", &self.timeout)
      .finish()
  }
}
