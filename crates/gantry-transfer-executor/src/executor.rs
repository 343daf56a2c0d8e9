//! Transfer executor implementation.

use chrono::Utc;
use futures::StreamExt;
use gantry_transfer::{Direction, Phase, TaskFiles, TransferError, TransferResult, TransferSpec};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

/// Executes the transfers of one phase for one task invocation.
///
/// The executor never short-circuits: every spec in the requested phase gets
/// a [`TransferResult`], successes and failures alike. Deciding whether a
/// failure is fatal for the invocation is the binder's job.
pub struct TransferExecutor {
  concurrency: Option<usize>,
}

impl TransferExecutor {
  /// Create an executor with unbounded in-phase concurrency.
  pub fn new() -> Self {
    Self { concurrency: None }
  }

  /// Limit how many transfers of one phase may be in flight at once.
  pub fn with_concurrency(mut self, limit: usize) -> Self {
    self.concurrency = Some(limit.max(1));
    self
  }

  /// Run every spec belonging to `phase`, concurrently up to the configured
  /// limit. The returned results are in declaration order regardless of
  /// which transfer finished first.
  #[instrument(
    name = "transfer_phase",
    skip(self, specs, cancel),
    fields(phase = ?phase, total = specs.len())
  )]
  pub async fn run_phase(
    &self,
    specs: &[TransferSpec],
    phase: Phase,
    cancel: &CancellationToken,
  ) -> Vec<TransferResult> {
    let selected: Vec<&TransferSpec> = specs.iter().filter(|s| s.phase() == phase).collect();
    if selected.is_empty() {
      return Vec::new();
    }

    for conflict in TaskFiles::conflicts(specs)
      .iter()
      .filter(|c| c.phase == phase)
    {
      warn!(conflict = %conflict, "duplicate transfer destination");
    }

    let limit = self.concurrency.unwrap_or(selected.len());
    let mut indexed: Vec<(usize, TransferResult)> = futures::stream::iter(
      selected
        .into_iter()
        .enumerate()
        .map(|(index, spec)| async move { (index, run_one(spec, cancel).await) }),
    )
    .buffer_unordered(limit)
    .collect()
    .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, result)| result).collect()
  }
}

impl Default for TransferExecutor {
  fn default() -> Self {
    Self::new()
  }
}

async fn run_one(spec: &TransferSpec, cancel: &CancellationToken) -> TransferResult {
  let started_at = Utc::now();
  info!(
    spec_id = %spec.id(),
    direction = ?spec.direction(),
    remote = %spec.remote(),
    local = %spec.local_path().display(),
    strategy = spec.strategy().name(),
    "transfer_started"
  );

  let transfer = async {
    match spec.direction() {
      Direction::ToLocal => {
        spec
          .strategy()
          .download(spec.remote(), spec.local_path())
          .await
      }
      Direction::ToRemote => {
        spec
          .strategy()
          .upload(spec.local_path(), spec.remote())
          .await
      }
    }
  };

  let outcome = tokio::select! {
    _ = cancel.cancelled() => Err(TransferError::Cancelled),
    outcome = run_with_timeout(spec, transfer) => outcome,
  };

  match outcome {
    Ok(()) => {
      info!(spec_id = %spec.id(), "transfer_completed");
      TransferResult::success(spec.id(), started_at)
    }
    Err(err) => {
      error!(spec_id = %spec.id(), error = %err, "transfer_failed");
      TransferResult::failure(spec.id(), err, started_at)
    }
  }
}

async fn run_with_timeout(
  spec: &TransferSpec,
  transfer: impl Future<Output = Result<(), TransferError>>,
) -> Result<(), TransferError> {
  match spec.timeout() {
    Some(timeout) => match tokio::time::timeout(timeout, transfer).await {
      Ok(outcome) => outcome,
      Err(_) => Err(TransferError::NetworkTimeout {
        timeout_ms: timeout.as_millis() as u64,
      }),
    },
    None => transfer.await,
  }
}
