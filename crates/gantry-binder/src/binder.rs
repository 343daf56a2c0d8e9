//! Task invocation binder implementation.

use std::future::Future;
use std::path::PathBuf;

use gantry_transfer::{Phase, TaskFiles, TransferResult, TransferSpec};
use gantry_transfer_executor::TransferExecutor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::error::OutcomeError;
use crate::outcome::TaskOutcome;

/// Reserved parameter name under which the resolved `(source, destination)`
/// pairs are injected into the task's arguments. This is the sole data
/// contract between the staging subsystem and task-author code.
pub const FILES_PARAM: &str = "files";

/// Configuration for the binder.
pub struct BinderConfig {
  /// Base directory under which each invocation gets its own working
  /// directory, so concurrent invocations of the same task never share a
  /// download destination.
  pub workdir_base: PathBuf,
}

/// Runs one task invocation with its staged transfers.
pub struct TaskInvocationBinder {
  executor: TransferExecutor,
  config: BinderConfig,
}

impl TaskInvocationBinder {
  pub fn new(executor: TransferExecutor, config: BinderConfig) -> Self {
    Self { executor, config }
  }

  /// Invoke `task` with staging. The task body runs only if every pre-phase
  /// transfer succeeded; the post-phase runs after the body returns or
  /// fails (specs marked skip-on-task-failure are skipped when it failed).
  /// Nothing is re-raised past this boundary — the outcome carries it all.
  #[instrument(name = "task_invoke", skip_all, fields(total_specs = files.len()))]
  pub async fn invoke<F, Fut>(
    &self,
    task: F,
    files: &TaskFiles,
    args: serde_json::Value,
    cancel: CancellationToken,
  ) -> TaskOutcome
  where
    F: FnOnce(serde_json::Value) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, anyhow::Error>>,
  {
    let invocation_id = uuid::Uuid::new_v4().to_string();
    let workdir = self.config.workdir_base.join(&invocation_id);

    if let Err(e) = tokio::fs::create_dir_all(&workdir).await {
      return Self::aborted(OutcomeError::Workdir {
        path: workdir.display().to_string(),
        message: e.to_string(),
      });
    }

    // Construction-time validation happens here, before any transfer.
    let specs = match files.resolve(&workdir) {
      Ok(specs) => specs,
      Err(source) => return Self::aborted(OutcomeError::Declaration { source }),
    };

    info!(
      invocation_id = %invocation_id,
      workdir = %workdir.display(),
      "staging_started"
    );

    let pre_transfer_results = self.executor.run_phase(&specs, Phase::Pre, &cancel).await;

    if let Some(failed) = pre_transfer_results.iter().find(|r| !r.succeeded) {
      let source = failed.error.clone().unwrap_or(
        gantry_transfer::TransferError::Transport {
          strategy: "unknown".to_string(),
          message: "transfer failed without an error record".to_string(),
        },
      );
      error!(
        invocation_id = %invocation_id,
        spec_id = %failed.spec_id,
        error = %source,
        "input_staging_failed"
      );
      return TaskOutcome {
        task_result: Err(OutcomeError::PreTransfer {
          spec_id: failed.spec_id.clone(),
          source,
        }),
        pre_transfer_results,
        post_transfer_results: Vec::new(),
      };
    }

    let args = match Self::inject_files(args, &specs) {
      Ok(args) => args,
      Err(e) => {
        return TaskOutcome {
          task_result: Err(e),
          pre_transfer_results,
          post_transfer_results: Vec::new(),
        };
      }
    };

    info!(invocation_id = %invocation_id, "task_started");
    let task_result = task(args).await;
    match &task_result {
      Ok(_) => info!(invocation_id = %invocation_id, "task_completed"),
      Err(e) => error!(invocation_id = %invocation_id, error = %e, "task_failed"),
    }

    let post_transfer_results = self
      .run_post_phase(&specs, task_result.is_err(), &cancel)
      .await;

    if post_transfer_results.iter().any(|r| !r.succeeded) {
      warn!(invocation_id = %invocation_id, "output_staging_failed");
    }

    TaskOutcome {
      task_result: task_result.map_err(|source| OutcomeError::TaskBody { source }),
      pre_transfer_results,
      post_transfer_results,
    }
  }

  /// Run the post-phase. When the body failed, specs that opted out via
  /// skip-on-task-failure are recorded as skipped instead of executed, and
  /// the remaining specs still run. Result order stays declaration order.
  async fn run_post_phase(
    &self,
    specs: &[TransferSpec],
    body_failed: bool,
    cancel: &CancellationToken,
  ) -> Vec<TransferResult> {
    let post_specs: Vec<&TransferSpec> =
      specs.iter().filter(|s| s.phase() == Phase::Post).collect();

    if !body_failed {
      return self.executor.run_phase(specs, Phase::Post, cancel).await;
    }

    let to_run: Vec<TransferSpec> = post_specs
      .iter()
      .filter(|s| !s.skip_on_task_failure())
      .map(|s| (*s).clone())
      .collect();
    let mut ran = self
      .executor
      .run_phase(&to_run, Phase::Post, cancel)
      .await
      .into_iter();

    post_specs
      .into_iter()
      .map(|spec| {
        if spec.skip_on_task_failure() {
          info!(spec_id = %spec.id(), "transfer_skipped");
          TransferResult::skipped(spec.id())
        } else {
          ran
            .next()
            .unwrap_or_else(|| TransferResult::skipped(spec.id()))
        }
      })
      .collect()
  }

  /// Inject the ordered path pairs under [`FILES_PARAM`]. Entries appear in
  /// declaration order, interleaving both phases, so index-based access in
  /// the task body is positionally stable regardless of direction.
  fn inject_files(
    args: serde_json::Value,
    specs: &[TransferSpec],
  ) -> Result<serde_json::Value, OutcomeError> {
    let pairs: Vec<(String, String)> = specs.iter().map(|s| s.source_dest_pair()).collect();
    let pairs = serde_json::to_value(pairs).map_err(|e| OutcomeError::InvalidArgs {
      message: e.to_string(),
    })?;

    let mut map = match args {
      serde_json::Value::Object(map) => map,
      serde_json::Value::Null => serde_json::Map::new(),
      other => {
        return Err(OutcomeError::InvalidArgs {
          message: format!("expected an object or null, got {}", other),
        });
      }
    };
    map.insert(FILES_PARAM.to_string(), pairs);
    Ok(serde_json::Value::Object(map))
  }

  fn aborted(error: OutcomeError) -> TaskOutcome {
    TaskOutcome {
      task_result: Err(error),
      pre_transfer_results: Vec::new(),
      post_transfer_results: Vec::new(),
    }
  }
}
