//! Invocation outcome record.

use gantry_transfer::TransferResult;

use crate::error::OutcomeError;

/// Everything the scheduler needs to know about one task invocation: the
/// body's result (or why it did not produce one) plus the ordered transfer
/// results of both phases. Owned by the scheduler once the binder returns.
#[derive(Debug)]
pub struct TaskOutcome {
  pub task_result: Result<serde_json::Value, OutcomeError>,
  pub pre_transfer_results: Vec<TransferResult>,
  pub post_transfer_results: Vec<TransferResult>,
}

impl TaskOutcome {
  pub fn succeeded(&self) -> bool {
    self.task_result.is_ok()
  }

  /// True when the task produced a result but one or more output transfers
  /// failed. The scheduler decides whether that is a partial success or an
  /// error; the task's own result is never overwritten by it.
  pub fn output_staging_failed(&self) -> bool {
    self.post_transfer_results.iter().any(|r| !r.succeeded)
  }
}
