//! Per-transfer outcome records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TransferError;

/// The outcome of a single transfer. Created by the executor, appended to
/// the task's outcome record, never mutated after creation.
///
/// Every failed result carries a non-empty error; no failure is silently
/// swallowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
  /// Id of the spec this result belongs to.
  pub spec_id: String,
  /// Whether the transfer completed (or was deliberately skipped).
  pub succeeded: bool,
  /// True when the transfer was skipped under `skip_on_task_failure`.
  pub skipped: bool,
  /// The failure, present exactly when `succeeded` is false.
  pub error: Option<TransferError>,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
}

impl TransferResult {
  pub fn success(spec_id: impl Into<String>, started_at: DateTime<Utc>) -> Self {
    Self {
      spec_id: spec_id.into(),
      succeeded: true,
      skipped: false,
      error: None,
      started_at,
      finished_at: Utc::now(),
    }
  }

  pub fn failure(
    spec_id: impl Into<String>,
    error: TransferError,
    started_at: DateTime<Utc>,
  ) -> Self {
    Self {
      spec_id: spec_id.into(),
      succeeded: false,
      skipped: false,
      error: Some(error),
      started_at,
      finished_at: Utc::now(),
    }
  }

  /// Record a post-phase transfer that was skipped because the task body
  /// failed and the spec opted out. Skipped entries keep the result
  /// sequence positionally stable for consumers.
  pub fn skipped(spec_id: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      spec_id: spec_id.into(),
      succeeded: true,
      skipped: true,
      error: None,
      started_at: now,
      finished_at: now,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failure_always_carries_an_error() {
    let result = TransferResult::failure(
      "spec-1",
      TransferError::ObjectNotFound {
        locator: "s3://bucket/missing".to_string(),
      },
      Utc::now(),
    );
    assert!(!result.succeeded);
    assert!(result.error.is_some());
  }

  #[test]
  fn skipped_results_are_not_failures() {
    let result = TransferResult::skipped("spec-1");
    assert!(result.succeeded);
    assert!(result.skipped);
    assert!(result.error.is_none());
  }
}
