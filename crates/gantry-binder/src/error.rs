//! Invocation outcome errors.

use gantry_transfer::TransferError;
use thiserror::Error;

/// Why a task invocation's result is a failure.
///
/// Pre-phase and declaration failures mean the task body never ran; a
/// `TaskBody` failure is the body's own error, passed through opaquely.
/// Post-phase failures are never represented here — they live on
/// [`TaskOutcome::post_transfer_results`](crate::TaskOutcome) so they can
/// not mask a successful task result.
#[derive(Debug, Error)]
pub enum OutcomeError {
  /// The invocation working directory could not be prepared.
  #[error("failed to prepare working directory '{path}': {message}")]
  Workdir { path: String, message: String },

  /// The task's arguments cannot carry the injected files parameter.
  #[error("invalid task arguments: {message}")]
  InvalidArgs { message: String },

  /// A transfer declaration failed validation (unresolved path, scheme
  /// mismatch) before any transfer ran.
  #[error("invalid transfer declaration: {source}")]
  Declaration {
    #[source]
    source: TransferError,
  },

  /// A required input transfer failed, so the task body was not invoked.
  #[error("input staging failed for transfer '{spec_id}': {source}")]
  PreTransfer {
    spec_id: String,
    #[source]
    source: TransferError,
  },

  /// The task body itself failed.
  #[error("task body failed: {source}")]
  TaskBody {
    #[source]
    source: anyhow::Error,
  },
}
