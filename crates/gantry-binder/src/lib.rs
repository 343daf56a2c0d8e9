//! Gantry Binder
//!
//! Wraps one task invocation with its staged file transfers: resolves the
//! task's [`TaskFiles`](gantry_transfer::TaskFiles) against an
//! invocation-scoped working directory, runs the pre-phase, injects the
//! resolved `(source, destination)` pairs into the task's arguments under
//! the reserved `files` parameter, invokes the body, runs the post-phase,
//! and hands a [`TaskOutcome`] back to the scheduler.

mod binder;
mod error;
mod outcome;

pub use binder::{BinderConfig, TaskInvocationBinder, FILES_PARAM};
pub use error::OutcomeError;
pub use outcome::TaskOutcome;
