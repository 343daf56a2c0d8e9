//! Gantry Transfer
//!
//! Core data model for the file staging subsystem: directional transfer
//! declarations attached to a task definition, the invocation-scoped specs
//! they resolve into, per-transfer outcome records, and the storage
//! strategy contract that backends implement.
//!
//! A task declares its file movements once, as an ordered [`TaskFiles`]
//! list. At invocation time the binder resolves the list against a working
//! directory, producing immutable [`TransferSpec`]s that the executor runs
//! in two phases: inputs ([`Phase::Pre`]) before the task body, outputs
//! ([`Phase::Post`]) after it.

mod direction;
mod error;
mod files;
mod locator;
mod result;
mod spec;
mod strategy;

pub use direction::{Direction, Phase};
pub use error::TransferError;
pub use files::{AuthorConflict, TaskFiles};
pub use locator::{Locator, Scheme};
pub use result::TransferResult;
pub use spec::{TransferDecl, TransferSpec};
pub use strategy::StorageStrategy;
