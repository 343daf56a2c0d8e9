//! Gantry Transfer Executor
//!
//! Runs a task invocation's transfers one phase at a time. Transfers within
//! a phase are independent and execute concurrently, but the result
//! sequence always comes back in declaration order, and a phase runs to
//! completion before the caller moves on — the task body never races a
//! pre-phase transfer, and no post-phase transfer starts before the body
//! has returned.

mod executor;

pub use executor::TransferExecutor;
