//! Transfer direction and execution phase.

use serde::{Deserialize, Serialize};

/// Direction of a file movement relative to the task's working area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
  /// Fetch a remote object into the local working area before the task runs.
  ToLocal,
  /// Push a locally produced file to a remote destination after the task runs.
  ToRemote,
}

/// Phase of execution relative to the task body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
  /// Runs to completion before the task body is invoked.
  Pre,
  /// Runs after the task body has returned or failed.
  Post,
}

impl Direction {
  /// The phase a transfer of this direction belongs to. The mapping is
  /// exact: `ToLocal` specs run only in the pre-phase, `ToRemote` only in
  /// the post-phase.
  pub fn phase(self) -> Phase {
    match self {
      Direction::ToLocal => Phase::Pre,
      Direction::ToRemote => Phase::Post,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direction_maps_to_exactly_one_phase() {
    assert_eq!(Direction::ToLocal.phase(), Phase::Pre);
    assert_eq!(Direction::ToRemote.phase(), Phase::Post);
  }
}
