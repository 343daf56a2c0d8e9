//! Ordered file declarations attached to a task definition.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::direction::Phase;
use crate::error::TransferError;
use crate::spec::{TransferDecl, TransferSpec};

/// The ordered list of file movements a task declares at definition time.
///
/// This is the explicit configuration struct the binder consumes at call
/// time: declaration order is the order results are reported in and the
/// order path pairs are injected into the task's arguments.
#[derive(Debug, Clone, Default)]
pub struct TaskFiles {
  decls: Vec<TransferDecl>,
}

impl TaskFiles {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a declaration, builder style.
  pub fn with(mut self, decl: TransferDecl) -> Self {
    self.decls.push(decl);
    self
  }

  pub fn push(&mut self, decl: TransferDecl) {
    self.decls.push(decl);
  }

  pub fn len(&self) -> usize {
    self.decls.len()
  }

  pub fn is_empty(&self) -> bool {
    self.decls.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &TransferDecl> {
    self.decls.iter()
  }

  /// Resolve every declaration against an invocation-scoped working
  /// directory, preserving declaration order. Fails on the first
  /// construction-time error (`PathUnresolved`, `SchemeMismatch`).
  pub fn resolve(&self, workdir: &Path) -> Result<Vec<TransferSpec>, TransferError> {
    self.decls.iter().map(|decl| decl.resolve(workdir)).collect()
  }

  /// Report duplicate destination paths within one phase. Conflicts are
  /// authoring diagnostics, not errors: both transfers still execute and
  /// the later-declared spec's write wins at the filesystem level.
  pub fn conflicts(specs: &[TransferSpec]) -> Vec<AuthorConflict> {
    let mut seen: HashMap<(Phase, &Path), &TransferSpec> = HashMap::new();
    let mut conflicts = Vec::new();

    for spec in specs {
      let key = (spec.phase(), spec.local_path());
      match seen.get(&key) {
        Some(first) => conflicts.push(AuthorConflict {
          phase: spec.phase(),
          local_path: spec.local_path().to_path_buf(),
          first_spec: first.id().to_string(),
          second_spec: spec.id().to_string(),
        }),
        None => {
          seen.insert(key, spec);
        }
      }
    }

    conflicts
  }
}

/// Two specs in the same phase target the same local path. Last declared
/// wins; both results are still recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorConflict {
  pub phase: Phase,
  pub local_path: PathBuf,
  pub first_spec: String,
  pub second_spec: String,
}

impl fmt::Display for AuthorConflict {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "specs '{}' and '{}' both target '{}' in the {:?} phase; the later declaration wins",
      self.first_spec,
      self.second_spec,
      self.local_path.display(),
      self.phase,
    )
  }
}
