//! Lifecycle hook registries.
//!
//! Build-failure targets run during teardown when the build recorded at
//! least one error; final targets run during every teardown. Both kinds
//! must be explicitly activated before they fire, and they dispatch in
//! ascending normalized-name order.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::EngineError;

/// Which lifecycle registry a hook belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
  BuildFailure,
  Final,
}

impl fmt::Display for HookKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      HookKind::BuildFailure => write!(f, "build-failure"),
      HookKind::Final => write!(f, "final"),
    }
  }
}

/// Activation registries for both hook kinds.
///
/// Keys are normalized target names; `BTreeMap` ordering is the dispatch
/// order, so it cannot drift from the registry contents.
#[derive(Debug, Default)]
pub struct Hooks {
  build_failure: BTreeMap<String, bool>,
  finals: BTreeMap<String, bool>,
}

impl Hooks {
  fn table(&self, kind: HookKind) -> &BTreeMap<String, bool> {
    match kind {
      HookKind::BuildFailure => &self.build_failure,
      HookKind::Final => &self.finals,
    }
  }

  fn table_mut(&mut self, kind: HookKind) -> &mut BTreeMap<String, bool> {
    match kind {
      HookKind::BuildFailure => &mut self.build_failure,
      HookKind::Final => &mut self.finals,
    }
  }

  pub(crate) fn register(&mut self, kind: HookKind, normalized: String) {
    self.table_mut(kind).insert(normalized, false);
  }

  pub(crate) fn activate(
    &mut self,
    kind: HookKind,
    name: &str,
    normalized: &str,
  ) -> Result<(), EngineError> {
    match self.table_mut(kind).get_mut(normalized) {
      Some(flag) => {
        *flag = true;
        Ok(())
      }
      None => Err(EngineError::UnknownHook {
        kind,
        name: name.to_string(),
      }),
    }
  }

  /// Activated hook names of the given kind, ascending.
  pub(crate) fn activated(&self, kind: HookKind) -> Vec<&str> {
    self
      .table(kind)
      .iter()
      .filter(|&(_, &active)| active)
      .map(|(name, _)| name.as_str())
      .collect()
  }

  pub(crate) fn reset(&mut self) {
    self.build_failure.clear();
    self.finals.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hooks_start_inactive() {
    let mut hooks = Hooks::default();
    hooks.register(HookKind::Final, "cleanup".to_string());
    assert!(hooks.activated(HookKind::Final).is_empty());
  }

  #[test]
  fn activation_flips_the_flag() {
    let mut hooks = Hooks::default();
    hooks.register(HookKind::BuildFailure, "report".to_string());
    hooks.activate(HookKind::BuildFailure, "report", "report").unwrap();
    assert_eq!(hooks.activated(HookKind::BuildFailure), ["report"]);
  }

  #[test]
  fn activating_an_unregistered_hook_fails() {
    let mut hooks = Hooks::default();
    let err = hooks.activate(HookKind::Final, "Ghost", "ghost").unwrap_err();
    assert!(matches!(
      err,
      EngineError::UnknownHook { kind: HookKind::Final, name } if name == "Ghost"
    ));
  }

  #[test]
  fn the_two_kinds_are_independent() {
    let mut hooks = Hooks::default();
    hooks.register(HookKind::Final, "shared".to_string());
    assert!(hooks.activate(HookKind::BuildFailure, "shared", "shared").is_err());
  }

  #[test]
  fn activated_hooks_come_out_in_ascending_name_order() {
    let mut hooks = Hooks::default();
    for name in ["zeta", "alpha", "mid"] {
      hooks.register(HookKind::Final, name.to_string());
      hooks.activate(HookKind::Final, name, name).unwrap();
    }
    assert_eq!(hooks.activated(HookKind::Final), ["alpha", "mid", "zeta"]);
  }

  #[test]
  fn reset_clears_both_tables() {
    let mut hooks = Hooks::default();
    hooks.register(HookKind::Final, "a".to_string());
    hooks.register(HookKind::BuildFailure, "b".to_string());
    hooks.reset();
    assert!(hooks.activated(HookKind::Final).is_empty());
    assert!(hooks.activate(HookKind::BuildFailure, "b", "b").is_err());
  }
}
