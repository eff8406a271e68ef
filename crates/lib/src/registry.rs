//! Case-insensitive target registry.
//!
//! Targets live in a vector and are addressed by [`TargetId`]; a side map
//! from normalized name to id serves lookups. Normalization uses
//! `str::to_lowercase`, the locale-independent Unicode default fold: ASCII
//! names get the plain ASCII mapping, non-ASCII names are permitted and
//! fold deterministically.

use std::collections::HashMap;

use crate::error::EngineError;
use crate::target::{Target, TargetBody, TargetId};

/// Case-fold a target name for lookups and comparisons.
pub fn normalize(name: &str) -> String {
  name.to_lowercase()
}

#[derive(Debug, Default)]
pub struct Registry {
  targets: Vec<Target>,
  by_name: HashMap<String, TargetId>,
  pending_description: Option<String>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a target under `name`, consuming any pending description.
  pub fn define(&mut self, name: &str, body: TargetBody) -> Result<TargetId, EngineError> {
    let normalized = normalize(name);
    if self.by_name.contains_key(&normalized) {
      return Err(EngineError::DuplicateTarget(name.to_string()));
    }
    let id = TargetId(self.targets.len());
    let description = self.pending_description.take();
    self
      .targets
      .push(Target::new(name, normalized.clone(), description, body));
    self.by_name.insert(normalized, id);
    Ok(id)
  }

  /// Attach a description to the next target to be registered. The slot
  /// holds one description at a time.
  pub fn describe(&mut self, text: &str) -> Result<(), EngineError> {
    if let Some(pending) = &self.pending_description {
      return Err(EngineError::DescriptionAlreadyPending(pending.clone()));
    }
    self.pending_description = Some(text.to_string());
    Ok(())
  }

  /// Case-insensitive lookup. The miss diagnostic enumerates every
  /// registered target name.
  pub fn resolve(&self, name: &str) -> Result<TargetId, EngineError> {
    self
      .by_name
      .get(&normalize(name))
      .copied()
      .ok_or_else(|| EngineError::UnknownTarget {
        name: name.to_string(),
        known: self.names().iter().map(|n| n.to_string()).collect(),
      })
  }

  pub fn target(&self, id: TargetId) -> &Target {
    &self.targets[id.index()]
  }

  pub(crate) fn target_mut(&mut self, id: TargetId) -> &mut Target {
    &mut self.targets[id.index()]
  }

  /// Original-case names in registration order.
  pub fn names(&self) -> Vec<&str> {
    self.targets.iter().map(|t| t.name()).collect()
  }

  pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
    (0..self.targets.len()).map(TargetId)
  }

  pub fn len(&self) -> usize {
    self.targets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.targets.is_empty()
  }

  pub(crate) fn pending_description(&self) -> Option<&str> {
    self.pending_description.as_deref()
  }

  pub fn reset(&mut self) {
    self.targets.clear();
    self.by_name.clear();
    self.pending_description = None;
  }

  /// Render a dependency list as `[a, b]` using display names.
  pub(crate) fn pretty_dependencies(&self, id: TargetId) -> String {
    let names: Vec<&str> = self
      .target(id)
      .dependencies()
      .iter()
      .map(|&dep| self.target(dep).name())
      .collect();
    format!("[{}]", names.join(", "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::EngineError;

  fn noop() -> TargetBody {
    Box::new(|| Ok(()))
  }

  #[test]
  fn define_and_resolve_is_case_insensitive() {
    let mut registry = Registry::new();
    let id = registry.define("Compile", noop()).unwrap();

    assert_eq!(registry.resolve("compile").unwrap(), id);
    assert_eq!(registry.resolve("COMPILE").unwrap(), id);
    assert_eq!(registry.target(id).name(), "Compile");
    assert_eq!(registry.target(id).normalized(), "compile");
  }

  #[test]
  fn duplicate_definition_is_rejected_across_cases() {
    let mut registry = Registry::new();
    registry.define("build", noop()).unwrap();

    let err = registry.define("Build", noop()).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateTarget(name) if name == "Build"));
  }

  #[test]
  fn miss_diagnostic_lists_all_names() {
    let mut registry = Registry::new();
    registry.define("build", noop()).unwrap();
    registry.define("Test", noop()).unwrap();

    let err = registry.resolve("deploy").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("build"));
    assert!(text.contains("Test"));
  }

  #[test]
  fn description_attaches_to_next_target_only() {
    let mut registry = Registry::new();
    registry.describe("Compile the tree").unwrap();
    let first = registry.define("build", noop()).unwrap();
    let second = registry.define("test", noop()).unwrap();

    assert_eq!(registry.target(first).description(), Some("Compile the tree"));
    assert_eq!(registry.target(second).description(), None);
    assert!(registry.pending_description().is_none());
  }

  #[test]
  fn double_describe_is_rejected() {
    let mut registry = Registry::new();
    registry.describe("first").unwrap();

    let err = registry.describe("second").unwrap_err();
    assert!(matches!(err, EngineError::DescriptionAlreadyPending(text) if text == "first"));
  }

  #[test]
  fn names_keep_registration_order_and_case() {
    let mut registry = Registry::new();
    registry.define("Zeta", noop()).unwrap();
    registry.define("alpha", noop()).unwrap();

    assert_eq!(registry.names(), ["Zeta", "alpha"]);
  }

  #[test]
  fn reset_round_trip_leaves_nothing() {
    let mut registry = Registry::new();
    registry.describe("pending").unwrap();
    registry.define("a", noop()).unwrap();
    registry.describe("pending again").unwrap();

    registry.reset();

    assert!(registry.is_empty());
    assert!(registry.names().is_empty());
    assert!(registry.pending_description().is_none());
  }

  #[test]
  fn non_ascii_names_fold_deterministically() {
    let mut registry = Registry::new();
    let id = registry.define("Größe", noop()).unwrap();
    assert_eq!(registry.resolve("größe").unwrap(), id);
  }
}
