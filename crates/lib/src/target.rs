//! Target definitions.

use std::fmt;

use crate::error::BuildFailure;

/// Stable identifier for a registered target: an index into the registry's
/// target table. Graph and planner traversals work on ids and never
/// re-resolve names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub(crate) usize);

impl TargetId {
  pub(crate) fn index(self) -> usize {
    self.0
  }
}

/// A target body: a parameter-free effectful action.
pub type TargetBody = Box<dyn Fn() -> Result<(), BuildFailure> + Send + Sync>;

/// A named unit of work with an ordered dependency list.
///
/// The display name keeps the case it was registered with; comparisons go
/// through the normalized form. The dependency list is the only field that
/// changes after creation, and it only grows.
pub struct Target {
  name: String,
  normalized: String,
  description: Option<String>,
  dependencies: Vec<TargetId>,
  body: TargetBody,
}

impl Target {
  pub(crate) fn new(
    name: &str,
    normalized: String,
    description: Option<String>,
    body: TargetBody,
  ) -> Self {
    Self {
      name: name.to_string(),
      normalized,
      description,
      dependencies: Vec::new(),
      body,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn normalized(&self) -> &str {
    &self.normalized
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  pub fn dependencies(&self) -> &[TargetId] {
    &self.dependencies
  }

  pub(crate) fn dependencies_mut(&mut self) -> &mut Vec<TargetId> {
    &mut self.dependencies
  }

  pub(crate) fn invoke(&self) -> Result<(), BuildFailure> {
    (self.body)()
  }
}

impl fmt::Debug for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Target")
      .field("name", &self.name)
      .field("description", &self.description)
      .field("dependencies", &self.dependencies)
      .finish_non_exhaustive()
  }
}
