//! Dependency edge insertion with incremental cycle prevention.
//!
//! Edges live in each target's ordered dependency list; list order decides
//! sequential execution order, so insertion supports both append and
//! prepend. Every insertion first walks the transitive dependencies of the
//! new prerequisite; finding the dependent target on that walk means the
//! edge would close a cycle, and it is rejected before anything is stored.

use std::collections::HashSet;

use crate::error::EngineError;
use crate::registry::Registry;
use crate::target::TargetId;

/// Where a new dependency lands in the dependent's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePosition {
  First,
  Last,
}

/// Append `dependency` to `target`'s dependency list.
pub fn depend_on(
  registry: &mut Registry,
  target: &str,
  dependency: &str,
) -> Result<(), EngineError> {
  insert_edge(registry, target, dependency, EdgePosition::Last)
}

/// Prepend `dependency`, making it the first of `target`'s dependencies to
/// run.
pub fn depend_on_first(
  registry: &mut Registry,
  target: &str,
  dependency: &str,
) -> Result<(), EngineError> {
  insert_edge(registry, target, dependency, EdgePosition::First)
}

pub fn insert_edge(
  registry: &mut Registry,
  target: &str,
  dependency: &str,
  position: EdgePosition,
) -> Result<(), EngineError> {
  let target_id = registry.resolve(target)?;
  let dep_id = registry.resolve(dependency)?;

  if reaches(registry, dep_id, target_id) {
    return Err(EngineError::CyclicDependency {
      target: registry.target(target_id).name().to_string(),
      dependency: registry.target(dep_id).name().to_string(),
    });
  }

  let deps = registry.target_mut(target_id).dependencies_mut();
  match position {
    EdgePosition::Last => deps.push(dep_id),
    EdgePosition::First => deps.insert(0, dep_id),
  }
  Ok(())
}

/// Whether `to` is reachable from `from` along dependency edges. The start
/// node counts, which is what rejects self-edges.
fn reaches(registry: &Registry, from: TargetId, to: TargetId) -> bool {
  let mut seen = HashSet::new();
  let mut stack = vec![from];
  while let Some(id) = stack.pop() {
    if id == to {
      return true;
    }
    if seen.insert(id) {
      stack.extend(registry.target(id).dependencies());
    }
  }
  false
}
