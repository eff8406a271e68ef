//! Build-order planning.
//!
//! Two orders are derived from the same graph: a depth-first linear order
//! for sequential execution, and a level partition for parallel execution.

use std::collections::HashMap;

use crate::registry::Registry;
use crate::target::TargetId;

/// Linear execution order: dependencies first, in list order, root last.
/// Each reachable target appears exactly once.
pub fn sequential_order(registry: &Registry, root: TargetId) -> Vec<TargetId> {
  let mut seen = vec![false; registry.len()];
  let mut order = Vec::new();
  visit(registry, root, &mut seen, &mut order);
  order
}

fn visit(registry: &Registry, id: TargetId, seen: &mut [bool], order: &mut Vec<TargetId>) {
  if seen[id.index()] {
    return;
  }
  seen[id.index()] = true;
  for &dep in registry.target(id).dependencies() {
    visit(registry, dep, seen, order);
  }
  order.push(id);
}

/// Level-partitioned parallel order, deepest level first.
///
/// A target's level is its maximum edge distance from the root along any
/// path; a target reachable at several depths sits at the deepest one only.
/// Every dependency therefore lands on a strictly deeper level than its
/// dependent, so levels can run behind barriers with no live dependency
/// tracking. Within a level the order carries no meaning; it is sorted by
/// id so plans are reproducible.
pub fn parallel_levels(registry: &Registry, root: TargetId) -> Vec<Vec<TargetId>> {
  let mut depth: HashMap<TargetId, usize> = HashMap::new();
  depth.insert(root, 0);
  let mut stack = vec![root];
  while let Some(id) = stack.pop() {
    let next = depth[&id] + 1;
    for &dep in registry.target(id).dependencies() {
      if depth.get(&dep).is_none_or(|&d| d < next) {
        depth.insert(dep, next);
        stack.push(dep);
      }
    }
  }

  let deepest = depth.values().copied().max().unwrap_or(0);
  let mut levels = vec![Vec::new(); deepest + 1];
  for (id, d) in depth {
    levels[deepest - d].push(id);
  }
  for level in &mut levels {
    level.sort_unstable();
  }
  levels
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::graph::depend_on;
  use crate::target::TargetBody;

  fn noop() -> TargetBody {
    Box::new(|| Ok(()))
  }

  fn registry_with(names: &[&str], edges: &[(&str, &str)]) -> Registry {
    let mut registry = Registry::new();
    for name in names {
      registry.define(name, noop()).unwrap();
    }
    for (target, dep) in edges {
      depend_on(&mut registry, target, dep).unwrap();
    }
    registry
  }

  fn names(registry: &Registry, order: &[TargetId]) -> Vec<String> {
    order
      .iter()
      .map(|&id| registry.target(id).name().to_string())
      .collect()
  }

  #[test]
  fn linear_chain_emits_dependencies_first() {
    let registry = registry_with(&["a", "b", "c"], &[("b", "a"), ("c", "b")]);
    let root = registry.resolve("c").unwrap();

    let order = sequential_order(&registry, root);
    assert_eq!(names(&registry, &order), ["a", "b", "c"]);
  }

  #[test]
  fn diamond_emits_each_target_once_with_dependencies_before_dependents() {
    let registry = registry_with(
      &["a", "b", "c", "d"],
      &[("b", "a"), ("c", "a"), ("d", "b"), ("d", "c")],
    );
    let root = registry.resolve("d").unwrap();

    let order = names(&registry, &sequential_order(&registry, root));
    assert_eq!(order, ["a", "b", "c", "d"]);
  }

  #[test]
  fn dependency_list_order_breaks_ties() {
    let registry = registry_with(&["root", "x", "y"], &[("root", "y"), ("root", "x")]);
    let root = registry.resolve("root").unwrap();

    let order = names(&registry, &sequential_order(&registry, root));
    assert_eq!(order, ["y", "x", "root"]);
  }

  #[test]
  fn target_without_dependencies_is_a_single_step_plan() {
    let registry = registry_with(&["solo"], &[]);
    let root = registry.resolve("solo").unwrap();

    assert_eq!(names(&registry, &sequential_order(&registry, root)), ["solo"]);
    assert_eq!(parallel_levels(&registry, root).len(), 1);
  }

  #[test]
  fn diamond_levels_are_deepest_first() {
    let registry = registry_with(
      &["a", "b", "c", "d"],
      &[("b", "a"), ("c", "a"), ("d", "b"), ("d", "c")],
    );
    let root = registry.resolve("d").unwrap();

    let levels: Vec<Vec<String>> = parallel_levels(&registry, root)
      .iter()
      .map(|level| names(&registry, level))
      .collect();
    assert_eq!(levels, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
  }

  #[test]
  fn target_reachable_at_several_depths_sits_at_the_deepest() {
    // root depends on b and c; b also depends on c. c is reachable at
    // distance 1 and 2 and must be scheduled at 2.
    let registry = registry_with(&["root", "b", "c"], &[("root", "b"), ("root", "c"), ("b", "c")]);
    let root = registry.resolve("root").unwrap();

    let levels: Vec<Vec<String>> = parallel_levels(&registry, root)
      .iter()
      .map(|level| names(&registry, level))
      .collect();
    assert_eq!(levels, vec![vec!["c"], vec!["b"], vec!["root"]]);
  }

  #[test]
  fn every_dependency_is_strictly_deeper_than_its_dependent() {
    let registry = registry_with(
      &["a", "b", "c", "d", "e"],
      &[("e", "d"), ("e", "b"), ("d", "c"), ("c", "a"), ("b", "a")],
    );
    let root = registry.resolve("e").unwrap();
    let levels = parallel_levels(&registry, root);

    let level_of = |id: TargetId| levels.iter().position(|level| level.contains(&id)).unwrap();
    for id in registry.ids() {
      for &dep in registry.target(id).dependencies() {
        assert!(level_of(dep) < level_of(id), "dependency must be on a deeper level");
      }
    }
  }

  #[test]
  fn unreachable_targets_are_not_planned() {
    let registry = registry_with(&["a", "b", "island"], &[("b", "a")]);
    let root = registry.resolve("b").unwrap();

    let order = names(&registry, &sequential_order(&registry, root));
    assert_eq!(order, ["a", "b"]);

    let planned: usize = parallel_levels(&registry, root).iter().map(Vec::len).sum();
    assert_eq!(planned, 2);
  }
}
