//! Human-readable renderings: target list, dependency graph, build-time
//! summary.

use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use crate::execute::{ErrorRecord, TimingRecord};
use crate::plan;
use crate::registry::Registry;
use crate::target::TargetId;

/// Minimum name column width in aligned output.
const MIN_NAME_WIDTH: usize = 8;

/// One line per registered target: padded name, description, literal
/// dependency list.
pub fn render_target_list(registry: &Registry) -> String {
  let width = registry
    .names()
    .iter()
    .map(|name| name.len())
    .max()
    .unwrap_or(0)
    .max(MIN_NAME_WIDTH);

  let mut out = String::from("Targets:\n");
  for id in registry.ids() {
    let target = registry.target(id);
    let _ = writeln!(
      out,
      "  {:<width$}  {}  {}",
      target.name(),
      target.description().unwrap_or(""),
      registry.pretty_dependencies(id),
    );
  }
  out
}

/// Render the dependency tree below `root`, one `<== name` line per visit,
/// indented proportionally to depth.
///
/// Non-verbose mode prints (and descends into) each target at most once, at
/// its first visit; verbose mode prints every traversal visit. The
/// linearized sequential execution order follows the tree.
pub fn render_dependency_graph(registry: &Registry, root: TargetId, verbose: bool) -> String {
  let mut out = format!("Dependency graph for '{}':\n", registry.target(root).name());
  let mut printed = HashSet::new();
  render_node(registry, root, 0, verbose, &mut printed, &mut out);

  let order: Vec<&str> = plan::sequential_order(registry, root)
    .into_iter()
    .map(|id| registry.target(id).name())
    .collect();
  let _ = writeln!(out, "Execution order: {}", order.join(", "));
  out
}

fn render_node(
  registry: &Registry,
  id: TargetId,
  depth: usize,
  verbose: bool,
  printed: &mut HashSet<TargetId>,
  out: &mut String,
) {
  if !verbose && !printed.insert(id) {
    return;
  }
  let _ = writeln!(
    out,
    "{:indent$}<== {}",
    "",
    registry.target(id).name(),
    indent = depth * 2
  );
  for &dep in registry.target(id).dependencies() {
    render_node(registry, dep, depth + 1, verbose, printed, out);
  }
}

/// Build-time summary: executed targets in completion order, a `Total` row,
/// the status line, and the numbered error list on failure. Names are
/// aligned to the widest one, never narrower than eight columns.
pub fn render_time_summary(
  timings: &[TimingRecord],
  errors: &[ErrorRecord],
  total: Duration,
) -> String {
  let width = timings
    .iter()
    .map(|timing| timing.target.len())
    .max()
    .unwrap_or(0)
    .max(MIN_NAME_WIDTH);

  let mut out = String::from("Build time report\n");
  for timing in timings {
    let _ = writeln!(
      out,
      "  {:<width$}  {}",
      timing.target,
      format_duration(timing.duration)
    );
  }
  let _ = writeln!(out, "  {:<width$}  {}", "Total", format_duration(total));

  if errors.is_empty() {
    out.push_str("Status: Ok\n");
  } else {
    out.push_str("Status: Failure\n");
    out.push_str("Errors:\n");
    for (index, error) in errors.iter().enumerate() {
      let _ = writeln!(out, "  {}. {}: {}", index + 1, error.target, error.message);
      if let Some(detail) = &error.detail {
        let _ = writeln!(out, "     {detail}");
      }
    }
  }
  out
}

/// Render a duration for the summary table: whole milliseconds below one
/// second, fractional seconds below one minute, minutes with padded
/// seconds above that.
pub fn format_duration(duration: Duration) -> String {
  const MINUTE: Duration = Duration::from_secs(60);

  if duration < Duration::from_secs(1) {
    return format!("{}ms", duration.as_millis());
  }
  if duration < MINUTE {
    return format!("{:.2}s", duration.as_secs_f64());
  }
  let whole = duration.as_secs();
  format!("{}m {:02}s", whole / 60, whole % 60)
}
