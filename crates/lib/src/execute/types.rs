//! Execution state and run results.

use std::collections::HashSet;
use std::time::Duration;

use serde::Serialize;

use crate::target::TargetId;

/// Exit code reported when a run recorded at least one error.
pub const FAILURE_EXIT_CODE: i32 = 42;

/// Whether the executor honors fail-fast short-circuiting for a target.
///
/// Normal targets respect it; lifecycle hooks must run in the failed state
/// and ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShortCircuit {
  Respect,
  Ignore,
}

/// Engine behavior toggles.
#[derive(Debug, Clone)]
pub struct EngineOptions {
  /// Skip scheduled targets once any error is recorded. Turning this off
  /// selects collect-all-errors: independent subgraphs keep running and
  /// every failure lands in the report.
  pub fail_fast: bool,
  /// Copy trace text from failures into their error records.
  pub print_stack_trace_on_error: bool,
}

impl Default for EngineOptions {
  fn default() -> Self {
    Self {
      fail_fast: true,
      print_stack_trace_on_error: false,
    }
  }
}

/// One recorded failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
  /// Display name of the failing target.
  pub target: String,
  pub message: String,
  /// Trace text, present when stack traces are enabled.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detail: Option<String>,
}

/// Completion-ordered timing entry. Names are normalized.
#[derive(Debug, Clone, Serialize)]
pub struct TimingRecord {
  pub target: String,
  #[serde(serialize_with = "serialize_duration", rename = "seconds")]
  pub duration: Duration,
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  serializer.serialize_f64(duration.as_secs_f64())
}

/// Mutable state shared by workers during a run.
///
/// One mutex in the engine protects the whole struct, so a target's timing
/// entry and its executed-set insertion land under one lock acquisition.
#[derive(Debug, Default)]
pub(crate) struct ExecState {
  pub executed: HashSet<TargetId>,
  pub timings: Vec<(TargetId, Duration)>,
  pub errors: Vec<ErrorRecord>,
}

impl ExecState {
  pub fn reset(&mut self) {
    self.executed.clear();
    self.timings.clear();
    self.errors.clear();
  }
}

/// Outcome of a `run` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  /// The requested root target (or the listing pseudo-target).
  pub target: String,
  pub timings: Vec<TimingRecord>,
  pub errors: Vec<ErrorRecord>,
  #[serde(serialize_with = "serialize_duration", rename = "total_seconds")]
  pub total: Duration,
}

impl RunReport {
  pub fn failed(&self) -> bool {
    !self.errors.is_empty()
  }

  /// 0 on a clean run, 42 if any error was recorded.
  pub fn exit_code(&self) -> i32 {
    if self.failed() { FAILURE_EXIT_CODE } else { 0 }
  }
}
