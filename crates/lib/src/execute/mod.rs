//! Target execution.
//!
//! `run_single_target` does the per-target work: short-circuit and
//! exec-once checks, start and end trace events, wall-clock timing, and
//! failure capture. The sequential runner walks the DFS order; the parallel
//! runner executes one level at a time through a bounded pool of scoped
//! worker threads, and the scope join is the inter-level barrier.

pub mod types;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

pub use types::{EngineOptions, ErrorRecord, FAILURE_EXIT_CODE, RunReport, TimingRecord};

pub(crate) use types::{ExecState, ShortCircuit};

use crate::engine::Engine;
use crate::error::{BuildFailure, FailureKind};
use crate::plan;
use crate::target::TargetId;

impl Engine {
  /// Run one target: short-circuit and exec-once checks, trace events,
  /// timing and failure capture. Body failures never propagate out of
  /// here; they are recorded and reported.
  pub(crate) fn run_single_target(&self, id: TargetId, short_circuit: ShortCircuit) {
    if short_circuit == ShortCircuit::Respect && self.options.fail_fast && self.has_errors() {
      debug!(
        task = self.registry.target(id).name(),
        "skipping target after earlier failure"
      );
      return;
    }
    if self.state.lock().unwrap().executed.contains(&id) {
      return;
    }

    let target = self.registry.target(id);
    self.log.trace_start_target(
      target.name(),
      target.description().unwrap_or(""),
      &self.registry.pretty_dependencies(id),
    );

    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| target.invoke()));
    let elapsed = started.elapsed();
    let result =
      outcome.unwrap_or_else(|payload| Err(BuildFailure::new(panic_message(payload.as_ref()))));

    match result {
      Ok(()) => {
        let mut state = self.state.lock().unwrap();
        state.timings.push((id, elapsed));
        state.executed.insert(id);
        drop(state);
        self.log.trace_end_target(target.name());
      }
      Err(failure) => {
        self.log.close_all_open_tags();
        self.record_failure(id, elapsed, &failure);
        self.log.trace_error(failure.message());
        if failure.kind() != FailureKind::TestFailure {
          self.ci.send_ci_error(failure.message());
        }
      }
    }
  }

  /// Append the failure's error records and the timing entry under one
  /// lock acquisition.
  fn record_failure(&self, id: TargetId, elapsed: Duration, failure: &BuildFailure) {
    let name = self.registry.target(id).name().to_string();
    let detail = if self.options.print_stack_trace_on_error {
      failure.trace().map(str::to_string)
    } else {
      None
    };

    let mut state = self.state.lock().unwrap();
    for cause in failure.causes() {
      state.errors.push(ErrorRecord {
        target: name.clone(),
        message: cause.clone(),
        detail: None,
      });
    }
    state.errors.push(ErrorRecord {
      target: name,
      message: failure.message().to_string(),
      detail,
    });
    state.timings.push((id, elapsed));
    state.executed.insert(id);
  }

  /// Depth-first sequential execution of the root's dependency closure.
  pub(crate) fn run_sequential(&self, root: TargetId) {
    for id in plan::sequential_order(&self.registry, root) {
      self.run_single_target(id, ShortCircuit::Respect);
    }
  }

  /// Execute one level through a bounded worker pool. Targets within the
  /// level run concurrently; returning from the scope is the barrier.
  pub(crate) fn run_level(&self, level: &[TargetId], jobs: usize) {
    if level.len() <= 1 || jobs <= 1 {
      for &id in level {
        self.run_single_target(id, ShortCircuit::Respect);
      }
      return;
    }

    let workers = jobs.min(level.len());
    let queue = Mutex::new(level.iter().copied().collect::<VecDeque<_>>());
    debug!(workers, targets = level.len(), "executing level");

    thread::scope(|scope| {
      for _ in 0..workers {
        scope.spawn(|| {
          while let Some(id) = pop_next(&queue) {
            self.run_single_target(id, ShortCircuit::Respect);
          }
        });
      }
    });
  }

  pub(crate) fn has_errors(&self) -> bool {
    !self.state.lock().unwrap().errors.is_empty()
  }
}

fn pop_next(queue: &Mutex<VecDeque<TargetId>>) -> Option<TargetId> {
  queue.lock().unwrap().pop_front()
}

/// Best-effort text for a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(text) = payload.downcast_ref::<&str>() {
    (*text).to_string()
  } else if let Some(text) = payload.downcast_ref::<String>() {
    text.clone()
  } else {
    "target body panicked".to_string()
  }
}
