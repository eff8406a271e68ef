//! The engine value and the top-level run driver.
//!
//! All formerly-global build state (target registry, execution state,
//! lifecycle tables) lives in one [`Engine`] value. `reset` reverts it to
//! empty; constructing a fresh engine is equivalent.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{BuildFailure, EngineError};
use crate::execute::{EngineOptions, ExecState, RunReport, ShortCircuit, TimingRecord};
use crate::graph;
use crate::hooks::{HookKind, Hooks};
use crate::host::{
  BuildLog, BuildParams, CiNotifier, EnvParams, NoopCi, NoopReaper, PARAM_LIST,
  PARAM_PARALLEL_JOBS, PARAM_SINGLE_TARGET, ProcessReaper, TracingLog,
};
use crate::plan;
use crate::registry::{Registry, normalize};
use crate::report;
use crate::target::TargetId;

/// Root names that make [`Engine::run`] print the target list and return.
pub const LIST_TARGETS_LONG: &str = "--listTargets";
pub const LIST_TARGETS_SHORT: &str = "-lt";

/// A build engine: target registry, dependency graph, lifecycle hooks, and
/// the execution state of the current run.
///
/// Targets and edges are registered up front; [`run`](Engine::run) then
/// derives an order, executes it, dispatches lifecycle hooks, and emits the
/// build-time summary. The registry is never mutated during execution, so
/// `run` borrows the engine shared and worker threads read it freely.
pub struct Engine {
  pub(crate) registry: Registry,
  pub(crate) hooks: Hooks,
  pub(crate) state: Mutex<ExecState>,
  pub(crate) options: EngineOptions,
  pub(crate) log: Arc<dyn BuildLog>,
  pub(crate) ci: Arc<dyn CiNotifier>,
  pub(crate) reaper: Arc<dyn ProcessReaper>,
  pub(crate) params: Arc<dyn BuildParams>,
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}

impl Engine {
  /// An engine wired to the default collaborators: tracing-backed log,
  /// no-op CI notifier and reaper, environment-backed parameters.
  pub fn new() -> Self {
    Self {
      registry: Registry::new(),
      hooks: Hooks::default(),
      state: Mutex::new(ExecState::default()),
      options: EngineOptions::default(),
      log: Arc::new(TracingLog),
      ci: Arc::new(NoopCi),
      reaper: Arc::new(NoopReaper),
      params: Arc::new(EnvParams),
    }
  }

  pub fn with_log(mut self, log: Arc<dyn BuildLog>) -> Self {
    self.log = log;
    self
  }

  pub fn with_ci_notifier(mut self, ci: Arc<dyn CiNotifier>) -> Self {
    self.ci = ci;
    self
  }

  pub fn with_reaper(mut self, reaper: Arc<dyn ProcessReaper>) -> Self {
    self.reaper = reaper;
    self
  }

  pub fn with_params(mut self, params: Arc<dyn BuildParams>) -> Self {
    self.params = params;
    self
  }

  pub fn with_options(mut self, options: EngineOptions) -> Self {
    self.options = options;
    self
  }

  /// Register a target. Consumes any pending description.
  pub fn define<F>(&mut self, name: &str, body: F) -> Result<TargetId, EngineError>
  where
    F: Fn() -> Result<(), BuildFailure> + Send + Sync + 'static,
  {
    self.registry.define(name, Box::new(body))
  }

  /// Attach a description to the next registered target.
  pub fn describe(&mut self, text: &str) -> Result<(), EngineError> {
    self.registry.describe(text)
  }

  /// `target` additionally depends on `dependency`, appended after the
  /// current dependencies.
  pub fn depend_on(&mut self, target: &str, dependency: &str) -> Result<(), EngineError> {
    graph::depend_on(&mut self.registry, target, dependency)
  }

  /// Like [`depend_on`](Self::depend_on), but the new dependency runs
  /// before the existing ones.
  pub fn depend_on_first(&mut self, target: &str, dependency: &str) -> Result<(), EngineError> {
    graph::depend_on_first(&mut self.registry, target, dependency)
  }

  /// Register a target that runs during teardown when the build failed.
  /// Inactive until [`activate`](Self::activate)d.
  pub fn register_build_failure_target<F>(
    &mut self,
    name: &str,
    body: F,
  ) -> Result<TargetId, EngineError>
  where
    F: Fn() -> Result<(), BuildFailure> + Send + Sync + 'static,
  {
    let id = self.define(name, body)?;
    self
      .hooks
      .register(HookKind::BuildFailure, self.registry.target(id).normalized().to_string());
    Ok(id)
  }

  /// Register a target that runs during every teardown. Inactive until
  /// [`activate`](Self::activate)d.
  pub fn register_final_target<F>(&mut self, name: &str, body: F) -> Result<TargetId, EngineError>
  where
    F: Fn() -> Result<(), BuildFailure> + Send + Sync + 'static,
  {
    let id = self.define(name, body)?;
    self
      .hooks
      .register(HookKind::Final, self.registry.target(id).normalized().to_string());
    Ok(id)
  }

  /// Arm a registered hook; hooks that were never activated do not fire.
  pub fn activate(&mut self, kind: HookKind, name: &str) -> Result<(), EngineError> {
    self.hooks.activate(kind, name, &normalize(name))
  }

  /// Clear the registry, the execution state, and both hook registries.
  pub fn reset(&mut self) {
    self.registry.reset();
    self.hooks.reset();
    self.state.lock().unwrap().reset();
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  /// Normalized names of targets whose bodies ran this invocation, sorted.
  pub fn executed_targets(&self) -> Vec<String> {
    let state = self.state.lock().unwrap();
    let mut names: Vec<String> = state
      .executed
      .iter()
      .map(|&id| self.registry.target(id).normalized().to_string())
      .collect();
    names.sort();
    names
  }

  /// Whether the host put the build in list mode.
  pub fn list_mode(&self) -> bool {
    self.params.has_build_param(PARAM_LIST)
  }

  /// Execute `target_name` after its transitive dependencies.
  ///
  /// The special names `--listTargets` and `-lt` print the target list and
  /// return immediately. Teardown (lifecycle hooks, the process reaper,
  /// the build-time summary) runs even when the root cannot be resolved.
  /// Body failures never surface here; they are recorded in the returned
  /// report, whose exit code is 42 when any error was recorded.
  pub fn run(&self, target_name: &str) -> Result<RunReport, EngineError> {
    if target_name == LIST_TARGETS_LONG || target_name == LIST_TARGETS_SHORT {
      self.log.log(&report::render_target_list(&self.registry));
      return Ok(self.build_report(target_name, Duration::ZERO));
    }
    if let Some(pending) = self.registry.pending_description() {
      return Err(EngineError::DanglingDescription(pending.to_string()));
    }

    let started = Instant::now();
    let jobs = self
      .params
      .environ_var_or_default(PARAM_PARALLEL_JOBS, "1")
      .parse::<usize>()
      .unwrap_or(1)
      .max(1);
    info!(root = target_name, jobs, "starting build");
    self.log.trace_header(&format!("Building '{target_name}'"));

    let main_result = self.execute_root(target_name, jobs);

    // Teardown runs regardless of how the main phase ended.
    if self.has_errors() {
      self.run_hooks(HookKind::BuildFailure);
    }
    self.run_hooks(HookKind::Final);
    self.reaper.kill_all_created_processes();

    let run_report = self.build_report(target_name, started.elapsed());
    self.log.log(&report::render_time_summary(
      &run_report.timings,
      &run_report.errors,
      run_report.total,
    ));

    main_result?;
    Ok(run_report)
  }

  fn execute_root(&self, target_name: &str, jobs: usize) -> Result<(), EngineError> {
    let root = self.registry.resolve(target_name)?;

    if self.params.has_build_param(PARAM_SINGLE_TARGET) {
      self.run_single_target(root, ShortCircuit::Respect);
    } else if jobs > 1 {
      for level in plan::parallel_levels(&self.registry, root) {
        self.run_level(&level, jobs);
      }
    } else {
      self
        .log
        .log(&report::render_dependency_graph(&self.registry, root, false));
      self.run_sequential(root);
    }
    Ok(())
  }

  fn run_hooks(&self, kind: HookKind) {
    for name in self.hooks.activated(kind) {
      // Hook registration defines the target, so the lookup cannot miss.
      if let Ok(id) = self.registry.resolve(name) {
        self.run_single_target(id, ShortCircuit::Ignore);
      }
    }
  }

  fn build_report(&self, target_name: &str, total: Duration) -> RunReport {
    let state = self.state.lock().unwrap();
    let timings = state
      .timings
      .iter()
      .map(|&(id, duration)| TimingRecord {
        target: self.registry.target(id).normalized().to_string(),
        duration,
      })
      .collect();
    RunReport {
      target: target_name.to_string(),
      timings,
      errors: state.errors.clone(),
      total,
    }
  }
}
