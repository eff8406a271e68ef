//! Host collaborator interfaces.
//!
//! The engine consumes these without implementing them: a text sink for
//! build output and per-target trace events, the CI error side channel, the
//! child-process reaper invoked at teardown, and build parameter lookup.
//! The defaults here are enough for embedding the engine directly; hosts
//! with their own infrastructure substitute their implementations.

use std::collections::HashMap;
use std::env;

use tracing::{error, info};

/// Name of the parameter selecting the worker pool size.
pub const PARAM_PARALLEL_JOBS: &str = "parallel-jobs";
/// Presence flag: run only the named target, skipping its dependencies.
pub const PARAM_SINGLE_TARGET: &str = "single-target";
/// Presence flag: the host is in list mode.
pub const PARAM_LIST: &str = "list";

/// Text sink for build output and per-target trace events.
///
/// `close_all_open_tags` flushes any open scopes in structured log
/// backends; the executor calls it before recording an error.
pub trait BuildLog: Send + Sync {
  fn log(&self, message: &str);

  /// Lazily-formatted variant of [`log`](Self::log).
  fn log_with(&self, message: &dyn Fn() -> String) {
    self.log(&message());
  }

  /// Lazily-formatted trace emission. No-op unless the sink traces.
  fn trace_with(&self, _message: &dyn Fn() -> String) {}

  fn trace_error(&self, message: &str);
  fn trace_line(&self, message: &str);
  fn trace_header(&self, message: &str);
  fn trace_start_target(&self, name: &str, description: &str, dependencies: &str);
  fn trace_end_target(&self, name: &str);

  fn close_all_open_tags(&self) {}
}

/// Side channel for CI infrastructure failures. Test failures are kept off
/// this channel by the executor.
pub trait CiNotifier: Send + Sync {
  fn send_ci_error(&self, message: &str);
}

/// Cleans up child processes spawned by target bodies. Called exactly once
/// during teardown.
pub trait ProcessReaper: Send + Sync {
  fn kill_all_created_processes(&self);
}

/// String-keyed build parameter lookup.
pub trait BuildParams: Send + Sync {
  fn has_build_param(&self, name: &str) -> bool;
  fn environ_var_or_default(&self, name: &str, default: &str) -> String;
}

/// Default sink: forwards everything to `tracing` events.
#[derive(Debug, Default)]
pub struct TracingLog;

impl BuildLog for TracingLog {
  fn log(&self, message: &str) {
    info!("{message}");
  }

  fn trace_error(&self, message: &str) {
    error!("{message}");
  }

  fn trace_line(&self, message: &str) {
    info!("{message}");
  }

  fn trace_header(&self, message: &str) {
    info!("{message}");
  }

  fn trace_start_target(&self, name: &str, description: &str, dependencies: &str) {
    info!(task = name, description, dependencies, "starting target");
  }

  fn trace_end_target(&self, name: &str) {
    info!(task = name, "finished target");
  }
}

/// CI notifier that drops messages; hosts without a CI integration use it.
#[derive(Debug, Default)]
pub struct NoopCi;

impl CiNotifier for NoopCi {
  fn send_ci_error(&self, _message: &str) {}
}

/// Reaper for hosts whose bodies wait on their children synchronously.
#[derive(Debug, Default)]
pub struct NoopReaper;

impl ProcessReaper for NoopReaper {
  fn kill_all_created_processes(&self) {}
}

/// Parameter lookup backed by the process environment.
///
/// `parallel-jobs` maps to `KILN_PARALLEL_JOBS`: uppercase, `-` becomes
/// `_`, `KILN_` prefix.
#[derive(Debug, Default)]
pub struct EnvParams;

impl EnvParams {
  fn var_name(name: &str) -> String {
    let mangled = name.to_uppercase().replace('-', "_");
    format!("KILN_{mangled}")
  }
}

impl BuildParams for EnvParams {
  fn has_build_param(&self, name: &str) -> bool {
    env::var_os(Self::var_name(name)).is_some()
  }

  fn environ_var_or_default(&self, name: &str, default: &str) -> String {
    env::var(Self::var_name(name)).unwrap_or_else(|_| default.to_string())
  }
}

/// In-memory parameter map; presence of a key is the flag form.
#[derive(Debug, Default)]
pub struct StaticParams {
  values: HashMap<String, String>,
}

impl StaticParams {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
    self.values.insert(name.to_string(), value.into());
    self
  }

  pub fn flag(self, name: &str) -> Self {
    self.set(name, "true")
  }
}

impl BuildParams for StaticParams {
  fn has_build_param(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  fn environ_var_or_default(&self, name: &str, default: &str) -> String {
    self
      .values
      .get(name)
      .cloned()
      .unwrap_or_else(|| default.to_string())
  }
}
