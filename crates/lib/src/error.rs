//! Error types for the build engine.
//!
//! Two distinct families: [`EngineError`] covers the configuration phase
//! (registration, descriptions, graph edits, name lookups) and is raised to
//! the caller; [`BuildFailure`] is produced by target bodies during
//! execution, caught by the executor, and recorded rather than propagated.

use thiserror::Error;

use crate::hooks::HookKind;

/// Errors raised while configuring or starting a build.
#[derive(Debug, Error)]
pub enum EngineError {
  /// A target with the same case-folded name is already registered.
  #[error("target '{0}' is already defined")]
  DuplicateTarget(String),

  /// `describe` was called twice without an intervening registration.
  #[error("a description is already pending: \"{0}\"")]
  DescriptionAlreadyPending(String),

  /// `run` was invoked while a description had no target to attach to.
  #[error("pending description \"{0}\" was never attached to a target")]
  DanglingDescription(String),

  /// Storing the edge would make the dependency graph cyclic.
  #[error("cyclic dependency between {target} and {dependency}")]
  CyclicDependency { target: String, dependency: String },

  /// Name lookup failed; the message enumerates every registered target.
  #[error("unknown target '{name}'; registered targets: [{}]", .known.join(", "))]
  UnknownTarget { name: String, known: Vec<String> },

  /// A hook was activated without being registered first.
  #[error("no {kind} target named '{name}' is registered")]
  UnknownHook { kind: HookKind, name: String },
}

/// Distinguishes infrastructure failures from test failures.
///
/// Test failures are user-visible build errors but are not forwarded to the
/// CI side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  Build,
  TestFailure,
}

/// A caught failure from a target body.
///
/// Carries the outer message, optional structured sub-causes (each recorded
/// as its own error entry), and optional trace text that lands in the error
/// record when stack traces are enabled.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BuildFailure {
  message: String,
  kind: FailureKind,
  causes: Vec<String>,
  trace: Option<String>,
}

impl BuildFailure {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      kind: FailureKind::Build,
      causes: Vec::new(),
      trace: None,
    }
  }

  /// A failure that is not reported to the CI error channel.
  pub fn test_failure(message: impl Into<String>) -> Self {
    Self {
      kind: FailureKind::TestFailure,
      ..Self::new(message)
    }
  }

  pub fn with_causes(mut self, causes: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.causes = causes.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
    self.trace = Some(trace.into());
    self
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn kind(&self) -> FailureKind {
    self.kind
  }

  pub fn causes(&self) -> &[String] {
    &self.causes
  }

  pub fn trace(&self) -> Option<&str> {
    self.trace.as_deref()
  }
}
