//! kiln: a build target engine.
//!
//! Targets are named, parameter-free units of work connected by a
//! declarative dependency graph. The engine executes a requested target
//! after every transitively-required dependency, exactly once each, either
//! sequentially or level-parallel across worker threads, and produces a
//! structured timing and error report. Failing targets abort their
//! dependents but still run designated cleanup targets.
//!
//! ```
//! use kiln_lib::Engine;
//!
//! let mut engine = Engine::new();
//! engine.define("greet", || {
//!   println!("hello");
//!   Ok(())
//! })?;
//! let report = engine.run("greet")?;
//! assert_eq!(report.exit_code(), 0);
//! # Ok::<(), kiln_lib::EngineError>(())
//! ```

pub mod engine;
pub mod error;
pub mod execute;
pub mod graph;
pub mod hooks;
pub mod host;
pub mod plan;
pub mod registry;
pub mod report;
pub mod target;

pub use engine::{Engine, LIST_TARGETS_LONG, LIST_TARGETS_SHORT};
pub use error::{BuildFailure, EngineError, FailureKind};
pub use execute::{EngineOptions, ErrorRecord, FAILURE_EXIT_CODE, RunReport, TimingRecord};
pub use hooks::HookKind;
pub use target::{Target, TargetBody, TargetId};
