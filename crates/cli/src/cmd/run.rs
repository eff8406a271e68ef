//! Implementation of `kiln run`.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use kiln_lib::Engine;
use kiln_lib::host::{PARAM_PARALLEL_JOBS, PARAM_SINGLE_TARGET, StaticParams};

use crate::manifest::BuildFile;
use crate::output::ConsoleLog;

/// Execute `target` from the manifest at `file`.
///
/// The process exits with the report's code: 0 on a clean build, 42 when
/// any target failed. Configuration problems (bad manifest, unknown
/// target, cycles) surface as errors and exit 1.
pub fn cmd_run(file: &Path, target: &str, jobs: usize, single_target: bool) -> Result<ExitCode> {
  let build_file = BuildFile::load(file)?;

  let mut params = StaticParams::new().set(PARAM_PARALLEL_JOBS, jobs.to_string());
  if single_target {
    params = params.flag(PARAM_SINGLE_TARGET);
  }

  let mut engine = Engine::new()
    .with_log(Arc::new(ConsoleLog))
    .with_params(Arc::new(params));
  build_file
    .register(&mut engine)
    .with_context(|| format!("invalid build manifest {}", file.display()))?;

  let report = engine
    .run(target)
    .with_context(|| format!("cannot run '{target}'"))?;

  let code = u8::try_from(report.exit_code()).unwrap_or(1);
  Ok(ExitCode::from(code))
}
