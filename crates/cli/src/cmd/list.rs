//! Implementation of `kiln list`.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use kiln_lib::{Engine, LIST_TARGETS_LONG};

use crate::manifest::BuildFile;
use crate::output::{self, ConsoleLog, OutputFormat};

#[derive(Serialize)]
struct TargetInfo {
  name: String,
  description: Option<String>,
  dependencies: Vec<String>,
}

/// Print the manifest's targets, either through the engine's listing
/// convention or as JSON.
pub fn cmd_list(file: &Path, format: OutputFormat) -> Result<()> {
  let build_file = BuildFile::load(file)?;
  let mut engine = Engine::new().with_log(Arc::new(ConsoleLog));
  build_file.register(&mut engine)?;

  if format.is_json() {
    let registry = engine.registry();
    let targets: Vec<TargetInfo> = registry
      .ids()
      .map(|id| {
        let target = registry.target(id);
        TargetInfo {
          name: target.name().to_string(),
          description: target.description().map(str::to_string),
          dependencies: target
            .dependencies()
            .iter()
            .map(|&dep| registry.target(dep).name().to_string())
            .collect(),
        }
      })
      .collect();
    output::print_json(&targets)?;
  } else {
    engine.run(LIST_TARGETS_LONG)?;
  }
  Ok(())
}
