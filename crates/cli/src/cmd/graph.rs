//! Implementation of `kiln graph`.

use std::path::Path;

use anyhow::Result;

use kiln_lib::Engine;
use kiln_lib::report::render_dependency_graph;

use crate::manifest::BuildFile;

/// Print the dependency tree below `target`, optionally expanding every
/// traversal visit.
pub fn cmd_graph(file: &Path, target: &str, full: bool) -> Result<()> {
  let build_file = BuildFile::load(file)?;
  let mut engine = Engine::new();
  build_file.register(&mut engine)?;

  let registry = engine.registry();
  let root = registry.resolve(target)?;
  print!("{}", render_dependency_graph(registry, root, full));
  Ok(())
}
