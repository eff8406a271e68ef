//! TOML build manifests.
//!
//! A manifest declares targets whose bodies are shell command lists:
//!
//! ```toml
//! [targets.build]
//! description = "Compile the tree"
//! deps = ["fmt"]
//! run = ["cc -o app main.c"]
//!
//! [targets.cleanup]
//! hook = "final"
//! activated = true
//! run = ["rm -rf tmp"]
//! ```
//!
//! Targets are registered first and edges second, so declaration order
//! never matters. Hook targets (`hook = "on-failure" | "final"`) are
//! additionally placed in the matching lifecycle registry and armed when
//! `activated` is set.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;

use kiln_lib::{BuildFailure, Engine, HookKind};

/// A parsed `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct BuildFile {
  #[serde(default)]
  targets: BTreeMap<String, TargetSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetSpec {
  #[serde(default)]
  description: Option<String>,

  /// Names of targets that must complete first, in order.
  #[serde(default)]
  deps: Vec<String>,

  /// Shell commands executed in order; the first non-zero exit fails the
  /// target.
  #[serde(default)]
  run: Vec<String>,

  #[serde(default)]
  hook: Option<HookSpec>,

  #[serde(default)]
  activated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum HookSpec {
  #[serde(rename = "on-failure")]
  OnFailure,
  #[serde(rename = "final")]
  Final,
}

impl BuildFile {
  pub fn load(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("cannot read build manifest {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid build manifest {}", path.display()))
  }

  /// Register every target, hook, and dependency edge into `engine`.
  pub fn register(&self, engine: &mut Engine) -> Result<()> {
    for (name, spec) in &self.targets {
      if let Some(description) = &spec.description {
        engine.describe(description)?;
      }
      let commands = spec.run.clone();
      let body = move || run_commands(&commands);

      match spec.hook {
        Some(HookSpec::OnFailure) => {
          engine.register_build_failure_target(name, body)?;
          if spec.activated {
            engine.activate(HookKind::BuildFailure, name)?;
          }
        }
        Some(HookSpec::Final) => {
          engine.register_final_target(name, body)?;
          if spec.activated {
            engine.activate(HookKind::Final, name)?;
          }
        }
        None => {
          engine.define(name, body)?;
        }
      }
    }

    for (name, spec) in &self.targets {
      for dep in &spec.deps {
        engine.depend_on(name, dep)?;
      }
    }
    Ok(())
  }
}

/// Run one target's commands through the platform shell. The engine
/// attributes the failure to the target, so messages name the command only.
fn run_commands(commands: &[String]) -> Result<(), BuildFailure> {
  for command in commands {
    let status = shell(command)
      .status()
      .map_err(|err| BuildFailure::new(format!("cannot spawn '{command}': {err}")))?;
    if !status.success() {
      return Err(BuildFailure::new(format!(
        "command '{command}' exited with {status}"
      )));
    }
  }
  Ok(())
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
  let mut cmd = Command::new("sh");
  cmd.arg("-c").arg(command);
  cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
  let mut cmd = Command::new("cmd");
  cmd.arg("/C").arg(command);
  cmd
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_manifest_parses() {
    let file: BuildFile = toml::from_str(
      r#"
      [targets.build]
      run = ["echo hi"]
      "#,
    )
    .unwrap();
    assert_eq!(file.targets.len(), 1);
    assert_eq!(file.targets["build"].run, ["echo hi"]);
  }

  #[test]
  fn hooks_and_descriptions_parse() {
    let file: BuildFile = toml::from_str(
      r#"
      [targets.cleanup]
      description = "Remove scratch files"
      hook = "final"
      activated = true

      [targets.report]
      hook = "on-failure"
      "#,
    )
    .unwrap();
    assert_eq!(file.targets["cleanup"].hook, Some(HookSpec::Final));
    assert!(file.targets["cleanup"].activated);
    assert_eq!(file.targets["report"].hook, Some(HookSpec::OnFailure));
    assert!(!file.targets["report"].activated);
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let result: std::result::Result<BuildFile, _> = toml::from_str(
      r#"
      [targets.build]
      comands = ["typo"]
      "#,
    );
    assert!(result.is_err());
  }

  #[test]
  fn registration_wires_targets_edges_and_descriptions() {
    let file: BuildFile = toml::from_str(
      r#"
      [targets.build]
      description = "Compile"
      deps = ["fmt"]

      [targets.fmt]
      "#,
    )
    .unwrap();

    let mut engine = Engine::new();
    file.register(&mut engine).unwrap();

    let registry = engine.registry();
    let build = registry.resolve("build").unwrap();
    assert_eq!(registry.target(build).description(), Some("Compile"));
    let deps: Vec<&str> = registry
      .target(build)
      .dependencies()
      .iter()
      .map(|&dep| registry.target(dep).name())
      .collect();
    assert_eq!(deps, ["fmt"]);
  }

  #[test]
  fn dependency_cycles_in_the_manifest_are_reported() {
    let file: BuildFile = toml::from_str(
      r#"
      [targets.a]
      deps = ["b"]

      [targets.b]
      deps = ["a"]
      "#,
    )
    .unwrap();

    let mut engine = Engine::new();
    let err = file.register(&mut engine).unwrap_err();
    assert!(err.to_string().contains("cyclic dependency"));
  }

  #[cfg(unix)]
  #[test]
  fn failing_commands_become_build_failures() {
    let err = run_commands(&["exit 3".to_string()]).unwrap_err();
    assert!(err.message().contains("exit 3"));
  }

  #[cfg(unix)]
  #[test]
  fn successful_commands_pass() {
    assert!(run_commands(&["true".to_string()]).is_ok());
  }
}
