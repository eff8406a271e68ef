//! Console output: the build log sink and formatting helpers.

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use kiln_lib::host::BuildLog;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const ERROR: &str = "✗";
  pub const ARROW: &str = "→";
}

/// Build log that writes styled text to the terminal.
#[derive(Debug, Default)]
pub struct ConsoleLog;

impl BuildLog for ConsoleLog {
  fn log(&self, message: &str) {
    println!("{message}");
  }

  fn trace_error(&self, message: &str) {
    let line = format!("{} {message}", symbols::ERROR);
    eprintln!("{}", line.if_supports_color(Stream::Stderr, |text| text.red()));
  }

  fn trace_line(&self, message: &str) {
    println!("{message}");
  }

  fn trace_header(&self, message: &str) {
    println!("{}", message.if_supports_color(Stream::Stdout, |s| s.bold()));
  }

  fn trace_start_target(&self, name: &str, description: &str, dependencies: &str) {
    let label = if description.is_empty() {
      name.to_string()
    } else {
      format!("{name} ({description})")
    };
    println!(
      "{} {label} {dependencies}",
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.cyan())
    );
  }

  fn trace_end_target(&self, _name: &str) {}
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
