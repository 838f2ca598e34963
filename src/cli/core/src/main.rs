/* src/cli/core/src/main.rs */

mod config;
mod media;
mod render;
mod ui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{InputOverrides, ResolvedInputs, load_or_discover, resolve_inputs};

#[derive(Parser)]
#[command(name = "mirror", about = "Patch a captured page snapshot with structured site content", version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Render the patched document to a file or stdout
  Render {
    #[command(flatten)]
    inputs: InputArgs,
    /// Output file (defaults to stdout)
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Run the patch pipeline without writing and report slot warnings
  Check {
    #[command(flatten)]
    inputs: InputArgs,
    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
  },
  /// Resolve a media request path to its local file through the manifest
  Media {
    /// Request path, e.g. /api/media/file/Blood%20Test.webp
    path: String,
    /// Path to mirror.toml (defaults to upward discovery)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Media manifest JSON
    #[arg(long)]
    manifest: Option<PathBuf>,
  },
}

#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
  /// Path to mirror.toml (defaults to upward discovery)
  #[arg(long)]
  config: Option<PathBuf>,
  /// Captured page snapshot
  #[arg(long)]
  snapshot: Option<PathBuf>,
  /// Site content JSON
  #[arg(long)]
  content: Option<PathBuf>,
  /// Media manifest JSON
  #[arg(long)]
  manifest: Option<PathBuf>,
  /// Directory holding guard.js, overrides.css and runtime.js
  #[arg(long)]
  injections: Option<PathBuf>,
  /// Fail when no section container matches the snapshot
  #[arg(long)]
  strict: bool,
}

impl InputArgs {
  fn resolve(self, cwd: &Path, out: Option<PathBuf>) -> Result<ResolvedInputs> {
    let (config, base_dir) = load_or_discover(self.config.as_deref(), cwd)?;
    let overrides = InputOverrides {
      snapshot: self.snapshot,
      content: self.content,
      manifest: self.manifest,
      injections: self.injections,
      out,
      strict: self.strict,
    };
    Ok(resolve_inputs(&config, &base_dir, overrides))
  }
}

fn init_tracing() {
  // RUST_LOG wins; otherwise only warnings reach stderr
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).compact().init();
}

fn run(cli: Cli) -> Result<()> {
  let cwd = std::env::current_dir().context("failed to read current directory")?;
  match cli.command {
    Command::Render { inputs, out } => {
      let inputs = inputs.resolve(&cwd, out)?;
      render::run_render(&inputs)
    }
    Command::Check { inputs, json } => {
      let inputs = inputs.resolve(&cwd, None)?;
      render::run_check(&inputs, json)
    }
    Command::Media { path, config, manifest } => {
      let inputs = InputArgs { config, manifest, ..Default::default() }.resolve(&cwd, None)?;
      media::run_media(&inputs.manifest, &path)
    }
  }
}

fn main() -> ExitCode {
  init_tracing();
  let cli = Cli::parse();
  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      ui::error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
