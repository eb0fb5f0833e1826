//! `annals`: load world legends exports into SQLite.
//!
//! # Usage
//!
//! ```text
//! annals import legends.xml [legends_plus.xml]
//! annals merge <world-id> data/worlds/<world-id>.db legends_plus.xml
//! annals worlds
//! annals switch <world-id>
//! annals delete <world-id>
//! ```
//!
//! Settings come from `annals.toml` (or `--config`) and `ANNALS_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use annals_core::sources::Sources;
use annals_import::{Mode, Pipeline, Settings};
use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "annals", version, about = "Load world legends exports into SQLite")]
struct Cli {
  /// Path to a TOML settings file.
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Abort the run after this many seconds.
  #[arg(long, value_name = "SECS", global = true)]
  timeout: Option<u64>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Import a fresh world.
  Import {
    /// The legends export.
    primary:       PathBuf,
    /// The richer supplementary export, if available.
    supplementary: Option<PathBuf>,
  },
  /// Add supplementary data to a world that was imported without it.
  Merge {
    world_id:      String,
    store:         PathBuf,
    supplementary: PathBuf,
  },
  /// List known worlds, newest first.
  Worlds,
  /// Make a world the current one.
  Switch { world_id: String },
  /// Remove a world and its files.
  Delete { world_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;

  match cli.timeout {
    Some(secs) => tokio::time::timeout(Duration::from_secs(secs), execute(cli.command, settings))
      .await
      .map_err(|_| {
        anyhow::anyhow!("timed out after {secs}s; the partially imported world should be discarded")
      })?,
    None => execute(cli.command, settings).await,
  }
}

async fn execute(command: Command, settings: Settings) -> anyhow::Result<()> {
  let pipeline = Pipeline::open(settings)
    .await
    .context("failed to open the catalog")?;

  match command {
    Command::Import { primary, supplementary } => {
      let report = pipeline
        .run(Mode::Import(Sources::new(primary, supplementary)))
        .await
        .context("import failed")?;
      report.log();
      println!("Imported world {} ({})", report.world.id, report.world.name);
    }

    Command::Merge { world_id, store, supplementary } => {
      let report = pipeline
        .run(Mode::Merge { world_id: world_id.clone(), store, supplementary })
        .await
        .with_context(|| format!("merge into world {world_id} failed"))?;
      report.log();
      println!("Merged supplementary data into world {}", report.world.id);
    }

    Command::Worlds => {
      let worlds = pipeline.catalog().list().await?;
      if worlds.is_empty() {
        println!("No worlds imported yet.");
      }
      for w in worlds {
        let marker = if w.is_current { '*' } else { ' ' };
        let plus = if w.has_supplementary { " +plus" } else { "" };
        let map = if w.has_map { " +map" } else { "" };
        let alt = w.altname.as_deref().map(|a| format!(" \"{a}\"")).unwrap_or_default();
        println!(
          "{marker} {}  {}{alt}  {}{plus}{map}",
          w.id,
          w.name,
          w.created_at.format("%Y-%m-%d %H:%M")
        );
      }
    }

    Command::Switch { world_id } => {
      let world = pipeline
        .catalog()
        .switch(&world_id)
        .await
        .with_context(|| format!("cannot switch to {world_id}"))?;
      println!("Current world: {} ({})", world.id, world.name);
    }

    Command::Delete { world_id } => {
      let world = pipeline
        .delete_world(&world_id)
        .await
        .with_context(|| format!("cannot delete {world_id}"))?;
      println!("Deleted world {} ({})", world.id, world.name);
    }
  }

  Ok(())
}
