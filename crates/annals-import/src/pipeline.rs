//! Import / merge sequencing.

use std::{
  io,
  path::{Path, PathBuf},
};

use annals_core::{
  catalog::{NewWorld, WorldCatalogEntry, display_name, generate_world_id},
  chronology::YearIndex,
  model::WorldHeader,
  sources::Sources,
};
use annals_store_sqlite::{Catalog, Phase, PhaseCounts, TableCount, WorldStore};
use annals_xml::{RecordStream, SanitizedDocument, Sanitizer, read_world_header};
use chrono::Utc;

use crate::{Error, Result, Settings};

/// What only the supplementary document provides; listed to the operator
/// when it is absent.
pub const SUPPLEMENTARY_FEATURES: &[&str] = &[
  "landmasses",
  "mountain peaks",
  "structures",
  "site ownership",
  "entity positions",
  "relationships",
  "written content",
  "artifact enrichment",
];

/// Which flow a run performs.
#[derive(Debug, Clone)]
pub enum Mode {
  /// Load a fresh world. The primary document is required.
  Import(Sources),
  /// Apply a supplementary document to a world already in the catalog,
  /// without rereading its primary document.
  Merge {
    world_id:      String,
    store:         PathBuf,
    supplementary: PathBuf,
  },
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct Report {
  pub world:  WorldCatalogEntry,
  pub phases: Vec<PhaseCounts>,
  pub tables: Vec<(&'static str, TableCount)>,
}

impl Report {
  /// Log the final table counts.
  pub fn log(&self) {
    tracing::info!("World {} ({}):", self.world.id, self.world.name);
    for (label, count) in &self.tables {
      tracing::info!("  {label}: {count}");
    }
  }
}

pub struct Pipeline {
  settings: Settings,
  catalog:  Catalog,
}

impl Pipeline {
  /// Prepare the data directory and open the catalog.
  pub async fn open(settings: Settings) -> Result<Self> {
    std::fs::create_dir_all(settings.worlds_dir())?;
    let catalog = Catalog::open(settings.catalog_path()).await?;
    Ok(Self { settings, catalog })
  }

  pub fn catalog(&self) -> &Catalog { &self.catalog }

  pub fn settings(&self) -> &Settings { &self.settings }

  pub async fn run(&self, mode: Mode) -> Result<Report> {
    match mode {
      Mode::Import(sources) => self.import(&sources).await,
      Mode::Merge { world_id, store, supplementary } => {
        self.merge(&world_id, &store, &supplementary).await
      }
    }
  }

  // ── Import ────────────────────────────────────────────────────────────────

  async fn import(&self, sources: &Sources) -> Result<Report> {
    if !sources.primary.is_file() {
      return Err(Error::MissingPrimary(sources.primary.clone()));
    }
    if let Some(plus) = &sources.supplementary
      && !plus.is_file()
    {
      return Err(Error::MissingSupplementary(plus.clone()));
    }

    let primary = self.sanitize(&sources.primary).await?;
    let plus = match &sources.supplementary {
      Some(path) => Some(self.sanitize(path).await?),
      None => None,
    };

    // The supplementary export carries both names; the primary one at most
    // the name.
    let mut header = read_header(primary.path()).await?;
    if let Some(plus) = &plus {
      header = read_header(plus.path()).await?.or(header);
    }

    let world_id = generate_world_id(header.name.as_deref(), Utc::now());
    let db_path = self.settings.world_path(&world_id);
    if db_path.exists() || self.catalog.get(&world_id).await?.is_some() {
      return Err(annals_store_sqlite::Error::DuplicateWorldId(world_id).into());
    }

    tracing::info!(
      "Importing world {} as {world_id}",
      display_name(header.name.as_deref())
    );
    let store = WorldStore::open(&db_path)
      .await?
      .with_report_every(self.settings.report_every);

    store
      .set_world(WorldHeader {
        name:    Some(display_name(header.name.as_deref()).to_owned()),
        altname: header.altname.clone(),
      })
      .await?;

    let mut phases = Vec::new();
    for phase in [
      Phase::Regions,
      Phase::UndergroundRegions,
      Phase::Sites,
      Phase::Artifacts,
      Phase::Entities,
      Phase::HistoricalFigures,
      Phase::Events,
    ] {
      phases.push(store.run(primary.path(), phase).await?);
    }

    match &plus {
      Some(plus) => {
        let index = year_index(primary.path()).await?;
        phases.extend(apply_supplementary(&store, plus.path(), index).await?);
      }
      None => tracing::warn!(
        "No supplementary document; skipping {}",
        SUPPLEMENTARY_FEATURES.join(", ")
      ),
    }

    store.backfill_artifacts().await?;

    let world = self
      .catalog
      .register(NewWorld {
        id: world_id,
        name: header.name,
        altname: header.altname,
        db_path,
        has_supplementary: plus.is_some(),
      })
      .await?;

    let tables = store.table_counts().await?;
    Ok(Report { world, phases, tables })
  }

  // ── Merge ─────────────────────────────────────────────────────────────────

  async fn merge(&self, world_id: &str, store_path: &Path, supplementary: &Path) -> Result<Report> {
    // Every precondition is checked before anything is written.
    let entry = self.catalog.ensure_mergeable(world_id).await?;
    if !store_path.is_file() {
      return Err(Error::MissingStore(store_path.to_path_buf()));
    }
    if !supplementary.is_file() {
      return Err(Error::MissingSupplementary(supplementary.to_path_buf()));
    }
    if store_path != entry.db_path.as_path() {
      tracing::warn!(
        "Merging into {} although the catalog records {} for world {world_id}",
        store_path.display(),
        entry.db_path.display()
      );
    }

    let plus = self.sanitize(supplementary).await?;
    let header = read_header(plus.path()).await?;

    tracing::info!("Merging supplementary data into world {world_id}");
    let store = WorldStore::open(store_path)
      .await?
      .with_report_every(self.settings.report_every);

    store.adopt_names(header.clone()).await?;
    self.catalog.adopt_names(world_id, header).await?;

    let index = store.stored_year_index().await?;
    tracing::info!("Recovered {} event years from the stored events", index.len());

    let phases = apply_supplementary(&store, plus.path(), index).await?;
    store.backfill_artifacts().await?;
    self.catalog.mark_supplementary(world_id).await?;

    let world = self.catalog.require(world_id).await?;
    let tables = store.table_counts().await?;
    Ok(Report { world, phases, tables })
  }

  // ── Catalog operations ────────────────────────────────────────────────────

  /// Remove a world from the catalog together with its store files and any
  /// rendered map.
  pub async fn delete_world(&self, id: &str) -> Result<WorldCatalogEntry> {
    let entry = self.catalog.require(id).await?;
    for path in world_files(&entry) {
      match std::fs::remove_file(&path) {
        Ok(()) => tracing::debug!("removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
      }
    }
    let removed = self.catalog.remove(id).await?;
    tracing::info!("Deleted world {} ({})", removed.id, removed.name);
    Ok(removed)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn sanitize(&self, path: &Path) -> Result<SanitizedDocument> {
    let sanitizer =
      Sanitizer::new(self.settings.source_encoding).with_chunk_size(self.settings.chunk_size);
    let path = path.to_path_buf();
    Ok(tokio::task::spawn_blocking(move || sanitizer.sanitize(&path)).await??)
  }
}

/// Every supplementary-only phase, in dependency order. Shared by import and
/// merge; each phase is overwrite-safe.
async fn apply_supplementary(
  store: &WorldStore,
  plus: &Path,
  index: YearIndex,
) -> Result<Vec<PhaseCounts>> {
  let mut phases = Vec::new();
  for phase in [
    Phase::Landmasses,
    Phase::MountainPeaks,
    Phase::Regions,
    Phase::Sites,
    Phase::Entities,
    Phase::Relationships,
    Phase::IndexedEvents(index),
    Phase::Artifacts,
    Phase::WrittenContent,
  ] {
    phases.push(store.run(plus, phase).await?);
  }
  Ok(phases)
}

/// One streaming pass over the primary document's events, keeping only
/// their years.
async fn year_index(primary: &Path) -> Result<YearIndex> {
  let path = primary.to_path_buf();
  let index = tokio::task::spawn_blocking(move || -> Result<YearIndex> {
    let mut index = YearIndex::new();
    for record in RecordStream::open(&path, "historical_event")? {
      index.observe(&record?);
    }
    Ok(index)
  })
  .await??;
  tracing::info!("Indexed {} event years", index.len());
  Ok(index)
}

async fn read_header(path: &Path) -> Result<WorldHeader> {
  let path = path.to_path_buf();
  Ok(tokio::task::spawn_blocking(move || read_world_header(&path)).await??)
}

/// The store file, its WAL siblings and the rendered map.
fn world_files(entry: &WorldCatalogEntry) -> Vec<PathBuf> {
  let db = &entry.db_path;
  let sibling = |suffix: &str| {
    let mut name = db.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
  };
  vec![
    db.clone(),
    sibling("-wal"),
    sibling("-shm"),
    db.with_file_name(format!("{}_map.png", entry.id)),
  ]
}
