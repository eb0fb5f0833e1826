//! [`WorldStore`]: one world's relational store.

use std::path::Path;

use annals_core::{catalog::DEFAULT_WORLD_NAME, chronology::YearIndex, model::WorldHeader};
use annals_xml::RecordStream;
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  phase::{Phase, PhaseCounts},
  reconcile,
  schema::{COUNTED_TABLES, WORLD_SCHEMA},
  stats::{TableCount, count_rows},
  write,
};

/// Progress cadence used when none is configured.
pub const DEFAULT_REPORT_EVERY: u64 = 10_000;

/// The tables of one world, backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct WorldStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  report_every:    u64,
}

impl WorldStore {
  /// Open (or create) a world store at `path` and initialise its schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, report_every: DEFAULT_REPORT_EVERY };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, report_every: DEFAULT_REPORT_EVERY };
    store.init_schema().await?;
    Ok(store)
  }

  /// Log progress every `n` records within a phase; `0` disables it.
  pub fn with_report_every(mut self, n: u64) -> Self {
    self.report_every = n;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(WORLD_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── World row ─────────────────────────────────────────────────────────────

  /// Write the singleton world row, replacing any previous one.
  pub async fn set_world(&self, header: WorldHeader) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        write::set_world(conn, &header)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Take the world's names from a later source without overwriting names
  /// that are already meaningful.
  pub async fn adopt_names(&self, header: WorldHeader) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        write::adopt_world_names(conn, &header, DEFAULT_WORLD_NAME)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn world(&self) -> Result<WorldHeader> {
    let header = self
      .conn
      .call(|conn| {
        let header = conn
          .query_row("SELECT name, altname FROM world WHERE id = 1", [], |r| {
            Ok(WorldHeader { name: r.get(0)?, altname: r.get(1)? })
          })
          .optional()?;
        Ok(header.unwrap_or_default())
      })
      .await?;
    Ok(header)
  }

  // ── Phases ────────────────────────────────────────────────────────────────

  /// Stream every record `phase` consumes from `doc` and write it, inside a
  /// single transaction that commits when the pass completes.
  ///
  /// A document error mid-pass rolls back this phase only; phases that ran
  /// before it stay committed.
  pub async fn run(&self, doc: &Path, phase: Phase) -> Result<PhaseCounts> {
    let label = phase.label();
    tracing::info!("Importing {label} from {}", doc.display());

    let stream = RecordStream::open(doc, phase.tag())?;
    let report_every = self.report_every;

    let counts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut counts = PhaseCounts::new(label);
        for record in stream {
          let record = record.map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;
          phase.apply(&tx, &record, &mut counts)?;
          counts.records += 1;
          if report_every > 0 && counts.records % report_every == 0 {
            tracing::info!("  {} {label} so far", counts.records);
          }
        }
        tx.commit()?;
        Ok(counts)
      })
      .await?;

    tracing::info!("{counts}");
    Ok(counts)
  }

  // ── Reconciliation ────────────────────────────────────────────────────────

  /// Event id → year for every stored event that has a year.
  pub async fn stored_year_index(&self) -> Result<YearIndex> {
    let index = self
      .conn
      .call(|conn| Ok(reconcile::stored_year_index(conn)?))
      .await?;
    Ok(index)
  }

  /// Recompute artifact creators and sites from creation events. Returns
  /// the number of artifacts that have a creation event.
  pub async fn backfill_artifacts(&self) -> Result<usize> {
    tracing::info!("Backfilling artifact creators and sites");
    let n = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let n = reconcile::backfill_artifacts(&tx)?;
        tx.commit()?;
        Ok(n)
      })
      .await?;
    tracing::info!("Backfilled {n} artifacts");
    Ok(n)
  }

  // ── Statistics ────────────────────────────────────────────────────────────

  /// Row counts for the headline tables, each counted independently.
  pub async fn table_counts(&self) -> Result<Vec<(&'static str, TableCount)>> {
    let counts = self
      .conn
      .call(|conn| {
        Ok(
          COUNTED_TABLES
            .iter()
            .map(|(table, label)| (*label, count_rows(conn, table)))
            .collect(),
        )
      })
      .await?;
    Ok(counts)
  }
}
