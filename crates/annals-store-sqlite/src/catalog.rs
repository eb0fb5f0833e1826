//! [`Catalog`]: the registry of loaded worlds.
//!
//! A small store separate from the world stores, holding one row per world.
//! At most one row is current; registering a world makes it current.

use std::path::Path;

use annals_core::{
  catalog::{DEFAULT_WORLD_NAME, NewWorld, WorldCatalogEntry, display_name},
  model::WorldHeader,
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};

use crate::{
  Error, Result,
  encode::{ENTRY_COLUMNS, RawCatalogEntry, encode_dt, encode_path},
  schema::{CATALOG_COLUMNS, CATALOG_INDEXES, CATALOG_SCHEMA},
};

#[derive(Clone)]
pub struct Catalog {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl Catalog {
  /// Open (or create) the catalog at `path`, migrating an older shape.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let catalog = Self { conn };
    catalog.migrate().await?;
    Ok(catalog)
  }

  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let catalog = Self { conn };
    catalog.migrate().await?;
    Ok(catalog)
  }

  /// Create the table if absent and append any column it lacks. Safe to run
  /// against a catalog of any age, including one already current.
  async fn migrate(&self) -> Result<()> {
    let added = self
      .conn
      .call(|conn| {
        conn.execute_batch(CATALOG_SCHEMA)?;

        let existing: Vec<String> = conn
          .prepare("SELECT name FROM pragma_table_info('worlds')")?
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<_>>()?;

        let mut added = Vec::new();
        for (column, decl) in CATALOG_COLUMNS {
          if !existing.iter().any(|c| c == column) {
            conn.execute_batch(&format!("ALTER TABLE worlds ADD COLUMN {column} {decl}"))?;
            added.push(*column);
          }
        }

        conn.execute_batch(CATALOG_INDEXES)?;
        Ok(added)
      })
      .await?;

    if !added.is_empty() {
      tracing::debug!("catalog migrated, added columns: {}", added.join(", "));
    }
    Ok(())
  }

  /// Insert `world` as the current world, clearing the previous current one
  /// in the same transaction.
  pub async fn register(&self, world: NewWorld) -> Result<WorldCatalogEntry> {
    let entry = WorldCatalogEntry {
      id:                world.id,
      name:              display_name(world.name.as_deref()).to_owned(),
      altname:           world.altname,
      db_path:           world.db_path,
      is_current:        true,
      has_supplementary: world.has_supplementary,
      has_map:           false,
      created_at:        Utc::now(),
    };

    let row = (
      entry.id.clone(),
      entry.name.clone(),
      entry.altname.clone(),
      encode_path(&entry.db_path),
      entry.has_supplementary,
      encode_dt(entry.created_at),
    );

    let inserted = self
      .conn
      .call(move |conn| {
        let (id, name, altname, db_path, has_supplementary, created_at) = row;
        let tx = conn.transaction()?;
        tx.execute("UPDATE worlds SET is_current = 0 WHERE is_current = 1", [])?;
        let result = tx.execute(
          "INSERT INTO worlds
             (id, name, altname, db_path, is_current, has_supplementary, has_map, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5, 0, ?6)",
          params![id, name, altname, db_path, has_supplementary, created_at],
        );
        match result {
          Ok(_) => {
            tx.commit()?;
            Ok(true)
          }
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateWorldId(entry.id));
    }
    tracing::info!("Registered world {} ({})", entry.id, entry.name);
    Ok(entry)
  }

  pub async fn get(&self, id: &str) -> Result<Option<WorldCatalogEntry>> {
    let id = id.to_owned();
    let raw = self.conn.call(move |conn| Ok(fetch(conn, &id)?)).await?;
    raw.map(RawCatalogEntry::into_entry).transpose()
  }

  /// Like [`Catalog::get`], but a missing world is an error.
  pub async fn require(&self, id: &str) -> Result<WorldCatalogEntry> {
    self.get(id).await?.ok_or_else(|| Error::WorldNotFound(id.to_owned()))
  }

  pub async fn current(&self) -> Result<Option<WorldCatalogEntry>> {
    let raw = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ENTRY_COLUMNS} FROM worlds WHERE is_current = 1"),
              [],
              RawCatalogEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawCatalogEntry::into_entry).transpose()
  }

  /// Every world, newest first.
  pub async fn list(&self) -> Result<Vec<WorldCatalogEntry>> {
    let raws: Vec<RawCatalogEntry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ENTRY_COLUMNS} FROM worlds ORDER BY created_at DESC, id"
        ))?;
        let rows = stmt
          .query_map([], RawCatalogEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawCatalogEntry::into_entry).collect()
  }

  /// Make `id` the current world.
  pub async fn switch(&self, id: &str) -> Result<WorldCatalogEntry> {
    let owned = id.to_owned();
    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch(&tx, &owned)?.is_none() {
          return Ok(false);
        }
        tx.execute("UPDATE worlds SET is_current = 0 WHERE is_current = 1", [])?;
        tx.execute("UPDATE worlds SET is_current = 1 WHERE id = ?1", params![owned])?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::WorldNotFound(id.to_owned()));
    }
    self.require(id).await
  }

  /// Remove `id` from the catalog and return what it was. If it was
  /// current, the newest remaining world becomes current.
  pub async fn remove(&self, id: &str) -> Result<WorldCatalogEntry> {
    let owned = id.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = fetch(&tx, &owned)? else {
          return Ok(None);
        };
        tx.execute("DELETE FROM worlds WHERE id = ?1", params![owned])?;
        if raw.is_current {
          tx.execute(
            "UPDATE worlds SET is_current = 1
             WHERE id = (SELECT id FROM worlds ORDER BY created_at DESC, id LIMIT 1)",
            [],
          )?;
        }
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw
      .ok_or_else(|| Error::WorldNotFound(id.to_owned()))?
      .into_entry()
  }

  /// Look up a world about to receive supplementary data, refusing if it
  /// already has some. Nothing is modified.
  pub async fn ensure_mergeable(&self, id: &str) -> Result<WorldCatalogEntry> {
    let entry = self.require(id).await?;
    if entry.has_supplementary {
      return Err(Error::AlreadyMerged(entry.id));
    }
    Ok(entry)
  }

  pub async fn mark_supplementary(&self, id: &str) -> Result<()> {
    self.update_flag(id, "has_supplementary").await
  }

  pub async fn mark_map(&self, id: &str) -> Result<()> { self.update_flag(id, "has_map").await }

  async fn update_flag(&self, id: &str, column: &'static str) -> Result<()> {
    let owned = id.to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&format!("UPDATE worlds SET {column} = 1 WHERE id = ?1"), params![owned])?)
      })
      .await?;
    if changed == 0 {
      return Err(Error::WorldNotFound(id.to_owned()));
    }
    Ok(())
  }

  /// Update a world's catalog names from a later source: the name only if
  /// it is still the placeholder, the alternate name only if unset.
  pub async fn adopt_names(&self, id: &str, header: WorldHeader) -> Result<()> {
    let owned = id.to_owned();
    self
      .conn
      .call(move |conn| {
        if let Some(name) = header.name {
          conn.execute(
            "UPDATE worlds SET name = ?1
             WHERE id = ?2 AND (TRIM(name) = '' OR name = ?3)",
            params![name, owned, DEFAULT_WORLD_NAME],
          )?;
        }
        if let Some(altname) = header.altname {
          conn.execute(
            "UPDATE worlds SET altname = ?1 WHERE id = ?2 AND altname IS NULL",
            params![altname, owned],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn fetch(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawCatalogEntry>> {
  conn
    .query_row(
      &format!("SELECT {ENTRY_COLUMNS} FROM worlds WHERE id = ?1"),
      params![id],
      RawCatalogEntry::from_row,
    )
    .optional()
}
