//! Row writers, one per entity kind.
//!
//! Each takes an already-mapped model and writes its parent row plus any
//! child rows. All of them are overwrite-safe so the same record can be
//! applied at import time and again during a merge: keyed tables use
//! `INSERT OR REPLACE`, and tables both documents contribute to use an
//! upsert that never replaces a present value with NULL.

use annals_core::model::{
  Artifact, Entity, HistoricalEvent, HistoricalFigure, Landmass, MountainPeak, Region,
  Relationship, Site, UndergroundRegion, WorldHeader, WrittenContent,
};
use rusqlite::{Connection, OptionalExtension as _, params};

// ─── World ───────────────────────────────────────────────────────────────────

pub fn set_world(conn: &Connection, header: &WorldHeader) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO world (id, name, altname) VALUES (1, ?1, ?2)",
    params![header.name, header.altname],
  )?;
  Ok(())
}

/// Fill in the world's names from a later source: the name only while it is
/// unset or the placeholder, the alternate name only while unset.
pub fn adopt_world_names(
  conn: &Connection,
  header: &WorldHeader,
  placeholder: &str,
) -> rusqlite::Result<()> {
  conn.execute("INSERT OR IGNORE INTO world (id) VALUES (1)", [])?;
  if let Some(name) = &header.name {
    conn.execute(
      "UPDATE world SET name = ?1
       WHERE id = 1 AND (name IS NULL OR TRIM(name) = '' OR name = ?2)",
      params![name, placeholder],
    )?;
  }
  if let Some(altname) = &header.altname {
    conn.execute(
      "UPDATE world SET altname = ?1 WHERE id = 1 AND altname IS NULL",
      params![altname],
    )?;
  }
  Ok(())
}

// ─── Geography ───────────────────────────────────────────────────────────────

pub fn upsert_region(conn: &Connection, r: &Region) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT INTO regions (id, name, type, coords, evilness) VALUES (?1, ?2, ?3, ?4, ?5)
       ON CONFLICT (id) DO UPDATE SET
         name     = COALESCE(excluded.name, name),
         type     = COALESCE(excluded.type, type),
         coords   = COALESCE(excluded.coords, coords),
         evilness = COALESCE(excluded.evilness, evilness)",
    )?
    .execute(params![r.id, r.name, r.kind, r.coords, r.evilness])?;
  Ok(())
}

pub fn replace_underground_region(
  conn: &Connection,
  r: &UndergroundRegion,
) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO underground_regions (id, type, depth, coords)
       VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![r.id, r.kind, r.depth, r.coords])?;
  Ok(())
}

pub fn replace_landmass(conn: &Connection, l: &Landmass) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO landmasses (id, name, coord_1, coord_2) VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![l.id, l.name, l.coord_1, l.coord_2])?;
  Ok(())
}

pub fn replace_mountain_peak(conn: &Connection, p: &MountainPeak) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO mountain_peaks (id, name, coords, height, is_volcano)
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )?
    .execute(params![p.id, p.name, p.coords, p.height, p.is_volcano])?;
  Ok(())
}

// ─── Sites ───────────────────────────────────────────────────────────────────

/// Upsert a site and replace any structures it carries. Returns the number
/// of structure rows written.
pub fn upsert_site(conn: &Connection, s: &Site) -> rusqlite::Result<u64> {
  conn
    .prepare_cached(
      "INSERT INTO sites (id, name, type, coords, rectangle, civ_id, cur_owner_id)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
       ON CONFLICT (id) DO UPDATE SET
         name         = COALESCE(excluded.name, name),
         type         = COALESCE(excluded.type, type),
         coords       = COALESCE(excluded.coords, coords),
         rectangle    = COALESCE(excluded.rectangle, rectangle),
         civ_id       = COALESCE(excluded.civ_id, civ_id),
         cur_owner_id = COALESCE(excluded.cur_owner_id, cur_owner_id)",
    )?
    .execute(params![s.id, s.name, s.kind, s.coords, s.rectangle, s.civ_id, s.cur_owner_id])?;

  let mut stmt = conn.prepare_cached(
    "INSERT OR REPLACE INTO structures (site_id, local_id, name, name2, type)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for st in &s.structures {
    stmt.execute(params![s.id, st.local_id, st.name, st.name2, st.kind])?;
  }
  Ok(s.structures.len() as u64)
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

pub fn find_artifact(conn: &Connection, id: i64) -> rusqlite::Result<Option<Artifact>> {
  conn
    .prepare_cached(
      "SELECT id, name, item_type, item_subtype, mat, creator_hfid, site_id, holder_hfid
       FROM artifacts WHERE id = ?1",
    )?
    .query_row(params![id], |row| {
      Ok(Artifact {
        id:           row.get(0)?,
        name:         row.get(1)?,
        item_type:    row.get(2)?,
        item_subtype: row.get(3)?,
        mat:          row.get(4)?,
        creator_hfid: row.get(5)?,
        site_id:      row.get(6)?,
        holder_hfid:  row.get(7)?,
      })
    })
    .optional()
}

/// Write `incoming`, keeping any stored field `incoming` leaves absent.
pub fn merge_artifact(conn: &Connection, incoming: Artifact) -> rusqlite::Result<()> {
  let merged = match incoming.id {
    Some(id) => match find_artifact(conn, id)? {
      Some(stored) => incoming.coalesce(&stored),
      None => incoming,
    },
    None => incoming,
  };
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO artifacts
         (id, name, item_type, item_subtype, mat, creator_hfid, site_id, holder_hfid)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?
    .execute(params![
      merged.id,
      merged.name,
      merged.item_type,
      merged.item_subtype,
      merged.mat,
      merged.creator_hfid,
      merged.site_id,
      merged.holder_hfid,
    ])?;
  Ok(())
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// Upsert an entity with its positions and assignments.
pub fn upsert_entity(conn: &Connection, e: &Entity) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT INTO entities (id, name, race, type) VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT (id) DO UPDATE SET
         name = COALESCE(excluded.name, name),
         race = COALESCE(excluded.race, race),
         type = COALESCE(excluded.type, type)",
    )?
    .execute(params![e.id, e.name, e.race, e.kind])?;

  let mut positions = conn.prepare_cached(
    "INSERT OR REPLACE INTO entity_positions (entity_id, position_id, name) VALUES (?1, ?2, ?3)",
  )?;
  for p in &e.positions {
    positions.execute(params![e.id, p.position_id, p.name])?;
  }

  let mut assignments = conn.prepare_cached(
    "INSERT OR REPLACE INTO entity_position_assignments
       (entity_id, assignment_id, position_id, histfig_id)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for a in &e.assignments {
    assignments.execute(params![e.id, a.assignment_id, a.position_id, a.histfig_id])?;
  }

  Ok(())
}

// ─── Historical figures ──────────────────────────────────────────────────────

/// Write a figure and its links in document order.
pub fn insert_figure(conn: &Connection, hf: &HistoricalFigure) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO historical_figures
         (id, name, race, caste, sex, birth_year, death_year)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?
    .execute(params![
      hf.id,
      hf.name,
      hf.race,
      hf.caste,
      hf.sex,
      hf.birth_year,
      hf.death_year,
    ])?;

  let mut entity_links = conn.prepare_cached(
    "INSERT INTO hf_entity_links (hfid, entity_id, link_type, link_strength)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  for l in &hf.entity_links {
    entity_links.execute(params![hf.id, l.entity_id, l.link_type, l.link_strength])?;
  }

  let mut site_links = conn.prepare_cached(
    "INSERT INTO hf_site_links (hfid, site_id, link_type) VALUES (?1, ?2, ?3)",
  )?;
  for l in &hf.site_links {
    site_links.execute(params![hf.id, l.site_id, l.link_type])?;
  }

  Ok(())
}

pub fn replace_relationship(conn: &Connection, r: &Relationship) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO hf_relationships (source_hf, target_hf, relationship, year)
       VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![r.source_hf, r.target_hf, r.relationship, r.year])?;
  Ok(())
}

// ─── Events ──────────────────────────────────────────────────────────────────

pub fn replace_event(conn: &Connection, e: &HistoricalEvent) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO historical_events
         (id, year, type, site_id, hfid, civ_id, state, reason, slayer_hfid,
          death_cause, artifact_id, entity_id, structure_id, extra_data)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
    )?
    .execute(params![
      e.id,
      e.year,
      e.kind,
      e.site_id,
      e.hfid,
      e.civ_id,
      e.state,
      e.reason,
      e.slayer_hfid,
      e.death_cause,
      e.artifact_id,
      e.entity_id,
      e.structure_id,
      e.extra_json(),
    ])?;
  Ok(())
}

/// Apply a supplementary event over whatever is stored for its id: a known
/// year is kept, other columns prefer the incoming value, and the side blob
/// is replaced only when the incoming record has one.
pub fn upsert_event(conn: &Connection, e: &HistoricalEvent) -> rusqlite::Result<()> {
  conn
    .prepare_cached(
      "INSERT INTO historical_events
         (id, year, type, site_id, hfid, civ_id, state, reason, slayer_hfid,
          death_cause, artifact_id, entity_id, structure_id, extra_data)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
       ON CONFLICT (id) DO UPDATE SET
         year         = COALESCE(year, excluded.year),
         type         = COALESCE(excluded.type, type),
         site_id      = COALESCE(excluded.site_id, site_id),
         hfid         = COALESCE(excluded.hfid, hfid),
         civ_id       = COALESCE(excluded.civ_id, civ_id),
         state        = COALESCE(excluded.state, state),
         reason       = COALESCE(excluded.reason, reason),
         slayer_hfid  = COALESCE(excluded.slayer_hfid, slayer_hfid),
         death_cause  = COALESCE(excluded.death_cause, death_cause),
         artifact_id  = COALESCE(excluded.artifact_id, artifact_id),
         entity_id    = COALESCE(excluded.entity_id, entity_id),
         structure_id = COALESCE(excluded.structure_id, structure_id),
         extra_data   = COALESCE(excluded.extra_data, extra_data)",
    )?
    .execute(params![
      e.id,
      e.year,
      e.kind,
      e.site_id,
      e.hfid,
      e.civ_id,
      e.state,
      e.reason,
      e.slayer_hfid,
      e.death_cause,
      e.artifact_id,
      e.entity_id,
      e.structure_id,
      e.extra_json(),
    ])?;
  Ok(())
}

// ─── Written content ─────────────────────────────────────────────────────────

/// Returns the number of style and reference rows written.
pub fn replace_written_content(conn: &Connection, w: &WrittenContent) -> rusqlite::Result<u64> {
  conn
    .prepare_cached(
      "INSERT OR REPLACE INTO written_content
         (id, title, type, author_hfid, page_start, page_end)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?
    .execute(params![w.id, w.title, w.kind, w.author_hfid, w.page_start, w.page_end])?;

  let mut styles = conn.prepare_cached(
    "INSERT OR REPLACE INTO written_content_styles (written_content_id, style) VALUES (?1, ?2)",
  )?;
  for style in &w.styles {
    styles.execute(params![w.id, style])?;
  }

  let mut references = conn.prepare_cached(
    "INSERT OR REPLACE INTO written_content_references (written_content_id, ref_type, ref_id)
     VALUES (?1, ?2, ?3)",
  )?;
  for r in &w.references {
    references.execute(params![w.id, r.ref_type, r.ref_id])?;
  }

  Ok((w.styles.len() + w.references.len()) as u64)
}
