//! SQL schema for world stores and the catalog.
//!
//! Both are idempotent thanks to `CREATE … IF NOT EXISTS`. The catalog also
//! grows additively: [`CATALOG_COLUMNS`] lists columns appended to older
//! catalogs with `ALTER TABLE … ADD COLUMN`.

/// DDL for one world's store.
///
/// Source ids are kept as given; they are unique within a world but carry
/// no foreign-key constraints, since the documents routinely reference ids
/// they never define.
pub const WORLD_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

-- Singleton row.
CREATE TABLE IF NOT EXISTS world (
    id      INTEGER PRIMARY KEY CHECK (id = 1),
    name    TEXT,
    altname TEXT
);

CREATE TABLE IF NOT EXISTS regions (
    id       INTEGER PRIMARY KEY,
    name     TEXT,
    type     TEXT,
    coords   TEXT,   -- 'x,y|x,y|…'
    evilness TEXT
);

CREATE TABLE IF NOT EXISTS underground_regions (
    id     INTEGER PRIMARY KEY,
    type   TEXT,
    depth  INTEGER,
    coords TEXT
);

CREATE TABLE IF NOT EXISTS sites (
    id           INTEGER PRIMARY KEY,
    name         TEXT,
    type         TEXT,
    coords       TEXT,
    rectangle    TEXT,
    civ_id       INTEGER,
    cur_owner_id INTEGER
);

CREATE TABLE IF NOT EXISTS structures (
    site_id  INTEGER,
    local_id INTEGER,
    name     TEXT,
    name2    TEXT,
    type     TEXT,
    PRIMARY KEY (site_id, local_id)
);

CREATE TABLE IF NOT EXISTS artifacts (
    id           INTEGER PRIMARY KEY,
    name         TEXT,
    item_type    TEXT,
    item_subtype TEXT,
    mat          TEXT,
    creator_hfid INTEGER,
    site_id      INTEGER,
    holder_hfid  INTEGER
);

CREATE TABLE IF NOT EXISTS historical_figures (
    id         INTEGER PRIMARY KEY,
    name       TEXT,
    race       TEXT,
    caste      TEXT,
    sex        INTEGER,
    birth_year INTEGER,
    death_year INTEGER   -- -1 while alive
);

CREATE TABLE IF NOT EXISTS hf_entity_links (
    hfid          INTEGER,
    entity_id     INTEGER,
    link_type     TEXT,
    link_strength INTEGER
);

CREATE TABLE IF NOT EXISTS hf_site_links (
    hfid      INTEGER,
    site_id   INTEGER,
    link_type TEXT
);

CREATE TABLE IF NOT EXISTS hf_relationships (
    source_hf    INTEGER,
    target_hf    INTEGER,
    relationship TEXT,
    year         INTEGER,
    UNIQUE (source_hf, target_hf, relationship, year)
);

CREATE TABLE IF NOT EXISTS entities (
    id   INTEGER PRIMARY KEY,
    name TEXT,
    race TEXT,
    type TEXT
);

CREATE TABLE IF NOT EXISTS entity_positions (
    entity_id   INTEGER,
    position_id INTEGER,
    name        TEXT,
    PRIMARY KEY (entity_id, position_id)
);

CREATE TABLE IF NOT EXISTS entity_position_assignments (
    entity_id     INTEGER,
    assignment_id INTEGER,
    position_id   INTEGER,
    histfig_id    INTEGER,
    PRIMARY KEY (entity_id, assignment_id)
);

CREATE TABLE IF NOT EXISTS historical_events (
    id           INTEGER PRIMARY KEY,
    year         INTEGER,
    type         TEXT,
    site_id      INTEGER,
    hfid         INTEGER,
    civ_id       INTEGER,
    state        TEXT,
    reason       TEXT,
    slayer_hfid  INTEGER,
    death_cause  TEXT,
    artifact_id  INTEGER,
    entity_id    INTEGER,
    structure_id INTEGER,
    extra_data   TEXT    -- JSON object of every other field, NULL if none
);

CREATE TABLE IF NOT EXISTS mountain_peaks (
    id         INTEGER PRIMARY KEY,
    name       TEXT,
    coords     TEXT,
    height     INTEGER,
    is_volcano INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS landmasses (
    id      INTEGER PRIMARY KEY,
    name    TEXT,
    coord_1 TEXT,
    coord_2 TEXT
);

CREATE TABLE IF NOT EXISTS written_content (
    id          INTEGER PRIMARY KEY,
    title       TEXT,
    type        TEXT,
    author_hfid INTEGER,
    page_start  INTEGER,
    page_end    INTEGER
);

CREATE TABLE IF NOT EXISTS written_content_styles (
    written_content_id INTEGER,
    style              TEXT,
    UNIQUE (written_content_id, style)
);

CREATE TABLE IF NOT EXISTS written_content_references (
    written_content_id INTEGER,
    ref_type           TEXT,
    ref_id             INTEGER,
    UNIQUE (written_content_id, ref_type, ref_id)
);

CREATE INDEX IF NOT EXISTS idx_events_type     ON historical_events(type);
CREATE INDEX IF NOT EXISTS idx_events_hfid     ON historical_events(hfid);
CREATE INDEX IF NOT EXISTS idx_events_artifact ON historical_events(artifact_id);
CREATE INDEX IF NOT EXISTS idx_events_site     ON historical_events(site_id);
CREATE INDEX IF NOT EXISTS idx_entity_links_hf ON hf_entity_links(hfid);
CREATE INDEX IF NOT EXISTS idx_site_links_hf   ON hf_site_links(hfid);
CREATE INDEX IF NOT EXISTS idx_rel_source      ON hf_relationships(source_hf);
CREATE INDEX IF NOT EXISTS idx_rel_target      ON hf_relationships(target_hf);

PRAGMA user_version = 1;
";

/// Base DDL for the catalog. Columns added later live in
/// [`CATALOG_COLUMNS`] so old and new catalogs converge on the same shape.
pub const CATALOG_SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS worlds (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    altname    TEXT,
    db_path    TEXT NOT NULL,
    is_current INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL   -- RFC 3339 UTC
);
";

/// Additive catalog migrations: `(column, declaration)`.
pub const CATALOG_COLUMNS: &[(&str, &str)] = &[
  ("has_supplementary", "INTEGER NOT NULL DEFAULT 0"),
  ("has_map", "INTEGER NOT NULL DEFAULT 0"),
];

/// At most one current world.
pub const CATALOG_INDEXES: &str = "
CREATE UNIQUE INDEX IF NOT EXISTS idx_worlds_current ON worlds(is_current) WHERE is_current = 1;
";

/// Tables reported by [`crate::WorldStore::table_counts`], with their
/// display labels.
pub const COUNTED_TABLES: &[(&str, &str)] = &[
  ("regions", "regions"),
  ("sites", "sites"),
  ("historical_figures", "historical figures"),
  ("entities", "entities"),
  ("artifacts", "artifacts"),
  ("historical_events", "events"),
  ("written_content", "written content"),
];
