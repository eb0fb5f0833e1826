//! Cross-source reconciliation that runs against stored rows.

use annals_core::chronology::YearIndex;
use rusqlite::Connection;

/// Event types marking an artifact's creation, in both documents' spelling.
const CREATION_EVENTS: &str = "('artifact created', 'artifact_created')";

/// Recompute each artifact's creator and originating site from its
/// creation event.
///
/// The creator is the `creator_hfid` in the event's side blob unless absent
/// or `-1`, else the event's own `hfid`; the site is the event's `site_id`.
/// When several creation events exist the lowest id wins. A derivation that
/// yields nothing leaves the stored value alone, so running this any number
/// of times converges on the same rows.
pub fn backfill_artifacts(conn: &Connection) -> rusqlite::Result<usize> {
  let sql = format!(
    "UPDATE artifacts SET
       creator_hfid = COALESCE((
         SELECT CASE
                  WHEN json_extract(e.extra_data, '$.creator_hfid') IS NOT NULL
                   AND CAST(json_extract(e.extra_data, '$.creator_hfid') AS INTEGER) != -1
                  THEN CAST(json_extract(e.extra_data, '$.creator_hfid') AS INTEGER)
                  ELSE NULLIF(e.hfid, -1)
                END
         FROM historical_events e
         WHERE e.type IN {CREATION_EVENTS} AND e.artifact_id = artifacts.id
         ORDER BY e.id
         LIMIT 1
       ), creator_hfid),
       site_id = COALESCE((
         SELECT e.site_id
         FROM historical_events e
         WHERE e.type IN {CREATION_EVENTS} AND e.artifact_id = artifacts.id
           AND e.site_id IS NOT NULL AND e.site_id != -1
         ORDER BY e.id
         LIMIT 1
       ), site_id)
     WHERE EXISTS (
       SELECT 1 FROM historical_events e
       WHERE e.type IN {CREATION_EVENTS} AND e.artifact_id = artifacts.id
     )"
  );
  conn.execute(&sql, [])
}

/// Rebuild the event id → year index from rows already stored.
pub fn stored_year_index(conn: &Connection) -> rusqlite::Result<YearIndex> {
  let mut stmt = conn.prepare(
    "SELECT id, year FROM historical_events WHERE id IS NOT NULL AND year IS NOT NULL",
  )?;
  let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, i64>(1)?)))?;
  rows.collect()
}
