//! Integration tests for `WorldStore` and `Catalog` against in-memory and
//! temp-dir databases.

use std::path::{Path, PathBuf};

use annals_core::{
  catalog::NewWorld,
  chronology::YearIndex,
  model::WorldHeader,
};
use tempfile::TempDir;

use crate::{Catalog, Error, Phase, TableCount, WorldStore};

async fn store() -> WorldStore {
  WorldStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// Write `body` wrapped in a document root and return its path.
fn doc(dir: &TempDir, name: &str, body: &str) -> PathBuf {
  let path = dir.path().join(name);
  std::fs::write(&path, format!("<?xml version=\"1.0\"?>\n<df_world>{body}</df_world>"))
    .expect("write fixture");
  path
}

type RowFn<T> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>;

async fn query<T: Send + 'static>(s: &WorldStore, sql: &str, map: RowFn<T>) -> Vec<T> {
  let sql = sql.to_owned();
  s.conn
    .call(move |conn| {
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map([], map)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(rows)
    })
    .await
    .unwrap()
}

async fn count(s: &WorldStore, table: &str) -> i64 {
  query(s, &format!("SELECT COUNT(*) FROM {table}"), |r| r.get(0)).await[0]
}

fn triple<A, B, C>(r: &rusqlite::Row<'_>) -> rusqlite::Result<(A, B, C)>
where
  A: rusqlite::types::FromSql,
  B: rusqlite::types::FromSql,
  C: rusqlite::types::FromSql,
{
  Ok((r.get(0)?, r.get(1)?, r.get(2)?))
}

// ─── Figures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn figure_links_are_written_in_document_order() {
  let dir = TempDir::new().unwrap();
  let path = doc(
    &dir,
    "legends.xml",
    "<historical_figures><historical_figure>
       <id>17</id><name>urist</name><death_year>-1</death_year>
       <entity_link><link_type>member</link_type><entity_id>3</entity_id></entity_link>
       <entity_link><link_type>enemy</link_type><entity_id>9</entity_id>
         <link_strength>40</link_strength></entity_link>
       <site_link><link_type>lair</link_type><site_id>2</site_id></site_link>
     </historical_figure></historical_figures>",
  );

  let s = store().await;
  let counts = s.run(&path, Phase::HistoricalFigures).await.unwrap();
  assert_eq!(counts.records, 1);
  assert_eq!(counts.children("entity links"), 2);

  let links: Vec<(i64, i64, String)> = query(
    &s,
    "SELECT hfid, entity_id, link_type FROM hf_entity_links ORDER BY rowid",
    |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
  )
  .await;
  assert_eq!(links, vec![(17, 3, "member".to_owned()), (17, 9, "enemy".to_owned())]);
  assert_eq!(count(&s, "hf_entity_links").await, 2);
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn supplementary_artifact_fields_coalesce() {
  let dir = TempDir::new().unwrap();
  let primary = doc(
    &dir,
    "legends.xml",
    "<artifacts><artifact><id>1</id><name>the gleaming</name><mat>iron</mat></artifact></artifacts>",
  );
  let without_mat = doc(
    &dir,
    "plus-a.xml",
    "<artifacts><artifact><id>1</id><item_type>weapon</item_type></artifact></artifacts>",
  );
  let with_steel = doc(
    &dir,
    "plus-b.xml",
    "<artifacts><artifact><id>1</id><mat>steel</mat></artifact></artifacts>",
  );

  let s = store().await;
  s.run(&primary, Phase::Artifacts).await.unwrap();

  s.run(&without_mat, Phase::Artifacts).await.unwrap();
  let rows: Vec<(String, Option<String>, String)> =
    query(&s, "SELECT mat, item_type, name FROM artifacts", |r| {
      Ok((r.get(0)?, r.get(1)?, r.get(2)?))
    })
    .await;
  assert_eq!(
    rows,
    vec![("iron".to_owned(), Some("weapon".to_owned()), "the gleaming".to_owned())]
  );

  s.run(&with_steel, Phase::Artifacts).await.unwrap();
  let rows: Vec<String> = query(&s, "SELECT mat FROM artifacts", |r| r.get(0)).await;
  assert_eq!(rows, vec!["steel".to_owned()]);
  assert_eq!(count(&s, "artifacts").await, 1);
}

#[tokio::test]
async fn backfill_is_idempotent() {
  let dir = TempDir::new().unwrap();
  let path = doc(
    &dir,
    "legends.xml",
    "<artifacts>
       <artifact><id>1</id><name>a</name></artifact>
       <artifact><id>2</id><name>b</name><creator_hfid>9</creator_hfid></artifact>
       <artifact><id>3</id><name>c</name><site_id>8</site_id></artifact>
     </artifacts>
     <historical_events>
       <historical_event><id>6</id><year>12</year><type>artifact created</type>
         <artifact_id>1</artifact_id><hfid>7</hfid></historical_event>
       <historical_event><id>5</id><year>10</year><type>artifact created</type>
         <artifact_id>1</artifact_id><hfid>3</hfid><site_id>4</site_id></historical_event>
       <historical_event><id>7</id><year>11</year><type>artifact_created</type>
         <artifact_id>2</artifact_id><hfid>5</hfid><creator_hfid>12</creator_hfid></historical_event>
       <historical_event><id>8</id><year>11</year><type>artifact created</type>
         <artifact_id>3</artifact_id><hfid>-1</hfid><site_id>-1</site_id></historical_event>
     </historical_events>",
  );

  let s = store().await;
  s.run(&path, Phase::Artifacts).await.unwrap();
  s.run(&path, Phase::Events).await.unwrap();

  assert_eq!(s.backfill_artifacts().await.unwrap(), 3);
  let sql = "SELECT id, creator_hfid, site_id FROM artifacts ORDER BY id";
  let first: Vec<(i64, Option<i64>, Option<i64>)> = query(&s, sql, triple).await;
  assert_eq!(
    first,
    vec![(1, Some(3), Some(4)), (2, Some(12), None), (3, None, Some(8))]
  );

  s.backfill_artifacts().await.unwrap();
  let second: Vec<(i64, Option<i64>, Option<i64>)> = query(&s, sql, triple).await;
  assert_eq!(first, second);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn indexed_events_take_years_from_index() {
  let dir = TempDir::new().unwrap();
  let plus = doc(
    &dir,
    "plus.xml",
    "<historical_events>
       <historical_event><id>1</id><type>hf died</type><slayer_hf>4</slayer_hf>
         <site>2</site><death_cause>struck</death_cause></historical_event>
       <historical_event><id>99</id><type>hf died</type></historical_event>
     </historical_events>",
  );

  let index: YearIndex = [(1, 250)].into_iter().collect();
  let s = store().await;
  let counts = s.run(&plus, Phase::IndexedEvents(index)).await.unwrap();
  assert_eq!(counts.records, 2);
  assert_eq!(counts.children("without year"), 1);

  let rows: Vec<(i64, Option<i64>, Option<i64>)> =
    query(&s, "SELECT id, year, slayer_hfid FROM historical_events ORDER BY id", triple).await;
  assert_eq!(rows, vec![(1, Some(250), Some(4)), (99, None, None)]);

  let extras: Vec<Option<String>> =
    query(&s, "SELECT extra_data FROM historical_events WHERE id = 1", |r| r.get(0)).await;
  assert_eq!(extras, vec![None]);

  let index = s.stored_year_index().await.unwrap();
  assert_eq!(index.get(1), Some(250));
  assert_eq!(index.get(99), None);
}

#[tokio::test]
async fn supplementary_event_keeps_stored_year_and_fields() {
  let dir = TempDir::new().unwrap();
  let primary = doc(
    &dir,
    "legends.xml",
    "<historical_events><historical_event>
       <id>1</id><year>250</year><type>hf died</type><hfid>3</hfid>
     </historical_event></historical_events>",
  );
  let plus = doc(
    &dir,
    "plus.xml",
    "<historical_events><historical_event>
       <id>1</id><type>hf died</type><slayer_hf>4</slayer_hf>
     </historical_event></historical_events>",
  );

  let s = store().await;
  s.run(&primary, Phase::Events).await.unwrap();
  s.run(&plus, Phase::IndexedEvents(YearIndex::new())).await.unwrap();

  let rows: Vec<(Option<i64>, Option<i64>, Option<i64>)> =
    query(&s, "SELECT year, hfid, slayer_hfid FROM historical_events", triple).await;
  assert_eq!(rows, vec![(Some(250), Some(3), Some(4))]);
}

#[tokio::test]
async fn unknown_fields_land_in_extra_data() {
  let dir = TempDir::new().unwrap();
  let path = doc(
    &dir,
    "legends.xml",
    "<historical_events><historical_event>
       <id>3</id><year>7</year><type>change hf state</type><state>settled</state>
       <coords>1,2</coords>
     </historical_event></historical_events>",
  );

  let s = store().await;
  s.run(&path, Phase::Events).await.unwrap();
  let rows: Vec<(String, String)> =
    query(&s, "SELECT state, extra_data FROM historical_events", |r| {
      Ok((r.get(0)?, r.get(1)?))
    })
    .await;
  assert_eq!(rows, vec![("settled".to_owned(), r#"{"coords":"1,2"}"#.to_owned())]);
}

#[tokio::test]
async fn document_error_rolls_back_only_that_phase() {
  let dir = TempDir::new().unwrap();
  let good = doc(
    &dir,
    "good.xml",
    "<artifacts><artifact><id>1</id></artifact></artifacts>",
  );
  let truncated = dir.path().join("bad.xml");
  std::fs::write(
    &truncated,
    "<df_world><historical_events><historical_event><id>1</id><year>3</year></historical_event>\
     <historical_event><id>2</id>",
  )
  .unwrap();

  let s = store().await;
  s.run(&good, Phase::Artifacts).await.unwrap();
  let err = s.run(&truncated, Phase::Events).await.unwrap_err();
  assert!(matches!(err, Error::Xml(_)), "got {err:?}");

  assert_eq!(count(&s, "artifacts").await, 1);
  assert_eq!(count(&s, "historical_events").await, 0);
}

#[tokio::test]
async fn missing_document_is_reported_before_writing() {
  let s = store().await;
  let err = s
    .run(Path::new("/no/such/legends.xml"), Phase::Sites)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Xml(annals_xml::Error::Unreadable { .. })));
}

// ─── Sites & relationships ───────────────────────────────────────────────────

#[tokio::test]
async fn supplementary_sites_add_ownership_and_structures() {
  let dir = TempDir::new().unwrap();
  let primary = doc(
    &dir,
    "legends.xml",
    "<sites><site><id>1</id><name>boatmurdered</name><type>fortress</type>\
     <coords>10,20</coords></site></sites>",
  );
  let plus = doc(
    &dir,
    "plus.xml",
    "<sites>
       <site><id>1</id><civ_id>5</civ_id><cur_owner_id>6</cur_owner_id>
         <structures>
           <structure><id>0</id><type>temple</type><name>the hall</name></structure>
           <structure><id>1</id><type>market</type></structure>
         </structures>
       </site>
       <site><id>2</id><name>new place</name></site>
     </sites>",
  );

  let s = store().await;
  s.run(&primary, Phase::Sites).await.unwrap();
  let counts = s.run(&plus, Phase::Sites).await.unwrap();
  assert_eq!(counts.children("structures"), 2);
  // Merging twice writes nothing new.
  s.run(&plus, Phase::Sites).await.unwrap();

  let rows: Vec<(String, Option<i64>, Option<i64>)> =
    query(&s, "SELECT name, civ_id, cur_owner_id FROM sites ORDER BY id", triple).await;
  assert_eq!(
    rows,
    vec![
      ("boatmurdered".to_owned(), Some(5), Some(6)),
      ("new place".to_owned(), None, None),
    ]
  );
  assert_eq!(count(&s, "structures").await, 2);
}

#[tokio::test]
async fn relationships_are_overwrite_safe() {
  let dir = TempDir::new().unwrap();
  let plus = doc(
    &dir,
    "plus.xml",
    "<historical_event_relationships><historical_event_relationship>
       <event>4</event><relationship>lover</relationship>
       <source_hf>1</source_hf><target_hf>2</target_hf><year>30</year>
     </historical_event_relationship></historical_event_relationships>",
  );

  let s = store().await;
  s.run(&plus, Phase::Relationships).await.unwrap();
  s.run(&plus, Phase::Relationships).await.unwrap();
  assert_eq!(count(&s, "hf_relationships").await, 1);
}

// ─── World row & statistics ──────────────────────────────────────────────────

#[tokio::test]
async fn world_names_are_adopted_only_when_unset() {
  let s = store().await;
  s.set_world(WorldHeader { name: Some("Unknown World".into()), altname: None })
    .await
    .unwrap();

  s.adopt_names(WorldHeader {
    name:    Some("Nish Lolor".into()),
    altname: Some("The Realm of Oceans".into()),
  })
  .await
  .unwrap();
  s.adopt_names(WorldHeader { name: Some("Other".into()), altname: Some("Other".into()) })
    .await
    .unwrap();

  let world = s.world().await.unwrap();
  assert_eq!(world.name.as_deref(), Some("Nish Lolor"));
  assert_eq!(world.altname.as_deref(), Some("The Realm of Oceans"));
}

#[tokio::test]
async fn table_counts_cover_headline_tables() {
  let s = store().await;
  let counts = s.table_counts().await.unwrap();
  assert_eq!(counts.len(), 7);
  assert!(counts.iter().all(|(_, c)| *c == TableCount::Rows(0)));
  assert_eq!(counts[1].0, "sites");
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

fn new_world(id: &str, name: Option<&str>) -> NewWorld {
  NewWorld {
    id:                id.to_owned(),
    name:              name.map(str::to_owned),
    altname:           None,
    db_path:           PathBuf::from(format!("data/worlds/{id}.db")),
    has_supplementary: false,
  }
}

#[tokio::test]
async fn register_moves_the_current_flag() {
  let c = Catalog::open_in_memory().await.unwrap();
  let a = c.register(new_world("aaaaaaaaaaaa", Some("First"))).await.unwrap();
  assert!(a.is_current);
  let b = c.register(new_world("bbbbbbbbbbbb", None)).await.unwrap();
  assert_eq!(b.name, "Unknown World");

  let current = c.current().await.unwrap().unwrap();
  assert_eq!(current.id, "bbbbbbbbbbbb");
  let all = c.list().await.unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all.iter().filter(|w| w.is_current).count(), 1);

  c.switch("aaaaaaaaaaaa").await.unwrap();
  assert_eq!(c.current().await.unwrap().unwrap().id, "aaaaaaaaaaaa");
  assert!(matches!(c.switch("nope").await, Err(Error::WorldNotFound(_))));
}

#[tokio::test]
async fn duplicate_id_is_rejected_without_losing_current() {
  let c = Catalog::open_in_memory().await.unwrap();
  c.register(new_world("aaaaaaaaaaaa", Some("First"))).await.unwrap();
  let err = c.register(new_world("aaaaaaaaaaaa", Some("Again"))).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateWorldId(_)));
  assert_eq!(c.current().await.unwrap().unwrap().name, "First");
}

#[tokio::test]
async fn removing_current_promotes_newest_remaining() {
  let c = Catalog::open_in_memory().await.unwrap();
  c.register(new_world("aaaaaaaaaaaa", Some("First"))).await.unwrap();
  c.register(new_world("bbbbbbbbbbbb", Some("Second"))).await.unwrap();

  let removed = c.remove("bbbbbbbbbbbb").await.unwrap();
  assert_eq!(removed.name, "Second");
  assert_eq!(c.current().await.unwrap().unwrap().id, "aaaaaaaaaaaa");
  assert!(matches!(c.remove("bbbbbbbbbbbb").await, Err(Error::WorldNotFound(_))));
}

#[tokio::test]
async fn merge_precondition_and_names() {
  let c = Catalog::open_in_memory().await.unwrap();
  c.register(new_world("aaaaaaaaaaaa", None)).await.unwrap();
  c.ensure_mergeable("aaaaaaaaaaaa").await.unwrap();

  c.adopt_names(
    "aaaaaaaaaaaa",
    WorldHeader { name: Some("Nish Lolor".into()), altname: Some("Oceans".into()) },
  )
  .await
  .unwrap();
  c.mark_supplementary("aaaaaaaaaaaa").await.unwrap();

  let entry = c.require("aaaaaaaaaaaa").await.unwrap();
  assert_eq!(entry.name, "Nish Lolor");
  assert_eq!(entry.altname.as_deref(), Some("Oceans"));
  assert!(entry.has_supplementary);
  assert!(matches!(
    c.ensure_mergeable("aaaaaaaaaaaa").await,
    Err(Error::AlreadyMerged(_))
  ));
  assert!(matches!(c.mark_supplementary("zzz").await, Err(Error::WorldNotFound(_))));
}

#[tokio::test]
async fn old_catalog_is_migrated_and_reopens_cleanly() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("master.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE worlds (
           id TEXT PRIMARY KEY, name TEXT NOT NULL, altname TEXT,
           db_path TEXT NOT NULL, is_current INTEGER NOT NULL DEFAULT 0,
           created_at TEXT NOT NULL);
         INSERT INTO worlds VALUES
           ('aaaaaaaaaaaa', 'Old', NULL, 'old.db', 1, '2020-01-01T00:00:00+00:00');",
      )
      .unwrap();
  }

  let c = Catalog::open(&path).await.unwrap();
  let old = c.require("aaaaaaaaaaaa").await.unwrap();
  assert!(!old.has_supplementary);
  assert!(!old.has_map);
  drop(c);

  // Already at the newer shape: opening again must not fail.
  let c = Catalog::open(&path).await.unwrap();
  c.mark_map("aaaaaaaaaaaa").await.unwrap();
  assert!(c.require("aaaaaaaaaaaa").await.unwrap().has_map);
}
