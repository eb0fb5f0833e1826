//! The generic record tree every extracted element is mapped to.
//!
//! A [`Record`] knows nothing about the entity kind it came from. Child tags
//! keep document order; a tag that recurs under the same parent collapses into
//! a [`Node::List`] at the position of its first occurrence. The per-kind
//! importers in [`crate::model`] read records through the lenient accessors
//! below, which treat anything of the wrong shape as absent.

use serde_json::{Map, Value};

// ─── Node ────────────────────────────────────────────────────────────────────

/// One value in the record tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  /// Text of a leaf element (no child elements). Empty for `<tag/>`.
  Scalar(String),
  /// Every occurrence of a tag that appeared more than once, in order.
  List(Vec<Node>),
  /// An element with child elements.
  Map(Record),
}

impl Node {
  pub fn as_scalar(&self) -> Option<&str> {
    match self {
      Node::Scalar(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_record(&self) -> Option<&Record> {
    match self {
      Node::Map(r) => Some(r),
      _ => None,
    }
  }

  /// JSON form used by the side blob: scalars as strings, lists as arrays,
  /// maps as objects.
  pub fn to_json(&self) -> Value {
    match self {
      Node::Scalar(s) => Value::String(s.clone()),
      Node::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
      Node::Map(r) => r.to_json(),
    }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// An ordered mapping from child tag name to [`Node`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
  fields: Vec<(String, Node)>,
}

impl Record {
  pub fn new() -> Self { Self::default() }

  /// Add a child value. A second value under the same name turns the field
  /// into a [`Node::List`]; later values are appended to it.
  pub fn insert(&mut self, name: impl Into<String>, value: Node) {
    let name = name.into();
    match self.fields.iter_mut().find(|(n, _)| *n == name) {
      Some((_, Node::List(items))) => items.push(value),
      Some((_, existing)) => {
        let first = std::mem::replace(existing, Node::List(Vec::with_capacity(2)));
        *existing = Node::List(vec![first, value]);
      }
      None => self.fields.push((name, value)),
    }
  }

  pub fn get(&self, name: &str) -> Option<&Node> {
    self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
  }

  pub fn contains(&self, name: &str) -> bool { self.get(name).is_some() }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
    self.fields.iter().map(|(n, v)| (n.as_str(), v))
  }

  pub fn len(&self) -> usize { self.fields.len() }

  pub fn is_empty(&self) -> bool { self.fields.is_empty() }

  /// Trimmed text of a scalar field. Empty text, repeated fields and nested
  /// elements all read as `None`.
  pub fn text(&self, name: &str) -> Option<&str> {
    self
      .get(name)
      .and_then(Node::as_scalar)
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }

  /// Owned variant of [`Record::text`].
  pub fn string(&self, name: &str) -> Option<String> {
    self.text(name).map(str::to_owned)
  }

  /// A scalar field parsed as an integer; unparseable text reads as `None`.
  pub fn int(&self, name: &str) -> Option<i64> {
    self.text(name).and_then(|s| s.parse().ok())
  }

  /// The first of `names` that has usable text.
  pub fn first_string(&self, names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| self.string(n))
  }

  /// The first of `names` that parses as an integer.
  pub fn first_int(&self, names: &[&str]) -> Option<i64> {
    names.iter().find_map(|n| self.int(n))
  }

  /// Nested child records under `name`, whether it occurred once or many
  /// times. Scalar occurrences are skipped.
  pub fn records<'a>(
    &'a self,
    name: &str,
  ) -> impl Iterator<Item = &'a Record> + use<'a> {
    self.occurrences(name).iter().filter_map(Node::as_record)
  }

  /// Non-empty scalar occurrences of `name`, whether it occurred once or many
  /// times.
  pub fn texts<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + use<'a> {
    self
      .occurrences(name)
      .iter()
      .filter_map(Node::as_scalar)
      .map(str::trim)
      .filter(|s| !s.is_empty())
  }

  fn occurrences(&self, name: &str) -> &[Node] {
    match self.get(name) {
      Some(Node::List(items)) => items,
      Some(node) => std::slice::from_ref(node),
      None => &[],
    }
  }

  pub fn to_json(&self) -> Value {
    Value::Object(
      self
        .fields
        .iter()
        .map(|(n, v)| (n.clone(), v.to_json()))
        .collect(),
    )
  }

  /// Every field whose name is not in `known`, as a JSON object.
  pub fn extras(&self, known: &[&str]) -> Map<String, Value> {
    self
      .fields
      .iter()
      .filter(|(n, _)| !known.contains(&n.as_str()))
      .map(|(n, v)| (n.clone(), v.to_json()))
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scalar(s: &str) -> Node { Node::Scalar(s.into()) }

  fn link(entity: &str) -> Node {
    let mut r = Record::new();
    r.insert("entity_id", scalar(entity));
    Node::Map(r)
  }

  #[test]
  fn repeated_tag_becomes_list_in_order() {
    let mut r = Record::new();
    r.insert("id", scalar("1"));
    r.insert("entity_link", link("10"));
    r.insert("entity_link", link("20"));
    r.insert("entity_link", link("30"));

    let ids: Vec<_> = r.records("entity_link").filter_map(|l| l.int("entity_id")).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(r.len(), 2);
  }

  #[test]
  fn single_occurrence_still_iterates() {
    let mut r = Record::new();
    r.insert("entity_link", link("7"));
    assert_eq!(r.records("entity_link").count(), 1);
    assert_eq!(r.records("site_link").count(), 0);
  }

  #[test]
  fn list_where_scalar_expected_reads_as_absent() {
    let mut r = Record::new();
    r.insert("name", scalar("urist"));
    r.insert("name", scalar("urist again"));
    assert_eq!(r.text("name"), None);
    assert_eq!(r.texts("name").count(), 2);
  }

  #[test]
  fn empty_and_unparseable_read_as_absent() {
    let mut r = Record::new();
    r.insert("name", scalar(""));
    r.insert("year", scalar("soon"));
    r.insert("is_volcano", scalar(""));
    assert_eq!(r.text("name"), None);
    assert_eq!(r.int("year"), None);
    assert!(r.contains("is_volcano"));
  }

  #[test]
  fn first_string_skips_empty_alternatives() {
    let mut r = Record::new();
    r.insert("name", scalar("  "));
    r.insert("name_string", scalar("the gleaming axe"));
    assert_eq!(
      r.first_string(&["name", "name_string"]).as_deref(),
      Some("the gleaming axe")
    );
  }

  #[test]
  fn extras_keep_nested_shape() {
    let mut r = Record::new();
    r.insert("id", scalar("4"));
    r.insert("feature_layer_id", scalar("-1"));
    r.insert("entity_link", link("9"));
    r.insert("entity_link", link("8"));

    let extra = r.extras(&["id"]);
    assert_eq!(extra.len(), 2);
    assert_eq!(extra["feature_layer_id"], Value::String("-1".into()));
    assert_eq!(extra["entity_link"][1]["entity_id"], Value::String("8".into()));
  }
}
