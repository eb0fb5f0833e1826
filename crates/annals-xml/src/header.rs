//! Reads the world's name from the top of an export.

use std::path::Path;

use annals_core::model::WorldHeader;
use quick_xml::events::Event;

use crate::{
  Result,
  extract::open_reader,
  map::text_of,
};

/// Collect `<name>` and `<altname>` that are direct children of the root.
///
/// Scanning stops at the first other element below the root, so only the
/// document prologue is read.
pub fn read_world_header(path: &Path) -> Result<WorldHeader> {
  let mut reader = open_reader(path)?;
  let mut buf = Vec::new();
  let mut header = WorldHeader::default();
  let mut depth = 0usize;
  let mut field: Option<Vec<u8>> = None;
  let mut text = String::new();

  loop {
    buf.clear();
    match reader.read_event_into(&mut buf)? {
      Event::Start(e) => {
        depth += 1;
        if depth == 2 {
          let name = e.local_name().as_ref().to_vec();
          if name != b"name" && name != b"altname" {
            break;
          }
          field = Some(name);
          text.clear();
        }
      }
      Event::Text(e) if field.is_some() => text.push_str(&text_of(&e)),
      Event::End(_) => {
        if depth == 2
          && let Some(name) = field.take()
        {
          let value = Some(text.trim().to_owned()).filter(|s| !s.is_empty());
          match name.as_slice() {
            b"name" => header.name = header.name.or(value),
            _ => header.altname = header.altname.or(value),
          }
          if header.name.is_some() && header.altname.is_some() {
            break;
          }
        }
        depth = depth.saturating_sub(1);
      }
      Event::Eof => break,
      _ => {}
    }
  }

  Ok(header)
}
