//! Pull-based streaming extraction of repeated record elements.

use std::{
  fs::File,
  io::BufReader,
  path::{Path, PathBuf},
};

use annals_core::Record;
use quick_xml::{Reader, events::Event};

use crate::{
  Error, Result,
  map::{RecordBuilder, tag_name},
};

/// Depth of record elements in an export: `<df_world>` (1) → section such
/// as `<sites>` (2) → `<site>` (3).
pub const RECORD_DEPTH: usize = 3;

const READ_BUFFER: usize = 1024 * 1024;

/// A lazy, finite, forward-only sequence of the records named `tag` in one
/// document.
///
/// Only elements at [`RECORD_DEPTH`] match by default, so a `<site>` field
/// nested inside an event is never mistaken for a site record. Each pass
/// opens the file afresh; two passes over the same document yield the same
/// records in the same order.
pub struct RecordStream {
  reader:  Reader<BufReader<File>>,
  buf:     Vec<u8>,
  tag:     String,
  path:    PathBuf,
  depth:   usize,
  at:      Option<usize>,
  yielded: u64,
  done:    bool,
}

impl RecordStream {
  pub fn open(path: &Path, tag: &str) -> Result<Self> {
    let reader = open_reader(path)?;
    Ok(Self {
      reader,
      buf: Vec::with_capacity(8192),
      tag: tag.to_owned(),
      path: path.to_path_buf(),
      depth: 0,
      at: Some(RECORD_DEPTH),
      yielded: 0,
      done: false,
    })
  }

  /// Match the outermost `tag` elements at whatever depth they occur.
  pub fn at_any_depth(mut self) -> Self {
    self.at = None;
    self
  }

  pub fn tag(&self) -> &str { &self.tag }

  pub fn path(&self) -> &Path { &self.path }

  /// Records yielded so far.
  pub fn yielded(&self) -> u64 { self.yielded }

  fn is_target(&self, name: &[u8], depth: usize) -> bool {
    self.at.is_none_or(|d| d == depth) && name == self.tag.as_bytes()
  }

  fn next_record(&mut self) -> Result<Option<Record>> {
    loop {
      self.buf.clear();
      let (name, empty) = match self.reader.read_event_into(&mut self.buf)? {
        Event::Start(e) => (tag_name(e.local_name().as_ref()), false),
        Event::Empty(e) => (tag_name(e.local_name().as_ref()), true),
        Event::End(_) => {
          self.depth = self.depth.saturating_sub(1);
          continue;
        }
        Event::Eof => return Ok(None),
        _ => continue,
      };

      let depth = self.depth + 1;
      if self.is_target(name.as_bytes(), depth) {
        if empty {
          return Ok(Some(Record::new()));
        }
        self.depth = depth;
        return self.read_body(name).map(Some);
      }
      if !empty {
        self.depth = depth;
      }
    }
  }

  /// Read up to and including the end tag of the record just opened.
  fn read_body(&mut self, tag: String) -> Result<Record> {
    let outer = self.depth - 1;
    let mut builder = RecordBuilder::new(tag);
    loop {
      self.buf.clear();
      let event = self.reader.read_event_into(&mut self.buf)?;
      if matches!(event, Event::Eof) {
        return Err(Error::UnexpectedEof { tag: builder.tag().to_owned() });
      }
      if let Some(record) = builder.feed(&event) {
        self.depth = outer;
        return Ok(record);
      }
    }
  }
}

impl Iterator for RecordStream {
  type Item = Result<Record>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.next_record() {
      Ok(Some(record)) => {
        self.yielded += 1;
        Some(Ok(record))
      }
      Ok(None) => {
        self.done = true;
        None
      }
      Err(e) => {
        self.done = true;
        Some(Err(e))
      }
    }
  }
}

pub(crate) fn open_reader(path: &Path) -> Result<Reader<BufReader<File>>> {
  let file = File::open(path).map_err(|e| Error::Unreadable {
    path:   path.to_path_buf(),
    source: e,
  })?;
  let mut reader = Reader::from_reader(BufReader::with_capacity(READ_BUFFER, file));
  reader.config_mut().trim_text(true);
  Ok(reader)
}
