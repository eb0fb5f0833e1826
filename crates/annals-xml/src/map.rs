//! Subtree → [`Record`] mapping.
//!
//! [`RecordBuilder`] is fed the reader events that follow a record's start
//! tag and hands back the finished record when that element closes. It keeps
//! one frame per open element, so its footprint is the depth of the record,
//! never the size of the document.

use std::borrow::Cow;

use annals_core::{Node, Record};
use quick_xml::{
  Reader,
  events::{BytesText, Event},
};

use crate::{Error, Result};

struct Frame {
  name:         String,
  record:       Record,
  text:         String,
  has_children: bool,
}

impl Frame {
  fn new(name: String) -> Self {
    Self { name, record: Record::new(), text: String::new(), has_children: false }
  }

  /// A leaf becomes its text; an element with children becomes a map and
  /// any mixed-in text is dropped.
  fn into_node(self) -> (String, Node) {
    let node = if self.has_children {
      Node::Map(self.record)
    } else {
      Node::Scalar(self.text)
    };
    (self.name, node)
  }
}

/// Incremental builder for one record.
pub struct RecordBuilder {
  stack: Vec<Frame>,
}

impl RecordBuilder {
  /// Start a record whose own start tag (named `tag`) was just read.
  pub fn new(tag: impl Into<String>) -> Self {
    Self { stack: vec![Frame::new(tag.into())] }
  }

  /// Consume one event. Returns the record once its end tag arrives.
  pub fn feed(&mut self, event: &Event<'_>) -> Option<Record> {
    match event {
      Event::Start(e) => self.open(tag_name(e.local_name().as_ref())),
      Event::Empty(e) => {
        self.open(tag_name(e.local_name().as_ref()));
        self.close();
      }
      Event::Text(e) => self.text(&text_of(e)),
      Event::CData(e) => self.text(&String::from_utf8_lossy(e)),
      Event::End(_) => {
        if self.stack.len() == 1 {
          return self.stack.pop().map(|root| root.record);
        }
        self.close();
      }
      _ => {}
    }
    None
  }

  fn open(&mut self, name: String) {
    if let Some(top) = self.stack.last_mut() {
      top.has_children = true;
    }
    self.stack.push(Frame::new(name));
  }

  fn text(&mut self, text: &str) {
    if let Some(top) = self.stack.last_mut() {
      top.text.push_str(text);
    }
  }

  fn close(&mut self) {
    if self.stack.len() < 2 {
      return;
    }
    if let Some(frame) = self.stack.pop() {
      let (name, node) = frame.into_node();
      if let Some(parent) = self.stack.last_mut() {
        parent.record.insert(name, node);
      }
    }
  }

  /// Name of the element this builder is collecting.
  pub fn tag(&self) -> &str {
    self.stack.first().map_or("", |f| f.name.as_str())
  }
}

pub(crate) fn tag_name(raw: &[u8]) -> String {
  String::from_utf8_lossy(raw).into_owned()
}

/// Unescaped text, falling back to the raw bytes when an entity is unknown.
pub(crate) fn text_of<'a>(e: &'a BytesText<'_>) -> Cow<'a, str> {
  match e.unescape() {
    Ok(text) => text,
    Err(_) => String::from_utf8_lossy(e),
  }
}

/// Map a single element given as text, e.g. one `<historical_figure>`.
pub fn map_element(xml: &str) -> Result<Record> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut builder: Option<RecordBuilder> = None;
  loop {
    let event = reader.read_event()?;
    if let Some(b) = builder.as_mut() {
      if matches!(event, Event::Eof) {
        return Err(Error::UnexpectedEof { tag: b.tag().to_owned() });
      }
      if let Some(record) = b.feed(&event) {
        return Ok(record);
      }
      continue;
    }
    match event {
      Event::Start(e) => builder = Some(RecordBuilder::new(tag_name(e.local_name().as_ref()))),
      Event::Empty(_) => return Ok(Record::new()),
      Event::Eof => return Err(Error::UnexpectedEof { tag: String::new() }),
      _ => {}
    }
  }
}
