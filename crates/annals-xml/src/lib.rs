//! XML side of the Annals importer.
//!
//! Pipeline:
//!   raw bytes (legacy encoding, stray control bytes)
//!     └─ Sanitizer          → temp file, UTF-8, XML 1.0 legal
//!          └─ RecordStream  → one `Record` per repeated element, lazily
//!               └─ RecordBuilder → generic tree, no schema knowledge
//!
//! Everything here is synchronous and bounded in memory by nesting depth,
//! never by document size.

mod decode;
pub mod error;
mod extract;
mod header;
mod map;
mod sanitize;

pub use error::{Error, Result};
pub use extract::{RECORD_DEPTH, RecordStream};
pub use header::read_world_header;
pub use map::{RecordBuilder, map_element};
pub use sanitize::{DEFAULT_CHUNK_SIZE, SanitizedDocument, Sanitizer};
