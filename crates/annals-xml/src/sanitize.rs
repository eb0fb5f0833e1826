//! Byte-level scrubbing of raw exports into parser-safe UTF-8.
//!
//! The game writes its legends in code page 437 and happily embeds control
//! bytes that XML 1.0 forbids. The sanitizer decodes fixed-size blocks,
//! drops illegal characters, rewrites the declared encoding to UTF-8 and
//! writes the result to a temporary file that is removed when the returned
//! [`SanitizedDocument`] is dropped, on success and failure alike.

use std::{
  fs::File,
  io::{BufWriter, Read, Write},
  path::{Path, PathBuf},
};

use annals_core::sources::SourceEncoding;
use tempfile::NamedTempFile;

use crate::{
  Error, Result,
  decode::Decoder,
};

/// Block size used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

// ─── Output handle ───────────────────────────────────────────────────────────

/// A sanitized copy of a source document. The backing file is unlinked on
/// drop.
#[derive(Debug)]
pub struct SanitizedDocument {
  file:   NamedTempFile,
  source: PathBuf,
  bytes:  u64,
}

impl SanitizedDocument {
  /// Path of the sanitized copy, valid for as long as `self` lives.
  pub fn path(&self) -> &Path { self.file.path() }

  /// The raw document this copy was made from.
  pub fn source(&self) -> &Path { &self.source }

  /// Size of the sanitized copy in bytes.
  pub fn len(&self) -> u64 { self.bytes }

  pub fn is_empty(&self) -> bool { self.bytes == 0 }
}

// ─── Sanitizer ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Sanitizer {
  encoding:   SourceEncoding,
  chunk_size: usize,
}

impl Default for Sanitizer {
  fn default() -> Self { Self::new(SourceEncoding::default()) }
}

impl Sanitizer {
  pub fn new(encoding: SourceEncoding) -> Self {
    Self { encoding, chunk_size: DEFAULT_CHUNK_SIZE }
  }

  pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
    self.chunk_size = chunk_size.max(1);
    self
  }

  /// Sanitize the document at `source` into a fresh temporary file.
  pub fn sanitize(&self, source: &Path) -> Result<SanitizedDocument> {
    tracing::info!("Sanitizing {}", source.display());

    let input = File::open(source).map_err(|e| Error::Unreadable {
      path:   source.to_path_buf(),
      source: e,
    })?;

    let mut file = tempfile::Builder::new()
      .prefix("annals-")
      .suffix(".xml")
      .tempfile()?;

    let bytes = {
      let mut out = BufWriter::new(file.as_file_mut());
      let bytes = self.sanitize_stream(input, &mut out)?;
      out.flush()?;
      bytes
    };

    tracing::info!("Sanitized {} ({bytes} bytes)", source.display());
    Ok(SanitizedDocument { file, source: source.to_path_buf(), bytes })
  }

  /// Core loop: decode, scrub and re-encode `input` into `output` one block
  /// at a time. Returns the number of bytes written.
  pub fn sanitize_stream(&self, mut input: impl Read, mut output: impl Write) -> Result<u64> {
    let mut decoder = Decoder::new(self.encoding);
    let mut block = vec![0u8; self.chunk_size];
    let mut text = String::with_capacity(self.chunk_size);
    let mut first = true;
    let mut written = 0u64;

    loop {
      let n = fill_block(&mut input, &mut block)?;
      text.clear();
      if n == 0 {
        decoder.finish(&mut text);
      } else {
        decoder.decode(&block[..n], &mut text);
      }
      text.retain(is_xml_char);

      if first && !text.is_empty() {
        rewrite_declared_encoding(&mut text);
        first = false;
      }

      output.write_all(text.as_bytes())?;
      written += text.len() as u64;

      if n == 0 {
        break;
      }
    }

    Ok(written)
  }
}

/// Read until `block` is full or the input is exhausted.
fn fill_block(input: &mut impl Read, block: &mut [u8]) -> std::io::Result<usize> {
  let mut filled = 0;
  while filled < block.len() {
    match input.read(&mut block[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
      Err(e) => return Err(e),
    }
  }
  Ok(filled)
}

/// Characters permitted by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
  matches!(
    c,
    '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
  )
}

/// Replace the value of `encoding=` inside a leading `<?xml … ?>`
/// declaration with `UTF-8`.
fn rewrite_declared_encoding(text: &mut String) {
  let start = text.len() - text.trim_start_matches(['\u{FEFF}', ' ', '\t', '\r', '\n']).len();
  if !text[start..].starts_with("<?xml") {
    return;
  }
  let Some(end) = text[start..].find("?>").map(|i| start + i) else {
    return;
  };

  // ASCII lowercasing keeps byte offsets identical.
  let decl = text[start..end].to_ascii_lowercase();
  let Some(key) = decl.find("encoding") else {
    return;
  };
  let rest = &decl[key + "encoding".len()..];
  let after_eq = match rest.trim_start().strip_prefix('=') {
    Some(r) => r.trim_start(),
    None => return,
  };
  let Some(quote) = after_eq.chars().next().filter(|c| *c == '"' || *c == '\'') else {
    return;
  };
  let value_start = start + decl.len() - after_eq.len() + 1;
  let Some(value_len) = text[value_start..end].find(quote) else {
    return;
  };

  text.replace_range(value_start..value_start + value_len, "UTF-8");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn run(input: &[u8], encoding: SourceEncoding, chunk: usize) -> String {
    let mut out = Vec::new();
    Sanitizer::new(encoding)
      .with_chunk_size(chunk)
      .sanitize_stream(input, &mut out)
      .unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn strips_control_bytes_keeps_whitespace() {
    let out = run(b"<a>ur\x01ist\x1f\tx\r\n</a>", SourceEncoding::Cp437, 64);
    assert_eq!(out, "<a>urist\tx\r\n</a>");
  }

  #[test]
  fn rewrites_declared_encoding() {
    let out = run(
      b"<?xml version=\"1.0\" encoding='CP437'?>\n<df_world/>",
      SourceEncoding::Cp437,
      64,
    );
    assert_eq!(out, "<?xml version=\"1.0\" encoding='UTF-8'?>\n<df_world/>");
  }

  #[test]
  fn rewrites_any_wrong_declaration() {
    let out = run(
      b"<?xml version=\"1.0\" encoding = \"iso-8859-1\"?><x/>",
      SourceEncoding::Latin1,
      4096,
    );
    assert!(out.starts_with("<?xml version=\"1.0\" encoding = \"UTF-8\"?>"));
  }

  #[test]
  fn only_first_chunk_is_rewritten() {
    let out = run(b"<x>encoding=\"CP437\"</x>", SourceEncoding::Cp437, 4);
    assert_eq!(out, "<x>encoding=\"CP437\"</x>");
  }

  #[test]
  fn tiny_chunks_match_one_big_chunk() {
    let input = b"<df_world><n>\x81\x02\x94 \xb0\x00</n></df_world>";
    assert_eq!(
      run(input, SourceEncoding::Cp437, 3),
      run(input, SourceEncoding::Cp437, 1 << 20)
    );
  }

  #[test]
  fn missing_source_is_unreadable() {
    let err = Sanitizer::default()
      .sanitize(Path::new("/definitely/not/here.xml"))
      .unwrap_err();
    assert!(matches!(err, Error::Unreadable { .. }));
  }

  #[test]
  fn temp_copy_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("legends.xml");
    std::fs::write(&raw, b"<df_world>\x01</df_world>").unwrap();

    let doc = Sanitizer::default().sanitize(&raw).unwrap();
    let copy = doc.path().to_path_buf();
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "<df_world></df_world>");
    drop(doc);
    assert!(!copy.exists());
  }
}
