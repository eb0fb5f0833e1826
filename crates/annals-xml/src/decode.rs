//! Byte → text decoding for the encodings the exporter is known to write.

use annals_core::sources::SourceEncoding;

/// Upper half of IBM code page 437 (0x80..=0xFF). The lower half is ASCII.
const CP437_HIGH: [char; 128] = [
  'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
  'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
  'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
  '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
  '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
  '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
  'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
  '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

fn cp437(b: u8) -> char {
  if b < 0x80 { b as char } else { CP437_HIGH[usize::from(b - 0x80)] }
}

/// Streaming decoder. Single-byte encodings decode every chunk on its own;
/// UTF-8 carries an incomplete trailing sequence over to the next chunk.
pub(crate) struct Decoder {
  encoding: SourceEncoding,
  pending:  Vec<u8>,
}

impl Decoder {
  pub(crate) fn new(encoding: SourceEncoding) -> Self {
    Self { encoding, pending: Vec::new() }
  }

  pub(crate) fn decode(&mut self, chunk: &[u8], out: &mut String) {
    match self.encoding {
      SourceEncoding::Cp437 => out.extend(chunk.iter().copied().map(cp437)),
      SourceEncoding::Latin1 => out.extend(chunk.iter().copied().map(char::from)),
      SourceEncoding::Utf8 => {
        self.pending.extend_from_slice(chunk);
        let keep = incomplete_tail(&self.pending);
        let split = self.pending.len() - keep;
        out.push_str(&String::from_utf8_lossy(&self.pending[..split]));
        self.pending.drain(..split);
      }
    }
  }

  /// Flush anything still buffered at end of input.
  pub(crate) fn finish(&mut self, out: &mut String) {
    if !self.pending.is_empty() {
      out.push_str(&String::from_utf8_lossy(&self.pending));
      self.pending.clear();
    }
  }
}

/// Length of a truncated multi-byte sequence at the end of `bytes`, if any.
fn incomplete_tail(bytes: &[u8]) -> usize {
  match std::str::from_utf8(bytes) {
    Ok(_) => 0,
    Err(e) if e.error_len().is_none() => bytes.len() - e.valid_up_to(),
    Err(_) => {
      // An invalid sequence earlier on; only the last few bytes can still be
      // the start of a valid character.
      let start = bytes.len().saturating_sub(3);
      (start..bytes.len())
        .find(|&i| {
          let lead = bytes[i];
          let width = match lead {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return false,
          };
          bytes.len() - i < width
        })
        .map_or(0, |i| bytes.len() - i)
    }
  }
}
