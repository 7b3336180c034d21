//! Quoted path codec
//!
//! Paths land in fast-export output C-style quoted whenever they contain
//! spaces, quotes, or bytes outside printable ASCII (see `quote_c_style` in
//! git's `quote.c`). A [`StreamPath`] owns the decoded bytes; quoting is a
//! surface syntax applied on the way out, so rewriting a path never has to
//! reason about escapes.

use crate::stream::StreamError;
use phf::phf_map;

/// Escape letter (as written after `\`) to the byte it denotes.
static ESCAPE_BYTES: phf::Map<char, u8> = phf_map! {
    'a' => 0x07,
    'b' => 0x08,
    't' => 0x09,
    'n' => 0x0a,
    'v' => 0x0b,
    'f' => 0x0c,
    'r' => 0x0d,
    '"' => 0x22,
    '\\' => 0x5c,
};

/// Byte to its escape letter, the reverse of [`ESCAPE_BYTES`].
static ESCAPE_LETTERS: phf::Map<u8, char> = phf_map! {
    0x07u8 => 'a',
    0x08u8 => 'b',
    0x09u8 => 't',
    0x0au8 => 'n',
    0x0bu8 => 'v',
    0x0cu8 => 'f',
    0x0du8 => 'r',
    0x22u8 => '"',
    0x5cu8 => '\\',
};

/// A repository path carried by a tree entry, stored as decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPath(Vec<u8>);

impl StreamPath {
    /// Decode a path field as it appears in the stream.
    ///
    /// Input starting with `"` must be a well-formed quoted string; anything
    /// else is taken verbatim. Zero-length input is never a valid path.
    pub fn from_quoted(s: &str) -> Result<Self, StreamError> {
        let invalid = || StreamError::InvalidPath(s.to_string());

        if s.is_empty() {
            return Err(invalid());
        }
        if !s.starts_with('"') {
            return Ok(Self(s.as_bytes().to_vec()));
        }
        if !s.ends_with('"') || s.len() < 3 {
            return Err(invalid());
        }

        let inner = &s.as_bytes()[1..s.len() - 1];
        let mut bytes = Vec::with_capacity(inner.len());
        let mut pos = 0;
        while pos < inner.len() {
            if inner[pos] != b'\\' {
                bytes.push(inner[pos]);
                pos += 1;
                continue;
            }
            let next = *inner.get(pos + 1).ok_or_else(invalid)?;
            if let Some(&byte) = ESCAPE_BYTES.get(&(next as char)) {
                bytes.push(byte);
                pos += 2;
            } else if let Some(byte) = octal_byte(inner.get(pos + 1..pos + 4)) {
                bytes.push(byte);
                pos += 4;
            } else {
                return Err(invalid());
            }
        }

        Ok(Self(bytes))
    }

    /// Take a path verbatim, no unescaping.
    pub fn from_unquoted(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encode for the stream: canonical quoted form when any byte needs
    /// escaping or the path contains a space, bare text otherwise.
    pub fn to_quoted(&self) -> String {
        let mut needs_quotes = false;
        let mut out = String::new();

        for &byte in &self.0 {
            if let Some(&letter) = ESCAPE_LETTERS.get(&byte) {
                out.push('\\');
                out.push(letter);
                needs_quotes = true;
            } else if byte < 0x20 || byte >= 0x7f {
                out.push_str(&format!("\\{byte:03o}"));
                needs_quotes = true;
            } else {
                if byte == b' ' {
                    needs_quotes = true;
                }
                out.push(byte as char);
            }
        }

        if needs_quotes { format!("\"{out}\"") } else { out }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the path lives under `dir` (component-wise, so `lib2/x`
    /// does not match `lib`).
    pub fn starts_with_dir(&self, dir: &str) -> bool {
        let prefix = [dir.as_bytes(), b"/"].concat();
        self.0.starts_with(&prefix)
    }

    /// The path relocated under `dir`.
    pub fn prefixed(&self, dir: &str) -> Self {
        Self([dir.as_bytes(), b"/", self.0.as_slice()].concat())
    }

    /// The path with the leading `dir/` removed, or `None` when the path
    /// is not under `dir`.
    pub fn strip_dir(&self, dir: &str) -> Option<Self> {
        if self.starts_with_dir(dir) {
            Some(Self(self.0[dir.len() + 1..].to_vec()))
        } else {
            None
        }
    }
}

impl std::fmt::Display for StreamPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Three octal digits as one byte; `None` when the digits are missing,
/// out of the octal alphabet, or encode a value above 255.
fn octal_byte(digits: Option<&[u8]>) -> Option<u8> {
    let digits = digits?;
    if digits.len() != 3 {
        return None;
    }

    let mut value: u16 = 0;
    for &d in digits {
        if !d.is_ascii_digit() || d > b'7' {
            return None;
        }
        value = value * 8 + u16::from(d - b'0');
    }

    u8::try_from(value).ok()
}
