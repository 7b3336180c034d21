//! Per-commit file change records
//!
//! Each `M`/`D` line inside a commit block records one file-level change:
//! a modification carrying a mode and an opaque blob reference, or a
//! deletion. The path field comes last and may contain embedded spaces, so
//! splitting is limited to the delimiters before it.

use crate::stream::path::StreamPath;
use crate::stream::token::split_limited;
use crate::stream::{StreamError, ToStream};

/// One file-level change in a commit's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry {
    Modification {
        mode: String,
        /// Opaque content reference; with `--no-data` exports this is the
        /// original blob hash and is never dereferenced here.
        blob: String,
        path: StreamPath,
    },
    Deletion {
        path: StreamPath,
    },
}

impl TreeEntry {
    /// Parse one `M`/`D` line. The leading code byte selects the variant
    /// and must be followed by a space.
    pub fn parse(line: &str) -> Result<Self, StreamError> {
        let line = line.strip_suffix('\n').unwrap_or(line);

        let mut chars = line.chars();
        let code = chars.next();
        if chars.next() != Some(' ') {
            return Err(StreamError::MalformedTreeEntry(line.to_string()));
        }

        match code {
            Some('M') => Self::parse_modification(line),
            Some('D') => Self::parse_deletion(line),
            _ => Err(StreamError::MalformedTreeEntry(line.to_string())),
        }
    }

    fn parse_modification(line: &str) -> Result<Self, StreamError> {
        match split_limited(line, 4)[..] {
            [code, mode, blob, path] => {
                if code != "M" {
                    return Err(StreamError::WrongEntryCode {
                        code: code.chars().next().unwrap_or(' '),
                        line: line.to_string(),
                    });
                }
                Ok(TreeEntry::Modification {
                    mode: mode.to_string(),
                    blob: blob.to_string(),
                    path: StreamPath::from_quoted(path)?,
                })
            }
            _ => Err(StreamError::MalformedTreeEntry(line.to_string())),
        }
    }

    fn parse_deletion(line: &str) -> Result<Self, StreamError> {
        match split_limited(line, 2)[..] {
            [code, path] => {
                if code != "D" {
                    return Err(StreamError::WrongEntryCode {
                        code: code.chars().next().unwrap_or(' '),
                        line: line.to_string(),
                    });
                }
                Ok(TreeEntry::Deletion {
                    path: StreamPath::from_quoted(path)?,
                })
            }
            _ => Err(StreamError::MalformedTreeEntry(line.to_string())),
        }
    }

    pub fn path(&self) -> &StreamPath {
        match self {
            TreeEntry::Modification { path, .. } | TreeEntry::Deletion { path } => path,
        }
    }

    /// The same entry pointing at a different path.
    pub(crate) fn with_path(self, path: StreamPath) -> Self {
        match self {
            TreeEntry::Modification { mode, blob, .. } => {
                TreeEntry::Modification { mode, blob, path }
            }
            TreeEntry::Deletion { .. } => TreeEntry::Deletion { path },
        }
    }
}

impl ToStream for TreeEntry {
    fn to_stream(&self) -> String {
        match self {
            TreeEntry::Modification { mode, blob, path } => {
                format!("M {mode} {blob} {}", path.to_quoted())
            }
            TreeEntry::Deletion { path } => format!("D {}", path.to_quoted()),
        }
    }
}
