//! The `git fast-export` stream grammar
//!
//! Fast-export transfers history as plain text: a sequence of commit
//! directive blocks separated by blank lines, each carrying an identity
//! mark, raw author/committer lines, a byte-counted message, parent edges,
//! and file-level tree entries. This module parses that grammar into owned
//! values and serializes them back:
//!
//! - `token`: strict integer parsing and limited field splitting
//! - `path`: the C-style quoted path codec
//! - `tree_entry`: modification/deletion records
//! - `commit`: one commit's directive block
//! - `repository`: the ordered commit sequence with its graph indices
//!
//! Only metadata is modeled (`fast-export --no-data`): blob references stay
//! opaque, and ref names collapse onto the single branch in [`MAIN_REF`].

use thiserror::Error;

pub mod commit;
pub mod path;
pub mod repository;
pub mod token;
pub mod tree_entry;

/// The one branch the stream is replayed onto. Incoming ref names are
/// ignored; serialization always targets this ref.
pub const MAIN_REF: &str = "refs/heads/main";

/// Everything that can go wrong while reading or mutating a stream.
///
/// Parse failures are fatal: the offending fragment is carried in the
/// variant and nothing is recovered. `UnknownMark` is distinct from an
/// empty reverse-index lookup, which is not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("invalid path {0:?}")]
    InvalidPath(String),

    #[error("unable to parse tree entry {0:?}")]
    MalformedTreeEntry(String),

    #[error("wrong code {code:?} in tree entry {line:?}")]
    WrongEntryCode { code: char, line: String },

    #[error("{0:?} is not a canonical integer")]
    NonCanonicalInt(String),

    #[error("expected {0:?} to start with ':'")]
    MissingColon(String),

    #[error("no directive at offset {offset}: {fragment:?}")]
    MalformedDirective { offset: usize, fragment: String },

    #[error("handling for keyword {0:?} not implemented")]
    UnknownKeyword(String),

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("failed to sync message of {declared} bytes, bad encoding")]
    MessageDesync { declared: usize },

    #[error("commit with mark :{0} not found")]
    UnknownMark(u64),

    #[error("only single-parent commits can be compressed, :{mark} has {parents}")]
    NotSingleParent { mark: u64, parents: usize },
}

/// Serialization back into export-stream text.
pub trait ToStream {
    fn to_stream(&self) -> String;
}
