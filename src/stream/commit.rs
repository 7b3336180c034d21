//! Commit directive blocks
//!
//! One commit in the stream is a run of directive lines:
//!
//! ```text
//! commit refs/heads/main
//! mark :2
//! author Ada <ada@example.com> 1700000000 +0000
//! committer Ada <ada@example.com> 1700000000 +0000
//! data 12
//! add parsing
//! from :1
//! M 100644 462f34e parse.rs
//! ```
//!
//! The block ends at stream end or at a blank line. `data` declares the
//! message length in **bytes**, and the message itself may contain anything,
//! including text that looks like directives; extraction is byte-counted,
//! never line-oriented. Author and committer lines stay opaque — nothing
//! here needs their structure.

use crate::stream::token::parse_int_strict;
use crate::stream::tree_entry::TreeEntry;
use crate::stream::{MAIN_REF, StreamError, ToStream};

/// One commit parsed from the stream.
///
/// `mark` is the process-local identity; parent edges refer to other
/// commits by mark, with index 0 the `from` parent and the rest `merge`
/// parents in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    mark: u64,
    author: String,
    committer: String,
    message: String,
    parents: Vec<u64>,
    tree: Vec<TreeEntry>,
}

impl Commit {
    pub fn new(
        mark: u64,
        author: String,
        committer: String,
        message: String,
        parents: Vec<u64>,
        tree: Vec<TreeEntry>,
    ) -> Self {
        Commit {
            mark,
            author,
            committer,
            message,
            parents,
            tree,
        }
    }

    /// Parse a single commit block; the text must contain nothing else
    /// (a final blank line is tolerated).
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        Self::parse_block(text, false).map(|(commit, _)| commit)
    }

    /// Parse one commit from the front of `text`, stopping at a blank
    /// line, and report exactly how many bytes were consumed so the caller
    /// can resume scanning immediately after.
    pub fn parse_prefix(text: &str) -> Result<(Self, usize), StreamError> {
        Self::parse_block(text, true)
    }

    fn parse_block(text: &str, allow_trailing: bool) -> Result<(Self, usize), StreamError> {
        let mut builder = CommitBuilder::default();
        let mut position = 0;

        while position < text.len() {
            if text[position..].starts_with('\n') && (allow_trailing || position == text.len() - 1)
            {
                break;
            }

            let (line, advance) = next_line(text, position)?;
            let (keyword, rest_of_line) =
                line.split_once(' ')
                    .ok_or_else(|| StreamError::MalformedDirective {
                        offset: position,
                        fragment: text[position..].chars().take(10).collect(),
                    })?;

            match keyword {
                "mark" => builder.mark = Some(parse_mark(rest_of_line)?),
                "author" => builder.author = Some(rest_of_line.to_string()),
                "committer" => builder.committer = Some(rest_of_line.to_string()),
                "data" => {
                    let declared: usize = parse_int_strict(rest_of_line)?;
                    let message = take_bytes(&text[position + advance..], declared)?;
                    builder.message = Some(message.to_string());
                    // Non-uniform advance: past the directive line, past the
                    // counted bytes, past at most one terminating newline.
                    position += advance + message.len();
                    if text[position..].starts_with('\n') {
                        position += 1;
                    }
                    continue;
                }
                "M" | "D" => builder.tree.push(TreeEntry::parse(line)?),
                "from" => builder.parents.insert(0, parse_mark(rest_of_line)?),
                "merge" => builder.parents.push(parse_mark(rest_of_line)?),
                // Ref housekeeping; everything lands on the implicit branch.
                "reset" | "commit" => {}
                _ => return Err(StreamError::UnknownKeyword(keyword.to_string())),
            }

            position += advance;
        }

        Ok((builder.build()?, position))
    }

    pub fn mark(&self) -> u64 {
        self.mark
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn committer(&self) -> &str {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[u64] {
        &self.parents
    }

    pub fn tree(&self) -> &[TreeEntry] {
        &self.tree
    }

    /// Tree mutation cannot desync the graph indices, so the rewrite
    /// engine gets direct access; parent edges stay repository-managed.
    pub(crate) fn tree_mut(&mut self) -> &mut Vec<TreeEntry> {
        &mut self.tree
    }

    pub(super) fn parents_mut(&mut self) -> &mut Vec<u64> {
        &mut self.parents
    }
}

impl ToStream for Commit {
    fn to_stream(&self) -> String {
        let mut out = format!(
            "commit {MAIN_REF}\nmark :{}\nauthor {}\ncommitter {}\ndata {}\n{}\n",
            self.mark,
            self.author,
            self.committer,
            self.message.len(),
            self.message,
        );

        for (i, parent) in self.parents.iter().enumerate() {
            let keyword = if i == 0 { "from" } else { "merge" };
            out.push_str(&format!("{keyword} :{parent}\n"));
        }
        for entry in &self.tree {
            out.push_str(&entry.to_stream());
            out.push('\n');
        }

        out
    }
}

/// Accumulates directives until the block ends; `build` enforces the
/// required fields once instead of every access reasoning about absence.
#[derive(Debug, Default)]
struct CommitBuilder {
    mark: Option<u64>,
    author: Option<String>,
    committer: Option<String>,
    message: Option<String>,
    parents: Vec<u64>,
    tree: Vec<TreeEntry>,
}

impl CommitBuilder {
    fn build(self) -> Result<Commit, StreamError> {
        Ok(Commit {
            mark: self.mark.ok_or(StreamError::MissingField("mark"))?,
            message: self.message.ok_or(StreamError::MissingField("message"))?,
            committer: self.committer.ok_or(StreamError::MissingField("committer"))?,
            author: self.author.ok_or(StreamError::MissingField("author"))?,
            parents: self.parents,
            tree: self.tree,
        })
    }
}

/// The line starting at `position` and the advance past its newline.
/// Directive lines must be newline-terminated, even the last one.
fn next_line(text: &str, position: usize) -> Result<(&str, usize), StreamError> {
    let rest = &text[position..];
    let end = rest.find('\n').ok_or_else(|| StreamError::MalformedDirective {
        offset: position,
        fragment: rest.chars().take(10).collect(),
    })?;
    Ok((&rest[..end], end + 1))
}

fn parse_mark(s: &str) -> Result<u64, StreamError> {
    let digits = s
        .strip_prefix(':')
        .ok_or_else(|| StreamError::MissingColon(s.to_string()))?;
    parse_int_strict(digits)
}

/// Slice exactly `declared` bytes of message off the front of `text`.
///
/// The count is in bytes but the text is UTF-8: start from `declared`
/// characters and shrink one character at a time until the byte length
/// matches exactly. Landing inside a multi-byte character, or a count
/// past the end of the text, can never match and fails as a
/// desynchronization.
fn take_bytes(text: &str, declared: usize) -> Result<&str, StreamError> {
    let mut candidate = match text.char_indices().nth(declared) {
        Some((end, _)) => &text[..end],
        None => text,
    };

    while candidate.len() != declared {
        match candidate.char_indices().next_back() {
            Some((end, _)) => candidate = &candidate[..end],
            None => return Err(StreamError::MessageDesync { declared }),
        }
    }

    Ok(candidate)
}
