//! Pull git history between repositories, transplanting it under or out of
//! a directory prefix.
//!
//! The heavy lifting happens on the textual `git fast-export` stream: the
//! stream is parsed into an in-memory commit graph, tree paths are rewritten
//! (prefixed with a target directory, or filtered down to a source directory
//! and stripped), commits the rewrite emptied are pruned, and the result is
//! re-serialized for `git fast-import`.
//!
//! - `stream`: the export-stream grammar (paths, tree entries, commits) and
//!   the commit graph built from it
//! - `rewrite`: path remapping and pruning over the graph
//! - `git`: process gateway to the external git binary
//! - `commands`: the user-facing pull operation

pub mod commands;
pub mod git;
pub mod rewrite;
pub mod stream;
