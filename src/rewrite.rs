//! Path rewriting over the commit graph
//!
//! Two mutually exclusive mappings, matching the two directions history
//! moves between repositories:
//!
//! - **target-dir**: every path in every commit is relocated under the
//!   directory; nothing is dropped.
//! - **source-dir**: only paths under the directory survive, stripped of
//!   the prefix; commits the filter empties are then pruned to a fixed
//!   point.
//!
//! Pruning only ever drops a commit that is parentless or unreferenced, so
//! no parent edge ever needs reattaching; a pass-through commit elision
//! (`compress_commit`) is deliberately not used here.

use crate::stream::repository::Repository;
use crate::stream::{StreamError, ToStream};
use anyhow::bail;
use tracing::{debug, info};

#[derive(Clone, Copy)]
enum Mapping<'a> {
    IntoDir(&'a str),
    FromDir(&'a str),
}

/// A parsed stream ready to have its paths rewritten.
pub struct Rewrite {
    repository: Repository,
}

impl Rewrite {
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        Ok(Rewrite {
            repository: Repository::parse(text)?,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Apply one of the two mappings and return the rewritten stream
    /// text. Exactly one of `target_dir`/`source_dir` must be given.
    pub fn rewrite_paths(
        &mut self,
        target_dir: Option<&str>,
        source_dir: Option<&str>,
    ) -> anyhow::Result<String> {
        let mapping = match (target_dir, source_dir) {
            (Some(_), Some(_)) => bail!("source-dir and target-dir are mutually exclusive"),
            (None, None) => bail!("must specify one of source-dir and target-dir"),
            (Some(target), None) => Mapping::IntoDir(target),
            (None, Some(source)) => Mapping::FromDir(source),
        };

        for commit in self.repository.commits_mut() {
            let tree = commit.tree_mut();
            *tree = std::mem::take(tree)
                .into_iter()
                .filter_map(|entry| match mapping {
                    Mapping::IntoDir(dir) => {
                        let path = entry.path().prefixed(dir);
                        Some(entry.with_path(path))
                    }
                    Mapping::FromDir(dir) => entry
                        .path()
                        .strip_dir(dir)
                        .map(|path| entry.with_path(path)),
                })
                .collect();
        }

        if let Mapping::FromDir(_) = mapping {
            self.prune_emptied_commits()?;
        }

        Ok(self.repository.to_stream())
    }

    /// Drop commits the path filter emptied, to a fixed point.
    ///
    /// Every drop restarts the scan from the first commit: cutting an edge
    /// can expose a new candidate anywhere in the sequence. Eligible means
    /// an empty tree on a commit that is parentless (children just lose
    /// the edge) or that nobody references (an abandoned head).
    fn prune_emptied_commits(&mut self) -> Result<(), StreamError> {
        let mut pass = 0;
        loop {
            pass += 1;
            debug!(pass, "pruning scan");

            let candidate = self.repository.commits().iter().find(|commit| {
                commit.tree().is_empty()
                    && (commit.parents().is_empty()
                        || self.repository.referencing(commit.mark()).is_empty())
            });

            match candidate.map(|commit| (commit.mark(), commit.message().to_string())) {
                Some((mark, message)) => {
                    info!(mark, message = message.trim_end(), "dropping emptied commit");
                    self.repository.drop_commit(mark)?;
                }
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::commit::Commit;

    /// The three-commit chain where only commit B touches `lib/`:
    /// A (no parent, files outside lib) <- B (adds lib/a.txt) <- C (other).
    const CHAIN: &str = "commit refs/heads/main\n\
                         mark :1\n\
                         author a\n\
                         committer c\n\
                         data 2\n\
                         A\n\
                         M 100644 aaaa README.md\n\
                         \n\
                         commit refs/heads/main\n\
                         mark :2\n\
                         author a\n\
                         committer c\n\
                         data 2\n\
                         B\n\
                         from :1\n\
                         M 100644 bbbb lib/a.txt\n\
                         \n\
                         commit refs/heads/main\n\
                         mark :3\n\
                         author a\n\
                         committer c\n\
                         data 2\n\
                         C\n\
                         from :2\n\
                         M 100644 cccc other.txt\n";

    #[test]
    fn requires_exactly_one_mapping() {
        let mut rewrite = Rewrite::parse(CHAIN).unwrap();
        assert!(rewrite.rewrite_paths(None, None).is_err());
        assert!(rewrite.rewrite_paths(Some("lib"), Some("lib")).is_err());
    }

    #[test]
    fn target_dir_prefixes_every_path_and_drops_nothing() {
        let mut rewrite = Rewrite::parse(CHAIN).unwrap();
        let out = rewrite.rewrite_paths(Some("vendor"), None).unwrap();

        assert_eq!(rewrite.repository().commits().len(), 3);
        assert!(out.contains("M 100644 aaaa vendor/README.md\n"));
        assert!(out.contains("M 100644 bbbb vendor/lib/a.txt\n"));
        assert!(out.contains("M 100644 cccc vendor/other.txt\n"));
    }

    #[test]
    fn source_dir_strips_filters_and_prunes_to_one_commit() {
        let mut rewrite = Rewrite::parse(CHAIN).unwrap();
        let out = rewrite.rewrite_paths(None, Some("lib")).unwrap();

        // A empties and is parentless; C empties and is an unreferenced
        // head; B survives alone, stripped and orphaned.
        let commits = rewrite.repository().commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].mark(), 2);
        assert!(commits[0].parents().is_empty());
        assert_eq!(commits[0].tree()[0].path().as_bytes(), b"a.txt");

        assert_eq!(
            out,
            "reset refs/heads/main\n\
             commit refs/heads/main\n\
             mark :2\n\
             author a\n\
             committer c\n\
             data 2\n\
             B\n\
             \n\
             M 100644 bbbb a.txt\n"
        );
    }

    #[test]
    fn source_dir_matching_is_component_wise() {
        let text = "commit refs/heads/main\n\
                    mark :1\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    A\n\
                    M 100644 aaaa lib/a.txt\n\
                    M 100644 bbbb library/b.txt\n\
                    D lib/c.txt\n";
        let mut rewrite = Rewrite::parse(text).unwrap();
        rewrite.rewrite_paths(None, Some("lib")).unwrap();

        let tree = rewrite.repository().commits()[0].tree();
        let paths: Vec<&[u8]> = tree.iter().map(|e| e.path().as_bytes()).collect();
        assert_eq!(paths, vec![b"a.txt".as_slice(), b"c.txt".as_slice()]);
    }

    #[test]
    fn pruning_keeps_referenced_empty_commits_with_parents() {
        // Only a parentless or unreferenced empty commit is prunable; an
        // empty commit in the middle of the chain stays.
        let text = "commit refs/heads/main\n\
                    mark :1\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    A\n\
                    M 100644 aaaa lib/base.txt\n\
                    \n\
                    commit refs/heads/main\n\
                    mark :2\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    B\n\
                    from :1\n\
                    M 100644 bbbb other.txt\n\
                    \n\
                    commit refs/heads/main\n\
                    mark :3\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    C\n\
                    from :2\n\
                    M 100644 cccc lib/leaf.txt\n";
        let mut rewrite = Rewrite::parse(text).unwrap();
        rewrite.rewrite_paths(None, Some("lib")).unwrap();

        // :2 emptied but is referenced by :3 and has parent :1, so the
        // chain survives intact apart from path stripping.
        let marks: Vec<u64> = rewrite
            .repository()
            .commits()
            .iter()
            .map(Commit::mark)
            .collect();
        assert_eq!(marks, vec![1, 2, 3]);
        assert_eq!(rewrite.repository().get(2).unwrap().parents(), &[1]);
    }

    #[test]
    fn pruning_cascades_through_exposed_heads() {
        // Dropping the emptied head :3 leaves :2 an unreferenced empty
        // head, which the restarted scan then catches, and so on down.
        let text = "commit refs/heads/main\n\
                    mark :1\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    A\n\
                    M 100644 aaaa lib/keep.txt\n\
                    \n\
                    commit refs/heads/main\n\
                    mark :2\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    B\n\
                    from :1\n\
                    M 100644 bbbb stray.txt\n\
                    \n\
                    commit refs/heads/main\n\
                    mark :3\n\
                    author a\n\
                    committer c\n\
                    data 2\n\
                    C\n\
                    from :2\n\
                    M 100644 cccc also-stray.txt\n";
        let mut rewrite = Rewrite::parse(text).unwrap();
        rewrite.rewrite_paths(None, Some("lib")).unwrap();

        let marks: Vec<u64> = rewrite
            .repository()
            .commits()
            .iter()
            .map(Commit::mark)
            .collect();
        assert_eq!(marks, vec![1]);
        assert_eq!(
            rewrite.repository().get(1).unwrap().tree()[0]
                .path()
                .as_bytes(),
            b"keep.txt"
        );
    }
}
