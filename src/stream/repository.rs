//! The commit graph behind one export stream
//!
//! A [`Repository`] owns the ordered commit sequence and two derived
//! indices: mark to commit, and mark to the marks that declare it as a
//! parent (reverse edges). The indices exist only to serve lookups; all
//! mutation goes through graph-level operations that keep the sequence and
//! both indices in lockstep, so neither index is ever exposed raw.

use crate::stream::commit::Commit;
use crate::stream::{MAIN_REF, StreamError, ToStream};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Repository {
    commits: Vec<Commit>,
    /// mark -> position in `commits`
    positions: HashMap<u64, usize>,
    /// mark -> marks of commits that declare it as a parent
    referenced_by: HashMap<u64, Vec<u64>>,
}

impl Repository {
    /// Build the graph from stream text: one trailing-mode commit parse
    /// after another, resuming right past each blank separator line.
    pub fn parse(text: &str) -> Result<Self, StreamError> {
        let mut commits = Vec::new();
        let mut position = 0;

        while position < text.len() {
            let (commit, consumed) = Commit::parse_prefix(&text[position..])?;
            commits.push(commit);
            position += consumed;
            if text[position..].starts_with('\n') {
                position += 1;
            }
        }

        Ok(Self::from_commits(commits))
    }

    fn from_commits(commits: Vec<Commit>) -> Self {
        let mut positions = HashMap::new();
        let mut referenced_by: HashMap<u64, Vec<u64>> = HashMap::new();

        for (index, commit) in commits.iter().enumerate() {
            positions.insert(commit.mark(), index);
        }
        for commit in &commits {
            for &parent in commit.parents() {
                referenced_by.entry(parent).or_default().push(commit.mark());
            }
        }

        Repository {
            commits,
            positions,
            referenced_by,
        }
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub(crate) fn commits_mut(&mut self) -> std::slice::IterMut<'_, Commit> {
        self.commits.iter_mut()
    }

    /// The commit carrying `mark`, or a distinct unknown-mark error.
    pub fn get(&self, mark: u64) -> Result<&Commit, StreamError> {
        self.positions
            .get(&mark)
            .map(|&index| &self.commits[index])
            .ok_or(StreamError::UnknownMark(mark))
    }

    /// The commits that declare `mark` as a parent, in edge insertion
    /// order. Empty for an unreferenced or unknown mark; unlike [`get`],
    /// asking about a mark nobody holds is not an error.
    ///
    /// [`get`]: Repository::get
    pub fn referencing(&self, mark: u64) -> Vec<&Commit> {
        self.referenced_by
            .get(&mark)
            .into_iter()
            .flatten()
            .filter_map(|&child| self.positions.get(&child).map(|&i| &self.commits[i]))
            .collect()
    }

    /// Remove the commit from the sequence and both indices, and remove
    /// the `mark` edge from every commit that listed it as a parent. No
    /// substitute edge is inserted; callers that need the graph to stay
    /// connected must compensate (see [`compress_commit`]).
    ///
    /// [`compress_commit`]: Repository::compress_commit
    pub fn drop_commit(&mut self, mark: u64) -> Result<(), StreamError> {
        let index = *self
            .positions
            .get(&mark)
            .ok_or(StreamError::UnknownMark(mark))?;

        // Incoming edges: children forget this parent.
        if let Some(children) = self.referenced_by.remove(&mark) {
            for child in children {
                if let Some(&child_index) = self.positions.get(&child) {
                    self.commits[child_index]
                        .parents_mut()
                        .retain(|&parent| parent != mark);
                }
            }
        }

        // Outgoing edges: parents forget this child in the reverse index.
        for parent in self.commits[index].parents().to_vec() {
            if let Some(children) = self.referenced_by.get_mut(&parent) {
                children.retain(|&child| child != mark);
            }
        }

        self.commits.remove(index);
        self.positions.remove(&mark);
        for position in self.positions.values_mut() {
            if *position > index {
                *position -= 1;
            }
        }

        Ok(())
    }

    /// Elide a pass-through commit: relink every commit that referenced
    /// `mark` onto `mark`'s own parent (deduplicated, first-seen order
    /// preserved), then drop `mark`. Only a single-parent commit can be
    /// compressed; anything else is rejected.
    pub fn compress_commit(&mut self, mark: u64) -> Result<(), StreamError> {
        let target = self.get(mark)?;
        if target.parents().len() != 1 {
            return Err(StreamError::NotSingleParent {
                mark,
                parents: target.parents().len(),
            });
        }
        let grandparent = target.parents()[0];

        let children = self.referenced_by.get(&mark).cloned().unwrap_or_default();
        for child in children {
            let child_index = *self
                .positions
                .get(&child)
                .ok_or(StreamError::UnknownMark(child))?;

            let parents = self.commits[child_index].parents_mut();
            if !parents.contains(&grandparent) {
                parents.push(grandparent);
            }
            parents.retain(|&parent| parent != mark);

            let reverse = self.referenced_by.entry(grandparent).or_default();
            if !reverse.contains(&child) {
                reverse.push(child);
            }
        }

        self.drop_commit(mark)
    }
}

impl ToStream for Repository {
    fn to_stream(&self) -> String {
        let blocks: Vec<String> = self.commits.iter().map(Commit::to_stream).collect();
        format!("reset {MAIN_REF}\n{}", blocks.join("\n"))
    }
}
