//! Per-revision issue storage with index disambiguation and set diffing.

use crate::models::Issue;
use std::collections::{HashMap, HashSet};

/// Issues added and removed between two revisions.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Diff {
    pub added: HashSet<Issue>,
    pub removed: HashSet<Issue>,
}

/// Mapping from revision key to the set of issues found in it.
///
/// Within one revision no two stored issues compare equal. The most recently
/// stored issue is remembered as the target of `extend_last_text`.
#[derive(Debug, Default)]
pub struct IssueStore {
    issues: HashMap<String, HashSet<Issue>>,
    last: Option<(String, Issue)>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the revision over with an empty set.
    pub fn reset(&mut self, revision: &str) {
        self.issues.insert(revision.to_string(), HashSet::new());
        self.forget_last_in(revision);
    }

    /// Drop everything stored for the revision.
    pub fn discard(&mut self, revision: &str) {
        self.issues.remove(revision);
        self.forget_last_in(revision);
    }

    fn forget_last_in(&mut self, revision: &str) {
        if self.last.as_ref().is_some_and(|(rev, _)| rev == revision) {
            self.last = None;
        }
    }

    pub fn contains(&self, revision: &str) -> bool {
        self.issues.contains_key(revision)
    }

    /// Insert an issue, bumping its index until it no longer collides.
    ///
    /// An issue whose merge key is already stored is the same defect seen
    /// twice; it is not inserted and `false` is returned. The stored one
    /// becomes the last issue.
    pub fn add(&mut self, revision: &str, mut issue: Issue) -> bool {
        let set = self.issues.entry(revision.to_string()).or_default();
        if issue.custom_hash().is_some() {
            if let Some(existing) = set.get(&issue) {
                tracing::debug!(
                    revision,
                    merge_key = issue.custom_hash().unwrap_or_default(),
                    "duplicate merge key in revision; keeping first report"
                );
                self.last = Some((revision.to_string(), existing.clone()));
                return false;
            }
        } else {
            while set.contains(&issue) {
                issue.bump_index();
            }
        }
        set.insert(issue.clone());
        self.last = Some((revision.to_string(), issue));
        true
    }

    pub fn last(&self) -> Option<&Issue> {
        self.last.as_ref().map(|(_, issue)| issue)
    }

    /// Append text to the most recently stored issue of `revision`.
    ///
    /// The issue is taken out of its set, extended, re-disambiguated and put
    /// back, so the set never holds an entry under a stale identity. Returns
    /// `false` when the revision has no last issue.
    pub fn extend_last_text(&mut self, revision: &str, more: &str) -> bool {
        if !self.last.as_ref().is_some_and(|(rev, _)| rev == revision) {
            return false;
        }
        let Some((revision, last)) = self.last.take() else {
            return false;
        };
        let set = self.issues.entry(revision.clone()).or_default();
        let mut issue = set.take(&last).unwrap_or(last);
        issue.extend_text(more);
        if issue.custom_hash().is_none() {
            // the old index disambiguated the old text
            issue.reset_index();
            while set.contains(&issue) {
                issue.bump_index();
            }
        }
        set.insert(issue.clone());
        self.last = Some((revision, issue));
        true
    }

    /// All issues of a revision; empty when the revision was never run.
    pub fn all<'a>(&'a self, revision: &str) -> Box<dyn Iterator<Item = &'a Issue> + 'a> {
        match self.issues.get(revision) {
            Some(set) => Box::new(set.iter()),
            None => Box::new(std::iter::empty()),
        }
    }

    /// Issues of a revision reported against one file.
    pub fn in_file<'a>(
        &'a self,
        revision: &str,
        file: &'a str,
    ) -> Box<dyn Iterator<Item = &'a Issue> + 'a> {
        Box::new(self.all(revision).filter(move |i| i.file() == file))
    }

    /// Set difference under the identity contract, never positional.
    pub fn diff(&self, older: &str, newer: &str) -> Diff {
        let empty = HashSet::new();
        let old = self.issues.get(older).unwrap_or(&empty);
        let new = self.issues.get(newer).unwrap_or(&empty);
        Diff {
            added: new.difference(old).cloned().collect(),
            removed: old.difference(new).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn style(file: &str, line: u32, text: &str) -> Issue {
        Issue::new(file, line, Category::Style, text)
    }

    #[test]
    fn test_identical_issues_get_distinct_indexes() {
        let mut store = IssueStore::new();
        assert!(store.add("r1", style("a.c", 1, "same")));
        assert!(store.add("r1", style("a.c", 5, "same")));
        let mut idx: Vec<u32> = store.all("r1").map(|i| i.index()).collect();
        idx.sort();
        assert_eq!(idx, vec![0, 1]);
    }

    #[test]
    fn test_unknown_revision_yields_nothing() {
        let store = IssueStore::new();
        assert_eq!(store.all("never").count(), 0);
        assert_eq!(store.in_file("never", "a.c").count(), 0);
    }

    #[test]
    fn test_in_file_filters() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 1, "x"));
        store.add("r1", style("b.c", 1, "x"));
        let files: Vec<_> = store.in_file("r1", "b.c").map(|i| i.file()).collect();
        assert_eq!(files, vec!["b.c"]);
    }

    #[test]
    fn test_diff_ignores_moved_lines() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 10, "kept"));
        store.add("r1", style("a.c", 20, "fixed"));
        store.add("r2", style("a.c", 42, "kept"));
        store.add("r2", style("b.c", 3, "new"));
        let d = store.diff("r1", "r2");
        assert_eq!(d.added.len(), 1);
        assert!(d.added.contains(&style("b.c", 0, "new")));
        assert_eq!(d.removed.len(), 1);
        assert!(d.removed.contains(&style("a.c", 0, "fixed")));
    }

    #[test]
    fn test_diff_is_antisymmetric_and_self_diff_empty() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 1, "x"));
        store.add("r1", style("a.c", 2, "x"));
        store.add("r2", style("a.c", 1, "x"));
        store.add("r2", style("c.c", 1, "y"));
        let forward = store.diff("r1", "r2");
        let backward = store.diff("r2", "r1");
        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.removed, backward.added);
        // the second copy of "x" disappeared
        assert_eq!(forward.removed.len(), 1);
        assert_eq!(store.diff("r1", "r1"), Diff::default());
    }

    #[test]
    fn test_duplicate_merge_key_is_not_stored_twice() {
        let mut store = IssueStore::new();
        assert!(store.add("r1", style("a.c", 1, "x").with_custom_hash("K1")));
        assert!(!store.add("r1", style("b.c", 2, "y").with_custom_hash("K1")));
        assert_eq!(store.all("r1").count(), 1);
        assert_eq!(store.last().map(|i| i.file()), Some("a.c"));
    }

    #[test]
    fn test_extend_last_text_keeps_set_consistent() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 1, "base"));
        store.add("r1", style("a.c", 2, "base\nmore"));
        // stored with index 1; after extension it must not land on index 0
        store.add("r1", style("a.c", 3, "base"));
        assert!(store.extend_last_text("r1", "more"));
        let texts: Vec<(String, u32)> = store
            .all("r1")
            .map(|i| (i.text().to_string(), i.index()))
            .collect();
        assert_eq!(texts.len(), 3);
        assert!(texts.contains(&("base".to_string(), 0)));
        assert!(texts.contains(&("base\nmore".to_string(), 0)));
        assert!(texts.contains(&("base\nmore".to_string(), 1)));
        assert_eq!(store.last().map(|i| i.line()), Some(3));
    }

    #[test]
    fn test_extended_issue_restarts_index_search() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 1, "base"));
        store.add("r1", style("a.c", 2, "base"));
        assert!(store.extend_last_text("r1", "Example 1: x"));
        store.add("r2", style("a.c", 2, "base"));
        assert!(store.extend_last_text("r2", "Example 1: x"));

        let extended = store.last().map(|i| (i.text().to_string(), i.index()));
        assert_eq!(extended, Some(("base\nExample 1: x".to_string(), 0)));
        let d = store.diff("r1", "r2");
        assert!(d.added.is_empty());
        assert_eq!(d.removed.len(), 1);
        assert!(d.removed.contains(&style("a.c", 0, "base")));
    }

    #[test]
    fn test_extend_without_last_issue() {
        let mut store = IssueStore::new();
        assert!(!store.extend_last_text("r1", "orphan"));
        store.add("r1", style("a.c", 1, "x"));
        assert!(!store.extend_last_text("r2", "other revision"));
        assert_eq!(store.last().map(|i| i.text()), Some("x"));
    }

    #[test]
    fn test_reset_and_discard() {
        let mut store = IssueStore::new();
        store.add("r1", style("a.c", 1, "x"));
        store.add("r2", style("a.c", 1, "x"));
        store.reset("r1");
        assert!(store.contains("r1"));
        assert_eq!(store.all("r1").count(), 0);
        assert_eq!(store.all("r2").count(), 1);
        store.discard("r2");
        assert!(!store.contains("r2"));
        assert!(store.last().is_none());
    }
}
