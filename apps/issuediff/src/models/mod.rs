//! Shared data models: the normalized `Issue`, its `Category`, and the
//! per-tool report structs consumed by printers.

pub mod coverity;

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
/// Coarse classification shared by all tools.
pub enum Category {
    Style,
    Error,
    Security,
    Unknown,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::Style => "STYLE",
            Category::Error => "ERROR",
            Category::Security => "SECURITY",
            Category::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STYLE" => Ok(Category::Style),
            "ERROR" => Ok(Category::Error),
            "SECURITY" => Ok(Category::Security),
            "UNKNOWN" => Ok(Category::Unknown),
            _ => Err(Error::validation(format!("unknown category '{}'", s))),
        }
    }
}

/// One normalized finding from a static-analysis tool.
///
/// Equality and hashing follow the identity contract:
/// - with a non-empty `custom_hash`, identity is the hash alone;
/// - otherwise identity is `(file, category, text, index)`.
///
/// `line` never takes part in identity, so a defect whose code moved between
/// revisions still compares equal. An issue carrying a hash never equals one
/// without, which keeps `Eq` transitive.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    file: String,
    line: u32,
    category: Category,
    text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    custom_hash: String,
    index: u32,
}

#[derive(PartialEq, Eq, Hash)]
enum Identity<'a> {
    Merge(&'a str),
    Fields(&'a str, Category, &'a str, u32),
}

impl Issue {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        category: Category,
        text: impl Into<String>,
    ) -> Self {
        Issue {
            file: file.into(),
            line,
            category,
            text: text.into(),
            custom_hash: String::new(),
            index: 0,
        }
    }

    /// Build an issue from raw captured strings, validating line and category.
    pub fn from_raw(file: &str, line: &str, category: &str, text: &str) -> Result<Self> {
        let line = parse_line(line)?;
        let category = category.parse::<Category>()?;
        Ok(Issue::new(file, line, category, text))
    }

    /// Attach a tool-supplied stable identity key.
    pub fn with_custom_hash(mut self, hash: impl Into<String>) -> Self {
        self.custom_hash = hash.into();
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn custom_hash(&self) -> Option<&str> {
        if self.custom_hash.is_empty() {
            None
        } else {
            Some(&self.custom_hash)
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Append a newline-separated continuation to the description.
    ///
    /// Changes identity for issues without a hash; stored issues must go
    /// through `IssueStore::extend_last_text` instead.
    pub fn extend_text(&mut self, more: &str) {
        self.text.push('\n');
        self.text.push_str(more);
    }

    pub(crate) fn bump_index(&mut self) {
        self.index += 1;
    }

    pub(crate) fn reset_index(&mut self) {
        self.index = 0;
    }

    fn identity(&self) -> Identity<'_> {
        if self.custom_hash.is_empty() {
            Identity::Fields(&self.file, self.category, &self.text, self.index)
        } else {
            Identity::Merge(&self.custom_hash)
        }
    }
}

fn parse_line(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| Error::validation(format!("line '{}' is not a number", raw)))
}

impl PartialEq for Issue {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Issue {}

impl Hash for Issue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} ({})\n {}",
            self.file, self.line, self.category, self.text
        )
    }
}

/// Sort issues for stable presentation: file, then line, then text.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.text.cmp(&b.text))
            .then(a.index.cmp(&b.index))
    });
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
/// What was computed for one revision.
pub enum RevisionOutcome {
    /// Every issue of the revision.
    Full { issues: Vec<Issue> },
    /// Issues added and removed relative to the previous revision.
    Diff {
        against: String,
        added: Vec<Issue>,
        removed: Vec<Issue>,
    },
    /// The revision could not be parsed.
    Failed { error: String },
}

#[derive(Serialize)]
/// Result for a single revision of one tool.
pub struct RevisionReport {
    pub revision: String,
    #[serde(flatten)]
    pub outcome: RevisionOutcome,
}

#[derive(Serialize, Default, Debug, PartialEq, Eq)]
/// Aggregated counters used by printers and exit codes.
pub struct Summary {
    pub revisions: usize,
    pub issues: usize,
    pub added: usize,
    pub removed: usize,
    pub failed: usize,
}

#[derive(Serialize)]
/// All revisions processed by one tool.
pub struct ToolReport {
    pub tool: String,
    pub revisions: Vec<RevisionReport>,
    pub summary: Summary,
}
