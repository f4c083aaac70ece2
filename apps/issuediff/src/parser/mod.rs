//! Tool log parsers sharing one `Parser` contract.
//!
//! Each supported tool is a variant of the closed `Tool` set and has one
//! concrete parser:
//! - `cppcheck`: single-line regex over `[file:line]: (type) text`.
//! - `gcc`: blank-line separated blocks of compiler diagnostics.
//! - `coverity`: JSON issue/event trees, optionally keyed by merge key.
//!
//! Parsers own their `IssueStore` exclusively; separate instances never share
//! state, so they can run on different threads.

pub mod coverity;
pub mod cppcheck;
pub mod gcc;
pub mod store;

pub use coverity::Coverity;
pub use cppcheck::CppCheck;
pub use gcc::Gcc;
pub use store::{Diff, IssueStore};

use crate::error::{Error, Result};
use crate::models::Issue;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Supported analysis tools.
pub enum Tool {
    Gcc,
    CppCheck,
    Coverity,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Gcc, Tool::CppCheck, Tool::Coverity];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Gcc => "GCC",
            Tool::CppCheck => "CppCheck",
            Tool::Coverity => "Coverity",
        }
    }

    /// Log file name inside a revision directory.
    pub fn log_file(self, severity: Severity) -> String {
        match self {
            Tool::Gcc => "GCC.log".to_string(),
            Tool::CppCheck => "CppCheck.log".to_string(),
            Tool::Coverity => format!("Coverity-{}.json", severity.name()),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tool {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Tool::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<_> = Tool::ALL.iter().map(|t| t.name()).collect();
                format!("unknown tool '{}' (supported: {})", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Analyzer confidence level; selects which output document is read.
pub enum Severity {
    Low,
    Medium,
    #[default]
    High,
    Custom,
}

impl Severity {
    pub fn name(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Custom => "custom",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "custom" => Ok(Severity::Custom),
            _ => Err(format!(
                "unknown severity '{}' (expected low|medium|high|custom)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How analyzer event trees become issues.
pub enum TreeStrategy {
    /// One issue per analyzer issue, taken from its main event and keyed by
    /// the merge key.
    #[default]
    MainEvent,
    /// Every event becomes an issue; `Example` events extend the previous one.
    EventTree,
}

impl FromStr for TreeStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main-event" | "main" => Ok(TreeStrategy::MainEvent),
            "event-tree" | "tree" => Ok(TreeStrategy::EventTree),
            _ => Err(format!(
                "unknown strategy '{}' (expected main-event|event-tree)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Options threaded into every parser at construction.
pub struct ParserConfig {
    /// Keep only issues whose parent directory has this name.
    pub subsystem: Option<String>,
    pub severity: Severity,
    pub strategy: TreeStrategy,
    /// Prefix stripped from absolute analyzer paths.
    pub source_root: Option<PathBuf>,
}

impl ParserConfig {
    /// Whether a directory name passes the subsystem filter.
    pub fn keeps_dir(&self, dir: &str) -> bool {
        match self.subsystem.as_deref() {
            None => true,
            Some(want) => dir == want,
        }
    }

    /// Whether a file path passes the subsystem filter, judged on the last
    /// component of its parent directory.
    pub fn keeps_path(&self, path: &str) -> bool {
        if self.subsystem.is_none() {
            return true;
        }
        let dir = Path::new(path)
            .parent()
            .and_then(|p| p.file_name())
            .map(|d| d.to_string_lossy().to_string())
            .unwrap_or_default();
        self.keeps_dir(&dir)
    }
}

/// Contract shared by all tool parsers.
///
/// Concrete parsers provide their tool, results directory, store and log file
/// name. Line-oriented parsers provide `compile` and `parse` and inherit the
/// line loop of `run`; parsers with structured input override `run`.
pub trait Parser {
    fn tool(&self) -> Tool;
    fn resultsdir(&self) -> &Path;
    fn store(&self) -> &IssueStore;
    fn store_mut(&mut self) -> &mut IssueStore;
    fn log_file(&self) -> String;

    /// Build the parser's patterns.
    fn compile(&mut self) -> Result<()> {
        Err(Error::NotImplemented {
            tool: self.tool().name(),
            operation: "compile",
        })
    }

    /// Turn one log line into an issue, or `None` when it is not one.
    fn parse(&mut self, _line: &str) -> Result<Option<Issue>> {
        Err(Error::NotImplemented {
            tool: self.tool().name(),
            operation: "parse",
        })
    }

    /// Normalize a raw line before `parse`.
    fn clean_line<'a>(&self, line: &'a str) -> &'a str {
        line.trim()
    }

    /// Clear per-log parsing state; called before and after every run.
    fn reset(&mut self) {}

    fn log_path(&self, revision: &str) -> PathBuf {
        self.resultsdir().join(revision).join(self.log_file())
    }

    /// Parse the log of one revision into the store.
    ///
    /// A re-run replaces the revision's previous issues. On failure the
    /// revision is left absent and other revisions are untouched.
    fn run(&mut self, revision: &str) -> Result<()> {
        self.store_mut().reset(revision);
        self.reset();
        let res = read_lines_into(self, revision);
        self.reset();
        match res {
            Ok(()) => {
                tracing::info!(
                    tool = self.tool().name(),
                    revision,
                    issues = self.store().all(revision).count(),
                    "parsed revision"
                );
                Ok(())
            }
            Err(e) => {
                self.store_mut().discard(revision);
                Err(e)
            }
        }
    }

    fn add_issue(&mut self, revision: &str, issue: Issue) -> bool {
        self.store_mut().add(revision, issue)
    }

    fn get_all_issues<'a>(&'a self, revision: &str) -> Box<dyn Iterator<Item = &'a Issue> + 'a> {
        self.store().all(revision)
    }

    fn get_issues<'a>(
        &'a self,
        revision: &str,
        file: &'a str,
    ) -> Box<dyn Iterator<Item = &'a Issue> + 'a> {
        self.store().in_file(revision, file)
    }

    /// `(added, removed)` between two revisions that were already run.
    fn get_diff(&self, older: &str, newer: &str) -> Diff {
        self.store().diff(older, newer)
    }
}

fn read_lines_into<P: Parser + ?Sized>(parser: &mut P, revision: &str) -> Result<()> {
    let path = parser.log_path(revision);
    let tool = parser.tool().name();
    let io_err = |source: std::io::Error| Error::Io {
        tool,
        revision: revision.to_string(),
        path: path.clone(),
        source,
    };
    let file = File::open(&path).map_err(&io_err)?;
    let mut reader = BufReader::new(file);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).map_err(&io_err)? == 0 {
            return Ok(());
        }
        // Invalid UTF-8 spoils only its own line.
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\n', '\r']);
        let cleaned = parser.clean_line(line);
        if let Some(issue) = parser.parse(cleaned)? {
            parser.add_issue(revision, issue);
        }
    }
}

/// One parser per tool, dispatched without trait objects.
pub enum AnyParser {
    Gcc(Gcc),
    CppCheck(CppCheck),
    Coverity(Coverity),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            AnyParser::Gcc($p) => $body,
            AnyParser::CppCheck($p) => $body,
            AnyParser::Coverity($p) => $body,
        }
    };
}

impl AnyParser {
    pub fn new(tool: Tool, resultsdir: impl Into<PathBuf>, config: &ParserConfig) -> Result<Self> {
        let resultsdir = resultsdir.into();
        Ok(match tool {
            Tool::Gcc => AnyParser::Gcc(Gcc::new(resultsdir, config.clone())?),
            Tool::CppCheck => AnyParser::CppCheck(CppCheck::new(resultsdir, config.clone())?),
            Tool::Coverity => AnyParser::Coverity(Coverity::new(resultsdir, config.clone())),
        })
    }
}

impl Parser for AnyParser {
    fn tool(&self) -> Tool {
        dispatch!(self, p => p.tool())
    }

    fn resultsdir(&self) -> &Path {
        dispatch!(self, p => p.resultsdir())
    }

    fn store(&self) -> &IssueStore {
        dispatch!(self, p => p.store())
    }

    fn store_mut(&mut self) -> &mut IssueStore {
        dispatch!(self, p => p.store_mut())
    }

    fn log_file(&self) -> String {
        dispatch!(self, p => p.log_file())
    }

    fn compile(&mut self) -> Result<()> {
        dispatch!(self, p => p.compile())
    }

    fn parse(&mut self, line: &str) -> Result<Option<Issue>> {
        dispatch!(self, p => p.parse(line))
    }

    fn clean_line<'a>(&self, line: &'a str) -> &'a str {
        dispatch!(self, p => p.clean_line(line))
    }

    fn reset(&mut self) {
        dispatch!(self, p => p.reset())
    }

    fn run(&mut self, revision: &str) -> Result<()> {
        dispatch!(self, p => p.run(revision))
    }
}
