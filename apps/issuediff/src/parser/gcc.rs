//! Compiler warning parser.
//!
//! A diagnostic spans several physical lines (context, the diagnostic itself,
//! source excerpt, caret) and blocks are separated by blank lines. Lines are
//! buffered by `BlockBuffer` until a blank line completes the block; the block
//! is then searched for the diagnostic and the buffer starts over whatever
//! the outcome.
//!
//! Within a block the first line is context and never the diagnostic. The
//! remaining lines are tried against
//! `dir/file:line:col: kind: message [-Wflag]`, and only when no line has a
//! flag against the same shape without it.

use super::{IssueStore, Parser, ParserConfig, Tool};
use crate::classify::gcc_category;
use crate::error::Result;
use crate::models::Issue;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

const WITH_FLAG: &str = r"^(?P<path>(?:[^\s:]*/)?(?P<dir>[^/\s:]+)/[^/\s:]+):(?P<line>\d+):(?P<col>\d+): (?P<kind>warning|error|fatal error): (?P<msg>.*) \[(?P<flag>-W[^\]]+)\]$";
const WITHOUT_FLAG: &str = r"^(?P<path>(?:[^\s:]*/)?(?P<dir>[^/\s:]+)/[^/\s:]+):(?P<line>\d+):(?P<col>\d+): (?P<kind>warning|error|fatal error): (?P<msg>.*)$";

/// Lines printed by the build wrapper before any compiler output.
pub const HEADER_LINES: [&str; 2] = ["Compiling sources...", "Build warnings:"];

/// Accumulates non-blank lines; a blank line flushes the block.
///
/// Single state (accumulating) with one transition (blank line: emit the
/// buffer and start empty). Header lines are swallowed without touching the
/// buffer.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    lines: Vec<String>,
}

impl BlockBuffer {
    /// Feed one line; returns the completed block on a blank line. The block
    /// may be empty when blank lines follow each other.
    pub fn feed(&mut self, line: &str) -> Option<Vec<String>> {
        let trimmed = line.trim();
        if HEADER_LINES.contains(&trimmed) {
            return None;
        }
        if trimmed.is_empty() {
            return Some(std::mem::take(&mut self.lines));
        }
        self.lines.push(line.to_string());
        None
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

pub struct Gcc {
    resultsdir: PathBuf,
    config: ParserConfig,
    store: IssueStore,
    buffer: BlockBuffer,
    with_flag: Option<Regex>,
    without_flag: Option<Regex>,
}

impl Gcc {
    pub fn new(resultsdir: PathBuf, config: ParserConfig) -> Result<Self> {
        let mut gcc = Gcc {
            resultsdir,
            config,
            store: IssueStore::new(),
            buffer: BlockBuffer::default(),
            with_flag: None,
            without_flag: None,
        };
        gcc.compile()?;
        Ok(gcc)
    }

    /// Find the diagnostic of a completed block.
    fn extract(&self, block: &[String]) -> Option<Issue> {
        let (caps, flag) = match first_match(self.with_flag.as_ref()?, block) {
            Some(c) => {
                let flag = c.name("flag").map(|m| m.as_str().to_string());
                (c, flag)
            }
            None => (first_match(self.without_flag.as_ref()?, block)?, None),
        };
        if !self.config.keeps_dir(&caps["dir"]) {
            tracing::debug!(dir = &caps["dir"], "block outside subsystem dropped");
            return None;
        }
        let category = gcc_category(flag.as_deref());
        Issue::from_raw(&caps["path"], &caps["line"], category.name(), &caps["msg"]).ok()
    }
}

fn first_match<'b>(re: &Regex, block: &'b [String]) -> Option<Captures<'b>> {
    block.iter().skip(1).find_map(|l| re.captures(l))
}

impl Parser for Gcc {
    fn tool(&self) -> Tool {
        Tool::Gcc
    }

    fn resultsdir(&self) -> &Path {
        &self.resultsdir
    }

    fn store(&self) -> &IssueStore {
        &self.store
    }

    fn store_mut(&mut self) -> &mut IssueStore {
        &mut self.store
    }

    fn log_file(&self) -> String {
        self.tool().log_file(self.config.severity)
    }

    fn compile(&mut self) -> Result<()> {
        self.with_flag = Some(Regex::new(WITH_FLAG)?);
        self.without_flag = Some(Regex::new(WITHOUT_FLAG)?);
        Ok(())
    }

    // Indentation of source excerpts is kept; only line endings go.
    fn clean_line<'a>(&self, line: &'a str) -> &'a str {
        line.trim_end()
    }

    fn parse(&mut self, line: &str) -> Result<Option<Issue>> {
        match self.buffer.feed(line) {
            Some(block) => Ok(self.extract(&block)),
            None => Ok(None),
        }
    }

    fn reset(&mut self) {
        if !self.buffer.is_empty() {
            tracing::debug!(
                lines = self.buffer.len(),
                "discarding block without terminating blank line"
            );
        }
        self.buffer.clear();
    }
}
