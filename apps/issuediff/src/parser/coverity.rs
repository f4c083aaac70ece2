//! Analyzer parser for tree-structured JSON output.
//!
//! Two strategies turn an analyzer issue into `Issue`s:
//! - `MainEvent`: the event flagged `main` supplies file, line and text, and
//!   the issue's `mergeKey` becomes the custom hash. Identity across
//!   revisions then comes from the analyzer itself.
//! - `EventTree`: depth-first walk of every event. Events whose description
//!   starts with `Example` extend the previous issue; all others become
//!   issues carrying the parent issue's category.
//!
//! The severity level only chooses which document is opened.

use super::{IssueStore, Parser, ParserConfig, Tool, TreeStrategy};
use crate::classify::coverity_category;
use crate::error::{Error, Result};
use crate::models::coverity::{Document, Event};
use crate::models::{Category, Issue};
use std::fs;
use std::path::{Path, PathBuf};

const EXAMPLE_MARKER: &str = "Example";

pub struct Coverity {
    resultsdir: PathBuf,
    config: ParserConfig,
    store: IssueStore,
}

impl Coverity {
    pub fn new(resultsdir: PathBuf, config: ParserConfig) -> Self {
        Coverity {
            resultsdir,
            config,
            store: IssueStore::new(),
        }
    }

    fn load(&self, revision: &str) -> Result<Document> {
        let path = self.log_path(revision);
        let tool = self.tool().name();
        let data = fs::read_to_string(&path).map_err(|source| Error::Io {
            tool,
            revision: revision.to_string(),
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| Error::Schema {
            tool,
            revision: revision.to_string(),
            path,
            source,
        })
    }

    /// Make absolute paths relative to the configured source root.
    fn normalize_path(&self, raw: &str) -> String {
        let Some(root) = self.config.source_root.as_deref() else {
            return raw.to_string();
        };
        let path = Path::new(raw);
        if !path.is_absolute() || !path.starts_with(root) {
            return raw.to_string();
        }
        pathdiff::diff_paths(path, root)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| raw.to_string())
    }

    fn ingest_main_events(&mut self, revision: &str, doc: &Document) {
        for issue in &doc.issues {
            let Some(ev) = issue.main_event() else {
                tracing::debug!(
                    revision,
                    merge_key = issue.merge_key.as_str(),
                    "analyzer issue without main event skipped"
                );
                continue;
            };
            let file = self.normalize_path(&ev.file_pathname);
            if !self.config.keeps_path(&file) {
                continue;
            }
            let category = coverity_category(issue.last_kind());
            let found = Issue::new(file, ev.line_number, category, ev.event_description.as_str())
                .with_custom_hash(issue.merge_key.as_str());
            self.store.add(revision, found);
        }
    }

    fn ingest_event_tree(&mut self, revision: &str, doc: &Document) {
        for issue in &doc.issues {
            let category = coverity_category(issue.last_kind());
            self.walk(revision, &issue.events, category);
        }
    }

    fn walk(&mut self, revision: &str, events: &[Event], category: Category) {
        for ev in events {
            let file = self.normalize_path(&ev.file_pathname);
            if self.config.keeps_path(&file) {
                if ev.event_description.starts_with(EXAMPLE_MARKER) {
                    self.store.extend_last_text(revision, &ev.event_description);
                } else {
                    let found =
                        Issue::new(file, ev.line_number, category, ev.event_description.as_str());
                    self.store.add(revision, found);
                }
            }
            self.walk(revision, &ev.events, category);
        }
    }
}

impl Parser for Coverity {
    fn tool(&self) -> Tool {
        Tool::Coverity
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

    // Nothing to build; the document is parsed by serde.
    fn compile(&mut self) -> Result<()> {
        Ok(())
    }

    fn run(&mut self, revision: &str) -> Result<()> {
        self.store.reset(revision);
        let doc = match self.load(revision) {
            Ok(doc) => doc,
            Err(e) => {
                self.store.discard(revision);
                return Err(e);
            }
        };
        match self.config.strategy {
            TreeStrategy::MainEvent => self.ingest_main_events(revision, &doc),
            TreeStrategy::EventTree => self.ingest_event_tree(revision, &doc),
        }
        tracing::info!(
            tool = self.tool().name(),
            revision,
            issues = self.store.all(revision).count(),
            "parsed revision"
        );
        Ok(())
    }
}
