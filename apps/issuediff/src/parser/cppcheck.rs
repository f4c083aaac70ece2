//! Lint tool parser: one issue per line, `[FILE:LINE]: (TYPE) text`.

use super::{IssueStore, Parser, ParserConfig, Tool};
use crate::classify::cppcheck_category;
use crate::error::Result;
use crate::models::Issue;
use regex::Regex;
use std::path::{Path, PathBuf};

const PATTERN: &str = r"^\[([^:\]]+):([0-9]+)\]: \(([^)]+)\) (.*)$";

pub struct CppCheck {
    resultsdir: PathBuf,
    config: ParserConfig,
    store: IssueStore,
    re: Option<Regex>,
}

impl CppCheck {
    pub fn new(resultsdir: PathBuf, config: ParserConfig) -> Result<Self> {
        let mut cppcheck = CppCheck {
            resultsdir,
            config,
            store: IssueStore::new(),
            re: None,
        };
        cppcheck.compile()?;
        Ok(cppcheck)
    }
}

impl Parser for CppCheck {
    fn tool(&self) -> Tool {
        Tool::CppCheck
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
        self.re = Some(Regex::new(PATTERN)?);
        Ok(())
    }

    fn parse(&mut self, line: &str) -> Result<Option<Issue>> {
        if !line.starts_with('[') {
            return Ok(None);
        }
        let Some(caps) = self.re.as_ref().and_then(|re| re.captures(line)) else {
            return Ok(None);
        };
        let file = &caps[1];
        if !self.config.keeps_path(file) {
            return Ok(None);
        }
        let category = cppcheck_category(&caps[3]);
        // Capture groups are all digits for the line, so this only fails on overflow.
        Ok(Issue::from_raw(file, &caps[2], category.name(), &caps[4]).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use tempfile::tempdir;

    fn parser(subsystem: Option<&str>) -> CppCheck {
        let cfg = ParserConfig {
            subsystem: subsystem.map(String::from),
            ..Default::default()
        };
        CppCheck::new(PathBuf::from("/nonexistent"), cfg).unwrap()
    }

    #[test]
    fn test_parse_style_issue() {
        let mut p = parser(None);
        let issue = p
            .parse("[mkfs/xfs_mkfs.c:120]: (style) variable 'x' not used")
            .unwrap()
            .unwrap();
        assert!(issue.file().ends_with("mkfs/xfs_mkfs.c"));
        assert_eq!(issue.line(), 120);
        assert_eq!(issue.category(), Category::Style);
        assert_eq!(issue.text(), "variable 'x' not used");
        let shown = issue.to_string();
        assert!(shown.contains("mkfs/xfs_mkfs.c"));
        assert!(shown.contains("120"));
        assert!(shown.contains("STYLE"));
        assert!(shown.contains("variable 'x' not used"));
    }

    #[test]
    fn test_pattern_is_compiled_on_construction() {
        assert!(parser(None).re.is_some());
    }

    #[test]
    fn test_non_style_severity_is_error() {
        let mut p = parser(None);
        let issue = p
            .parse("[repair/phase6.c:88]: (error) Memory leak: buf")
            .unwrap()
            .unwrap();
        assert_eq!(issue.category(), Category::Error);
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let mut p = parser(None);
        for line in [
            "",
            "Checking mkfs/xfs_mkfs.c ...",
            "1/42 files checked 2% done",
            "[mkfs/xfs_mkfs.c:12] -> [mkfs/xfs_mkfs.c:40]: (style) dup",
            "[broken",
            "[mkfs/xfs_mkfs.c:99999999999]: (style) overflowing line",
        ] {
            assert!(p.parse(line).unwrap().is_none(), "line: {line}");
        }
    }

    #[test]
    fn test_subsystem_filter_drops_other_dirs() {
        let mut p = parser(Some("mkfs"));
        assert!(p
            .parse("[copy/xfs_copy.c:10]: (style) x")
            .unwrap()
            .is_none());
        assert!(p
            .parse("[mkfs/proto.c:10]: (style) x")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_run_reads_revision_log() {
        let dir = tempdir().unwrap();
        let rev = dir.path().join("0123456789");
        std::fs::create_dir_all(&rev).unwrap();
        std::fs::write(
            rev.join("CppCheck.log"),
            "Checking mkfs/xfs_mkfs.c ...\n\
             [mkfs/xfs_mkfs.c:120]: (style) variable 'x' not used\n   \
             [mkfs/xfs_mkfs.c:130]: (style) variable 'x' not used\n\
             [db/check.c:7]: (error) Uninitialized variable: y\n",
        )
        .unwrap();
        let mut p = CppCheck::new(dir.path().to_path_buf(), ParserConfig::default()).unwrap();
        p.run("0123456789").unwrap();
        assert_eq!(p.get_all_issues("0123456789").count(), 3);
        assert_eq!(p.get_issues("0123456789", "mkfs/xfs_mkfs.c").count(), 2);
        let mut idx: Vec<u32> = p
            .get_issues("0123456789", "mkfs/xfs_mkfs.c")
            .map(|i| i.index())
            .collect();
        idx.sort();
        assert_eq!(idx, vec![0, 1]);
    }
}
