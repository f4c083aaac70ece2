//! Per-tool report assembly: run every revision in order and list either all
//! issues or the difference to the previous revision.

use crate::error::Result;
use crate::models::{sort_issues, Issue, RevisionOutcome, RevisionReport, Summary, ToolReport};
use crate::parser::{AnyParser, Parser, ParserConfig, Tool};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Show added/removed issues relative to the previous revision.
    pub diff: bool,
    /// Restrict listings to one file.
    pub file: Option<String>,
}

/// Build the report of one tool over `revisions` (oldest first).
///
/// A revision that fails to parse is recorded as failed; the next revision
/// is then listed in full because there is nothing to diff against.
pub fn build(
    tool: Tool,
    revisions: &[String],
    resultsdir: &Path,
    config: &ParserConfig,
    opts: &ReportOptions,
) -> Result<ToolReport> {
    let mut parser = AnyParser::new(tool, resultsdir, config)?;
    Ok(build_with(&mut parser, revisions, opts))
}

// Only the previous revision's issues stay stored while walking the list.
fn build_with<P: Parser>(parser: &mut P, revisions: &[String], opts: &ReportOptions) -> ToolReport {
    let tool = parser.tool();
    let mut reports = Vec::with_capacity(revisions.len());
    let mut summary = Summary::default();
    let mut previous: Option<&str> = None;

    for rev in revisions {
        summary.revisions += 1;
        if let Err(e) = parser.run(rev) {
            tracing::warn!(tool = tool.name(), revision = rev.as_str(), "{}", e);
            summary.failed += 1;
            reports.push(RevisionReport {
                revision: rev.clone(),
                outcome: RevisionOutcome::Failed {
                    error: e.to_string(),
                },
            });
            if let Some(prev) = previous.take() {
                parser.store_mut().discard(prev);
            }
            continue;
        }
        summary.issues += match opts.file.as_deref() {
            Some(f) => parser.get_issues(rev, f).count(),
            None => parser.get_all_issues(rev).count(),
        };

        let outcome = match previous {
            Some(prev) if opts.diff => {
                let diff = parser.get_diff(prev, rev);
                let added = listing(diff.added, opts.file.as_deref());
                let removed = listing(diff.removed, opts.file.as_deref());
                summary.added += added.len();
                summary.removed += removed.len();
                RevisionOutcome::Diff {
                    against: prev.to_string(),
                    added,
                    removed,
                }
            }
            _ => {
                let issues: Vec<Issue> = match opts.file.as_deref() {
                    Some(f) => parser.get_issues(rev, f).cloned().collect(),
                    None => parser.get_all_issues(rev).cloned().collect(),
                };
                RevisionOutcome::Full {
                    issues: sorted(issues),
                }
            }
        };
        reports.push(RevisionReport {
            revision: rev.clone(),
            outcome,
        });
        if let Some(prev) = previous {
            parser.store_mut().discard(prev);
        }
        previous = Some(rev);
    }

    ToolReport {
        tool: tool.name().to_string(),
        revisions: reports,
        summary,
    }
}

/// Build reports for several tools in parallel; results keep tool order.
pub fn build_all(
    tools: &[Tool],
    revisions: &[String],
    resultsdir: &Path,
    config: &ParserConfig,
    opts: &ReportOptions,
) -> Vec<Result<ToolReport>> {
    tools
        .par_iter()
        .map(|t| build(*t, revisions, resultsdir, config, opts))
        .collect()
}

fn listing(set: HashSet<Issue>, file: Option<&str>) -> Vec<Issue> {
    let issues = set
        .into_iter()
        .filter(|i| file.map_or(true, |f| i.file() == f))
        .collect();
    sorted(issues)
}

fn sorted(mut issues: Vec<Issue>) -> Vec<Issue> {
    sort_issues(&mut issues);
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_log(root: &Path, rev: &str, name: &str, body: &str) {
        let dir = root.join(rev);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), body).unwrap();
    }

    fn revs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_diff_report_between_consecutive_revisions() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_log(
            root,
            "r1",
            "CppCheck.log",
            "[mkfs/a.c:10]: (style) kept\n[mkfs/a.c:20]: (error) fixed later\n",
        );
        write_log(
            root,
            "r2",
            "CppCheck.log",
            "[mkfs/a.c:14]: (style) kept\n[mkfs/b.c:3]: (style) introduced\n",
        );
        let opts = ReportOptions {
            diff: true,
            file: None,
        };
        let report = build(
            Tool::CppCheck,
            &revs(&["r1", "r2"]),
            root,
            &ParserConfig::default(),
            &opts,
        )
        .unwrap();
        assert_eq!(report.revisions.len(), 2);
        assert!(matches!(
            &report.revisions[0].outcome,
            RevisionOutcome::Full { issues } if issues.len() == 2
        ));
        match &report.revisions[1].outcome {
            RevisionOutcome::Diff {
                against,
                added,
                removed,
            } => {
                assert_eq!(against, "r1");
                assert_eq!(added.len(), 1);
                assert_eq!(added[0].text(), "introduced");
                assert_eq!(removed.len(), 1);
                assert_eq!(removed[0].text(), "fixed later");
            }
            _ => panic!("expected a diff outcome"),
        }
        assert_eq!(
            report.summary,
            Summary {
                revisions: 2,
                issues: 4,
                added: 1,
                removed: 1,
                failed: 0,
            }
        );
    }

    #[test]
    fn test_failed_revision_breaks_the_diff_chain() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_log(root, "r1", "CppCheck.log", "[a/a.c:1]: (style) x\n");
        write_log(root, "r3", "CppCheck.log", "[a/a.c:1]: (style) x\n");
        let opts = ReportOptions {
            diff: true,
            file: None,
        };
        let report = build(
            Tool::CppCheck,
            &revs(&["r1", "r2", "r3"]),
            root,
            &ParserConfig::default(),
            &opts,
        )
        .unwrap();
        assert!(matches!(
            &report.revisions[1].outcome,
            RevisionOutcome::Failed { error } if error.contains("r2")
        ));
        assert!(matches!(
            &report.revisions[2].outcome,
            RevisionOutcome::Full { issues } if issues.len() == 1
        ));
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn test_only_the_previous_revision_stays_stored() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for rev in ["r1", "r2", "r3"] {
            write_log(root, rev, "CppCheck.log", "[a/a.c:1]: (style) x\n");
        }
        let opts = ReportOptions {
            diff: true,
            file: None,
        };
        let mut parser =
            AnyParser::new(Tool::CppCheck, root, &ParserConfig::default()).unwrap();
        let report = build_with(&mut parser, &revs(&["r1", "r2", "r3"]), &opts);
        assert_eq!(report.summary.failed, 0);
        assert!(matches!(
            &report.revisions[2].outcome,
            RevisionOutcome::Diff { added, removed, .. } if added.is_empty() && removed.is_empty()
        ));
        assert!(!parser.store().contains("r1"));
        assert!(!parser.store().contains("r2"));
        assert!(parser.store().contains("r3"));
    }

    #[test]
    fn test_summary_counts_only_the_listed_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_log(
            root,
            "r1",
            "CppCheck.log",
            "[a/a.c:1]: (style) x\n[a/b.c:1]: (style) y\n[a/b.c:2]: (style) z\n",
        );
        let opts = ReportOptions {
            diff: false,
            file: Some("a/a.c".into()),
        };
        let report = build(
            Tool::CppCheck,
            &revs(&["r1"]),
            root,
            &ParserConfig::default(),
            &opts,
        )
        .unwrap();
        assert_eq!(report.summary.issues, 1);
    }

    #[test]
    fn test_file_filter_and_parallel_tools() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write_log(
            root,
            "r1",
            "CppCheck.log",
            "[a/a.c:1]: (style) x\n[a/b.c:1]: (style) y\n",
        );
        write_log(
            root,
            "r1",
            "GCC.log",
            "ctx\na/a.c:1:1: warning: unused variable 'z' [-Wunused-variable]\n\n",
        );
        let opts = ReportOptions {
            diff: false,
            file: Some("a/a.c".into()),
        };
        let reports = build_all(
            &[Tool::CppCheck, Tool::Gcc],
            &revs(&["r1"]),
            root,
            &ParserConfig::default(),
            &opts,
        );
        let reports: Vec<ToolReport> = reports.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(reports[0].tool, "CppCheck");
        assert_eq!(reports[1].tool, "GCC");
        for r in &reports {
            match &r.revisions[0].outcome {
                RevisionOutcome::Full { issues } => {
                    assert_eq!(issues.len(), 1);
                    assert_eq!(issues[0].file(), "a/a.c");
                }
                _ => panic!("expected a full listing"),
            }
        }
    }
}
