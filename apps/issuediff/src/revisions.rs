//! Revision list expansion over git history.
//!
//! Each argument is a single revision or a range `A..B`. A range expands to
//! the older endpoint followed by every commit on the ancestry path up to
//! the newer one, oldest first. Revisions are shortened to the first ten
//! characters, which names their results directory.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;

pub const SHORT_LEN: usize = 10;

/// First `SHORT_LEN` characters of a revision hash.
pub fn short(rev: &str) -> String {
    rev.chars().take(SHORT_LEN).collect()
}

/// Split `A..B` into its endpoints.
pub fn split_range(spec: &str) -> Option<(&str, &str)> {
    let (a, b) = spec.split_once("..")?;
    if a.is_empty() || b.is_empty() || b.starts_with('.') {
        return None;
    }
    Some((a, b))
}

/// Expand revision arguments into an ordered list of short revisions.
pub fn expand(specs: &[String], repo: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for spec in specs {
        if spec.contains("..") {
            let (a, b) = split_range(spec)
                .ok_or_else(|| Error::revision(format!("malformed range '{}'", spec)))?;
            out.extend(expand_range(repo, a, b)?.iter().map(|r| short(r)));
        } else {
            out.push(short(&rev_parse(repo, spec)?));
        }
    }
    Ok(out)
}

/// Use revision arguments as directory names without consulting git.
pub fn literal(specs: &[String]) -> Result<Vec<String>> {
    specs
        .iter()
        .map(|s| {
            if s.contains("..") {
                Err(Error::revision(format!(
                    "range '{}' needs git; drop --no-git",
                    s
                )))
            } else {
                Ok(s.clone())
            }
        })
        .collect()
}

fn expand_range(repo: &Path, a: &str, b: &str) -> Result<Vec<String>> {
    let a = rev_parse(repo, a)?;
    let b = rev_parse(repo, b)?;
    let (older, newer) = if is_ancestor(repo, &a, &b)? {
        (a, b)
    } else if is_ancestor(repo, &b, &a)? {
        (b, a)
    } else {
        return Err(Error::revision(format!(
            "neither of the revisions {} and {} precedes the other one; are they in different branches?",
            short(&a),
            short(&b)
        )));
    };
    let listed = git(
        repo,
        &[
            "rev-list",
            "--reverse",
            "--ancestry-path",
            &format!("{}..{}", older, newer),
        ],
    )?;
    let mut revs = vec![older];
    revs.extend(listed.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from));
    Ok(revs)
}

fn rev_parse(repo: &Path, rev: &str) -> Result<String> {
    git(repo, &["rev-parse", "--verify", &format!("{}^{{commit}}", rev)])
}

fn is_ancestor(repo: &Path, a: &str, b: &str) -> Result<bool> {
    let status = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["merge-base", "--is-ancestor", a, b])
        .status()
        .map_err(|e| Error::revision(format!("cannot run git: {}", e)))?;
    match status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => Err(Error::revision(format!(
            "git merge-base failed for {} and {}",
            short(a),
            short(b)
        ))),
    }
}

fn git(repo: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| Error::revision(format!("cannot run git: {}", e)))?;
    if !out.status.success() {
        return Err(Error::revision(format!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
