//! Configuration discovery and effective settings resolution.
//!
//! issuediff reads `issuediff.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `results`: `results`
//! - `tools`: all supported tools
//! - `subsystem`: none (every directory kept)
//! - `severity`: `high`
//! - `strategy`: `main-event`
//! - `output`: `human`
//! - `diff`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::parser::{ParserConfig, Severity, Tool, TreeStrategy};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `issuediff.toml|yaml`.
pub struct FileConfig {
    /// Directory holding one sub-directory per revision.
    pub results: Option<String>,
    pub tools: Option<Vec<String>>,
    pub subsystem: Option<String>,
    pub severity: Option<Severity>,
    pub strategy: Option<TreeStrategy>,
    /// Prefix stripped from absolute analyzer paths.
    pub source_root: Option<String>,
    pub output: Option<String>,
    pub diff: Option<bool>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` defers to the config file.
pub struct Overrides {
    pub repo_root: Option<String>,
    pub results: Option<String>,
    pub tools: Vec<String>,
    pub subsystem: Option<String>,
    pub severity: Option<String>,
    pub strategy: Option<String>,
    pub source_root: Option<String>,
    pub output: Option<String>,
    pub diff: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    /// Whether an `issuediff.toml|yaml|yml` was loaded.
    pub config_found: bool,
    pub results: PathBuf,
    pub tools: Vec<Tool>,
    pub output: String,
    pub diff: bool,
    pub parser: ParserConfig,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when an `issuediff.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("issuediff.toml").exists()
            || cur.join("issuediff.yaml").exists()
            || cur.join("issuediff.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FileConfig` from `issuediff.toml` or `issuediff.yaml|yml` if present.
///
/// A file that cannot be read or parsed is reported and ignored.
pub fn load_config(root: &Path) -> Option<FileConfig> {
    let toml_path = root.join("issuediff.toml");
    if toml_path.exists() {
        let s = read_logged(&toml_path)?;
        return match toml::from_str::<FileConfig>(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", toml_path.display(), e);
                None
            }
        };
    }
    for yml in ["issuediff.yaml", "issuediff.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = read_logged(&p)?;
            return match serde_yaml::from_str::<FileConfig>(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", p.display(), e);
                    None
                }
            };
        }
    }
    None
}

fn read_logged(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// Fails with a user-facing message on unknown tool, severity, strategy or
/// output names.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, String> {
    let start = PathBuf::from(cli.repo_root.as_deref().unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root);
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let results = cli
        .results
        .clone()
        .or(cfg.results)
        .unwrap_or_else(|| "results".to_string());
    let results = repo_root.join(results);

    let tool_names = if cli.tools.is_empty() {
        cfg.tools.unwrap_or_default()
    } else {
        cli.tools.clone()
    };
    let tools = if tool_names.is_empty() {
        Tool::ALL.to_vec()
    } else {
        tool_names
            .iter()
            .map(|n| n.parse::<Tool>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let severity = match cli.severity.as_deref() {
        Some(s) => s.parse::<Severity>()?,
        None => cfg.severity.unwrap_or_default(),
    };
    let strategy = match cli.strategy.as_deref() {
        Some(s) => s.parse::<TreeStrategy>()?,
        None => cfg.strategy.unwrap_or_default(),
    };

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(format!("unknown output mode '{}' (expected human|json)", output));
    }

    let diff = cli.diff.or(cfg.diff).unwrap_or(false);
    let subsystem = cli
        .subsystem
        .clone()
        .or(cfg.subsystem)
        .filter(|s| !s.is_empty());
    let source_root = cli
        .source_root
        .clone()
        .or(cfg.source_root)
        .map(PathBuf::from);

    Ok(Effective {
        repo_root,
        config_found,
        results,
        tools,
        output,
        diff,
        parser: ParserConfig {
            subsystem,
            severity,
            strategy,
            source_root,
        },
    })
}
