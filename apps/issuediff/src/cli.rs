//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "issuediff",
    version,
    about = "Diff static-analysis findings across git revisions",
    long_about = "issuediff — normalize compiler, lint and analyzer logs into one issue model and show which issues each revision introduced or resolved.\n\nConfiguration precedence: CLI > issuediff.toml > defaults.",
    after_help = "Examples:\n  issuediff report v4.10.0..v4.11.0 --diff\n  issuediff report 1a2b3c4d5e --tool CppCheck --mkfs-only\n  issuediff report a..b --tool Coverity --severity medium --output json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Debug logging on stderr")]
    pub verbose: bool,
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue, help = "Only log errors")]
    pub quiet: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current issuediff version.")]
    Version,
    /// List supported tools
    #[command(
        about = "List supported tools",
        long_about = "Print every supported tool with the log file it reads inside a revision directory."
    )]
    Tools,
    /// Parse tool logs per revision and list or diff issues
    #[command(
        about = "Report issues per revision",
        long_about = "Parse each revision's tool logs from the results directory. With --diff, every revision after the first shows only the issues added and removed since the previous one.",
        after_help = "Examples:\n  issuediff report abc..def --diff\n  issuediff report abc --tool GCC --file mkfs/xfs_mkfs.c"
    )]
    Report {
        #[arg(required = true, help = "Git revisions; ranges A..B are expanded")]
        revisions: Vec<String>,
        #[arg(long, help = "Tool to report (repeatable; default: all)")]
        tool: Vec<String>,
        #[arg(long, help = "Results directory with one sub-directory per revision")]
        results: Option<String>,
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Keep only issues whose directory has this name")]
        subsystem: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "subsystem", help = "Shorthand for --subsystem mkfs")]
        mkfs_only: bool,
        #[arg(long, help = "Analyzer level: low|medium|high|custom (default: high)")]
        severity: Option<String>,
        #[arg(long, help = "Analyzer strategy: main-event|event-tree (default: main-event)")]
        strategy: Option<String>,
        #[arg(long, help = "Prefix stripped from absolute analyzer paths")]
        source_root: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Show differences between consecutive revisions")]
        diff: bool,
        #[arg(long, help = "Restrict listings to one file")]
        file: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Use revisions as directory names without git")]
        no_git: bool,
    },
}
