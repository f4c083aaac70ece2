//! issuediff CLI binary entry point.
//! Resolves configuration, expands revisions and prints per-tool reports.

use clap::Parser;
use issuediff::cli::{Cli, Commands};
use issuediff::config::{self, Overrides};
use issuediff::output::{self, error_prefix, note_prefix};
use issuediff::parser::{Severity, Tool};
use issuediff::report::{self, ReportOptions};
use issuediff::revisions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Tools => {
            for tool in Tool::ALL {
                let log = match tool {
                    Tool::Coverity => "Coverity-<SEVERITY>.json".to_string(),
                    _ => tool.log_file(Severity::default()),
                };
                println!("{:<10} {}", tool.name(), log);
            }
        }
        Commands::Report {
            revisions: specs,
            tool,
            results,
            repo_root,
            subsystem,
            mkfs_only,
            severity,
            strategy,
            source_root,
            diff,
            file,
            output: output_mode,
            no_git,
        } => {
            let overrides = Overrides {
                repo_root,
                results,
                tools: tool,
                subsystem: if mkfs_only {
                    Some("mkfs".to_string())
                } else {
                    subsystem
                },
                severity,
                strategy,
                source_root,
                output: output_mode,
                diff: if diff { Some(true) } else { None },
            };
            let eff = match config::resolve_effective(&overrides) {
                Ok(eff) => eff,
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(2);
                }
            };
            if !eff.config_found {
                tracing::debug!("no issuediff.toml found; using defaults");
            }
            if !eff.results.is_dir() {
                eprintln!(
                    "{} Results directory not found: {} (pass --results or configure issuediff.toml)",
                    error_prefix(),
                    eff.results.display()
                );
                std::process::exit(2);
            }

            let expanded = if no_git {
                revisions::literal(&specs)
            } else {
                revisions::expand(&specs, &eff.repo_root)
            };
            let revs = match expanded {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    std::process::exit(2);
                }
            };
            tracing::info!(count = revs.len(), "revisions expanded");
            if eff.diff && revs.len() < 2 {
                eprintln!(
                    "{} a single revision has nothing to diff against; listing all issues",
                    note_prefix()
                );
            }

            let opts = ReportOptions {
                diff: eff.diff,
                file,
            };
            let mut reports = Vec::new();
            let mut broken = 0usize;
            for res in report::build_all(&eff.tools, &revs, &eff.results, &eff.parser, &opts) {
                match res {
                    Ok(r) => reports.push(r),
                    Err(e) => {
                        eprintln!("{} {}", error_prefix(), e);
                        broken += 1;
                    }
                }
            }
            output::print_reports(&reports, &eff.output);
            let failed: usize = reports.iter().map(|r| r.summary.failed).sum();
            if broken > 0 || failed > 0 {
                std::process::exit(1);
            }
        }
    }
}

/// Route `tracing` output to stderr; `RUST_LOG` overrides the flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
