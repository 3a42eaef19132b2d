use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use phpantom_doc::config::Config;
use phpantom_doc::message::{Message, Progress, ProgressError};
use phpantom_doc::{DocBuilder, VersionReport};

/// Command line for the `phpantom-doc` binary.
#[derive(Debug, Parser)]
#[command(
    name = "phpantom-doc",
    version,
    about = "Incremental API documentation builder for PHP"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file
    #[arg(short, long, global = true, default_value = "phpantom-doc.toml")]
    config: PathBuf,

    /// Quiet mode (only print errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose mode (debug logging, every visited class)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse every version and update the class cache
    Parse {
        /// Discard the cache and parse everything again
        #[arg(long)]
        force: bool,
    },
    /// Parse and render every version
    Update {
        /// Discard the cache and the build output first
        #[arg(long)]
        force: bool,
    },
    /// List the classes each version would re-render
    Diff,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("phpantom-doc error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let mut builder = DocBuilder::from_config(&config)?;
    let mut console = Console {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Command::Parse { force } => {
            let reports = builder.parse(&mut console, force)?;
            summarize(&reports, cli.quiet);
        }
        Command::Update { force } => {
            let reports = builder.update(&mut console, force)?;
            summarize(&reports, cli.quiet);
        }
        Command::Diff => {
            for (version, diff) in builder.pending()? {
                println!("{}:", version.display_name());
                if !diff.is_already_rendered() {
                    println!("  never rendered");
                }
                for class in diff.modified_classes() {
                    println!("  M {class}");
                }
                for class in diff.removed_classes() {
                    println!("  D {class}");
                }
                for namespace in diff.added_namespaces() {
                    println!("  + namespace {namespace}");
                }
                for namespace in diff.removed_namespaces() {
                    println!("  - namespace {namespace}");
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("PHPANTOM_DOC_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing: {error}"))?;

    Ok(())
}

/// Prints progress to the terminal.
struct Console {
    quiet: bool,
    verbose: bool,
}

impl Progress for Console {
    fn notify(&mut self, message: Message<'_>) -> Result<(), ProgressError> {
        match message {
            Message::SwitchVersion(version) if !self.quiet => {
                println!("Version {}", version.display_name());
            }
            Message::ParseClass { percent, class } if self.verbose => {
                println!("  [{percent:>3}%] {class}");
            }
            Message::ParseErrors { errors, .. } => {
                for error in errors {
                    eprintln!("  {error}");
                }
            }
            Message::ClassVisited { class, modified } if self.verbose && modified => {
                println!("  visited {class}");
            }
            _ => {}
        }
        Ok(())
    }
}

fn summarize(reports: &[VersionReport], quiet: bool) {
    if quiet {
        return;
    }
    for report in reports {
        if report.reused {
            println!("{}: frozen, cache reused", report.version.display_name());
            continue;
        }
        println!(
            "{}: {} modified, {} removed, {} errors",
            report.version.display_name(),
            report.modified.len(),
            report.removed.len(),
            report.errors.len()
        );
        if let Some(diff) = &report.diff {
            println!(
                "  {} pages out of date, {} removed",
                diff.modified_classes().len(),
                diff.removed_classes().len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["phpantom-doc", "update", "--force", "-c", "doc.toml", "-q"])
            .expect("cli should parse");
        assert!(cli.quiet);
        assert_eq!(cli.config, std::path::PathBuf::from("doc.toml"));
        assert!(matches!(cli.command, Command::Update { force: true }));
    }
}
