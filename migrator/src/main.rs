//! Sequential schema migration for persisted application state.
//!
//! Reads a versioned state file (`{"version": N, "state": {...}}`), reports
//! pending migrations, and rewrites it at the current schema version.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use migrator::Registry;
use migrator::core::types::PlanEntry;
use migrator::core::version::Version;
use migrator::exit_codes;
use migrator::io::config::{DEFAULT_CONFIG_PATH, load_config};
use migrator::logging;
use migrator::migrate::{MigrateOptions, MigrateOutcome, migrate_file, plan_file};

#[derive(Parser)]
#[command(
    name = "migrator",
    version,
    about = "Sequential schema migration for persisted application state"
)]
struct Cli {
    /// Path to the TOML config (missing file means defaults).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log each migration step to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current schema version and the registered steps.
    Versions,
    /// Print the stored version of a state file and the pending plan.
    Status {
        /// State file to inspect.
        file: PathBuf,
    },
    /// Upgrade a state file in place to the current schema version.
    Migrate {
        /// State file to migrate.
        file: PathBuf,
        /// Report what would run without rewriting the file.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Versions => cmd_versions(),
        Command::Status { file } => cmd_status(&cli.config, &file),
        Command::Migrate { file, dry_run } => cmd_migrate(&cli.config, &file, dry_run),
    }
}

fn cmd_versions() -> Result<i32> {
    let registry = Registry::builtin();
    println!(
        "versions: current={} registered={}",
        registry.current_version(),
        join_versions(&registry.registered_versions())
    );
    for step in registry.steps() {
        println!("step: v{} {}", step.to_version, step.name);
    }
    Ok(exit_codes::OK)
}

fn cmd_status(config_path: &Path, file: &Path) -> Result<i32> {
    let config = load_config(config_path)?;
    let plan = plan_file(&Registry::builtin(), file, &config)?;
    println!(
        "status: file={} stored={} current={}",
        file.display(),
        plan.from,
        plan.to
    );
    if plan.is_ahead() {
        eprintln!(
            "warning: stored version {} is newer than current version {}",
            plan.from, plan.to
        );
        return Ok(exit_codes::AHEAD);
    }
    if plan.is_empty() {
        return Ok(exit_codes::OK);
    }
    for entry in &plan.entries {
        match entry {
            PlanEntry::Step { version, name } => println!("pending: v{} {}", version, name),
            PlanEntry::Noop { version } => println!("pending: v{} (no-op)", version),
        }
    }
    Ok(exit_codes::PENDING)
}

fn cmd_migrate(config_path: &Path, file: &Path, dry_run: bool) -> Result<i32> {
    let config = load_config(config_path)?;
    let options = MigrateOptions { dry_run };
    match migrate_file(&Registry::builtin(), file, &config, &options)? {
        MigrateOutcome::UpToDate { version } => {
            println!("migrate: file={} version={} up-to-date", file.display(), version);
            Ok(exit_codes::OK)
        }
        MigrateOutcome::Migrated { report, written } => {
            println!(
                "migrate: file={} from={} to={} applied={} written={}",
                file.display(),
                report.from,
                report.to,
                join_versions(&report.applied),
                written
            );
            Ok(exit_codes::OK)
        }
        MigrateOutcome::Ahead { stored, current } => {
            eprintln!(
                "warning: stored version {} is newer than current version {}; file left untouched",
                stored, current
            );
            Ok(exit_codes::AHEAD)
        }
    }
}

fn join_versions(versions: &[Version]) -> String {
    if versions.is_empty() {
        return "-".to_string();
    }
    versions
        .iter()
        .map(Version::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
