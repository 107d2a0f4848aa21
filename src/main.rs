//! kgen-lock CLI - deterministic lock file and drift detection
//!
//! Usage: kgen-lock <COMMAND>
//!
//! Commands:
//!   generate  Scan the project and write a fresh lock file
//!   status    Compare the project against the lock file
//!   validate  Validate an existing lock file
//!   git       Git integration (status, track, commit, history, blame, hooks, ignore)

use anyhow::Result;
use clap::Parser;

use kgen_lock::application::{setup_git_hooks, update_gitignore, LockManager};
use kgen_lock::cli::{Cli, Commands, GitCommands};
use kgen_lock::config::LockConfig;
use kgen_lock::domain::services::DriftStatus;
use kgen_lock::infrastructure::GitCli;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if cli.json {
                let payload = serde_json::json!({ "error": e.to_string() });
                println!("{}", payload);
            } else {
                eprintln!("error: {}", e);
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let cwd = std::env::current_dir()?;
    let clock_override = read_clock_override();
    let config = LockConfig::load(&cwd)?.with_clock_override(clock_override);
    let manager = LockManager::new(config);

    match &cli.command {
        Commands::Generate { no_backup, dry_run } => {
            run_generate(&manager, cli, *no_backup, *dry_run)
        }
        Commands::Status => run_status(&manager, cli),
        Commands::Validate => run_validate(&manager, cli),
        Commands::Git { command } => run_git(&manager, cli, command),
    }
}

/// Reproducible-build override, read once at startup and injected into
/// the manager's config. Never read inside the library.
fn read_clock_override() -> Option<i64> {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
}

fn run_generate(
    manager: &LockManager<GitCli>,
    cli: &Cli,
    no_backup: bool,
    dry_run: bool,
) -> Result<i32> {
    let document = manager.generate()?;

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(0);
    }

    let backup = manager.update(&document, !no_backup)?;

    if cli.json {
        let payload = serde_json::json!({
            "written": manager.config().lock_path(),
            "files": document.file_count(),
            "backup": backup,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!(
            "Lock file written to {} ({} file(s) tracked)",
            manager.config().lock_path().display(),
            document.file_count()
        );
        if cli.verbose > 0 {
            if let Some(backup) = backup {
                println!("Previous lock backed up to {}", backup.display());
            }
        }
    }

    Ok(0)
}

fn run_status(manager: &LockManager<GitCli>, cli: &Cli) -> Result<i32> {
    let comparison = manager.compare()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!("{}", comparison.message);
        for change in &comparison.changes {
            println!("  {}: {}", change.kind, change.file);
        }
    }

    Ok(match comparison.status {
        DriftStatus::Clean => 0,
        DriftStatus::Drift => 1,
        DriftStatus::NoLock => 2,
    })
}

fn run_validate(manager: &LockManager<GitCli>, cli: &Cli) -> Result<i32> {
    match manager.load() {
        Ok(Some(document)) => {
            if cli.json {
                let payload = serde_json::json!({
                    "valid": true,
                    "version": document.version,
                    "files": document.file_count(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Lock file is valid (version {}, {} file(s) tracked)",
                    document.version,
                    document.file_count()
                );
            }
            Ok(0)
        }
        Ok(None) => {
            if cli.json {
                println!("{}", serde_json::json!({ "valid": false, "reason": "no-lock" }));
            } else {
                println!("No lock file found");
            }
            Ok(2)
        }
        Err(e) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "valid": false, "reason": e.to_string() })
                );
            } else {
                eprintln!("error: {}", e);
            }
            Ok(1)
        }
    }
}

fn run_git(manager: &LockManager<GitCli>, cli: &Cli, command: &GitCommands) -> Result<i32> {
    let git = manager.git();
    let root = manager.config().project_root.clone();

    match command {
        GitCommands::Status => {
            let status = git.status();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(if status.is_repo { 0 } else { 1 });
            }

            if !status.is_repo {
                println!("Not a Git repository");
                return Ok(1);
            }

            println!(
                "commit:  {}",
                status.short_commit.as_deref().unwrap_or("(none)")
            );
            println!("branch:  {}", status.branch.as_deref().unwrap_or("(none)"));
            println!("dirty:   {}", status.dirty);
            if !status.tags.is_empty() {
                println!("tags:    {}", status.tags.join(", "));
            }
            if !status.config_files.is_empty() {
                println!("config:  {}", status.config_files.join(", "));
            }
            if let Some(error) = &status.error {
                println!("warning: {}", error);
            }
            Ok(0)
        }

        GitCommands::Track { files } => {
            let files = if files.is_empty() {
                None
            } else {
                Some(files.as_slice())
            };
            let result = git.track_config_files(files);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.success {
                println!("Tracked {} file(s)", result.tracked.len());
                for skipped in &result.skipped {
                    eprintln!("warning: skipped missing file {}", skipped);
                }
            } else if let Some(error) = &result.error {
                eprintln!("error: {}", error);
            }
            Ok(if result.success { 0 } else { 1 })
        }

        GitCommands::Commit { message } => {
            let outcome = git.commit_config_changes(message.as_deref());

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else if outcome.success {
                println!("{}", outcome.message.as_deref().unwrap_or("Committed"));
            } else if let Some(error) = &outcome.error {
                eprintln!("error: {}", error);
            }
            Ok(if outcome.success { 0 } else { 1 })
        }

        GitCommands::History { limit } => {
            let history = git.lock_file_history(*limit);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("No lock file history");
            } else {
                for entry in &history {
                    let hash: String = entry.hash.chars().take(8).collect();
                    println!("{} {} ({})", hash, entry.message, entry.author);
                }
            }
            Ok(0)
        }

        GitCommands::Blame => {
            let result = git.lock_file_blame();

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.success {
                for line in &result.blame {
                    let hash: String = line.hash.chars().take(8).collect();
                    println!("{} {:>4} {} {}", hash, line.line, line.author, line.content);
                }
            } else if let Some(error) = &result.error {
                eprintln!("error: {}", error);
            }
            Ok(if result.success { 0 } else { 1 })
        }

        GitCommands::Hooks => {
            let result = setup_git_hooks(&root);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if result.success {
                for path in &result.installed {
                    println!("Installed {}", path.display());
                }
            } else if let Some(error) = &result.error {
                eprintln!("error: {}", error);
            }
            Ok(if result.success { 0 } else { 1 })
        }

        GitCommands::Ignore { force } => {
            let result = update_gitignore(&root, *force)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}: {}", result.action, result.path.display());
            }
            Ok(0)
        }
    }
}
