use clap::{Parser, Subcommand};

/// kgen-lock - deterministic lock file and drift detection for KGEN projects
#[derive(Parser, Debug)]
#[command(name = "kgen-lock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for CI
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the project and write a fresh lock file
    Generate {
        /// Skip the timestamped backup of an existing lock file
        #[arg(long)]
        no_backup: bool,

        /// Print the lock document without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Compare the project against the lock file (exit 1 on drift)
    Status,

    /// Validate an existing lock file's schema and version
    Validate,

    /// Git integration for lock and config files
    Git {
        #[command(subcommand)]
        command: GitCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum GitCommands {
    /// Show repository state relevant to the lock engine
    Status,

    /// Stage configuration files (missing paths are skipped)
    Track {
        /// Files to track; defaults to the known config set
        files: Vec<String>,
    },

    /// Commit staged configuration changes, if any
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Show commits touching the lock file, newest first
    History {
        /// Maximum number of commits to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Line-level attribution of the lock file
    Blame,

    /// Install pre-commit and post-merge hooks
    Hooks,

    /// Add or refresh the managed .gitignore section
    Ignore {
        /// Replace an existing managed section
        #[arg(long)]
        force: bool,
    },
}
