//! Application layer: use-case orchestration over domain and infrastructure

pub mod git_ops;
pub mod hooks;
pub mod lock_manager;

pub use git_ops::{
    BlameLine, BlameResult, CommitOutcome, ConfigChanges, GitIntegration, GitStatus,
    HistoryEntry, TrackResult,
};
pub use hooks::{
    gitignore_patterns, post_merge_hook, pre_commit_hook, setup_git_hooks, update_gitignore,
    GitIgnoreUpdate, HooksResult, IgnoreAction,
};
pub use lock_manager::LockManager;
