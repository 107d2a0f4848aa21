//! Local filesystem helpers
//!
//! Atomic writes use the tempfile + rename pattern so a concurrent
//! reader never observes a partially written file.

use std::io::Write;
use std::path::Path;

/// Write content to a file atomically, creating parent directories.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
