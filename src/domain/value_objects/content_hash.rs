//! Content Hash Value Object
//!
//! A validated, immutable SHA-256 digest over file or aggregate content.
//! All drift detection reduces to comparing these values.

use std::fmt;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Content hash value object
///
/// Wraps a SHA-256 hash string with the `sha256:` prefix. Identical byte
/// content always yields an identical hash; file metadata never
/// participates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Create a new ContentHash from a raw hash string (without prefix)
    pub fn new(raw_hash: &str) -> Self {
        if raw_hash.starts_with(Self::PREFIX) {
            Self(raw_hash.to_string())
        } else {
            Self(format!("{}{}", Self::PREFIX, raw_hash))
        }
    }

    /// Create a ContentHash by computing SHA-256 of a byte slice
    pub fn from_bytes(content: &[u8]) -> Self {
        let hash = Sha256::digest(content);
        Self(format!("{}{:x}", Self::PREFIX, hash))
    }

    /// Create a ContentHash by streaming a file's content
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut hasher = Sha256::new();
        std::io::copy(&mut file, &mut hasher)?;
        Ok(Self(format!("{}{:x}", Self::PREFIX, hasher.finalize())))
    }

    /// Get the full hash string with prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get just the hex part without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Check if this hash matches another
    pub fn matches(&self, other: &ContentHash) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContentHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_adds_prefix_if_missing() {
        let hash = ContentHash::new("abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn new_keeps_prefix_if_present() {
        let hash = ContentHash::new("sha256:abc123");
        assert_eq!(hash.as_str(), "sha256:abc123");
    }

    #[test]
    fn from_bytes_computes_sha256() {
        let hash = ContentHash::from_bytes(b"hello");
        assert!(hash.as_str().starts_with("sha256:"));
        assert_eq!(hash.hex().len(), 64);
    }

    #[test]
    fn same_content_same_hash() {
        let h1 = ContentHash::from_bytes(b"test");
        let h2 = ContentHash::from_bytes(b"test");
        assert!(h1.matches(&h2));
    }

    #[test]
    fn different_content_different_hash() {
        let h1 = ContentHash::from_bytes(b"test1");
        let h2 = ContentHash::from_bytes(b"test2");
        assert!(!h1.matches(&h2));
    }

    #[test]
    fn from_file_matches_from_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.ttl");
        std::fs::write(&path, b"@prefix ex: <http://example.org/> .").unwrap();

        let from_file = ContentHash::from_file(&path).unwrap();
        let from_bytes = ContentHash::from_bytes(b"@prefix ex: <http://example.org/> .");
        assert_eq!(from_file, from_bytes);
    }

    #[test]
    fn from_file_ignores_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.ttl");
        std::fs::write(&path, b"content").unwrap();
        let first = ContentHash::from_file(&path).unwrap();

        // rewrite identical bytes; mtime changes, hash must not
        std::fs::write(&path, b"content").unwrap();
        let second = ContentHash::from_file(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn display_shows_full_hash() {
        let hash = ContentHash::new("abc123");
        assert_eq!(format!("{}", hash), "sha256:abc123");
    }

    #[test]
    fn hex_returns_without_prefix() {
        let hash = ContentHash::new("abc123");
        assert_eq!(hash.hex(), "abc123");
    }
}
