//! Integrity aggregation
//!
//! Deterministic digests over category file maps and over the whole
//! project. Entries are fed to the hasher in sorted-path order (byte
//! order, forward slashes), which makes the result independent of scan
//! order and platform.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::domain::entities::FileRecord;
use crate::domain::value_objects::ContentHash;

/// Aggregate digest over one category's file records.
///
/// Input is a BTreeMap, so iteration is already sorted by path. Each
/// entry contributes `path NUL hash LF`; the NUL separator keeps
/// adjacent fields from colliding.
pub fn hash_category(files: &BTreeMap<String, FileRecord>) -> ContentHash {
    let mut hasher = Sha256::new();
    for (path, record) in files {
        hasher.update(path.as_bytes());
        hasher.update([0u8]);
        hasher.update(record.hash.as_bytes());
        hasher.update(b"\n");
    }
    ContentHash::new(&format!("{:x}", hasher.finalize()))
}

/// Aggregate digest over all category hashes.
///
/// `components` must be supplied in the configured category order; the
/// order is part of the digest.
pub fn hash_combined<'a>(components: impl IntoIterator<Item = (&'a str, &'a str)>) -> ContentHash {
    let mut hasher = Sha256::new();
    for (name, hash) in components {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(hash.as_bytes());
        hasher.update(b"\n");
    }
    ContentHash::new(&format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str) -> FileRecord {
        FileRecord {
            hash: hash.to_string(),
            size: 1,
            modified: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn category_hash_is_deterministic() {
        let mut files = BTreeMap::new();
        files.insert("a.ttl".to_string(), record("sha256:aaa"));
        files.insert("b.ttl".to_string(), record("sha256:bbb"));

        assert_eq!(hash_category(&files), hash_category(&files.clone()));
    }

    #[test]
    fn category_hash_insensitive_to_insertion_order() {
        let mut forward = BTreeMap::new();
        forward.insert("a.ttl".to_string(), record("sha256:aaa"));
        forward.insert("b.ttl".to_string(), record("sha256:bbb"));

        let mut reverse = BTreeMap::new();
        reverse.insert("b.ttl".to_string(), record("sha256:bbb"));
        reverse.insert("a.ttl".to_string(), record("sha256:aaa"));

        assert_eq!(hash_category(&forward), hash_category(&reverse));
    }

    #[test]
    fn category_hash_insensitive_to_metadata() {
        let mut a = BTreeMap::new();
        a.insert(
            "a.ttl".to_string(),
            FileRecord {
                hash: "sha256:aaa".to_string(),
                size: 1,
                modified: "2024-01-01T00:00:00Z".to_string(),
            },
        );
        let mut b = BTreeMap::new();
        b.insert(
            "a.ttl".to_string(),
            FileRecord {
                hash: "sha256:aaa".to_string(),
                size: 999,
                modified: "2030-12-31T23:59:59Z".to_string(),
            },
        );

        assert_eq!(hash_category(&a), hash_category(&b));
    }

    #[test]
    fn category_hash_changes_with_content_hash() {
        let mut a = BTreeMap::new();
        a.insert("a.ttl".to_string(), record("sha256:aaa"));
        let mut b = BTreeMap::new();
        b.insert("a.ttl".to_string(), record("sha256:zzz"));

        assert_ne!(hash_category(&a), hash_category(&b));
    }

    #[test]
    fn empty_category_has_stable_hash() {
        let empty = BTreeMap::new();
        assert_eq!(hash_category(&empty), hash_category(&empty.clone()));
    }

    #[test]
    fn combined_hash_depends_on_category_order() {
        let forward = hash_combined([("templates", "sha256:a"), ("rules", "sha256:b")]);
        let reverse = hash_combined([("rules", "sha256:b"), ("templates", "sha256:a")]);
        assert_ne!(forward, reverse);
    }

    #[test]
    fn combined_hash_deterministic_for_same_input() {
        let a = hash_combined([("templates", "sha256:a"), ("rules", "sha256:b")]);
        let b = hash_combined([("templates", "sha256:a"), ("rules", "sha256:b")]);
        assert_eq!(a, b);
    }
}
