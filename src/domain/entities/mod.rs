//! Domain entities

mod lock_document;

pub use lock_document::{
    is_compatible_version, normalize_lock_path, validate_lock_document, FileRecord, GitInfo,
    Integrity, LockDocument, ProjectInfo, LOCK_MAJOR, LOCK_VERSION,
};
