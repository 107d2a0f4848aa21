//! Domain services (pure, no I/O)

mod drift;
mod integrity;

pub use drift::{diff_file_maps, Change, ChangeKind, Comparison, DriftStatus};
pub use integrity::{hash_category, hash_combined};
