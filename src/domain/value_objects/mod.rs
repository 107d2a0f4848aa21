//! Domain value objects

mod content_hash;

pub use content_hash::ContentHash;
