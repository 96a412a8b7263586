//! Object storage integration.
//!
//! Media files (cover images, button images, intro and stop audio) live in a
//! Supabase-style object store reached over HTTP. The database pointer
//! columns on `tours` / `stops` are the source of truth for whether a media
//! object exists; this module only moves bytes and derives public URLs.

pub mod client;
pub mod public_url;

pub use client::{ObjectStore, StorageClient, StorageError};
pub use public_url::{parse_public_url, StoragePath};
