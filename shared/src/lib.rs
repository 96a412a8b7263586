//! Shared types for the tour admin backend services

// Re-export common dependencies
pub use chrono;
pub use serde;

// Export types module
pub mod types;
