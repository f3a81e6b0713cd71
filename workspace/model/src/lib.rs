pub mod entities;

// Re-export tracing so downstream crates log through the same facade
pub use tracing;
