// Core modules
pub mod aggregate;
pub mod db;
pub mod export;
pub mod ingest;
pub mod matching;
pub mod models;
pub mod sweep;
pub mod synthetic;

// Re-export commonly used types
pub use models::*;

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
