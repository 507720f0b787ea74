pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod session;
pub mod state;

// Re-export common error type
pub use error::LanternError;
