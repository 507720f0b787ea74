//! Application layer for Lantern.
//!
//! This crate provides use case implementations that coordinate between
//! domain and infrastructure layers to implement application-level business logic.

pub mod chat_service;
pub mod export_service;
pub mod training_service;

pub use chat_service::{ChatService, SendOutcome};
pub use export_service::ExportService;
pub use training_service::TrainingService;
