//! Persisted application state.
//!
//! - `model`: the state document (`AppState`)
//! - `repository`: the storage contract (`StateRepository`)

pub mod model;
pub mod repository;

pub use model::AppState;
pub use repository::StateRepository;
