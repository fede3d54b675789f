pub mod auth;
pub mod error;
pub mod models;
pub mod openapi;
pub mod repo;
pub mod routes;
pub mod settings;
pub mod usecase;

// Re-export commonly used items for tests / external users
pub use routes::{config, AppState};
pub use usecase::UseCases;
