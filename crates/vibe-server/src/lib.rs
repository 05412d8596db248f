// ABOUTME: HTTP server for vibe-assistant: configuration, GitHub access, and prompt building over JSON.
// ABOUTME: Uses Axum with shared state holding the config store, GitHub client, and model factory.

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::{ServerConfig, ServerConfigError};
pub use error::ApiError;
pub use routes::create_router;
