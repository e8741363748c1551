//! Orchestrator presentation layer (HTTP API)

pub mod controllers;
pub mod errors;
pub mod models;
pub mod routes;

pub use controllers::ScanApiState;
pub use errors::ApiError;
pub use routes::{ApiDoc, create_router};
