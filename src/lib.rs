//! Scanward - Main application library
//!
//! This is the main binary crate that wires together all modules

mod app;

pub use app::{AppHandle, create_app};
pub use scanward_core::{Config, init_tracing};

// Re-export for convenience
pub use scanward_core;
pub use scanward_orchestrator;
pub use scanward_tools;
