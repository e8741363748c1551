//! Scanward Core - Foundation crate for the scanward scan orchestrator
//!
//! This crate provides shared functionality used across the workspace:
//!
//! # Modules
//!
//! - [`config`] - Strongly-typed configuration with TOML and environment variable support
//! - [`infrastructure`] - Dragonfly/Redis cache access
//! - [`logging`] - Structured logging with tracing
//!
//! # Configuration
//!
//! Load configuration from files and environment:
//!
//! ```rust,ignore
//! use scanward_core::Config;
//!
//! let config = Config::load()?;
//! ```
//!
//! Environment variables use the `SCANWARD__` prefix with double underscore separators:
//!
//! ```bash
//! SCANWARD__SERVER__PORT=3000
//! SCANWARD__STORE__TTL_HOURS=24
//! SCANWARD__TOOLS__SEMGREP__TIMEOUT_SECONDS=900
//! ```
//!
//! # Logging
//!
//! ```rust,ignore
//! use scanward_core::init_tracing;
//!
//! init_tracing(&config.logging)?;
//! ```

pub mod config;
pub mod infrastructure;
pub mod logging;

pub use config::Config;
pub use logging::init_tracing;
