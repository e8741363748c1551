//! Configuration management

pub mod validation;

pub use validation::{Validate, ValidationError};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub scan: ScanConfig,
    pub git: GitConfig,
    pub credentials: CredentialsConfig,
    pub tools: ToolsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whether to expose the generated OpenAPI document.
    pub enable_docs: bool,
    /// Global request timeout in seconds applied at the HTTP layer.
    pub request_timeout_seconds: u64,
    /// Allowed CORS origins. Use ["*"] to allow any (development only). Empty vector -> no external origins.
    pub allowed_origins: Vec<String>,
    /// Grace period given to in-flight background work on shutdown.
    pub shutdown_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            enable_docs: true,
            request_timeout_seconds: 30,
            allowed_origins: vec!["*".to_string()],
            shutdown_timeout_seconds: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

/// Backend used to persist scan jobs
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Dragonfly/Redis (recommended for production, survives restarts)
    #[default]
    Dragonfly,
    /// In-process storage (single instance, development and tests)
    Memory,
}

/// Job store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Dragonfly DB connection URL (e.g., "redis://127.0.0.1:6379")
    pub dragonfly_url: String,
    /// Prefix applied to every key written by the store
    pub key_prefix: String,
    /// Lifetime of a scan record after its last write
    pub ttl_hours: u64,
    /// Maximum number of ids kept in the recency index
    pub recent_capacity: usize,
    /// Connection timeout in seconds for Dragonfly DB
    pub connection_timeout_seconds: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Dragonfly,
            dragonfly_url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "scanward".to_string(),
            ttl_hours: 24,
            recent_capacity: 100,
            connection_timeout_seconds: 5,
        }
    }
}

impl StoreConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }
}

/// Scan admission and execution configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// How many of the most recent jobs are inspected for an in-flight scan of the same repo
    pub admission_window: usize,
    /// Upper bound on jobs returned by the listing endpoint
    pub list_limit: usize,
    /// Number of scans executed concurrently by the worker pool
    pub max_concurrent_scans: usize,
    /// Capacity of the in-process execution queue
    pub queue_capacity: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            admission_window: 20,
            list_limit: 20,
            max_concurrent_scans: 4,
            queue_capacity: 64,
        }
    }
}

/// Repository checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Base URL repositories are cloned from (`https://` or `file://`)
    pub base_url: String,
    /// Owner prefixed to bare repository names
    pub default_owner: Option<String>,
    pub clone_timeout_seconds: u64,
    /// Shallow clone depth for network remotes; `None` clones full history
    pub clone_depth: Option<i32>,
    /// Parent directory for workspaces. Defaults to std::env::temp_dir().
    pub checkout_parent: Option<PathBuf>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com".to_string(),
            default_owner: None,
            clone_timeout_seconds: 120,
            clone_depth: Some(1),
            checkout_parent: None,
        }
    }
}

/// Credential lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Environment variable holding the clone-capable token
    pub env_var: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_var: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Per-tool execution settings
///
/// Executable and timeout are optional so a partially specified section keeps
/// the tool's own defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub enabled: bool,
    /// Path to the executable (or bare name resolved through PATH)
    pub executable: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Additional CLI arguments appended before the scan target
    pub extra_args: Vec<String>,
}

impl ToolConfig {
    pub fn executable_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.executable.as_deref().unwrap_or(default)
    }

    pub fn timeout_or(&self, default_seconds: u64) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(default_seconds))
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: None,
            timeout_seconds: None,
            extra_args: Vec::new(),
        }
    }
}

/// Trivy settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrivyConfig {
    #[serde(flatten)]
    pub tool: ToolConfig,
}

/// Gitleaks settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitleaksConfig {
    #[serde(flatten)]
    pub tool: ToolConfig,
    /// Redact secret values in reported matches
    pub redact: bool,
}

impl Default for GitleaksConfig {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            redact: true,
        }
    }
}

/// Semgrep settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemgrepConfig {
    #[serde(flatten)]
    pub tool: ToolConfig,
    /// Value passed to `--config` (registry ruleset or local rules path)
    pub config: String,
}

impl Default for SemgrepConfig {
    fn default() -> Self {
        Self {
            tool: ToolConfig::default(),
            config: "auto".to_string(),
        }
    }
}

/// External scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ToolsConfig {
    pub trivy: TrivyConfig,
    pub gitleaks: GitleaksConfig,
    pub semgrep: SemgrepConfig,
}

impl Validate for Config {
    fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.logging.validate()?;
        self.store.validate()?;
        self.scan.validate()?;
        self.git.validate()?;
        self.tools.validate()?;
        if self.credentials.env_var.trim().is_empty() {
            return Err(ValidationError::credentials(
                "Credential env_var cannot be empty",
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Add local config and environment variables last (highest priority)
        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SCANWARD")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            );

        let config: Config = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}
