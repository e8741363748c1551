//! Configuration validation module

use crate::config::{
    GitConfig, LoggingConfig, ScanConfig, ServerConfig, StoreConfig, ToolConfig, ToolsConfig,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Store configuration error: {message}")]
    Store { message: String },

    #[error("Scan configuration error: {message}")]
    Scan { message: String },

    #[error("Git configuration error: {message}")]
    Git { message: String },

    #[error("Credentials configuration error: {message}")]
    Credentials { message: String },

    #[error("Tool configuration error: {message}")]
    Tool { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan {
            message: message.into(),
        }
    }

    pub fn git(message: impl Into<String>) -> Self {
        Self::Git {
            message: message.into(),
        }
    }

    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    pub fn tool(message: impl Into<String>) -> Self {
        Self::Tool {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        // u16 cannot exceed 65535, so only 0 needs rejecting
        if self.port == 0 {
            return Err(ValidationError::server(format!(
                "Port must be in range 1-65535, got {}",
                self.port
            )));
        }

        if self.host.is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "Request timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "Unknown log format '{}', expected 'json' or 'pretty'",
                other
            ))),
        }
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_hours == 0 {
            return Err(ValidationError::store(
                "Store TTL must be greater than 0 hours",
            ));
        }

        if self.recent_capacity == 0 {
            return Err(ValidationError::store(
                "Recent index capacity must be greater than 0",
            ));
        }

        if self.key_prefix.is_empty() {
            return Err(ValidationError::store("Key prefix cannot be empty"));
        }

        Ok(())
    }
}

impl Validate for ScanConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.admission_window == 0 {
            return Err(ValidationError::scan(
                "Admission window must be greater than 0",
            ));
        }

        if self.list_limit == 0 {
            return Err(ValidationError::scan("List limit must be greater than 0"));
        }

        if self.max_concurrent_scans == 0 {
            return Err(ValidationError::scan(
                "max_concurrent_scans must be greater than 0",
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ValidationError::scan(
                "Queue capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for GitConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("file://")) {
            return Err(ValidationError::git(format!(
                "base_url must use https:// or file://, got {}",
                self.base_url
            )));
        }

        if self.clone_timeout_seconds == 0 {
            return Err(ValidationError::git(
                "Clone timeout must be greater than 0",
            ));
        }

        if let Some(depth) = self.clone_depth
            && depth <= 0
        {
            return Err(ValidationError::git(format!(
                "Clone depth must be positive, got {}",
                depth
            )));
        }

        Ok(())
    }
}

fn validate_tool(name: &str, tool: &ToolConfig) -> Result<(), ValidationError> {
    if let Some(executable) = &tool.executable
        && executable.trim().is_empty()
    {
        return Err(ValidationError::tool(format!(
            "{} executable cannot be empty",
            name
        )));
    }

    if tool.timeout_seconds == Some(0) {
        return Err(ValidationError::tool(format!(
            "{} timeout must be greater than 0",
            name
        )));
    }

    Ok(())
}

impl Validate for ToolsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_tool("trivy", &self.trivy.tool)?;
        validate_tool("gitleaks", &self.gitleaks.tool)?;
        validate_tool("semgrep", &self.semgrep.tool)?;

        if self.semgrep.config.trim().is_empty() {
            return Err(ValidationError::tool("semgrep config cannot be empty"));
        }

        Ok(())
    }
}
