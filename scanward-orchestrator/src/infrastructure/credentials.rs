//! Repository credential providers

use crate::domain::{Credential, CredentialProvider};

/// Reads a single token from an environment variable for every repository.
#[derive(Debug, Clone)]
pub struct EnvCredentialProvider {
    env_var: String,
}

impl EnvCredentialProvider {
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credential(&self, _key: &str) -> Option<Credential> {
        std::env::var(&self.env_var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .map(Credential::new)
    }
}

/// Fixed token, or none at all.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    credential: Option<Credential>,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Some(Credential::new(token)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credential(&self, _key: &str) -> Option<Credential> {
        self.credential.clone()
    }
}
