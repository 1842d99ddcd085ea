//! Configuration loading, validation, and management for persona-relay.
//!
//! Loads configuration from `~/.persona-relay/config.toml` with environment
//! variable overrides. Everything the generation backend needs is checked at
//! startup, so a missing endpoint or key never surfaces mid-request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// The root configuration structure.
///
/// Maps directly to `~/.persona-relay/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Azure OpenAI deployment settings
    #[serde(default)]
    pub azure_openai: AzureOpenAiConfig,

    /// Generation backend selection
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Context store configuration
    #[serde(default)]
    pub context: ContextConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AzureOpenAiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.into()
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: None,
            api_key: None,
            api_version: default_api_version(),
        }
    }
}

impl std::fmt::Debug for AzureOpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiConfig")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_key", &redact(&self.api_key))
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Fully resolved Azure OpenAI settings; every mandatory field is present.
#[derive(Clone)]
pub struct AzureOpenAiSettings {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
}

impl std::fmt::Debug for AzureOpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiSettings")
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl AzureOpenAiConfig {
    /// Resolve the mandatory settings, failing on the first one that is
    /// absent or blank.
    pub fn require(&self) -> Result<AzureOpenAiSettings, ConfigError> {
        fn field(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or(ConfigError::Missing(name))
        }

        let api_version = if self.api_version.trim().is_empty() {
            default_api_version()
        } else {
            self.api_version.trim().to_string()
        };

        Ok(AzureOpenAiSettings {
            endpoint: field(&self.endpoint, "azure_openai.endpoint")?,
            deployment: field(&self.deployment, "azure_openai.deployment")?,
            api_key: field(&self.api_key, "azure_openai.api_key")?,
            api_version,
        })
    }
}

/// Which generation backend the process wires up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationBackend {
    /// Real Azure OpenAI deployment
    #[default]
    Azure,
    /// Deterministic offline double
    Mock,
}

impl std::str::FromStr for GenerationBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "azure" => Ok(Self::Azure),
            "mock" => Ok(Self::Mock),
            other => Err(ConfigError::ValidationError(format!(
                "unknown generation backend '{other}' (expected 'azure' or 'mock')"
            ))),
        }
    }
}

impl std::fmt::Display for GenerationBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Azure => write!(f, "azure"),
            Self::Mock => write!(f, "mock"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub backend: GenerationBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Origins allowed by the CORS policy (credentials are allowed).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://botdigital.info".into(),
        "https://staging.botdigital.info".into(),
        "http://localhost:19006".into(),
    ]
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// How many context entries a tool invocation retrieves.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Entries upserted into the store at startup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seed: Vec<ContextSeed>,
}

fn default_search_limit() -> usize {
    5
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            seed: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSeed {
    pub key: String,
    pub text: String,
}

impl AppConfig {
    /// Load configuration from the default path (~/.persona-relay/config.toml).
    ///
    /// Environment variables override the file:
    /// - `AZURE_OPENAI_ENDPOINT`, `AZURE_OPENAI_DEPLOYMENT`,
    ///   `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_API_VERSION`
    /// - `PERSONA_RELAY_BACKEND` (`azure` or `mock`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.azure_openai.endpoint = Some(endpoint);
        }
        if let Some(deployment) = lookup("AZURE_OPENAI_DEPLOYMENT") {
            self.azure_openai.deployment = Some(deployment);
        }
        if let Some(api_key) = lookup("AZURE_OPENAI_API_KEY") {
            self.azure_openai.api_key = Some(api_key);
        }
        if let Some(api_version) = lookup("AZURE_OPENAI_API_VERSION") {
            self.azure_openai.api_version = api_version;
        }
        if let Some(backend) = lookup("PERSONA_RELAY_BACKEND") {
            self.generation.backend = backend.parse()?;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".persona-relay")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.context.search_limit == 0 {
            return Err(ConfigError::ValidationError(
                "context.search_limit must be at least 1".into(),
            ));
        }

        if self.gateway.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gateway.host must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Render this config as TOML with the API key masked.
    pub fn redacted_toml(&self) -> String {
        let mut config = self.clone();
        if config.azure_openai.api_key.is_some() {
            config.azure_openai.api_key = Some("[REDACTED]".into());
        }
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("{0} configuration is required.")]
    Missing(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
