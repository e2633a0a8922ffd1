//! Configuration loading, validation, and management for Coscribe.
//!
//! Loads configuration from `~/.coscribe/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.coscribe/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model provider (OpenAI-compatible endpoint)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Research backend (Sonar API)
    #[serde(default)]
    pub research: ResearchConfig,

    /// Workflow webhook
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Slash-command routing
    #[serde(default)]
    pub command: CommandConfig,

    /// Context assembly (system preamble, document embedding)
    #[serde(default)]
    pub context: ContextConfig,

    /// Dispatch loop limits and timeouts
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("research", &self.research)
            .field("webhook", &self.webhook)
            .field("command", &self.command)
            .field("context", &self.context)
            .field("dispatch", &self.dispatch)
            .finish()
    }
}

/// Connection settings for the chat-completions provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible endpoint
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// API key (usually supplied via environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Transport timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_provider_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Settings for the Sonar research backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Whether the research tool is offered to the model at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Sonar API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sonar API base URL
    #[serde(default = "default_research_url")]
    pub base_url: String,

    /// Which Sonar model to query
    #[serde(default = "default_research_model")]
    pub model: String,

    /// Transport timeout in seconds
    #[serde(default = "default_research_timeout")]
    pub timeout_secs: u64,
}

fn default_research_url() -> String {
    "https://api.perplexity.ai".into()
}
fn default_research_model() -> String {
    "sonar-reasoning".into()
}
fn default_research_timeout() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: default_research_url(),
            model: default_research_model(),
            timeout_secs: default_research_timeout(),
        }
    }
}

impl std::fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchConfig")
            .field("enabled", &self.enabled)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Settings for the external workflow webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Whether slash commands may reach the webhook
    #[serde(default)]
    pub enabled: bool,

    /// Webhook endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Transport timeout in seconds
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout() -> u64 {
    30
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            timeout_secs: default_webhook_timeout(),
        }
    }
}

/// Slash-command routing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Leading token that diverts input to the webhook
    #[serde(default = "default_command_prefix")]
    pub prefix: String,

    /// Send the current document along with the command query
    #[serde(default = "default_true")]
    pub attach_document: bool,
}

fn default_command_prefix() -> String {
    "/research".into()
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            prefix: default_command_prefix(),
            attach_document: true,
        }
    }
}

/// Context assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Instructional text prepended to the embedded document
    #[serde(default = "default_system_preamble")]
    pub system_preamble: String,

    /// Truncate the embedded document to this many characters (None = never)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_document_chars: Option<usize>,

    /// Which end of an oversized document survives truncation
    #[serde(default)]
    pub truncate: TruncatePolicy,
}

/// Which end of the document to keep when it exceeds `max_document_chars`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncatePolicy {
    /// Keep the beginning
    #[default]
    Head,
    /// Keep the end
    Tail,
}

fn default_system_preamble() -> String {
    "You are a writing assistant helping the user draft and refine a document. \
     The user's current document is provided below. When the user asks you to \
     change the document, respond with the line \"I'll update the document with:\" \
     followed by the complete new document content in a fenced code block. \
     Use the research tool when a question needs current facts or sources."
        .into()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            system_preamble: default_system_preamble(),
            max_document_chars: None,
            truncate: TruncatePolicy::Head,
        }
    }
}

/// Dispatch loop limits and timeouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Max tool rounds per turn before the loop aborts
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Deadline for one model invocation, in seconds
    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,

    /// Deadline for one tool execution, in seconds
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Pause before the single model-call retry, in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_max_tool_rounds() -> usize {
    2
}
fn default_model_timeout() -> u64 {
    90
}
fn default_tool_timeout() -> u64 {
    60
}
fn default_retry_backoff() -> u64 {
    500
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            model_timeout_secs: default_model_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.coscribe/config.toml).
    ///
    /// Also checks environment variables for secrets and endpoints:
    /// - `COSCRIBE_API_KEY` (highest priority), then `OPENROUTER_API_KEY`,
    ///   then `OPENAI_API_KEY`
    /// - `COSCRIBE_MODEL`
    /// - `PERPLEXITY_API_KEY`
    /// - `COSCRIBE_WEBHOOK_URL`, then `N8N_WEBHOOK_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var("COSCRIBE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("COSCRIBE_MODEL") {
            config.provider.model = model;
        }

        if config.research.api_key.is_none() {
            config.research.api_key = std::env::var("PERPLEXITY_API_KEY").ok();
        }

        if config.webhook.url.is_none() {
            config.webhook.url = std::env::var("COSCRIBE_WEBHOOK_URL")
                .ok()
                .or_else(|| std::env::var("N8N_WEBHOOK_URL").ok());
        }
        if config.webhook.url.is_some() {
            config.webhook.enabled = true;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".coscribe")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.temperature < 0.0 || self.provider.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.dispatch.max_tool_rounds == 0 {
            return Err(ConfigError::ValidationError(
                "dispatch.max_tool_rounds must be at least 1".into(),
            ));
        }

        if !self.command.prefix.starts_with('/') || self.command.prefix.len() < 2 {
            return Err(ConfigError::ValidationError(
                "command.prefix must start with '/' and name a command".into(),
            ));
        }

        if self.context.max_document_chars == Some(0) {
            return Err(ConfigError::ValidationError(
                "context.max_document_chars must be greater than zero when set".into(),
            ));
        }

        if self.webhook.enabled && self.webhook.url.is_none() {
            return Err(ConfigError::ValidationError(
                "webhook.enabled requires webhook.url".into(),
            ));
        }

        Ok(())
    }

    /// Check if a provider API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            research: ResearchConfig::default(),
            webhook: WebhookConfig::default(),
            command: CommandConfig::default(),
            context: ContextConfig::default(),
            dispatch: DispatchConfig::default(),
        }
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

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
