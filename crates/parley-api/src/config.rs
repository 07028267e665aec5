use config::{Config as ConfigLoader, ConfigError, File};
use parley_exchange::PollSchedule;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub openai_assistant_id: String,
    #[serde(default)]
    pub openai_organization: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7071,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_request_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Opening assistant line for new threads; the built-in greeting when unset
    #[serde(default)]
    pub greeting: Option<String>,
    #[serde(default = "default_poll_unit_ms")]
    pub poll_unit_ms: u64,
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,
    /// Alternative API root, e.g. a proxy or a local mock
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            greeting: None,
            poll_unit_ms: default_poll_unit_ms(),
            max_poll_attempts: default_max_poll_attempts(),
            base_url: None,
        }
    }
}

impl AssistantConfig {
    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule::new(
            Duration::from_millis(self.poll_unit_ms),
            self.max_poll_attempts,
        )
    }
}

fn default_poll_unit_ms() -> u64 {
    1000
}

fn default_max_poll_attempts() -> u32 {
    5
}

/// Environment variables that override single config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("SERVER_REQUEST_TIMEOUT_SECS", "server.request_timeout_secs"),
    ("CORS_ENABLED", "cors.enabled"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
    ("ASSISTANT_GREETING", "assistant.greeting"),
    ("ASSISTANT_POLL_UNIT_MS", "assistant.poll_unit_ms"),
    ("ASSISTANT_MAX_POLL_ATTEMPTS", "assistant.max_poll_attempts"),
    ("ASSISTANT_BASE_URL", "assistant.base_url"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_, CORS_, LOG_ and ASSISTANT_ prefixes)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with environment lookups going through `env`
    pub fn load_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = env("ENV").unwrap_or_else(|| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", profile)).required(false));

        // 3. Environment variables override everything
        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, env(var))?;
        }
        if let Some(origins) = env("CORS_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
            builder = builder.set_override("cors.origins", origins)?;
        }

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.openai_api_key = require(&env, "OPENAI_API_KEY")?;
        cfg.openai_assistant_id = require(&env, "OPENAI_ASSISTANT_ID")?;
        cfg.openai_organization = env("OPENAI_ORGANIZATION").filter(|org| !org.is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

fn require<F>(env: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    env(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::Message(format!("{} environment variable is required", key)))
}
