use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::RetryPolicy;
use crate::domain::prompt::{CONTEXT_PIECES, USER_QUERY};
use crate::domain::PromptTemplate;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";
pub const DEFAULT_PROMPTS_PATH: &str = "config/prompts.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Service settings plus prompt templates, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Reads `CONFIG_PATH` / `PROMPTS_PATH` (or the defaults) and applies
    /// environment overrides. Missing files fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let prompts_path =
            std::env::var("PROMPTS_PATH").unwrap_or_else(|_| DEFAULT_PROMPTS_PATH.into());

        let mut app = Self::from_files(Path::new(&config_path), Path::new(&prompts_path))?;
        app.config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(app)
    }

    pub fn from_files(config_path: &Path, prompts_path: &Path) -> Result<Self, ConfigError> {
        let prompts: PromptsConfig = read_yaml(prompts_path)?.unwrap_or_default();
        prompts.validate()?;

        Ok(Self {
            config: read_yaml(config_path)?.unwrap_or_default(),
            prompts,
        })
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub azure: AzureConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("AZURE_OPENAI_API_KEY") {
            self.azure.api_key = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.azure.endpoint = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_API_VERSION") {
            self.azure.api_version = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_CHAT_DEPLOYMENT") {
            self.llm.deployment = v;
        }
        if let Some(v) = lookup("AZURE_OPENAI_EMBEDDING_DEPLOYMENT") {
            self.embedding.deployment = v;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("SERVER_PORT") {
            self.server.port = v.parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT".into(),
                value: v,
            })?;
        }
        if let Some(v) = lookup("LOG_FORMAT") {
            self.logging.format = match v.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "LOG_FORMAT".into(),
                        value: v,
                    })
                }
            };
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Connection settings shared by the chat and embedding deployments.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: "2024-02-01".into(),
            timeout_seconds: 60,
        }
    }
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub deployment: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub request_timeout_seconds: u64,
    pub deadline_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            deployment: "gpt-4o".into(),
            max_attempts: 5,
            base_delay_ms: 1000,
            max_delay_ms: 16_000,
            request_timeout_seconds: 60,
            deadline_seconds: 120,
        }
    }
}

impl LlmConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_attempt_timeout(Duration::from_secs(self.request_timeout_seconds))
            .with_deadline(Duration::from_secs(self.deadline_seconds))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub deployment: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            deployment: "text-embedding-3-small".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub chunk_size: usize,
    pub seed_path: Option<PathBuf>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_size: 1000,
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "rag_service=debug,tower_http=debug".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub rag: RagPrompts,
}

impl PromptsConfig {
    /// Rejects templates whose placeholders `/rag_inference` cannot fill.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rag
            .context_inference
            .ensure_placeholders(&[CONTEXT_PIECES, USER_QUERY])
            .map_err(|e| ConfigError::Invalid {
                key: "rag.context_inference".into(),
                value: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub context_inference: PromptTemplate,
}
