//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    pub prompts: PromptsConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Inbound API key authentication
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Literal secret; takes precedence over `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_auth_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_auth_header")]
    pub header_name: String,
    #[serde(default = "default_bypass_paths")]
    pub bypass_paths: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_auth_key_env() -> String {
    "FASTAPI_API_KEY".to_string()
}

fn default_auth_header() -> String {
    "x-api-key".to_string()
}

fn default_bypass_paths() -> Vec<String> {
    vec!["/health".to_string()]
}

impl AuthConfig {
    /// Resolve the expected secret from the literal value or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Protocol spoken by the generation API
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolType {
    #[default]
    Gemini,
    OpenAI,
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolType::Gemini => write!(f, "gemini"),
            ProtocolType::OpenAI => write!(f, "openai"),
        }
    }
}

/// Generation API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_name")]
    pub name: String,

    #[serde(default)]
    pub protocol: ProtocolType,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_backend_key_env")]
    pub api_key_env: String,

    /// Custom auth header for OpenAI-compatible servers; bearer token when unset
    #[serde(default)]
    pub auth_header_name: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_backend_name() -> String {
    "gemini".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

fn default_backend_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60000
}

impl BackendConfig {
    /// Resolve the upstream API key from the literal value or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.is_empty())
    }
}

/// Prompt library location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptsConfig {
    #[serde(default = "default_prompts_path")]
    pub path: String,
}

fn default_prompts_path() -> String {
    "prompts_library.json".to_string()
}

/// Upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `["*"]` allows any origin
    #[serde(default = "default_origins")]
    pub allow_origins: Vec<String>,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/assist.yaml")
    }

    /// Load settings from a specific configuration file (YAML or TOML by extension)
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path
            .extension()
            .map_or(false, |ext| ext == "yaml" || ext == "yml")
        {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("auth.enabled", true)?
            .set_default("auth.api_key_env", default_auth_key_env())?
            .set_default("auth.header_name", default_auth_header())?
            .set_default("auth.bypass_paths", default_bypass_paths())?
            .set_default("backend.name", default_backend_name())?
            .set_default("backend.protocol", "gemini")?
            .set_default("backend.endpoint", default_endpoint())?
            .set_default("backend.model", default_model())?
            .set_default("backend.api_key_env", default_backend_key_env())?
            .set_default("backend.timeout_ms", default_timeout() as i64)?
            .set_default("prompts.path", default_prompts_path())?
            .set_default("upload.max_bytes", default_max_bytes() as i64)?
            .set_default("cors.enabled", true)?
            .set_default("cors.allow_origins", default_origins())?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("TEXT_ASSIST")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }
        if self.backend.endpoint.trim().is_empty() {
            return Err(invalid("Backend endpoint cannot be empty"));
        }
        if self.backend.model.trim().is_empty() {
            return Err(invalid("Backend model cannot be empty"));
        }
        if self.prompts.path.trim().is_empty() {
            return Err(invalid("Prompts path cannot be empty"));
        }
        if self.auth.header_name.trim().is_empty() {
            return Err(invalid("Auth header name cannot be empty"));
        }
        if self.upload.max_bytes == 0 {
            return Err(invalid("Upload limit must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Config(config::ConfigError::Message(message.to_string()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            auth: AuthConfig::default(),
            backend: BackendConfig::default(),
            prompts: PromptsConfig {
                path: default_prompts_path(),
            },
            upload: UploadConfig {
                max_bytes: default_max_bytes(),
            },
            cors: CorsConfig {
                enabled: true,
                allow_origins: default_origins(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            api_key_env: default_auth_key_env(),
            header_name: default_auth_header(),
            bypass_paths: default_bypass_paths(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: default_backend_name(),
            protocol: ProtocolType::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_backend_key_env(),
            auth_header_name: None,
            timeout_ms: default_timeout(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}
