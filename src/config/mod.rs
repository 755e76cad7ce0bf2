//! Configuration module

pub mod settings;

pub use settings::{
    AuthConfig, BackendConfig, CorsConfig, LoggingConfig, PromptsConfig, ProtocolType,
    ServerConfig, Settings, UploadConfig,
};
