//! Unit tests for configuration module

use std::io::Write;
use tempfile::Builder;
use text_assist_gateway::config::{ProtocolType, Settings};

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8000);
    assert!(settings.auth.enabled);
    assert_eq!(settings.auth.api_key_env, "FASTAPI_API_KEY");
    assert_eq!(settings.auth.bypass_paths, vec!["/health".to_string()]);
    assert_eq!(settings.backend.protocol, ProtocolType::Gemini);
    assert_eq!(settings.backend.api_key_env, "GEMINI_API_KEY");
    assert_eq!(settings.prompts.path, "prompts_library.json");
    assert_eq!(settings.upload.max_bytes, 10 * 1024 * 1024);
}

#[test]
fn test_settings_validation_valid() {
    let settings = Settings::default();
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_validation_invalid_port() {
    let mut settings = Settings::default();
    settings.server.port = 0;

    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_empty_model() {
    let mut settings = Settings::default();
    settings.backend.model = "  ".to_string();

    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_empty_header_name() {
    let mut settings = Settings::default();
    settings.auth.header_name = String::new();

    assert!(settings.validate().is_err());
}

#[test]
fn test_missing_file_uses_defaults() {
    let settings = Settings::load_from_path("does/not/exist.yaml").unwrap();

    assert_eq!(settings.backend.model, "gemini-2.0-flash-lite");
    assert_eq!(settings.logging.format, "json");
}

#[test]
fn test_load_yaml_file() {
    let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        r#"
server:
  port: 9100
auth:
  api_key: file-secret
backend:
  protocol: openai
  endpoint: http://localhost:11434/v1
  model: llama3
  temperature: 0.2
cors:
  allow_origins:
    - http://localhost:3000
"#
    )
    .unwrap();

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.auth.resolve_api_key().as_deref(), Some("file-secret"));
    assert_eq!(settings.backend.protocol, ProtocolType::OpenAI);
    assert_eq!(settings.backend.model, "llama3");
    assert_eq!(settings.backend.temperature, Some(0.2));
    assert_eq!(settings.cors.allow_origins, vec!["http://localhost:3000".to_string()]);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_load_toml_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[logging]
level = "debug"
format = "pretty"

[prompts]
path = "custom_prompts.json"
"#
    )
    .unwrap();

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.logging.level, "debug");
    assert_eq!(settings.logging.format, "pretty");
    assert_eq!(settings.prompts.path, "custom_prompts.json");
}
