//! Unit tests for config module.

use super::*;
use std::io::Write;

#[test]
fn test_parse_config() {
    let toml_content = r#"
[api]
base_url = "http://127.0.0.1:5001"
timeout_secs = 10
api_key = "s3cret"

[cache]
enabled = false
ttl_secs = 5

[logging]
filter = "oracle_forge=debug"
"#;

    let config = Config::parse(toml_content).expect("should parse");
    assert_eq!(config.api.base_url, "http://127.0.0.1:5001");
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.api.api_key.as_deref(), Some("s3cret"));
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.ttl(), Duration::from_secs(5));
    assert_eq!(config.logging.filter, "oracle_forge=debug");
}

#[test]
fn test_parse_empty_uses_defaults() {
    let config = Config::parse("").expect("should parse");

    assert_eq!(config, Config::default());
    assert_eq!(config.api.base_url, "http://localhost:5000");
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn test_parse_partial_section() {
    let config = Config::parse("[cache]\nttl_secs = 120\n").expect("should parse");

    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 120);
    assert_eq!(config.api, ApiConfig::default());
}

#[test]
fn test_parse_invalid_toml() {
    let result = Config::parse("[api\nbase_url = ");

    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[api]\nbase_url = \"https://forge.example.com\"").unwrap();

    let config = Config::load(file.path()).expect("should load");

    assert_eq!(config.api.base_url, "https://forge.example.com");
}

#[test]
fn test_load_missing_file() {
    let result = Config::load("/definitely/not/oracle-forge.toml");

    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_validation_empty_base_url() {
    let result = Config::parse("[api]\nbase_url = \"  \"\n");

    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
}

#[test]
fn test_validation_non_http_base_url() {
    let result = Config::parse("[api]\nbase_url = \"ftp://forge\"\n");

    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
}

#[test]
fn test_validation_zero_timeout() {
    let result = Config::parse("[api]\ntimeout_secs = 0\n");

    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
}

#[test]
fn test_validation_zero_ttl_only_when_enabled() {
    assert!(Config::parse("[cache]\nttl_secs = 0\n").is_err());
    assert!(Config::parse("[cache]\nenabled = false\nttl_secs = 0\n").is_ok());
}

// ============================================================================
// Override / Client config Tests
// ============================================================================

#[test]
fn test_override_base_url_replaces_base_url() {
    let mut config = Config::default();

    config.override_base_url(Some(" http://10.0.0.2:5000 ".to_string()));

    assert_eq!(config.api.base_url, "http://10.0.0.2:5000");
}

#[test]
fn test_override_base_url_ignores_blank() {
    let mut config = Config::default();

    config.override_base_url(Some("   ".to_string()));
    config.override_base_url(None);

    assert_eq!(config.api.base_url, "http://localhost:5000");
}

#[test]
fn test_client_config_carries_api_key() {
    let mut config = Config::default();
    config.api.api_key = Some("abc".to_string());
    config.api.timeout_secs = 12;

    let client = config.client_config();

    assert_eq!(client.base_url, "http://localhost:5000");
    assert_eq!(client.timeout, Duration::from_secs(12));
    assert_eq!(
        client.default_headers,
        vec![("X-API-Key".to_string(), "abc".to_string())]
    );
}

#[test]
fn test_client_config_without_api_key() {
    let mut config = Config::default();
    config.api.api_key = Some(String::new());

    assert!(config.client_config().default_headers.is_empty());
}

#[test]
fn test_resolve_flag_wins_over_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[api]\nbase_url = \"http://file.example.com\"\ntimeout_secs = 5").unwrap();

    let config = Config::resolve(Some(file.path()), Some("http://flag.example.com".to_string()))
        .expect("should resolve");

    assert_eq!(config.api.base_url, "http://flag.example.com");
    assert_eq!(config.api.timeout_secs, 5);
}

#[test]
fn test_resolve_rejects_invalid_flag() {
    let result = Config::resolve(None, Some("not-a-url".to_string()));

    assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
}
