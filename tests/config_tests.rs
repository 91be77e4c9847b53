/// Tests for client configuration.
///
/// Tests that touch process environment variables run serially.
use std::env;
use std::time::Duration;

use lytics_sdk::config::*;
use lytics_sdk::LyticsError;
use serial_test::serial;

fn clear_env() {
    env::remove_var(API_KEY_ENV);
    env::remove_var(API_BASE_ENV);
}

#[test]
fn test_defaults() {
    let config = LyticsConfig::new("abc");
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(config.api_key, "abc");
    assert!(config.timeout.is_none());
}

#[test]
fn test_builder() {
    let config = LyticsConfig::new("abc")
        .with_api_base("http://localhost:8080/")
        .with_timeout(Duration::from_secs(5));
    assert_eq!(config.api_base, "http://localhost:8080");
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_debug_masks_key() {
    let config = LyticsConfig::new("0123456789abcdef");
    let debug = format!("{config:?}");
    assert!(!debug.contains("0123456789abcdef"));
    assert!(debug.contains("0123...cdef"));
}

#[test]
fn test_mask_key() {
    assert_eq!(mask_key("short"), "*****");
    assert_eq!(mask_key(""), "");
    assert_eq!(mask_key("abcdefghij"), "abcd...ghij");
}

#[test]
#[serial]
fn test_from_env_requires_key() {
    clear_env();
    let err = LyticsConfig::from_env().unwrap_err();
    assert!(matches!(err, LyticsError::ConfigError(_)));

    env::set_var(API_KEY_ENV, "   ");
    assert!(LyticsConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_from_env() {
    clear_env();
    env::set_var(API_KEY_ENV, "env-key");
    let config = LyticsConfig::from_env().unwrap();
    assert_eq!(config.api_key, "env-key");
    assert_eq!(config.api_base, DEFAULT_API_BASE);

    env::set_var(API_BASE_ENV, "http://127.0.0.1:9000/");
    let config = LyticsConfig::from_env().unwrap();
    assert_eq!(config.api_base, "http://127.0.0.1:9000");
    clear_env();
}

#[test]
fn test_invalid_api_base_is_config_error() {
    let api = lytics_sdk::LyticsApi::new(LyticsConfig::new("k").with_api_base("not a url")).unwrap();
    assert!(matches!(
        api.endpoint(&["api", "account"]),
        Err(LyticsError::ConfigError(_))
    ));
}

#[test]
fn test_header_unsafe_key_is_rejected() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let api = lytics_sdk::LyticsApi::new(LyticsConfig::new("bad\nkey")).unwrap();
    let err = rt.block_on(api.get_accounts()).unwrap_err();
    assert!(matches!(err, LyticsError::ConfigError(_)));
}
