//! Configuration loader
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the base URL is not set there, falls back to a file; any other
//!    environment error is returned as is
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `BOOKDESK_API_BASE_URL`: API base URL (required)
//! - `BOOKDESK_API_TIMEOUT_SECS`: Request timeout in seconds (default 10)
//! - `BOOKDESK_CACHE_TTL_SECS`: Default cache TTL in seconds (default 300)
//! - `BOOKDESK_CACHE_MAX_ENTRIES`: LRU cap on cached responses
//! - `BOOKDESK_KEYCHAIN_SERVICE`: Keychain service name (default `bookdesk`)
//! - `BOOKDESK_USER_AGENT`: User-Agent header value
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./bookdesk.{json,toml}` then `./config.{json,toml}` (current directory)
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use bookdesk_domain::{BookdeskError, ClientConfig, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["bookdesk.json", "bookdesk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables win whenever `BOOKDESK_API_BASE_URL` is set; an
/// invalid value among them is reported rather than masked by a file.
///
/// # Errors
/// Returns `BookdeskError::Config` if the environment configuration is
/// invalid, or if the base URL is unset and no valid file is found.
pub fn load() -> Result<ClientConfig> {
    if env_optional("BOOKDESK_API_BASE_URL").is_none() {
        tracing::debug!("BOOKDESK_API_BASE_URL not set, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `BookdeskError::Config` if `BOOKDESK_API_BASE_URL` is missing, a
/// numeric variable does not parse, or validation fails.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(env_var("BOOKDESK_API_BASE_URL")?);

    if let Some(timeout) = env_parse::<u64>("BOOKDESK_API_TIMEOUT_SECS", "request timeout")? {
        config.request_timeout_secs = timeout;
    }
    if let Some(ttl) = env_parse::<u64>("BOOKDESK_CACHE_TTL_SECS", "cache TTL")? {
        config.cache_ttl_secs = ttl;
    }
    config.cache_max_entries =
        env_parse::<usize>("BOOKDESK_CACHE_MAX_ENTRIES", "cache max entries")?;
    if let Some(service) = env_optional("BOOKDESK_KEYCHAIN_SERVICE") {
        config.keychain_service = service;
    }
    config.user_agent = env_optional("BOOKDESK_USER_AGENT");

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `BookdeskError::Config` if no file is found, it cannot be read or
/// parsed, or validation fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BookdeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BookdeskError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BookdeskError::Config(format!("Failed to read config file: {}", e)))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BookdeskError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BookdeskError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BookdeskError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        BookdeskError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Non-empty value of an optional variable
fn env_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str, label: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_optional(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| BookdeskError::Config(format!("Invalid {label}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 6] = [
        "BOOKDESK_API_BASE_URL",
        "BOOKDESK_API_TIMEOUT_SECS",
        "BOOKDESK_CACHE_TTL_SECS",
        "BOOKDESK_CACHE_MAX_ENTRIES",
        "BOOKDESK_KEYCHAIN_SERVICE",
        "BOOKDESK_USER_AGENT",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKDESK_API_BASE_URL", "https://api.bookdesk.test/v1");
        std::env::set_var("BOOKDESK_API_TIMEOUT_SECS", "15");
        std::env::set_var("BOOKDESK_CACHE_TTL_SECS", "120");
        std::env::set_var("BOOKDESK_CACHE_MAX_ENTRIES", "500");
        std::env::set_var("BOOKDESK_KEYCHAIN_SERVICE", "bookdesk.staging");
        std::env::set_var("BOOKDESK_USER_AGENT", "bookdesk-admin/2.1");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.base_url, "https://api.bookdesk.test/v1");
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.cache_ttl_secs, 120);
        assert_eq!(config.cache_max_entries, Some(500));
        assert_eq!(config.keychain_service, "bookdesk.staging");
        assert_eq!(config.user_agent.as_deref(), Some("bookdesk-admin/2.1"));
    }

    #[test]
    fn test_load_from_env_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKDESK_API_BASE_URL", "http://localhost:4000");
        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.cache_max_entries, None);
        assert_eq!(config.keychain_service, "bookdesk");
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let result = load_from_env();
        assert!(matches!(result, Err(BookdeskError::Config(_))));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKDESK_API_BASE_URL", "http://localhost:4000");
        std::env::set_var("BOOKDESK_API_TIMEOUT_SECS", "ten");
        let result = load_from_env();
        clear_env();

        match result {
            Err(BookdeskError::Config(msg)) => assert!(msg.contains("request timeout")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_reports_invalid_env_instead_of_falling_back() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKDESK_API_BASE_URL", "http://localhost:4000");
        std::env::set_var("BOOKDESK_API_TIMEOUT_SECS", "ten");
        let result = load();
        clear_env();

        match result {
            Err(BookdeskError::Config(msg)) => assert!(msg.contains("request timeout"), "{msg}"),
            other => panic!("expected the env error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_env_rejects_zero_timeout() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("BOOKDESK_API_BASE_URL", "http://localhost:4000");
        std::env::set_var("BOOKDESK_API_TIMEOUT_SECS", "0");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(BookdeskError::Config(_))));
    }

    #[test]
    fn test_load_from_file_json() {
        let json_content = r#"{
            "base_url": "https://api.bookdesk.test",
            "cache_ttl_secs": 60
        }"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(json_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("json");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.expect("config from JSON file");
        assert_eq!(config.base_url, "https://api.bookdesk.test");
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/bookdesk.json")));
        assert!(matches!(result, Err(BookdeskError::Config(_))));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_content = r#"
base_url = "https://api.bookdesk.test"
request_timeout_secs = 20
cache_max_entries = 100
"#;

        let config = parse_config(toml_content, &PathBuf::from("bookdesk.toml")).unwrap();
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.cache_max_entries, Some(100));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("base_url: x", &PathBuf::from("bookdesk.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_parse_config_missing_base_url() {
        let result = parse_config(r#"{"cache_ttl_secs": 60}"#, &PathBuf::from("bookdesk.json"));
        assert!(matches!(result, Err(BookdeskError::Config(_))));
    }
}
