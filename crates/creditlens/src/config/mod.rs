use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::{PolicyKind, UnknownPolicy};

pub const DEFAULT_LLAMA_API_URL: &str = "https://api.llama-api.com/chat/completions";
pub const DEFAULT_LLAMA_MODEL: &str = "llama4-maverick";
pub const DEFAULT_LLAMA_PARSE_URL: &str = "https://api.cloud.llamaindex.ai/api/parsing";
const DEFAULT_POLL_ATTEMPTS: u32 = 60;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub language_model: LanguageModelConfig,
    pub document_parser: DocumentParserConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|bytes| *bytes > 0)
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let policy = match env::var("SCORING_POLICY") {
            Ok(value) => value
                .parse::<PolicyKind>()
                .map_err(|source| ConfigError::InvalidPolicy { source })?,
            Err(_) => PolicyKind::default(),
        };

        let poll_attempts = match env::var("LLAMA_PARSE_POLL_ATTEMPTS") {
            Ok(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ConfigError::InvalidPollAttempts)?,
            Err(_) => DEFAULT_POLL_ATTEMPTS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                upload_dir: PathBuf::from(upload_dir),
                max_upload_bytes,
            },
            scoring: ScoringConfig { policy },
            language_model: LanguageModelConfig {
                api_key: non_empty_var("LLAMA_API_KEY"),
                api_url: env::var("LLAMA_API_URL")
                    .unwrap_or_else(|_| DEFAULT_LLAMA_API_URL.to_string()),
                model: env::var("LLAMA_MODEL").unwrap_or_else(|_| DEFAULT_LLAMA_MODEL.to_string()),
            },
            document_parser: DocumentParserConfig {
                api_key: non_empty_var("LLAMA_CLOUD_API_KEY"),
                base_url: env::var("LLAMA_PARSE_URL")
                    .unwrap_or_else(|_| DEFAULT_LLAMA_PARSE_URL.to_string()),
                poll_attempts,
                poll_interval: POLL_INTERVAL,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where uploaded statements wait for analysis.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Request body cap for statement uploads.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ScoringConfig {
    pub policy: PolicyKind,
}

/// Chat-completion endpoint used for extraction and narrative.
#[derive(Debug, Clone)]
pub struct LanguageModelConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct DocumentParserConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPolicy { source: UnknownPolicy },
    InvalidPollAttempts,
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPolicy { source } => write!(f, "SCORING_POLICY: {source}"),
            ConfigError::InvalidPollAttempts => {
                write!(f, "LLAMA_PARSE_POLL_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "MAX_UPLOAD_BYTES must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidPollAttempts
            | ConfigError::InvalidUploadLimit => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPolicy { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "UPLOAD_DIR",
            "MAX_UPLOAD_BYTES",
            "SCORING_POLICY",
            "LLAMA_API_KEY",
            "LLAMA_API_URL",
            "LLAMA_MODEL",
            "LLAMA_CLOUD_API_KEY",
            "LLAMA_PARSE_URL",
            "LLAMA_PARSE_POLL_ATTEMPTS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.scoring.policy, PolicyKind::Liability);
        assert_eq!(config.language_model.api_url, DEFAULT_LLAMA_API_URL);
        assert_eq!(config.language_model.model, DEFAULT_LLAMA_MODEL);
        assert_eq!(config.document_parser.poll_attempts, DEFAULT_POLL_ATTEMPTS);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8000));
    }

    #[test]
    fn reads_policy_and_credentials() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_POLICY", "utilization");
        env::set_var("LLAMA_API_KEY", "sk-test");
        env::set_var("LLAMA_CLOUD_API_KEY", "  ");
        env::set_var("LLAMA_PARSE_POLL_ATTEMPTS", "5");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.scoring.policy, PolicyKind::Utilization);
        assert_eq!(config.language_model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.document_parser.api_key, None);
        assert_eq!(config.document_parser.poll_attempts, 5);
    }

    #[test]
    fn rejects_invalid_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_POLICY", "fico");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPolicy { .. })
        ));

        reset_env();
        env::set_var("LLAMA_PARSE_POLL_ATTEMPTS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidPollAttempts)
        ));

        reset_env();
        env::set_var("MAX_UPLOAD_BYTES", "lots");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidUploadLimit)
        ));

        reset_env();
        env::set_var("APP_PORT", "99999");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidPort)));
        reset_env();
    }
}
