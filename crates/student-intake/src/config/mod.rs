use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::intake::processor::DEFAULT_MAX_UPLOAD_BYTES;

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

/// Top-level configuration for the intake service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub intake: IntakeConfig,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    /// Reads `.env` (when present) and the `APP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: AppEnvironment::from_str(&var_or("APP_ENV", "development")),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            intake: IntakeConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        Ok(Self {
            host: var_or("APP_HOST", "127.0.0.1"),
            port,
        })
    }

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

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Form-handling limits and the front-end origin allowed to post admissions.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    pub allowed_origin: String,
    pub max_upload_bytes: usize,
    /// Portal users allowed to review and decide applications.
    pub reviewers: Vec<String>,
}

impl IntakeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let allowed_origin = var_or("APP_ALLOWED_ORIGIN", "http://localhost:5173");
        if !["http://", "https://"]
            .iter()
            .any(|scheme| allowed_origin.starts_with(scheme))
        {
            return Err(ConfigError::InvalidOrigin {
                value: allowed_origin,
            });
        }

        let max_upload_bytes = match env::var("APP_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidUploadLimit)?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let reviewers = var_or("APP_REVIEWERS", "")
            .split(',')
            .map(str::trim)
            .filter(|reviewer| !reviewer.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            allowed_origin,
            max_upload_bytes,
            reviewers,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidOrigin { value: String },
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidOrigin { value } => {
                write!(f, "APP_ALLOWED_ORIGIN must be an http(s) origin, got '{value}'")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "APP_MAX_UPLOAD_BYTES must be a positive byte count")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidOrigin { .. }
            | ConfigError::InvalidUploadLimit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn clear_app_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_ALLOWED_ORIGIN",
            "APP_MAX_UPLOAD_BYTES",
            "APP_REVIEWERS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _env = env_lock().lock().expect("env mutex poisoned");
        clear_app_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.intake.allowed_origin, "http://localhost:5173");
        assert_eq!(config.intake.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.intake.reviewers.is_empty());
    }

    #[test]
    fn reviewers_are_comma_separated() {
        let _env = env_lock().lock().expect("env mutex poisoned");
        clear_app_env();
        env::set_var("APP_REVIEWERS", "admissions-office, principal ,");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.intake.reviewers, vec!["admissions-office", "principal"]);
        clear_app_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _env = env_lock().lock().expect("env mutex poisoned");
        clear_app_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        clear_app_env();
    }

    #[test]
    fn rejects_zero_upload_limit() {
        let _env = env_lock().lock().expect("env mutex poisoned");
        clear_app_env();
        env::set_var("APP_MAX_UPLOAD_BYTES", "0");
        let error = AppConfig::load().expect_err("zero limit");
        assert!(matches!(error, ConfigError::InvalidUploadLimit));
        clear_app_env();
    }

    #[test]
    fn rejects_origin_without_scheme() {
        let _env = env_lock().lock().expect("env mutex poisoned");
        clear_app_env();
        env::set_var("APP_ALLOWED_ORIGIN", "admissions.example.org");
        let error = AppConfig::load().expect_err("origin without scheme");
        assert!(matches!(error, ConfigError::InvalidOrigin { .. }));
        clear_app_env();
    }
}
