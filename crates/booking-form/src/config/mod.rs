use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::forms::render::document::DEFAULT_FONT_FAMILY;
use crate::forms::{DocumentRuntimeConfig, LayoutConstants, LayoutError, LayoutVariant};

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
    pub form: FormConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            form: FormConfig::from_env()?,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Form layout and document settings.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub variant: LayoutVariant,
    pub template_path: Option<PathBuf>,
    pub font_family: String,
}

impl FormConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let variant = match env::var("FORM_LAYOUT_VARIANT") {
            Ok(value) if !value.trim().is_empty() => LayoutVariant::from_name(&value)
                .ok_or(ConfigError::InvalidLayoutVariant { value })?,
            _ => LayoutVariant::default(),
        };

        let template_path = env::var("FORM_TEMPLATE_PATH")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let font_family = env::var("FORM_FONT_FAMILY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string());

        Ok(Self {
            variant,
            template_path,
            font_family,
        })
    }

    /// Constants for the configured variant, validated before use.
    pub fn layout_constants(&self) -> Result<LayoutConstants, ConfigError> {
        let constants = self.variant.constants();
        constants
            .validate()
            .map_err(|source| ConfigError::InvalidLayout { source })?;
        Ok(constants)
    }

    pub fn runtime_config(&self) -> DocumentRuntimeConfig {
        DocumentRuntimeConfig {
            font_family: self.font_family.clone(),
            ..DocumentRuntimeConfig::default()
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            variant: LayoutVariant::default(),
            template_path: None,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLayoutVariant { value: String },
    InvalidLayout { source: LayoutError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLayoutVariant { value } => write!(
                f,
                "FORM_LAYOUT_VARIANT must be `wide` or `compact`, found '{}'",
                value
            ),
            ConfigError::InvalidLayout { source } => {
                write!(f, "form layout constants are invalid: {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidLayoutVariant { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidLayout { source } => Some(source),
        }
    }
}
