use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::candidates::eligibility::{
    EligibilityPolicy, DEFAULT_ALLOWED_INSTITUTIONS, DEFAULT_MINIMUM_AVERAGE,
};
use crate::candidates::router::REPORT_DOWNLOAD_ROUTE;

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
    pub eligibility: EligibilityPolicy,
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

        let candidates_path = env::var("APP_CANDIDATES_PATH")
            .unwrap_or_else(|_| "data/candidates.json".to_string());
        let report_path =
            env::var("APP_REPORT_PATH").unwrap_or_else(|_| "reports/report.pdf".to_string());

        let allowed_institutions = match env::var("APP_ALLOWED_INSTITUTIONS") {
            Ok(raw) => parse_institutions(&raw)?,
            Err(_) => DEFAULT_ALLOWED_INSTITUTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        };
        let minimum_average = match env::var("APP_MIN_AVERAGE") {
            Ok(raw) => parse_minimum_average(&raw)?,
            Err(_) => DEFAULT_MINIMUM_AVERAGE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig {
                candidates_path: PathBuf::from(candidates_path),
                report_path: PathBuf::from(report_path),
                report_location: REPORT_DOWNLOAD_ROUTE.to_string(),
            },
            eligibility: EligibilityPolicy::new(allowed_institutions, minimum_average),
        })
    }
}

fn parse_institutions(raw: &str) -> Result<Vec<String>, ConfigError> {
    let institutions: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    if institutions.is_empty() {
        return Err(ConfigError::EmptyInstitutionList);
    }

    Ok(institutions)
}

fn parse_minimum_average(raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| (0.0..=10.0).contains(value))
        .ok_or_else(|| ConfigError::InvalidMinimumAverage {
            value: raw.to_string(),
        })
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

/// Locations of the candidate file and the published report.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub candidates_path: PathBuf,
    pub report_path: PathBuf,
    /// Public path under which the transport serves the report.
    pub report_location: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMinimumAverage { value: String },
    EmptyInstitutionList,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMinimumAverage { value } => write!(
                f,
                "APP_MIN_AVERAGE must be a number between 0 and 10 (got '{}')",
                value
            ),
            ConfigError::EmptyInstitutionList => {
                write!(f, "APP_ALLOWED_INSTITUTIONS must name at least one institution")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMinimumAverage { .. }
            | ConfigError::EmptyInstitutionList => None,
        }
    }
}
