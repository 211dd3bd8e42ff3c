use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub simulator: SimulatorConfig,
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

        let simulator = SimulatorConfig {
            write_failure_rate: rate_var("APP_FAULT_RATE", SimulatorConfig::DEFAULT_WRITE_RATE)?,
            reorder_failure_rate: rate_var(
                "APP_REORDER_FAULT_RATE",
                SimulatorConfig::DEFAULT_REORDER_RATE,
            )?,
            latency_floor_ms: millis_var(
                "APP_LATENCY_FLOOR_MS",
                SimulatorConfig::DEFAULT_LATENCY_FLOOR_MS,
            )?,
            latency_jitter_ms: millis_var(
                "APP_LATENCY_JITTER_MS",
                SimulatorConfig::DEFAULT_LATENCY_JITTER_MS,
            )?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            simulator,
        })
    }
}

fn rate_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => {
            let value = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidRate { name })?;
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name });
            }
            Ok(value)
        }
    }
}

fn millis_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidMillis { name }),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the fault-injecting transport simulator: write failure
/// probabilities (with a separate dial for the reorder path, the most
/// failure-sensitive operation) and the uniform latency window.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub write_failure_rate: f64,
    pub reorder_failure_rate: f64,
    pub latency_floor_ms: u64,
    pub latency_jitter_ms: u64,
}

impl SimulatorConfig {
    pub const DEFAULT_WRITE_RATE: f64 = 0.08;
    pub const DEFAULT_REORDER_RATE: f64 = 0.10;
    pub const DEFAULT_LATENCY_FLOOR_MS: u64 = 200;
    pub const DEFAULT_LATENCY_JITTER_MS: u64 = 1000;

    /// No latency, no injected failures. Tests and demos start here.
    pub fn quiet() -> Self {
        Self {
            write_failure_rate: 0.0,
            reorder_failure_rate: 0.0,
            latency_floor_ms: 0,
            latency_jitter_ms: 0,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            write_failure_rate: Self::DEFAULT_WRITE_RATE,
            reorder_failure_rate: Self::DEFAULT_REORDER_RATE,
            latency_floor_ms: Self::DEFAULT_LATENCY_FLOOR_MS,
            latency_jitter_ms: Self::DEFAULT_LATENCY_JITTER_MS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidRate { name: &'static str },
    InvalidMillis { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRate { name } => {
                write!(f, "{name} must be a probability between 0.0 and 1.0")
            }
            ConfigError::InvalidMillis { name } => {
                write!(f, "{name} must be a millisecond count")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
