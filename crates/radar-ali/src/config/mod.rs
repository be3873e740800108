use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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
    pub data: DataConfig,
    pub scoring: ScoringConfig,
    pub llm: LlmConfig,
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

        let source = match (
            non_empty_var("RADAR_COMPANIES_URL"),
            non_empty_var("RADAR_SOLUTIONS_URL"),
        ) {
            (Some(companies_url), Some(solutions_url)) => DataSourceConfig::PublishedSheets {
                companies_url,
                solutions_url,
                scheduled_url: non_empty_var("RADAR_SCHEDULED_URL"),
            },
            (Some(_), None) => {
                return Err(ConfigError::IncompleteSheets {
                    missing: "RADAR_SOLUTIONS_URL",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteSheets {
                    missing: "RADAR_COMPANIES_URL",
                })
            }
            (None, None) => DataSourceConfig::Directory(PathBuf::from(
                env::var("RADAR_DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            )),
        };

        let cache_ttl_secs = parse_var("RADAR_CACHE_TTL_SECS", 600u64)?;
        let top_n = parse_var("RADAR_TOP_N", ScoringConfig::DEFAULT_TOP_N)?;

        let llm = LlmConfig {
            api_key: non_empty_var("OPENAI_API_KEY"),
            base_url: env::var("LLM_API_BASE_URL")
                .unwrap_or_else(|_| LlmConfig::DEFAULT_BASE_URL.to_string()),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| LlmConfig::DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", 20u64)?),
            temperature: parse_var("LLM_TEMPERATURE", 0.7f32)?,
            max_tokens: parse_var("LLM_MAX_TOKENS", 1000u32)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig {
                source,
                cache_ttl: Duration::from_secs(cache_ttl_secs),
            },
            scoring: ScoringConfig { top_n },
            llm,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
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

/// Where the radar tables come from and how long a loaded snapshot stays valid.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub source: DataSourceConfig,
    pub cache_ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceConfig {
    /// Directory holding `companies.csv`, `solutions.csv` and optionally `scheduled.csv`.
    Directory(PathBuf),
    /// Published Google Sheets CSV exports.
    PublishedSheets {
        companies_url: String,
        solutions_url: String,
        scheduled_url: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    /// Number of ranked candidates forwarded to the language model.
    pub top_n: usize,
}

impl ScoringConfig {
    pub const DEFAULT_TOP_N: usize = 5;
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_n: Self::DEFAULT_TOP_N,
        }
    }
}

/// Chat-completion endpoint settings. A missing API key disables model calls.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    IncompleteSheets { missing: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric, got '{value}'")
            }
            ConfigError::IncompleteSheets { missing } => {
                write!(f, "published sheet source requires {missing} as well")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::IncompleteSheets { .. } => None,
        }
    }
}
