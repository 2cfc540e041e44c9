//! Cloudburst configuration
//!
//! Settings come from a TOML file, with `CLOUDBURST_*` environment
//! variables layered on top. Every section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::history::{AggregateOptions, CategoryRule, CategoryTable, WeekdayZone};
use crate::report::{ReportClientConfig, DEFAULT_REPORT_URL};

/// Top-level configuration, one field per TOML table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub aggregation: AggregationConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// `[report]`: where stored reports are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_report_url() -> String {
    DEFAULT_REPORT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            base_url: default_report_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl ReportConfig {
    pub fn client_config(&self) -> ReportClientConfig {
        ReportClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
        }
    }
}

/// `[aggregation]`: knobs for turning entries into statistics
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_minutes_per_visit")]
    pub minutes_per_visit: u32,

    /// "local", "utc" or a fixed offset such as "+05:30"
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Replaces the built-in category table when present
    #[serde(default)]
    pub categories: Option<Vec<CategoryRule>>,
}

fn default_top_n() -> usize {
    5
}

fn default_minutes_per_visit() -> u32 {
    3
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            minutes_per_visit: default_minutes_per_visit(),
            timezone: default_timezone(),
            categories: None,
        }
    }
}

impl AggregationConfig {
    /// Aggregation options; an unparsable timezone falls back to local time
    pub fn options(&self) -> AggregateOptions {
        let zone = WeekdayZone::parse(&self.timezone).unwrap_or_else(|| {
            tracing::warn!(timezone = %self.timezone, "Unknown timezone, using local time");
            WeekdayZone::Local
        });

        AggregateOptions::default()
            .top_n(self.top_n)
            .minutes_per_visit(self.minutes_per_visit)
            .zone(zone)
    }

    /// Category table from config, or the built-in one
    pub fn category_table(&self) -> CategoryTable {
        match &self.categories {
            Some(rules) => CategoryTable::new(rules.clone()),
            None => CategoryTable::builtin(),
        }
    }
}

/// `[api]`: dashboard HTTP server
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_host")]
    pub host: String,

    #[serde(default = "default_bind_port")]
    pub port: u16,

    /// Empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8090
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_bind_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// `host:port` for the listener
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log output style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter for the `cloudburst` target; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == LogFormat::Json
    }
}

impl Config {
    /// Read and parse a TOML file, without environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// File contents plus environment overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// First readable file from [`Config::search_paths`], else [`Config::from_env`]
    ///
    /// A file that exists but fails to load is skipped with a warning.
    pub fn load_default() -> Self {
        for path in Self::search_paths().iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    tracing::info!(path = ?path, "Loaded config");
                    return config;
                }
                Err(e) => tracing::warn!(error = %e, "Skipping config file"),
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::from_env()
    }

    /// Config file locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(3);
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("cloudburst").join("config.toml"));
        }
        paths.push(PathBuf::from("/etc/cloudburst/config.toml"));
        paths.push(PathBuf::from("./config.toml"));
        paths
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Values that fail to parse are ignored
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("CLOUDBURST_REPORT_URL") {
            self.report.base_url = url;
        }

        if let Some(n) = var("CLOUDBURST_TOP_N").and_then(|v| v.trim().parse().ok()) {
            self.aggregation.top_n = n;
        }
        if let Some(m) = var("CLOUDBURST_MINUTES_PER_VISIT").and_then(|v| v.trim().parse().ok()) {
            self.aggregation.minutes_per_visit = m;
        }
        if let Some(tz) = var("CLOUDBURST_TIMEZONE") {
            self.aggregation.timezone = tz;
        }

        if let Some(host) = var("CLOUDBURST_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("CLOUDBURST_API_PORT").and_then(|v| v.trim().parse().ok()) {
            self.api.port = port;
        }

        if let Some(level) = var("CLOUDBURST_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CLOUDBURST_LOG_FORMAT").and_then(|v| LogFormat::parse(&v)) {
            self.logging.format = format;
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents for a starter `config.toml`, every value at its default
pub fn generate_default_config() -> String {
    format!(
        r##"# Cloudburst configuration
#
# Any value can also be set through the environment:
#   CLOUDBURST_REPORT_URL, CLOUDBURST_TOP_N, CLOUDBURST_MINUTES_PER_VISIT,
#   CLOUDBURST_TIMEZONE, CLOUDBURST_API_HOST, CLOUDBURST_API_PORT,
#   CLOUDBURST_LOG_LEVEL, CLOUDBURST_LOG_FORMAT

[report]
base_url = "{url}"
request_timeout_secs = {timeout}

[aggregation]
# Size of the top-domains ranking
top_n = {top_n}

# Minutes of screen time attributed to one visit
minutes_per_visit = {minutes}

# Weekly histogram timezone: "local", "utc" or an offset like "+05:30"
timezone = "{timezone}"

# Uncomment to replace the built-in categories. First matching rule wins.
# [[aggregation.categories]]
# name = "Social Media"
# keywords = ["facebook", "reddit", "youtube"]
# color = "#FF8C42"
# leakage = true

[api]
host = "{host}"
port = {port}
# Empty list allows any origin
cors_origins = []

[logging]
level = "{level}"
# "pretty" or "json"
format = "pretty"
"##,
        url = DEFAULT_REPORT_URL,
        timeout = default_timeout_secs(),
        top_n = default_top_n(),
        minutes = default_minutes_per_visit(),
        timezone = default_timezone(),
        host = default_bind_host(),
        port = default_bind_port(),
        level = default_level(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.report.base_url, DEFAULT_REPORT_URL);
        assert_eq!(config.aggregation.top_n, 5);
        assert_eq!(config.aggregation.minutes_per_visit, 3);
        assert_eq!(config.api.addr(), "0.0.0.0:8090");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.aggregation.category_table(), CategoryTable::builtin());
    }

    #[test]
    fn test_generated_config_parses() {
        let content = generate_default_config();
        // the commented category example keeps its hex color intact
        assert!(content.contains("# color = \"#FF8C42\""));
        assert!(content.trim_end().ends_with("format = \"pretty\""));

        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.report.base_url, DEFAULT_REPORT_URL);
        assert_eq!(config.report.request_timeout_secs, 30);
        assert_eq!(config.aggregation.top_n, 5);
        assert_eq!(config.aggregation.timezone, "local");
        assert!(config.aggregation.categories.is_none());
        assert_eq!(config.api.port, 8090);
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[api]\nport = 7000\n").unwrap();
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.aggregation.top_n, 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
[report]
base_url = "http://localhost:9000"

[aggregation]
top_n = 3
timezone = "utc"

[[aggregation.categories]]
name = "Code"
keywords = ["GitHub"]
color = "#000000"

[logging]
format = "json"
"##
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.report.base_url, "http://localhost:9000");
        assert_eq!(config.report.client_config().request_timeout_ms, 30_000);
        assert!(config.logging.is_json());

        let options = config.aggregation.options();
        assert_eq!(options.top_n, 3);
        assert_eq!(options.minutes_per_visit, 3);
        assert_eq!(options.zone, WeekdayZone::utc());

        let table = config.aggregation.category_table();
        assert_eq!(table.rules().len(), 1);
        assert_eq!(table.classify("github.com").name, "Code");
        assert!(!table.rules()[0].leakage);
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/cloudburst.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[api]\nport = \"not a port\"").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[logging]\nformat = \"xml\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CLOUDBURST_REPORT_URL", "http://reports.local"),
            ("CLOUDBURST_TOP_N", "10"),
            ("CLOUDBURST_MINUTES_PER_VISIT", "oops"),
            ("CLOUDBURST_API_PORT", "9999"),
            ("CLOUDBURST_LOG_FORMAT", "JSON"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.report.base_url, "http://reports.local");
        assert_eq!(config.aggregation.top_n, 10);
        assert_eq!(config.aggregation.minutes_per_visit, 3);
        assert_eq!(config.api.port, 9999);
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_search_paths_end_with_working_dir() {
        let paths = Config::search_paths();
        assert_eq!(paths.last(), Some(&PathBuf::from("./config.toml")));
    }

    #[test]
    fn test_bad_timezone_falls_back_to_local() {
        let aggregation = AggregationConfig {
            timezone: "mars".to_string(),
            ..Default::default()
        };
        assert_eq!(aggregation.options().zone, WeekdayZone::Local);
    }
}
