//! Configuration module for loxflux
//!
//! Settings are loaded once at startup: defaults, then `.env` and the process
//! environment (via envconfig), then command-line flags. The resulting
//! [`Config`] is passed by value into the sink and the ingestion loop.

use clap::{ArgAction, Parser};
use envconfig::Envconfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for loxflux
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct Config {
    /// InfluxDB connection
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub influx: InfluxConfig,

    /// UDP listener
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub listener: ListenerConfig,

    /// Logging
    #[serde(flatten)]
    #[envconfig(nested = true)]
    pub logging: LoggingConfig,
}

/// InfluxDB (1.x HTTP API) configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct InfluxConfig {
    /// Hostname of the InfluxDB HTTP API
    #[envconfig(from = "INFLUXDB_HOST", default = "127.0.0.1")]
    pub host: String,

    /// Port of the InfluxDB HTTP API
    #[envconfig(from = "INFLUXDB_PORT", default = "8086")]
    pub port: u16,

    /// Use https to connect
    #[envconfig(from = "INFLUXDB_HTTPS", default = "false")]
    pub https: bool,

    /// Verify the server certificate when using https
    #[envconfig(from = "INFLUXDB_VERIFY_HTTPS", default = "false")]
    pub verify_https: bool,

    /// Database name
    #[envconfig(from = "INFLUXDB_DATABASE", default = "loxone")]
    pub database: String,

    /// Login user (optional, only with authentication enabled)
    #[envconfig(from = "INFLUXDB_USER")]
    pub user: Option<String>,

    /// Login password (optional)
    #[serde(skip_serializing)]
    #[envconfig(from = "INFLUXDB_PASSWORD")]
    pub password: Option<String>,

    /// HTTP request timeout in seconds
    #[envconfig(from = "INFLUXDB_TIMEOUT_SECS", default = "10")]
    pub timeout_secs: u64,
}

impl InfluxConfig {
    /// URL scheme for the configured transport
    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }

    /// Base URL of the HTTP API, e.g. `http://127.0.0.1:8086`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether invalid certificates must be accepted
    pub fn accept_invalid_certs(&self) -> bool {
        self.https && !self.verify_https
    }

    /// Password masked for logging
    pub fn masked_password(&self) -> &'static str {
        if self.password.is_some() {
            "***"
        } else {
            "<none>"
        }
    }
}

/// UDP listener configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct ListenerConfig {
    /// Local address to bind
    #[envconfig(from = "BIND_ADDRESS", default = "0.0.0.0")]
    pub bind_address: String,

    /// Local port to bind
    #[envconfig(from = "BIND_PORT", default = "2222")]
    pub bind_port: u16,

    /// Receive buffer size; longer datagrams are truncated by the OS
    #[envconfig(from = "UDP_BUFFER_SIZE", default = "1024")]
    pub buffer_size: usize,
}

impl ListenerConfig {
    /// Get the bind address as a string
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, Envconfig)]
pub struct LoggingConfig {
    /// Enable debug output (parsed point dumps)
    #[envconfig(from = "DEBUG", default = "false")]
    pub debug: bool,

    /// Log level when not in debug mode
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Environment (development, production)
    #[envconfig(from = "ENVIRONMENT", default = "development")]
    pub environment: String,
}

impl LoggingConfig {
    /// Level actually used, `debug` wins over `log_level`
    pub fn effective_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenv::dotenv().ok();

        // Parse configuration from environment
        Config::init_from_env().map_err(Error::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.influx.host.trim().is_empty() {
            return Err(Error::config("InfluxDB host cannot be empty"));
        }

        if self.influx.port == 0 {
            return Err(Error::config("InfluxDB port cannot be 0"));
        }

        if self.influx.database.trim().is_empty() {
            return Err(Error::config("InfluxDB database cannot be empty"));
        }

        if self.influx.password.is_some() && self.influx.user.is_none() {
            return Err(Error::config("InfluxDB password given without a user"));
        }

        if self.listener.buffer_size == 0 {
            return Err(Error::config("UDP buffer size must be at least 1"));
        }

        Ok(())
    }

    /// Log configuration (with sensitive data masked)
    pub fn log_config(&self) {
        tracing::info!(
            url = %self.influx.base_url(),
            database = %self.influx.database,
            user = self.influx.user.as_deref().unwrap_or("<none>"),
            password = self.influx.masked_password(),
            verify_https = self.influx.verify_https,
            "InfluxDB configuration"
        );

        tracing::info!(
            bind = %self.listener.address(),
            buffer_size = self.listener.buffer_size,
            "Listener configuration"
        );

        tracing::info!(
            level = %self.logging.effective_level(),
            environment = %self.logging.environment,
            debug = self.logging.debug,
            "Logging configuration"
        );
    }
}

/// Command-line overrides; every flag falls back to the environment
#[derive(Parser, Debug, Default)]
#[command(
    name = "loxflux",
    version,
    about = "Import Loxone UDP logs into InfluxDB",
    disable_help_flag = true
)]
pub struct Cli {
    /// Hostname of InfluxDB http API
    #[arg(short = 'h', long)]
    pub host: Option<String>,

    /// Port of InfluxDB http API
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Use https to connect to InfluxDB
    #[arg(short = 's', long, action = ArgAction::SetTrue)]
    pub ssl: bool,

    /// Verify https connection to InfluxDB
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub verify: bool,

    /// InfluxDB database name
    #[arg(long)]
    pub database: Option<String>,

    /// InfluxDB user
    #[arg(long)]
    pub user: Option<String>,

    /// Local address to listen on for UDP packets
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Local port to listen on for UDP packets
    #[arg(long)]
    pub bind_port: Option<u16>,

    /// Debug output
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Show this help message and exit
    #[arg(short = '?', long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

impl Cli {
    /// Apply flags on top of an environment-loaded configuration
    ///
    /// Switch flags can only turn a setting on.
    pub fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.influx.host = host;
        }
        if let Some(port) = self.port {
            config.influx.port = port;
        }
        if self.ssl {
            config.influx.https = true;
        }
        if self.verify {
            config.influx.verify_https = true;
        }
        if let Some(database) = self.database {
            config.influx.database = database;
        }
        if let Some(user) = self.user {
            config.influx.user = Some(user);
        }
        if let Some(bind_address) = self.bind_address {
            config.listener.bind_address = bind_address;
        }
        if let Some(bind_port) = self.bind_port {
            config.listener.bind_port = bind_port;
        }
        if self.debug {
            config.logging.debug = true;
        }
    }
}
