//! Configuration management

use clap::Parser;
use config::{
    builder::DefaultState, Config as ConfigBuilder, ConfigBuilder as Builder,
    ConfigError as BuilderError, Environment, File, FileFormat,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum accepted length of the token signing secret, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 16;

/// Longest access-token lifetime accepted (one day)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),

    #[error("Invalid database configuration: {0}")]
    InvalidDatabase(String),

    #[error("Invalid logging configuration: {0}")]
    InvalidLogging(String),

    #[error("Invalid security configuration: {0}")]
    InvalidSecurity(String),

    #[error("Invalid SMS configuration: {0}")]
    InvalidSms(String),

    #[error("Invalid bootstrap configuration: {0}")]
    InvalidBootstrap(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
}

impl From<BuilderError> for ConfigError {
    fn from(err: BuilderError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub sms: SmsConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl Config {
    /// Load configuration with precedence: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let cli_args = CliArgs::parse();

        // 1. Defaults (lowest priority)
        let mut builder = with_defaults(ConfigBuilder::builder())?;

        // 2. Config file if specified
        if let Some(config_path) = &cli_args.config {
            if !config_path.exists() {
                return Err(ConfigError::FileNotFound(
                    config_path.display().to_string(),
                ));
            }
            builder = builder.add_source(File::from(config_path.as_path()));
        }

        // 3. Environment variables, prefixed with DGH_ and using __ for nesting
        // Example: DGH_SECURITY__JWT_SECRET=...
        builder = builder.add_source(env_source());

        // 4. CLI arguments (highest priority)
        if let Some(host) = &cli_args.host {
            builder = builder.set_override("server.host", host.clone())?;
        }
        if let Some(port) = cli_args.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(db_path) = &cli_args.database {
            builder = builder.set_override("database.path", db_path.display().to_string())?;
        }
        if let Some(log_level) = &cli_args.log_level {
            builder = builder.set_override("logging.level", log_level.clone())?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file path, on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string, on top of the defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = with_defaults(ConfigBuilder::builder())?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logging.validate()?;
        self.security.validate()?;
        self.sms.validate()?;
        self.bootstrap.validate()?;
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("DGH")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("security.allowed_origins")
        .try_parsing(true)
}

fn with_defaults(builder: Builder<DefaultState>) -> Result<Builder<DefaultState>, ConfigError> {
    Ok(builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("server.request_timeout", 30)?
        .set_default("database.path", "./data/dgh-care.db")?
        .set_default("database.connection_pool_size", 10)?
        .set_default("database.busy_timeout", 5000)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "json")?
        .set_default("logging.output", "stdout")?
        .set_default("logging.max_file_size", 10485760)? // 10 MB
        .set_default("logging.max_backups", 5)?
        .set_default("security.jwt_secret", "")?
        .set_default("security.token_ttl_minutes", 15)?
        .set_default("security.bcrypt_cost", bcrypt::DEFAULT_COST as i64)?
        .set_default("security.allowed_origins", vec!["*"])?
        .set_default("security.enable_hsts", false)?
        .set_default("security.hsts_max_age", 31536000)?
        .set_default("sms.enabled", false)?
        .set_default("sms.account_sid", "")?
        .set_default("sms.auth_token", "")?
        .set_default("sms.from_number", "")?
        .set_default("sms.api_base", "https://api.twilio.com")?
        .set_default("sms.hospital_name", "Douala General Hospital")?)
}

/// Command-line arguments for configuration override
#[derive(Debug, Parser)]
#[command(name = "dgh-care")]
#[command(about = "DGH Care hospital management API server", long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server host address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database file path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // seconds
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidServer("host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidServer("port must be greater than 0".to_string()));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::InvalidServer(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub connection_pool_size: usize,
    pub busy_timeout: u64, // milliseconds
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidDatabase("path cannot be empty".to_string()));
        }

        if self.connection_pool_size == 0 {
            return Err(ConfigError::InvalidDatabase(
                "connection_pool_size must be greater than 0".to_string(),
            ));
        }

        if self.busy_timeout == 0 {
            return Err(ConfigError::InvalidDatabase(
                "busy_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
    pub log_file: Option<PathBuf>,
    pub max_file_size: usize, // bytes
    pub max_backups: usize,
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "level must be one of: {:?}",
                valid_levels
            )));
        }

        let valid_formats = ["json", "text"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "format must be one of: {:?}",
                valid_formats
            )));
        }

        let valid_outputs = ["stdout", "file"];
        if !valid_outputs.contains(&self.output.as_str()) {
            return Err(ConfigError::InvalidLogging(format!(
                "output must be one of: {:?}",
                valid_outputs
            )));
        }

        if self.output == "file" && self.log_file.is_none() {
            return Err(ConfigError::InvalidLogging(
                "log_file must be specified when output is 'file'".to_string(),
            ));
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        if self.max_backups == 0 {
            return Err(ConfigError::InvalidLogging(
                "max_backups must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
    pub enable_hsts: bool,
    pub hsts_max_age: u64, // seconds
}

impl SecurityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidSecurity(format!(
                "jwt_secret must be set (DGH_SECURITY__JWT_SECRET) and at least {} bytes long",
                MIN_JWT_SECRET_LEN
            )));
        }

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.token_ttl_minutes) {
            return Err(ConfigError::InvalidSecurity(format!(
                "token_ttl_minutes must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidSecurity(
                "bcrypt_cost must be between 4 and 31".to_string(),
            ));
        }

        if self.allowed_origins.is_empty() {
            return Err(ConfigError::InvalidSecurity(
                "allowed_origins cannot be empty".to_string(),
            ));
        }

        if self.enable_hsts && self.hsts_max_age == 0 {
            return Err(ConfigError::InvalidSecurity(
                "hsts_max_age must be greater than 0 when enable_hsts is true".to_string(),
            ));
        }

        Ok(())
    }
}

/// Outbound SMS provider settings (Twilio REST API)
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
    pub hospital_name: String,
}

impl SmsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(ConfigError::InvalidSms(
                "account_sid and auth_token must be provided when sms is enabled".to_string(),
            ));
        }

        if self.from_number.is_empty() {
            return Err(ConfigError::InvalidSms(
                "from_number must be provided when sms is enabled".to_string(),
            ));
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Err(ConfigError::InvalidSms(
                "api_base must start with http:// or https://".to_string(),
            ));
        }

        Ok(())
    }
}

/// Optional first administrator, created at startup when no admin exists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.admin_email, &self.admin_password) {
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::InvalidBootstrap(
                "admin_email and admin_password must be set together".to_string(),
            )),
            (Some(_), Some(password)) if password.len() < 8 => Err(ConfigError::InvalidBootstrap(
                "admin_password must be at least 8 characters".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
