use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for the EAO session server
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EaoConfig {
    /// Listen address
    #[serde(default)]
    pub server: ServerConfig,

    /// Optimisation limits and solver choice
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Where the standard nodes and assets come from
    #[serde(default)]
    pub library: LibraryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Largest timegrid (in steps) an optimisation may run on
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Solver selected after every reset
    #[serde(default = "default_solver")]
    pub default_solver: String,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            default_solver: default_solver(),
        }
    }
}

/// Optional JSON files replacing the builtin standard library
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LibraryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_nodes_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_assets_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_max_steps() -> usize {
    96 * 5 // five days of quarter hours
}
fn default_solver() -> String {
    "standard".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration manager with file discovery and env overrides
pub struct ConfigManager {
    config: EaoConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.eao.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading EAO server configuration...");

        Self::load_dotenv();
        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Same as [`ConfigManager::load`] but with an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        Self::load_dotenv();
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    /// Wrap an in-memory configuration, skipping files and environment.
    pub fn from_config(config: EaoConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn finish(config: EaoConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        info!("Configuration loaded successfully");
        match &config_path {
            Some(path) => info!("   Config file: {}", path.display()),
            None => info!("   Config file: NONE (using defaults)"),
        }
        info!("   Listen: {}:{}", config.server.host, config.server.port);
        info!("   Max optimisation steps: {}", config.optimizer.max_steps);
        info!("   Solver: {}", config.optimizer.default_solver);

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.eao.toml (current directory)
    /// 2. ~/.eao/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(EaoConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".eao.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".eao").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((EaoConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<EaoConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: EaoConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    fn apply_env_overrides(mut config: EaoConfig) -> EaoConfig {
        if let Ok(host) = std::env::var("EAO_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("EAO_PORT") {
            match port.parse() {
                Ok(p) => config.server.port = p,
                Err(_) => warn!("Ignoring EAO_PORT={}: not a port number", port),
            }
        }
        if let Ok(steps) = std::env::var("EAO_MAX_OPTIM_STEPS") {
            match steps.parse() {
                Ok(n) => config.optimizer.max_steps = n,
                Err(_) => warn!("Ignoring EAO_MAX_OPTIM_STEPS={}: not a number", steps),
            }
        }
        if let Ok(solver) = std::env::var("EAO_SOLVER") {
            config.optimizer.default_solver = solver;
        }
        if let Ok(path) = std::env::var("EAO_STD_NODES_FILE") {
            config.library.std_nodes_file = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("EAO_STD_ASSETS_FILE") {
            config.library.std_assets_file = Some(PathBuf::from(path));
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.logging.level = level;
        }

        config
    }

    fn validate_config(config: &EaoConfig) -> Result<(), ConfigError> {
        if config.optimizer.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "optimizer.max_steps must be positive".to_string(),
            ));
        }

        if config.optimizer.default_solver.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "optimizer.default_solver must not be empty".to_string(),
            ));
        }

        // RUST_LOG may carry directives such as "eao_api=debug"; only bare levels are checked.
        let level = config.logging.level.as_str();
        if !level.contains('=') && !level.contains(',') {
            match level {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        other
                    )))
                }
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &EaoConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Command-line listen options win over file and environment.
    pub fn override_listen(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.config.server.host = host;
        }
        if let Some(port) = port {
            self.config.server.port = port;
        }
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = EaoConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EaoConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.optimizer.max_steps, 480);
        assert_eq!(config.optimizer.default_solver, "standard");
        assert!(config.library.std_nodes_file.is_none());
    }

    #[test]
    fn test_config_validation() {
        let config = EaoConfig::default();
        assert!(ConfigManager::validate_config(&config).is_ok());

        let mut zero_steps = config.clone();
        zero_steps.optimizer.max_steps = 0;
        assert!(ConfigManager::validate_config(&zero_steps).is_err());

        let mut bad_level = config.clone();
        bad_level.logging.level = "loud".to_string();
        assert!(ConfigManager::validate_config(&bad_level).is_err());

        let mut directive = config;
        directive.logging.level = "eao_api=debug,tower_http=info".to_string();
        assert!(ConfigManager::validate_config(&directive).is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EaoConfig = toml::from_str("[optimizer]\nmax_steps = 96\n").unwrap();
        assert_eq!(config.optimizer.max_steps, 96);
        assert_eq!(config.optimizer.default_solver, "standard");
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
