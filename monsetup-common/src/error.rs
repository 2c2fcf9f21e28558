use std::path::PathBuf;
use thiserror::Error;

/// Main error type for monsetup operations
#[derive(Error, Debug)]
pub enum MonsetupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Display inventory error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Process execution error: {0}")]
    Process(#[from] ProcessError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path:?}")]
    FileRead { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse TOML configuration: {message}")]
    TomlParse { message: String },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Display inventory (xrandr query) errors
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("{tool} query failed: {message}")]
    Query { tool: String, message: String },

    #[error("Unparsable {tool} output: {output}")]
    Unparsable { tool: String, output: String },
}

/// Monitor counts outside the supported single/dual cases
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("No connected monitors found")]
    NoMonitors,

    #[error("{count} monitors connected ({monitors:?}), at most 2 are supported")]
    TooManyMonitors { count: usize, monitors: Vec<String> },
}

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Command execution failed: {command:?}")]
    Execution { command: String, source: std::io::Error },

    #[error("Command {command:?} returned non-zero exit code: {code}")]
    NonZeroExit { command: String, code: i32, stderr: String },
}

/// Validation errors for values parsed out of configuration or tool output
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid resolution: {value} (expected <width>x<height>)")]
    InvalidResolution { value: String },

    #[error("Invalid desktop token: {value} (expected a single digit 0-9)")]
    InvalidDesktop { value: String },
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, MonsetupError>;

impl From<std::io::Error> for MonsetupError {
    fn from(err: std::io::Error) -> Self {
        MonsetupError::Process(ProcessError::Execution {
            command: "unknown".to_string(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for MonsetupError {
    fn from(err: toml::de::Error) -> Self {
        MonsetupError::Config(ConfigError::TomlParse {
            message: err.to_string(),
        })
    }
}

impl MonsetupError {
    /// Short name of the failure class, used as the prefix of fatal messages.
    pub fn class(&self) -> &'static str {
        match self {
            MonsetupError::Config(_) => "ConfigurationError",
            MonsetupError::Inventory(_) => "InventoryQueryError",
            MonsetupError::Topology(_) => "TopologyAmbiguity",
            MonsetupError::Process(_) => "ApplyError",
            MonsetupError::Validation(_) => "ValidationError",
        }
    }
}

// Error reporting utilities
pub trait ErrorReporting {
    fn log_error(&self, context: &str);
    fn user_friendly_message(&self) -> String;
}

impl ErrorReporting for MonsetupError {
    fn log_error(&self, context: &str) {
        log::error!("{}: {:?}", context, self);
    }

    fn user_friendly_message(&self) -> String {
        let detail = match self {
            MonsetupError::Config(ConfigError::FileRead { path, .. }) => {
                format!("Configuration file not found: {:?}", path)
            }
            MonsetupError::Config(ConfigError::TomlParse { message }) => {
                format!("Invalid configuration format: {}", message)
            }
            MonsetupError::Topology(TopologyError::NoMonitors) => {
                "No connected monitors reported by xrandr. Is an X session running?".to_string()
            }
            MonsetupError::Topology(TopologyError::TooManyMonitors { count, monitors }) => {
                format!(
                    "{} monitors connected ({}), only single and dual monitor setups are supported",
                    count,
                    monitors.join(", ")
                )
            }
            MonsetupError::Inventory(InventoryError::Query { tool, message }) => {
                format!("Could not query {}: {}", tool, message)
            }
            _ => self.to_string(),
        };
        format!("{}: {}", self.class(), detail)
    }
}
