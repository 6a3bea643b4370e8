use thiserror::Error;

pub type Result<R> = std::result::Result<R, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown environment `{0}`, expected one of dev, stg, prod")]
    UnknownEnvironment(String),
    #[error("Unknown deployment profile `{0}`, expected one of container, layered")]
    UnknownProfile(String),
    #[error("Alert email `{0}` is not a valid email address")]
    InvalidAlertEmail(String),
    #[error("Error loading deployment settings {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("Error serializing template as JSON {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error serializing template as YAML {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("Formatting error when writing {0}")]
    FormatError(#[from] std::fmt::Error),
    #[error("I/O error when reading {0}")]
    IoError(#[from] std::io::Error),
    #[error("The path `{0}` does not exist")]
    FileNotFoundError(String),
    #[error("{0}")]
    IllegalArguments(String),
    #[error("Invalid path for completions script: {0}")]
    InvalidCompletionsPath(String),
}
