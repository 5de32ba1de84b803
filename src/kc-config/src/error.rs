use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Yaml error: {0}")]
    SerdeError(#[from] SerdeYamlError),
    #[error("No home directory found")]
    NoHomeDir,
    #[error("No active console profile")]
    NoCurrentProfile,
    #[error("No console profile named {0}")]
    UnknownProfile(String),
}
