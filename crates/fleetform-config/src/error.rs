use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Project file not found. Looked in:\n\
        - current directory: fleet.local.yaml, .fleet.local.yaml, fleet.yaml, .fleet.yaml\n\
        - ./.fleetform/ directory\n\
        - ~/.config/fleetform/fleet.yaml\n\
        Set FLEETFORM_CONFIG to point at a file directly"
    )]
    ProjectFileNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
