use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoCatError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Cannot write output file: {path}")]
    OutputArtifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for RepoCatError {
    fn user_message(&self) -> String {
        match self {
            RepoCatError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            RepoCatError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            RepoCatError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            RepoCatError::OutputArtifact { path, source } => {
                format!("Cannot write output file {}: {}", path, source)
            }
            RepoCatError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            RepoCatError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            RepoCatError::InvalidPath { .. } => Some(
                "Verify the directory exists and the path does not contain parent references.".to_string()
            ),
            RepoCatError::Permission { .. } => Some(
                "Ensure you have read access to the scanned tree and write access to the output location.".to_string()
            ),
            RepoCatError::OutputArtifact { .. } => Some(
                "Choose a writable output path with --output or free up disk space.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for RepoCatError {
    fn from(error: toml::de::Error) -> Self {
        RepoCatError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoCatError>;
