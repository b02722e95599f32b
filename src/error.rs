use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the retro camera, returned to whoever triggered a capture
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Film error: {0}")]
    Film(#[from] FilmError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Effect processing error: {0}")]
    Effect(#[from] EffectError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Capture worker has stopped")]
    WorkerStopped,
}

/// Errors raised by the film roll state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilmError {
    #[error("No roll is loaded")]
    NoActiveRoll,

    #[error("Roll {roll_id} has no exposures left")]
    FilmExhausted { roll_id: String },
}

/// Photo store and roll registry errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Unknown roll: {roll_id}")]
    UnknownRoll { roll_id: String },

    #[error("IO failure at {path}: {source}")]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Roll registry at {path} is unreadable: {reason}")]
    RegistryCorrupt { path: PathBuf, reason: String },
}

/// Retro effect pipeline and image codec errors
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Failed to decode captured image: {reason}")]
    Decode { reason: String },

    #[error("Failed to encode processed image: {reason}")]
    Encode { reason: String },

    #[error("Stage {stage} cannot be built: {reason}")]
    InvalidStage { stage: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using CaptureError
pub type Result<T> = std::result::Result<T, CaptureError>;

impl StorageError {
    pub(crate) fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }
}

impl CaptureError {
    /// Check if this error can be cleared by a user action (reset film, fix storage, retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Film(_) | Self::Storage(_) | Self::Io(_) => true,
            Self::Effect(EffectError::Decode { .. }) => true,
            // A broken config or a dead worker needs a restart
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Film(FilmError::NoActiveRoll) => {
                "No film loaded. Load a new roll before taking photos.".to_string()
            }
            Self::Film(FilmError::FilmExhausted { roll_id }) => {
                format!("Roll '{}' is finished. Change the film to keep shooting.", roll_id)
            }
            Self::Storage(StorageError::StorageUnavailable { path, .. }) => {
                format!("Cannot create a folder at '{}'. Check storage access.", path.display())
            }
            Self::Storage(StorageError::UnknownRoll { roll_id }) => {
                format!("Roll '{}' does not exist.", roll_id)
            }
            Self::Storage(StorageError::IoFailure { path, .. }) => {
                format!("Could not save '{}'. The photo was not counted; try again.", path.display())
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_film_errors_are_recoverable() {
        let err: CaptureError = FilmError::FilmExhausted { roll_id: "PhotoFolder_1".into() }.into();
        assert!(err.is_recoverable());
        assert!(err.user_message().contains("PhotoFolder_1"));
    }

    #[test]
    fn test_config_errors_are_not_recoverable() {
        let err: CaptureError = ConfigError::ParseFailed { path: "x.toml".into() }.into();
        assert!(!err.is_recoverable());
    }
}
