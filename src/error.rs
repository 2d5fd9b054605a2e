use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Asset not loaded: {}", path.display())]
    NotLoaded { path: PathBuf },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to load {}: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] ron::error::SpannedError),
}

impl GameError {
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        GameError::InvalidState(message.into())
    }

    pub fn not_loaded<P: Into<PathBuf>>(path: P) -> Self {
        GameError::NotLoaded { path: path.into() }
    }
}

pub type GameResult<T> = Result<T, GameError>;
