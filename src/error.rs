use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcesError {
    #[error("invalid card: {0:?} (expected rank then suit, e.g. As, Th, 10h)")]
    InvalidCard(String),

    #[error("invalid deck: {0}")]
    InvalidDeck(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AcesResult<T> = Result<T, AcesError>;
