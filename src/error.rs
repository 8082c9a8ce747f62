//! Error types for the RPSLS engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpslsError {
    #[error("Invalid move id: {0} (expected 1-5)")]
    InvalidMove(u8),

    #[error("Unknown move name: {0}")]
    UnknownMoveName(String),

    #[error("Move table violates tournament invariant: {0}")]
    InvalidMoveTable(String),

    #[error("Failed to read statistics: {0}")]
    PersistenceRead(String),

    #[error("Failed to write statistics: {0}")]
    PersistenceWrite(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, RpslsError>;
