use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("{what} is full (capacity {capacity})")]
    CapacityExceeded { what: &'static str, capacity: usize },

    #[error("invalid key size: expected {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("cipher setup failed: {0}")]
    CipherSetup(String),
}

pub type Result<T> = std::result::Result<T, Error>;
