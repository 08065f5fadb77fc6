use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Unknown margin mode: {0}")]
    UnknownMarginMode(String),

    #[error("Invalid number: {0}")]
    InvalidNumeric(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("{0} lock poisoned")]
    StatePoisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
