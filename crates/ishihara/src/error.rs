//! Crate error type.
//!
//! Configuration problems surface from [`crate::engine::PackingEngine::start`]
//! before any shape is generated. [`Error::InvariantViolation`] is the only
//! error a running generation can return; it aborts the run.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid canvas size {width}x{height}: both dimensions must be > 0")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("invalid mask: {0}")]
    InvalidMask(String),

    #[error("invalid color '{0}': expected #RRGGBB")]
    InvalidColor(String),

    #[error("invalid engine state: {0}")]
    InvalidState(String),

    #[error("invariant violated during generation: {0}")]
    InvariantViolation(String),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
