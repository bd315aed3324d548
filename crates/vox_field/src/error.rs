//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid configuration (kernel axes over the scratch capacity,
//! bad enhancement parameters), structurally invalid volume files, and IO.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid volume header: {0}")]
    InvalidHeader(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
