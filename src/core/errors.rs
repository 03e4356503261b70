//! Shared error types for the library

use thiserror::Error;

/// Main error type for cellcore operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Batched request whose parallel lists disagree in length
    #[error("mismatched {context}: {ids} ids but {values} values")]
    MismatchedRequest {
        context: &'static str,
        ids: usize,
        values: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
