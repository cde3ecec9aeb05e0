//! Errors raised while constructing core types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("listing name is {len} bytes, maximum is {max}")]
    NameTooLong { len: usize, max: usize },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}
