//! Errors raised by the search engine and the games it drives.

use thiserror::Error;

use crate::core::DealError;

/// Errors that can occur while searching.
#[derive(Error, Debug)]
pub enum Error {
    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("move {0} is legal in the sampled deal but missing from the node's move list")]
    IncoherentDeterminization(String),

    #[error(transparent)]
    Deal(#[from] DealError),

    #[error("reward requested for a game that has not finished")]
    NotTerminal,

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("invalid enhancement: {0}")]
    InvalidEnhancement(String),
}

/// Convenience Result type for search operations
pub type Result<T> = std::result::Result<T, Error>;
