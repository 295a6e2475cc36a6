use thiserror::Error;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[derive(Debug, Error)]
pub enum PaintboxError {
    #[error("malformed token: {0}")]
    MalformedToken(String),
    #[error("unknown tile permutation: {0}")]
    UnknownPermutation(String),
    #[error("illegal placement: {0}")]
    IllegalPlacement(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaintboxError>;

pub mod game;
pub mod logging;
pub mod mcts;
pub mod protocol;
pub mod scoring;
pub mod utils;
