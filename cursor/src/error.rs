//! Error types for cursor operations

use thiserror::Error;

/// Error type for cursor operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("buffer overflow: requested {requested} bytes, {remaining} remaining")]
    BufferOverflow { requested: usize, remaining: usize },
    #[error("zero-compressed format error: {0}")]
    ZeroCompressedFormat(String),
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("unsupported operation in this mode: {0}")]
    Unsupported(&'static str),
    #[error("no mark to return to")]
    NoMark,
    #[error("invalid enum in {0}: {1}")]
    InvalidEnum(&'static str, i128),
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, String), // context, message
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
