//! Error types for XDR operations

use thiserror::Error;

/// Error type for XDR operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("capacity exceeded: {0} > {1}")]
    CapacityExceeded(usize, usize), // required, capacity
    #[error("length exceeded: {0} > {1}")]
    LengthExceeded(usize, usize), // found, max
    #[error("no matching union arm for discriminant {0}")]
    NoMatchingArm(i32),
    #[error("missing value in {0}")]
    MissingValue(&'static str),
    #[error("invalid bool: {0}")]
    InvalidBool(u32),
    #[error("invalid data in {0}: {1}")]
    InvalidData(&'static str, &'static str), // context, message
    #[error("offset overflow")]
    OffsetOverflow,
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
