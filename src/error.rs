//! Library-wide error and result types.

use std::fmt;

/// Result alias used throughout xtskit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Every failure is raised by a pre-check: an operation that returns an
/// error has not touched any cipher state, written any output, or consumed
/// any input. The `&'static str` payload names the violated condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied parameter is unusable: bad key length, sector size
    /// below one block, an output buffer with too little capacity, a data
    /// unit shorter than one block, or a ciphertext-stealing pair that
    /// would straddle a sector boundary.
    InvalidArgument(&'static str),
    /// A position lies outside its valid span, such as a starting block
    /// index at or past the number of blocks in a sector.
    OutOfRange(&'static str),
    /// The cipher cannot accept the call in its current state: the
    /// per-sector byte budget is exhausted, a 32-bit size query would
    /// overflow, or the instance has been disposed.
    InvalidState(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(s) => write!(f, "invalid argument: {s}"),
            Error::OutOfRange(s) => write!(f, "out of range: {s}"),
            Error::InvalidState(s) => write!(f, "invalid state: {s}"),
        }
    }
}

impl std::error::Error for Error {}
