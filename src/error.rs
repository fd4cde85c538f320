//! Error types for CoveKV
//!
//! Provides a unified error type for all operations.
//!
//! Decode failures deliberately come in distinct flavors, because the
//! connection layer disposes of them differently: `Incomplete` means "read
//! more bytes and try again", while `BadLength`, `UnknownMarker`, and
//! `Protocol` mean the buffered request is unusable and gets answered with
//! an error reply. Domain-level failures (bad arity, non-integer INCR
//! target, expiry in the past) are never represented here; they are
//! ordinary error frames on the wire.

use thiserror::Error;

/// Result type alias using CoveError
pub type Result<T> = std::result::Result<T, CoveError>;

/// Unified error type for CoveKV operations
#[derive(Debug, Error)]
pub enum CoveError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Wire Protocol Errors
    // -------------------------------------------------------------------------
    /// The buffer ends before the frame does; the caller should await more
    /// bytes rather than fail the connection.
    #[error("incomplete frame")]
    Incomplete,

    /// A bulk-string length or array count did not parse as a non-negative
    /// base-10 integer.
    #[error("malformed length prefix: {0:?}")]
    BadLength(String),

    /// The first byte of a frame is none of `+ - : $ *`.
    #[error("unrecognized type marker: 0x{0:02x}")]
    UnknownMarker(u8),

    /// Any other wire violation: non-UTF-8 payload, malformed integer
    /// payload, a command frame whose elements carry no text.
    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
