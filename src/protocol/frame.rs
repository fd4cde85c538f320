//! Frame definitions
//!
//! A `Frame` is one wire-protocol value, request or reply side. The tag is
//! decided where the frame is produced (by the decoder from the marker byte,
//! or by a command handler from its result kind), never inferred later from
//! the payload, so the encoder is a total function over this enum.

/// A single protocol value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Status line, e.g. `+OK`
    Simple(String),

    /// Error line, e.g. `-ERR unknown command`
    Error(String),

    /// Signed 64-bit integer, e.g. `:42`
    Integer(i64),

    /// Length-prefixed text, e.g. `$3\r\nfoo`
    Bulk(String),

    /// The absent value, `$-1`
    Null,

    /// Ordered sequence of nested frames
    Array(Vec<Frame>),
}

impl Frame {
    /// The `+OK` status reply
    pub fn ok() -> Frame {
        Frame::Simple("OK".to_string())
    }

    /// An error reply with the conventional `ERR ` class prefix already
    /// included by the caller when appropriate
    pub fn error(message: impl Into<String>) -> Frame {
        Frame::Error(message.into())
    }

    /// The wire marker byte this frame encodes under
    pub fn marker(&self) -> u8 {
        match self {
            Frame::Simple(_) => b'+',
            Frame::Error(_) => b'-',
            Frame::Integer(_) => b':',
            Frame::Bulk(_) | Frame::Null => b'$',
            Frame::Array(_) => b'*',
        }
    }

    /// Flatten a request frame into command words.
    ///
    /// The top level of a request is normally an array of bulk strings; a
    /// lone text frame is accepted as a one-word command. Integer elements
    /// keep their decimal spelling, matching how a text-level decoder would
    /// have read them. Returns `None` when the frame (or any element of an
    /// array) carries no text: nulls and nested arrays cannot be arguments.
    pub fn into_parts(self) -> Option<Vec<String>> {
        match self {
            Frame::Array(items) => items.into_iter().map(Frame::into_text).collect(),
            other => other.into_text().map(|word| vec![word]),
        }
    }

    /// The text payload of a single frame, if it has one
    fn into_text(self) -> Option<String> {
        match self {
            Frame::Simple(text) | Frame::Error(text) | Frame::Bulk(text) => Some(text),
            Frame::Integer(n) => Some(n.to_string()),
            Frame::Null | Frame::Array(_) => None,
        }
    }
}
