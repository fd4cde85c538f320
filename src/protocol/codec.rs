//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! Decoding is a single recursive-descent routine: `decode` reads one marker
//! byte, dispatches to the matching handler, and array elements re-enter the
//! same routine, so nesting needs no per-marker duplication. A depth counter
//! caps that recursion at [`MAX_DEPTH`] so a hostile frame cannot exhaust
//! the stack. The input is an unconsumed byte buffer; on success the caller
//! gets the parsed frame plus the remaining bytes, which lets it serve
//! pipelined requests and resume after partial reads.
//!
//! Failure classes are kept separate (see [`CoveError`]): a truncated buffer
//! is `Incomplete` (retryable once more bytes arrive), a length or count
//! that does not parse is `BadLength`, and a first byte outside the marker
//! set is `UnknownMarker`.

use std::str;

use crate::error::{CoveError, Result};

use super::Frame;

/// Maximum accepted bulk-string payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Maximum accepted array element count
pub const MAX_ARRAY_LEN: usize = 1024 * 1024;

/// Maximum accepted array nesting depth
pub const MAX_DEPTH: usize = 32;

const CRLF: &[u8] = b"\r\n";

// =============================================================================
// Decoding
// =============================================================================

/// Decode one frame from the front of `input`.
///
/// Returns the frame and the unconsumed remainder of the buffer.
pub fn decode(input: &[u8]) -> Result<(Frame, &[u8])> {
    decode_nested(input, 0)
}

/// One frame at `depth` levels inside enclosing arrays
fn decode_nested(input: &[u8], depth: usize) -> Result<(Frame, &[u8])> {
    if depth > MAX_DEPTH {
        return Err(CoveError::Protocol(format!(
            "array nesting deeper than {MAX_DEPTH} levels"
        )));
    }
    let (&marker, body) = input.split_first().ok_or(CoveError::Incomplete)?;

    match marker {
        b'+' => {
            let (line, rest) = read_line(body)?;
            Ok((Frame::Simple(line.to_string()), rest))
        }
        b'-' => {
            let (line, rest) = read_line(body)?;
            Ok((Frame::Error(line.to_string()), rest))
        }
        b':' => {
            let (line, rest) = read_line(body)?;
            let value = line.parse::<i64>().map_err(|_| {
                CoveError::Protocol(format!("malformed integer payload: {line:?}"))
            })?;
            Ok((Frame::Integer(value), rest))
        }
        b'$' => decode_bulk(body),
        b'*' => decode_array(body, depth),
        other => Err(CoveError::UnknownMarker(other)),
    }
}

/// Decode a bulk string body: `<len>\r\n<len bytes>\r\n`
///
/// `-1` is the null frame; any other length must be a non-negative base-10
/// integer within [`MAX_BULK_LEN`].
fn decode_bulk(input: &[u8]) -> Result<(Frame, &[u8])> {
    let (line, rest) = read_line(input)?;
    if line == "-1" {
        return Ok((Frame::Null, rest));
    }

    let len = parse_length(line, MAX_BULK_LEN)?;
    if rest.len() < len + CRLF.len() {
        return Err(CoveError::Incomplete);
    }

    let (payload, tail) = rest.split_at(len);
    if &tail[..CRLF.len()] != CRLF {
        return Err(CoveError::Protocol(
            "bulk payload not CRLF-terminated".to_string(),
        ));
    }

    let text = str::from_utf8(payload)
        .map_err(|_| CoveError::Protocol("non-UTF-8 bulk payload".to_string()))?;
    Ok((Frame::Bulk(text.to_string()), &tail[CRLF.len()..]))
}

/// Decode an array body: `<count>\r\n` followed by `count` nested frames,
/// each read through the same routine one level deeper, regardless of its
/// own marker.
fn decode_array(input: &[u8], depth: usize) -> Result<(Frame, &[u8])> {
    let (line, mut rest) = read_line(input)?;
    if line == "-1" {
        return Ok((Frame::Null, rest));
    }

    let count = parse_length(line, MAX_ARRAY_LEN)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let (item, tail) = decode_nested(rest, depth + 1)?;
        items.push(item);
        rest = tail;
    }
    Ok((Frame::Array(items), rest))
}

/// Read up to the next CRLF, returning the line as text and the bytes after
/// the terminator. No terminator in the buffer means the frame is truncated.
fn read_line(input: &[u8]) -> Result<(&str, &[u8])> {
    let end = input
        .windows(CRLF.len())
        .position(|window| window == CRLF)
        .ok_or(CoveError::Incomplete)?;

    let line = str::from_utf8(&input[..end])
        .map_err(|_| CoveError::Protocol("non-UTF-8 payload".to_string()))?;
    Ok((line, &input[end + CRLF.len()..]))
}

/// Parse a length/count prefix as a bounded non-negative integer
fn parse_length(line: &str, max: usize) -> Result<usize> {
    let value: usize = line
        .parse()
        .map_err(|_| CoveError::BadLength(line.to_string()))?;
    if value > max {
        return Err(CoveError::BadLength(line.to_string()));
    }
    Ok(value)
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a frame to bytes, representation chosen by the frame's tag
pub fn encode(frame: &Frame) -> Vec<u8> {
    let mut buf = Vec::new();
    write_frame(&mut buf, frame);
    buf
}

fn write_frame(buf: &mut Vec<u8>, frame: &Frame) {
    match frame {
        Frame::Simple(text) | Frame::Error(text) => write_line(buf, frame.marker(), text),
        Frame::Integer(value) => write_line(buf, frame.marker(), &value.to_string()),
        Frame::Bulk(text) => {
            write_line(buf, frame.marker(), &text.len().to_string());
            buf.extend_from_slice(text.as_bytes());
            buf.extend_from_slice(CRLF);
        }
        Frame::Null => buf.extend_from_slice(b"$-1\r\n"),
        Frame::Array(items) => {
            write_line(buf, frame.marker(), &items.len().to_string());
            for item in items {
                write_frame(buf, item);
            }
        }
    }
}

fn write_line(buf: &mut Vec<u8>, marker: u8, payload: &str) {
    buf.push(marker);
    buf.extend_from_slice(payload.as_bytes());
    buf.extend_from_slice(CRLF);
}
