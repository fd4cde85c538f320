//! Command Dispatch
//!
//! Maps one decoded request (command word plus arguments) onto one key
//! space and produces exactly one reply frame.
//!
//! Domain failures are replies, never faults: unknown commands, bad arity,
//! wrong value types, malformed numbers, and expiry instants that are not
//! in the future all come back as error frames and leave the connection
//! usable.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Duration;

use crate::protocol::Frame;
use crate::store::{KeySpace, Stored, WrongType};

/// Reply for operations against a key holding the other kind of value
const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
/// Reply for operands that must be base-10 integers but are not
const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";

// =============================================================================
// Dispatch
// =============================================================================

/// Execute one command against `space`.
///
/// `parts` is the flattened request: command word first, arguments after,
/// exactly as they arrived on the wire. Command names match
/// case-insensitively; arguments are taken verbatim.
pub fn dispatch(space: &Arc<KeySpace>, parts: &[String]) -> Frame {
    let Some((name, args)) = parts.split_first() else {
        return Frame::error("ERR empty command");
    };

    match name.to_ascii_uppercase().as_str() {
        "SET" => set(space, args),
        "GET" => get(space, args),
        "EXISTS" => exists(space, args),
        "DEL" => del(space, args),
        "INCR" => adjust(space, args, 1, "incr"),
        "DECR" => adjust(space, args, -1, "decr"),
        "LPUSH" => push(space, args, End::Front, "lpush"),
        "RPUSH" => push(space, args, End::Back, "rpush"),
        "LRANGE" => lrange(space, args),
        "SAVE" => save(space),
        "PING" => Frame::Simple("PONG".to_string()),
        "ECHO" => echo(args),
        // Standard clients send these during their handshake; a bare OK
        // keeps them happy without touching any state.
        "CONFIG" | "COMMAND" => Frame::ok(),
        _ => Frame::error(format!("ERR unknown command '{}'", clean_token(name))),
    }
}

fn wrong_arity(cmd: &str) -> Frame {
    Frame::error(format!("ERR wrong number of arguments for '{cmd}' command"))
}

/// User text bound for a single-line reply. Error lines are CRLF-terminated
/// on the wire, so any control byte in an echoed token is blanked to keep
/// the reply one frame.
fn clean_token(text: &str) -> String {
    text.replace(|c: char| c.is_ascii_control(), " ")
}

// =============================================================================
// Strings and counters
// =============================================================================

fn set(space: &Arc<KeySpace>, args: &[String]) -> Frame {
    match args {
        [key, value] => {
            space.set_text(key, value);
            Frame::ok()
        }
        [key, value, option, operand] => match expiry_duration(option, operand) {
            Ok(ttl) => {
                Arc::clone(space).set_text_with_ttl(key, value, ttl);
                Frame::ok()
            }
            Err(reply) => reply,
        },
        _ => wrong_arity("set"),
    }
}

fn get(space: &Arc<KeySpace>, args: &[String]) -> Frame {
    let [key] = args else {
        return wrong_arity("get");
    };
    match space.get(key) {
        Some(Stored::Text(text)) => Frame::Bulk(text),
        Some(Stored::List(_)) => Frame::error(WRONG_TYPE),
        None => Frame::Null,
    }
}

fn exists(space: &Arc<KeySpace>, args: &[String]) -> Frame {
    if args.is_empty() {
        return wrong_arity("exists");
    }
    Frame::Integer(space.exists(args))
}

fn del(space: &Arc<KeySpace>, args: &[String]) -> Frame {
    if args.is_empty() {
        return wrong_arity("del");
    }
    Frame::Integer(space.del(args))
}

fn adjust(space: &Arc<KeySpace>, args: &[String], delta: i64, cmd: &str) -> Frame {
    let [key] = args else {
        return wrong_arity(cmd);
    };
    match space.adjust(key, delta) {
        Some(value) => Frame::Integer(value),
        None => Frame::error(NOT_AN_INTEGER),
    }
}

// =============================================================================
// Lists
// =============================================================================

/// Which end of a list a push lands on
enum End {
    Front,
    Back,
}

fn push(space: &Arc<KeySpace>, args: &[String], end: End, cmd: &str) -> Frame {
    let Some((key, values)) = args.split_first() else {
        return wrong_arity(cmd);
    };
    if values.is_empty() {
        return wrong_arity(cmd);
    }

    let pushed = match end {
        End::Front => space.push_front(key, values),
        End::Back => space.push_back(key, values),
    };
    match pushed {
        Ok(len) => Frame::Integer(len as i64),
        Err(WrongType) => Frame::error(WRONG_TYPE),
    }
}

fn lrange(space: &Arc<KeySpace>, args: &[String]) -> Frame {
    let [key, start, end] = args else {
        return wrong_arity("lrange");
    };
    let (Ok(start), Ok(end)) = (start.parse::<i64>(), end.parse::<i64>()) else {
        return Frame::error(NOT_AN_INTEGER);
    };

    match space.range(key, start, end) {
        Ok(items) => Frame::Array(items.into_iter().map(Frame::Bulk).collect()),
        Err(WrongType) => Frame::error(WRONG_TYPE),
    }
}

// =============================================================================
// Persistence and diagnostics
// =============================================================================

fn save(space: &Arc<KeySpace>) -> Frame {
    match space.save() {
        Ok(()) => Frame::ok(),
        Err(err) => Frame::error(format!("ERR snapshot save failed: {err}")),
    }
}

fn echo(args: &[String]) -> Frame {
    let [message] = args else {
        return wrong_arity("echo");
    };
    Frame::Bulk(message.clone())
}

// =============================================================================
// Expiry options
// =============================================================================

/// How a SET expiry operand is interpreted
enum ExpiryKind {
    /// EX: seconds from now
    RelativeSecs,
    /// PX: milliseconds from now
    RelativeMillis,
    /// EXAT: absolute unix timestamp in seconds
    AbsoluteSecs,
    /// PXAT: absolute unix timestamp in milliseconds
    AbsoluteMillis,
}

/// Translate a SET expiry option into a duration from now.
///
/// The option token is validated before its operand, so an unknown token
/// reports as unknown even when the operand is junk too. All four options
/// must name a strictly future instant.
fn expiry_duration(option: &str, operand: &str) -> Result<Duration, Frame> {
    let kind = match option.to_ascii_uppercase().as_str() {
        "EX" => ExpiryKind::RelativeSecs,
        "PX" => ExpiryKind::RelativeMillis,
        "EXAT" => ExpiryKind::AbsoluteSecs,
        "PXAT" => ExpiryKind::AbsoluteMillis,
        _ => {
            return Err(Frame::error(format!(
                "ERR {} is unknown",
                clean_token(option)
            )))
        }
    };

    let Ok(value) = operand.parse::<i64>() else {
        return Err(Frame::error(NOT_AN_INTEGER));
    };

    let ttl = match kind {
        ExpiryKind::RelativeSecs => (value > 0).then(|| Duration::from_secs(value as u64)),
        ExpiryKind::RelativeMillis => (value > 0).then(|| Duration::from_millis(value as u64)),
        ExpiryKind::AbsoluteSecs => remaining_until(Duration::from_secs(value.max(0) as u64)),
        ExpiryKind::AbsoluteMillis => remaining_until(Duration::from_millis(value.max(0) as u64)),
    };
    ttl.ok_or_else(|| {
        Frame::error(format!("ERR {} is in the past", clean_token(option)))
    })
}

/// Time left until the absolute unix instant `target`, if any remains
fn remaining_until(target: Duration) -> Option<Duration> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let left = target.checked_sub(now)?;
    (!left.is_zero()).then_some(left)
}
