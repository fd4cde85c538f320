//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Wire Format (RESP-style, CRLF-terminated)
//!
//! Every value starts with a one-byte type marker:
//!
//! ```text
//! ┌────────┬──────────────────┬──────────────────────────────┐
//! │ Marker │ Form             │ Example                      │
//! ├────────┼──────────────────┼──────────────────────────────┤
//! │   +    │ +<text>\r\n      │ +OK\r\n                      │
//! │   -    │ -<text>\r\n      │ -ERR unknown command\r\n     │
//! │   :    │ :<int>\r\n       │ :42\r\n                      │
//! │   $    │ $<len>\r\n<text>\r\n │ $3\r\nfoo\r\n            │
//! │   *    │ *<count>\r\n<count values> │ *1\r\n$4\r\nPING\r\n │
//! └────────┴──────────────────┴──────────────────────────────┘
//! ```
//!
//! `$-1\r\n` is the null (absent) value. Arrays nest, to a bounded depth:
//! each of the `count` values is decoded by the same entry point regardless
//! of its own marker.
//!
//! ## Requests and Replies
//!
//! A request is an array of bulk strings (`*3 $3 SET $3 foo $3 bar`); the
//! decoder itself is marker-driven, so any of the five forms may appear
//! nested. Replies use whichever form matches the result: status and error
//! lines, integers, bulk strings, nulls, or arrays of those.

mod codec;
mod frame;

pub use codec::{decode, encode, MAX_ARRAY_LEN, MAX_BULK_LEN, MAX_DEPTH};
pub use frame::Frame;
