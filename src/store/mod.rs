//! Storage Module
//!
//! Per-identity storage engines and their persistence.
//!
//! ## Responsibilities
//! - One isolated key space per peer identity
//! - TTL bookkeeping with proactive, per-key expiry tasks
//! - Wholesale JSON snapshots (SAVE / first-acquire load)
//! - Process-lifetime registry of engines

mod keyspace;
mod registry;
mod snapshot;

pub use keyspace::KeySpace;
pub use registry::Registry;

use serde::{Deserialize, Serialize};

/// A stored value: plain text or an ordered list of text.
///
/// Integers have no stored form (INCR/DECR parse and rewrite Text), and the
/// absent value is the absence of an entry. The untagged serde shape is
/// exactly the snapshot format: a JSON string for Text, an array of strings
/// for List.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stored {
    Text(String),
    List(Vec<String>),
}

/// An operation was applied to a key holding the other kind of value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongType;
