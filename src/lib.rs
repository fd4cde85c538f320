//! # CoveKV
//!
//! An in-memory key-value cache server with:
//! - A binary-safe, length-prefixed wire protocol over TCP
//! - One isolated key space per peer identity
//! - Proactive per-key TTL expiry
//! - Wholesale JSON snapshots, one file per identity
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                (one task per connection)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Protocol Codec                              │
//! │           (five-marker grammar, CRLF-framed)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ command + args
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                Command Dispatcher                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────▼────────────┐
//!          │    Identity Registry    │
//!          │  (identity → key space) │
//!          └────────────┬────────────┘
//!                       │
//!               ┌───────▼───────┐         ┌──────────────┐
//!               │   Key Space   │  SAVE   │   Snapshot   │
//!               │ (TTL reapers) │────────▶│  (JSON file  │
//!               └───────────────┘         │ per identity)│
//!                                         └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod dispatch;
pub mod store;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CoveError, Result};
pub use config::Config;
pub use network::Server;
pub use protocol::Frame;
pub use store::{KeySpace, Registry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CoveKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
