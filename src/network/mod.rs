//! Network Module
//!
//! TCP server and per-client connection handling.
//!
//! ## Architecture
//! - Single acceptor task
//! - One task per connection, multiplexed cooperatively
//! - Each request is dispatched against the key space of the peer's
//!   identity, acquired from the shared registry

mod connection;
mod server;

pub use connection::Connection;
pub use server::Server;
