//! Connection Handler
//!
//! One instance per client TCP connection. Reads frames off the socket,
//! executes them against the peer identity's key space, and writes exactly
//! one reply per request, in request order. Several requests arriving in
//! one read (pipelining) are served back to back before the next read.
//!
//! ## Failure disposition
//! - Incomplete frame: keep the bytes, read more
//! - Malformed frame: error reply, drop buffered bytes, keep the connection
//! - Clean close between frames: end the task quietly
//! - Close mid-frame, or a write failure: surface as an error

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::dispatch;
use crate::error::{CoveError, Result};
use crate::protocol::{self, Frame};
use crate::store::Registry;

/// Handles a single client connection
pub struct Connection {
    /// The TCP stream
    stream: TcpStream,
    /// Bytes received but not yet decoded
    buffer: BytesMut,
    /// Registry the key space is acquired from on every request
    registry: Arc<Registry>,
    /// Peer identity: the connection's IP, shared by every connection and
    /// reconnection from that address
    identity: String,
    /// Full peer address, for logging only
    peer_addr: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream, peer_addr: SocketAddr, registry: Arc<Registry>) -> Connection {
        Connection {
            stream,
            buffer: BytesMut::with_capacity(4 * 1024),
            registry,
            identity: peer_addr.ip().to_string(),
            peer_addr,
        }
    }

    /// Serve requests until the peer closes the connection
    pub async fn run(&mut self) -> Result<()> {
        tracing::debug!("connection established from {}", self.peer_addr);

        loop {
            let frame = match self.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!("client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(
                    err @ (CoveError::BadLength(_)
                    | CoveError::UnknownMarker(_)
                    | CoveError::Protocol(_)),
                ) => {
                    // The stream position is unreliable after a parse
                    // failure, so drop everything buffered and resync on
                    // whatever the client sends next.
                    tracing::warn!("bad request from {}: {}", self.peer_addr, err);
                    self.buffer.clear();
                    self.reply(Frame::error(format!("ERR {err}"))).await?;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let reply = self.execute(frame);
            self.reply(reply).await?;
        }
    }

    /// Read one complete frame, buffering partial reads.
    ///
    /// `Ok(None)` means the peer closed cleanly between frames.
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if !self.buffer.is_empty() {
                match protocol::decode(&self.buffer) {
                    Ok((frame, rest)) => {
                        let consumed = self.buffer.len() - rest.len();
                        self.buffer.advance(consumed);
                        return Ok(Some(frame));
                    }
                    Err(CoveError::Incomplete) => {}
                    Err(err) => return Err(err),
                }
            }

            if self.stream.read_buf(&mut self.buffer).await? == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(std::io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "connection closed mid-frame",
                )
                .into());
            }
        }
    }

    /// Execute one request frame against this peer's key space
    fn execute(&self, frame: Frame) -> Frame {
        let Some(parts) = frame.into_parts() else {
            return Frame::error("ERR request must be an array of bulk strings");
        };

        tracing::trace!("{} request: {:?}", self.identity, parts);
        let space = self.registry.acquire(&self.identity);
        dispatch::dispatch(&space, &parts)
    }

    /// Encode and send one reply frame
    async fn reply(&mut self, frame: Frame) -> Result<()> {
        let bytes = protocol::encode(&frame);
        self.stream.write_all(&bytes).await?;
        Ok(())
    }
}
