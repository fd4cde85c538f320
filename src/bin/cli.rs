//! CoveKV CLI Client
//!
//! One-shot command client: sends a single command to a CoveKV server and
//! prints the reply. The command words are passed through verbatim, so
//! anything the server understands works here:
//!
//! ```text
//! covekv-cli SET greeting hello EX 30
//! covekv-cli LRANGE jobs 0 9
//! ```

use std::io::{Read, Write};
use std::net::TcpStream;

use clap::Parser;

use covekv::protocol::{self, Frame};
use covekv::CoveError;

/// CoveKV CLI
#[derive(Parser, Debug)]
#[command(name = "covekv-cli")]
#[command(about = "Command-line client for CoveKV")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Command words sent as one request (e.g. SET greeting hello)
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> covekv::Result<()> {
    let request = Frame::Array(
        args.command
            .iter()
            .map(|word| Frame::Bulk(word.clone()))
            .collect(),
    );

    let mut stream = TcpStream::connect(&args.server)?;
    stream.write_all(&protocol::encode(&request))?;

    println!("{}", render(&read_reply(&mut stream)?));
    Ok(())
}

/// Read bytes until one complete reply frame decodes
fn read_reply(stream: &mut TcpStream) -> covekv::Result<Frame> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "server closed before a full reply",
            )
            .into());
        }
        buffer.extend_from_slice(&chunk[..n]);

        match protocol::decode(&buffer) {
            Ok((frame, _rest)) => return Ok(frame),
            Err(CoveError::Incomplete) => continue,
            Err(err) => return Err(err),
        }
    }
}

/// Human-readable rendering of a reply frame
fn render(frame: &Frame) -> String {
    match frame {
        Frame::Simple(text) => text.clone(),
        Frame::Error(message) => format!("(error) {message}"),
        Frame::Integer(value) => format!("(integer) {value}"),
        Frame::Bulk(text) => format!("\"{text}\""),
        Frame::Null => "(nil)".to_string(),
        Frame::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Frame::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}) {}", i + 1, render(item)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
