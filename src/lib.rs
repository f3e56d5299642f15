//! Websocket server based on `tokio` tools
//!
//! The protocol engine (`websocket` module) has no I/O inside: bytes are
//! fed to a `Session` which parses the handshake and frames, and emits
//! outbound bytes and completed messages to an `Output`. The `server`
//! module runs sessions for accepted sockets on a worker pool.
#![recursion_limit="100"]

extern crate futures;
extern crate futures_cpupool;
extern crate tokio_core;
extern crate tk_bufstream;
extern crate tk_listen;
extern crate sha1;
extern crate byteorder;
extern crate rand;
#[macro_use(quick_error)] extern crate quick_error;
#[macro_use] extern crate log;


pub mod websocket;
pub mod server;
mod buffer;
mod error;
mod handler;

pub use buffer::ByteBuffer;
pub use error::Error;
pub use handler::{Handler, Reply, Echo};
