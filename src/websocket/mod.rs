//! Websocket protocol engine
//!
//! Nothing in this module does I/O. Codec functions work on a
//! `ByteBuffer`, and `Session` drives them across partial network reads.

mod config;
mod keys;
mod handshake;
mod frame;
mod session;

pub use self::keys::{Accept, MaskKey, GUID};
pub use self::handshake::{HandshakeRequest, parse_handshake};
pub use self::handshake::{build_handshake_response, write_handshake_response};
pub use self::frame::{Frame, Opcode, parse_frame, serialize_frame};
pub use self::frame::{write_frame, close_payload};
pub use self::session::{Session, State, Output, Message};


/// Websocket protocol limits and handshake options
#[derive(Debug, Clone)]
pub struct Config {
    max_handshake_size: usize,
    max_frame_size: usize,
    max_message_size: usize,
    protocol: Option<String>,
}
