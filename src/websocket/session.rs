use std::mem;
use std::str::{from_utf8, Utf8Error};
use std::sync::Arc;

use buffer::ByteBuffer;
use error::Error;
use websocket::{Config, Frame, Opcode};
use websocket::{parse_handshake, parse_frame, build_handshake_response};


/// Protocol state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    AwaitingHandshake,
    Established,
}

/// A complete message
///
/// For data messages `opcode` is the opcode of the frame that started the
/// message and `data` is the concatenation of all fragments. Control frames
/// are delivered as one-frame messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub opcode: Opcode,
    pub data: Vec<u8>,
}

/// Receives everything a session produces
pub trait Output {
    /// Bytes to be written to the socket, in order
    fn write(&mut self, data: Vec<u8>);
    /// A message received from the peer
    fn deliver(&mut self, message: Message);
}

/// Protocol state of a single connection
///
/// Feed it bytes as they arrive from the network, in any chunking. The
/// session keeps whatever is not parsed yet, so an incomplete handshake or
/// frame is completed on a later `feed`.
#[derive(Debug)]
pub struct Session {
    config: Arc<Config>,
    state: State,
    recv: ByteBuffer,
    // bytes of `recv` already searched for the end of the handshake
    scanned: usize,
    message: Vec<u8>,
    message_opcode: Option<Opcode>,
}

impl Message {
    pub fn text(&self) -> Result<&str, Utf8Error> {
        from_utf8(&self.data)
    }
}

impl Session {
    pub fn new(config: &Arc<Config>) -> Session {
        Session {
            config: config.clone(),
            state: State::AwaitingHandshake,
            recv: ByteBuffer::new(),
            scanned: 0,
            message: Vec::new(),
            message_opcode: None,
        }
    }
    pub fn state(&self) -> State {
        self.state
    }
    /// Number of received bytes not yet parsed
    pub fn buffered(&self) -> usize {
        self.recv.len()
    }
    /// Process newly received bytes
    ///
    /// Every complete handshake or frame found in the buffer is processed
    /// before returning. The handshake response is passed to `out.write`
    /// as a single chunk, messages are passed to `out.deliver`.
    ///
    /// An error means the connection must be closed, the session should
    /// not be fed anymore.
    pub fn feed<O: Output>(&mut self, data: &[u8], out: &mut O)
        -> Result<(), Error>
    {
        self.recv.append(data);
        loop {
            match self.state {
                State::AwaitingHandshake => {
                    let limit = self.config.handshake_limit();
                    let (req, consumed) =
                        match parse_handshake(&mut self.recv, limit,
                                              self.scanned)?
                        {
                            Some(pair) => pair,
                            None => {
                                self.scanned = self.recv.current().len();
                                return Ok(());
                            }
                        };
                    self.recv.erase(consumed);
                    self.recv.reset_cursor();
                    let protocol = self.config.choose_protocol(&req);
                    debug!("Websocket handshake for {:?} accepted, \
                        protocol {:?}", req.uri(), protocol);
                    out.write(build_handshake_response(req.key(), protocol));
                    self.state = State::Established;
                }
                State::Established => {
                    let limit = self.config.frame_limit();
                    let (frame, consumed) =
                        match parse_frame(&mut self.recv, limit)? {
                            Some(pair) => pair,
                            None => return Ok(()),
                        };
                    self.recv.erase(consumed);
                    self.recv.reset_cursor();
                    self.frame_received(frame, out)?;
                }
            }
        }
    }

    fn frame_received<O: Output>(&mut self, frame: Frame, out: &mut O)
        -> Result<(), Error>
    {
        trace!("Received frame {:?} fin: {}, {} bytes",
            frame.opcode, frame.fin, frame.payload.len());
        if frame.opcode.is_control() {
            out.deliver(Message {
                opcode: frame.opcode,
                data: frame.payload,
            });
            return Ok(());
        }
        if self.message.len() + frame.payload.len()
            > self.config.message_limit()
        {
            return Err(Error::TooLong);
        }
        if self.message_opcode.is_none() {
            self.message_opcode = Some(frame.opcode);
        }
        if self.message.is_empty() {
            self.message = frame.payload;
        } else {
            self.message.extend_from_slice(&frame.payload);
        }
        if frame.fin {
            let opcode = self.message_opcode.take().unwrap_or(frame.opcode);
            out.deliver(Message {
                opcode: opcode,
                data: mem::replace(&mut self.message, Vec::new()),
            });
        }
        Ok(())
    }
}
