use websocket::{Frame, Message, Opcode, write_frame};


/// Handles messages received from websocket
///
/// Called on a worker thread. Messages of a single connection are passed
/// in the order they were received and never concurrently, while messages
/// of different connections may be handled in parallel.
pub trait Handler: Send + Sync + 'static {
    /// A message (or a control frame) received
    fn message(&self, message: Message, reply: &mut Reply);
}

/// Collects frames to be sent back to the peer
///
/// Everything written here is sent as a single buffer after the current
/// batch of input is processed.
#[derive(Debug, Default)]
pub struct Reply {
    buf: Vec<u8>,
    close: bool,
}

/// A handler that sends every message back
///
/// Answers pings with pongs and replies to close with close, then shuts
/// the connection down. Unknown opcodes are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Reply {
    pub fn new() -> Reply {
        Reply {
            buf: Vec::new(),
            close: false,
        }
    }
    /// Append raw bytes, they go to the wire as is
    pub fn write(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }
    /// Send a frame
    pub fn frame(&mut self, frame: &Frame) {
        if self.close {
            debug!("Dropping {:?} frame after close", frame.opcode);
            return;
        }
        write_frame(&mut self.buf, frame);
    }
    /// Send a complete message in a single frame
    pub fn send(&mut self, opcode: Opcode, data: &[u8]) {
        self.frame(&Frame::new(opcode, data));
    }
    pub fn text(&mut self, data: &str) {
        self.send(Opcode::Text, data.as_bytes());
    }
    pub fn binary(&mut self, data: &[u8]) {
        self.send(Opcode::Binary, data);
    }
    pub fn pong(&mut self, data: &[u8]) {
        self.send(Opcode::Pong, data);
    }
    /// Send close frame and shut down the connection when it's flushed
    ///
    /// Frames sent after this are dropped.
    pub fn close(&mut self, code: u16, reason: &str) {
        self.frame(&Frame::close(code, reason));
        self.close = true;
    }
    pub fn is_closing(&self) -> bool {
        self.close
    }
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
    /// Bytes written so far and whether close was requested
    pub fn into_parts(self) -> (Vec<u8>, bool) {
        (self.buf, self.close)
    }
}

impl<F> Handler for F
    where F: Fn(Message, &mut Reply) + Send + Sync + 'static,
{
    fn message(&self, message: Message, reply: &mut Reply) {
        (self)(message, reply)
    }
}

impl Handler for Echo {
    fn message(&self, message: Message, reply: &mut Reply) {
        match message.opcode {
            Opcode::Ping => reply.pong(&message.data),
            Opcode::Pong => {}
            Opcode::Close => {
                let code = if message.data.len() >= 2 {
                    (message.data[0] as u16) << 8 | message.data[1] as u16
                } else {
                    1000
                };
                debug!("Websocket closed by peer [{}]", code);
                reply.close(code, "");
            }
            Opcode::Unknown(x) => {
                debug!("Ignoring message with unknown opcode {}", x);
            }
            // only a continuation frame with no message started
            // arrives as such
            Opcode::Continue => {
                debug!("Ignoring continuation without a message");
            }
            opcode @ Opcode::Text | opcode @ Opcode::Binary => {
                trace!("Echoing {} bytes", message.data.len());
                reply.send(opcode, &message.data);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use websocket::{Message, Opcode};
    use super::{Handler, Reply, Echo};

    fn echo(opcode: Opcode, data: &[u8]) -> (Vec<u8>, bool) {
        let mut reply = Reply::new();
        Echo.message(Message { opcode: opcode, data: data.to_vec() },
                     &mut reply);
        reply.into_parts()
    }

    #[test]
    fn echo_text() {
        assert_eq!(echo(Opcode::Text, b"Hello"),
            (b"\x81\x05Hello".to_vec(), false));
    }

    #[test]
    fn echo_ping() {
        assert_eq!(echo(Opcode::Ping, b"xy"), (b"\x8A\x02xy".to_vec(), false));
    }

    #[test]
    fn echo_close() {
        assert_eq!(echo(Opcode::Close, b"\x03\xe9bye"),
            (b"\x88\x02\x03\xe9".to_vec(), true));
        assert_eq!(echo(Opcode::Close, b""),
            (b"\x88\x02\x03\xe8".to_vec(), true));
    }

    #[test]
    fn ignore_unknown() {
        assert_eq!(echo(Opcode::Unknown(5), b"?"), (Vec::new(), false));
    }

    #[test]
    fn ignore_orphan_continue() {
        assert_eq!(echo(Opcode::Continue, b"hi"), (Vec::new(), false));
    }

    #[test]
    fn nothing_after_close() {
        let mut reply = Reply::new();
        reply.close(1000, "");
        reply.text("late");
        assert_eq!(reply.into_parts(), (b"\x88\x02\x03\xe8".to_vec(), true));
    }

    #[test]
    fn closure_handler() {
        let handler = |msg: Message, reply: &mut Reply| {
            reply.text(&msg.data.len().to_string());
        };
        let mut reply = Reply::new();
        handler.message(Message { opcode: Opcode::Binary, data: vec![1, 2] },
                        &mut reply);
        assert_eq!(reply.into_parts(), (b"\x81\x012".to_vec(), false));
    }
}
