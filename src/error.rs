use std::io;
use std::convert::From;


quick_error! {
    /// Websocket server error
    ///
    /// Every error here is local to a single connection. Waiting for more
    /// bytes is not an error: parsers return `Ok(None)` for that.
    #[derive(Debug)]
    pub enum Error {
        /// Socket IO error
        Io(err: io::Error) {
            description("I/O error")
            display("I/O error: {}", err)
            from()
        }
        /// Handshake request is malformed or lacks a required header
        HandshakeInvalid(reason: &'static str) {
            description("invalid websocket handshake")
            display("invalid websocket handshake: {}", reason)
        }
        /// No end of headers within the configured handshake size
        ///
        /// This is an invalid handshake too, it is handled exactly like
        /// `HandshakeInvalid`: no response is sent and the connection is
        /// closed. See `is_invalid_handshake`.
        HandshakeTooLong {
            description("websocket handshake is too long")
        }
        /// Frame header violates the protocol
        FrameParse(reason: &'static str) {
            description("error parsing websocket frame")
            display("error parsing websocket frame: {}", reason)
        }
        /// Received frame or message that is longer than configured limit
        TooLong {
            description("received frame or message that is too long")
        }
    }
}

impl Error {
    /// Handshake was rejected, never answered with a response
    pub fn is_invalid_handshake(&self) -> bool {
        match *self {
            Error::HandshakeInvalid(..) | Error::HandshakeTooLong => true,
            _ => false,
        }
    }
    /// Close status to send to the peer before dropping the connection
    ///
    /// Returns `None` for errors that happen before the websocket is
    /// established or when the socket itself is broken.
    pub fn close_code(&self) -> Option<u16> {
        match *self {
            Error::FrameParse(..) => Some(1002),
            Error::TooLong => Some(1009),
            Error::Io(..) | Error::HandshakeInvalid(..)
            | Error::HandshakeTooLong => None,
        }
    }
}

#[test]
fn send_sync() {
    fn send_sync<T: Send+Sync>(_: T) {}
    send_sync(Error::TooLong);
}

#[test]
fn close_codes() {
    assert_eq!(Error::FrameParse("x").close_code(), Some(1002));
    assert_eq!(Error::TooLong.close_code(), Some(1009));
    assert_eq!(Error::HandshakeInvalid("x").close_code(), None);
}

#[test]
fn invalid_handshake_class() {
    assert!(Error::HandshakeInvalid("x").is_invalid_handshake());
    assert!(Error::HandshakeTooLong.is_invalid_handshake());
    assert!(!Error::TooLong.is_invalid_handshake());
    assert_eq!(Error::HandshakeTooLong.close_code(), None);
}
