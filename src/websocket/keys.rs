use rand::{Rng, thread_rng};
use std::fmt;
use std::str::{from_utf8_unchecked};

use sha1::Sha1;


/// WebSocket GUID constant (provided by RFC 6455)
pub const GUID: &'static str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

const CHARS: &'static[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                              abcdefghijklmnopqrstuvwxyz\
                              0123456789+/";

/// The `Sec-WebSocket-Accept` header value
///
/// Formats as base64 via `Display`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Accept([u8; 20]);

/// A masking key for client-to-server frames
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MaskKey(pub [u8; 4]);

impl Accept {
    /// Create an Accept header value from a key received in header
    ///
    /// Note: key here is a key as passed in header value (base64-encoded),
    /// it's not decoded or validated.
    pub fn from_key_bytes(key: &[u8]) -> Accept {
        let mut sha1 = Sha1::new();
        sha1.update(key);
        sha1.update(GUID.as_bytes());
        Accept(sha1.digest().bytes())
    }
}

impl MaskKey {
    /// Create a new (random) key, eligible to use for client frames
    pub fn random() -> MaskKey {
        let mut key = [0u8; 4];
        thread_rng().fill_bytes(&mut key);
        MaskKey(key)
    }
    /// XOR the data in place, `offset` is the position of the first byte
    /// of `data` within the payload
    pub fn apply(&self, data: &mut [u8], offset: usize) {
        for (idx, byte) in data.iter_mut().enumerate() {
            *byte ^= self.0[(offset + idx) % 4];
        }
    }
}

impl fmt::Display for Accept {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0u8; 28];
        for i in 0..6 {
            let n = ((self.0[i*3+0] as usize) << 16) |
                    ((self.0[i*3+1] as usize) <<  8) |
                     (self.0[i*3+2] as usize) ;
            buf[i*4+0] = CHARS[(n >> 18) & 63];
            buf[i*4+1] = CHARS[(n >> 12) & 63];
            buf[i*4+2] = CHARS[(n >>  6) & 63];
            buf[i*4+3] = CHARS[(n >>  0) & 63];
        }
        let n = ((self.0[18] as usize) << 16) |
                ((self.0[19] as usize) <<  8);
        buf[24] = CHARS[(n >> 18) & 63];
        buf[25] = CHARS[(n >> 12) & 63];
        buf[26] = CHARS[(n >> 6) & 63];
        buf[27] = b'=';
        // only CHARS and '=' are written above
        fmt::Write::write_str(f, unsafe {
            from_utf8_unchecked(&buf)
        })
    }
}

impl fmt::Debug for Accept {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "websocket::Accept({})", self)
    }
}
