use byteorder::{BigEndian, ByteOrder};

use buffer::ByteBuffer;
use error::Error;
use websocket::MaskKey;


/// Frame opcode (RFC 6455, section 5.2)
///
/// Unknown opcodes are kept as is, it's up to the message handler to
/// decide what to do with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Continue,
    Text,
    Binary,
    Close,
    Ping,
    Pong,
    Unknown(u8),
}

/// A single websocket frame
///
/// The payload is always stored unmasked, `mask` only tells whether the
/// frame is (or was) masked on the wire and with which key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub fin: bool,
    pub rsv1: bool,
    pub rsv2: bool,
    pub rsv3: bool,
    pub opcode: Opcode,
    pub mask: Option<MaskKey>,
    pub payload: Vec<u8>,
}

impl From<u8> for Opcode {
    fn from(code: u8) -> Opcode {
        use self::Opcode::*;
        match code {
            0x0 => Continue,
            0x1 => Text,
            0x2 => Binary,
            0x8 => Close,
            0x9 => Ping,
            0xA => Pong,
            x => Unknown(x),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(code: Opcode) -> u8 {
        use self::Opcode::*;
        match code {
            Continue => 0x0,
            Text => 0x1,
            Binary => 0x2,
            Close => 0x8,
            Ping => 0x9,
            Pong => 0xA,
            Unknown(x) => x,
        }
    }
}

impl Opcode {
    /// Opcodes in the 0x8-0xF range
    pub fn is_control(&self) -> bool {
        u8::from(*self) & 0x8 != 0
    }
}

impl Frame {
    /// An unmasked frame with `fin` set
    pub fn new<T: Into<Vec<u8>>>(opcode: Opcode, payload: T) -> Frame {
        Frame {
            fin: true,
            rsv1: false,
            rsv2: false,
            rsv3: false,
            opcode: opcode,
            mask: None,
            payload: payload.into(),
        }
    }
    /// A close frame with status code and reason
    pub fn close(code: u16, reason: &str) -> Frame {
        Frame::new(Opcode::Close, close_payload(code, reason))
    }
    /// Same frame with the `fin` flag set to `value`
    pub fn fin(mut self, value: bool) -> Frame {
        self.fin = value;
        self
    }
    /// Same frame masked with `key`, as a client would send it
    pub fn masked(mut self, key: MaskKey) -> Frame {
        self.mask = Some(key);
        self
    }
}

/// Payload of the close frame: big-endian status then utf-8 reason
///
/// The reason is truncated to fit a control frame.
pub fn close_payload(code: u16, reason: &str) -> Vec<u8> {
    let mut end = ::std::cmp::min(reason.len(), 123);
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    let mut data = Vec::with_capacity(2 + end);
    data.extend_from_slice(&[(code >> 8) as u8, (code & 0xFF) as u8]);
    data.extend_from_slice(reason[..end].as_bytes());
    data
}

fn read_frame(buf: &mut ByteBuffer, limit: usize)
    -> Result<Option<Frame>, Error>
{
    let mut head = [0u8; 2];
    if !buf.read(&mut head) {
        return Ok(None);
    }
    let fin = head[0] & 0x80 != 0;
    let opcode = Opcode::from(head[0] & 0x0F);
    let masked = head[1] & 0x80 != 0;
    let size = match head[1] & 0x7F {
        126 => {
            let mut len = [0u8; 2];
            if !buf.read(&mut len) {
                return Ok(None);
            }
            BigEndian::read_u16(&len) as u64
        }
        127 => {
            let mut len = [0u8; 8];
            if !buf.read(&mut len) {
                return Ok(None);
            }
            let len = BigEndian::read_u64(&len);
            if len & (1 << 63) != 0 {
                return Err(Error::FrameParse("64-bit length has high bit set"));
            }
            len
        }
        size => size as u64,
    };
    match opcode {
        Opcode::Close | Opcode::Ping | Opcode::Pong => {
            if !fin {
                return Err(Error::FrameParse("fragmented control frame"));
            }
            if size > 125 {
                return Err(Error::FrameParse("control frame is too long"));
            }
        }
        _ => {}
    }
    if size > limit as u64 {
        return Err(Error::TooLong);
    }
    let size = size as usize;
    let mask = if masked {
        let mut key = [0u8; 4];
        if !buf.read(&mut key) {
            return Ok(None);
        }
        Some(MaskKey(key))
    } else {
        None
    };
    if !buf.require(size) {
        return Ok(None);
    }
    let mut payload = vec![0u8; size];
    let complete = buf.read(&mut payload);
    debug_assert!(complete);
    if let Some(ref key) = mask {
        key.apply(&mut payload, 0);
    }
    Ok(Some(Frame {
        fin: fin,
        rsv1: head[0] & 0x40 != 0,
        rsv2: head[0] & 0x20 != 0,
        rsv3: head[0] & 0x10 != 0,
        opcode: opcode,
        mask: mask,
        payload: payload,
    }))
}

/// Try to parse a frame at the cursor of `buf`
///
/// Returns `Ok(None)` if the whole frame (header and payload) is not in the
/// buffer yet. In that case, and on error, the cursor is left where it was
/// before the call. Otherwise returns the unmasked frame and the number of
/// bytes it occupied, with the cursor advanced past the frame.
///
/// Frames declaring payload larger than `limit` fail with `TooLong` as soon
/// as the length is known.
pub fn parse_frame(buf: &mut ByteBuffer, limit: usize)
    -> Result<Option<(Frame, usize)>, Error>
{
    let start = buf.cursor();
    match read_frame(buf, limit) {
        Ok(Some(frame)) => {
            let consumed = buf.cursor() - start;
            Ok(Some((frame, consumed)))
        }
        Ok(None) => {
            buf.set_cursor(start);
            Ok(None)
        }
        Err(e) => {
            buf.set_cursor(start);
            Err(e)
        }
    }
}

/// Append the wire representation of `frame` to `out`
///
/// Masked frames get the key written after the length, and the payload
/// XOR'ed with it.
pub fn write_frame(out: &mut Vec<u8>, frame: &Frame) {
    let mut first_byte = u8::from(frame.opcode) & 0x0F;
    if frame.fin { first_byte |= 0x80; }
    if frame.rsv1 { first_byte |= 0x40; }
    if frame.rsv2 { first_byte |= 0x20; }
    if frame.rsv3 { first_byte |= 0x10; }
    let mask_bit = if frame.mask.is_some() { 0x80 } else { 0 };
    match frame.payload.len() {
        len @ 0..=125 => {
            out.extend_from_slice(&[first_byte, mask_bit | len as u8]);
        }
        len @ 126..=65535 => {
            let mut size = [0u8; 2];
            BigEndian::write_u16(&mut size, len as u16);
            out.extend_from_slice(&[first_byte, mask_bit | 126]);
            out.extend_from_slice(&size);
        }
        len => {
            let mut size = [0u8; 8];
            BigEndian::write_u64(&mut size, len as u64);
            out.extend_from_slice(&[first_byte, mask_bit | 127]);
            out.extend_from_slice(&size);
        }
    }
    match frame.mask {
        Some(key) => {
            out.extend_from_slice(&key.0);
            let start = out.len();
            out.extend_from_slice(&frame.payload);
            key.apply(&mut out[start..], 0);
        }
        None => out.extend_from_slice(&frame.payload),
    }
}

/// Serialize a single frame
pub fn serialize_frame(frame: &Frame) -> Vec<u8> {
    let mut out = Vec::with_capacity(frame.payload.len() + 14);
    write_frame(&mut out, frame);
    out
}
