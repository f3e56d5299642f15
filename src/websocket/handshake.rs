use std::io::Write;
use std::cmp::min;

use buffer::ByteBuffer;
use error::Error;
use websocket::Accept;


/// A parsed websocket upgrade request
///
/// Headers are kept in the order received. Lookups are case-insensitive
/// and the first header with a given name wins.
#[derive(Debug, Clone)]
pub struct HandshakeRequest {
    method: String,
    uri: String,
    version: String,
    headers: Vec<(String, String)>,
}

impl HandshakeRequest {
    pub fn method(&self) -> &str {
        &self.method
    }
    pub fn uri(&self) -> &str {
        &self.uri
    }
    pub fn version(&self) -> &str {
        &self.version
    }
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
    /// Value of the first header named `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|&&(ref k, _)| k.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| &v[..])
    }
    /// The `Sec-WebSocket-Key` value
    pub fn key(&self) -> &str {
        self.header("Sec-WebSocket-Key").unwrap_or("")
    }
    /// Tokens of the `Sec-WebSocket-Protocol` header, in order
    pub fn protocols<'x>(&'x self) -> impl Iterator<Item=&'x str> + 'x {
        self.header("Sec-WebSocket-Protocol")
            .into_iter()
            .flat_map(|v| v.split(','))
            .map(|x| x.trim())
            .filter(|x| x.len() > 0)
    }
    /// The value of `Sec-WebSocket-Accept` for this request
    pub fn accept(&self) -> Accept {
        Accept::from_key_bytes(self.key().as_bytes())
    }
}

fn find_terminator(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn trim(x: &str) -> &str {
    x.trim_matches(|c| c == ' ' || c == '\t')
}

fn has_token(value: &str, token: &str) -> bool {
    value.split(',').any(|tok| trim(tok).eq_ignore_ascii_case(token))
}

fn parse_head(head: &str) -> Result<HandshakeRequest, Error> {
    let mut lines = head.split("\r\n").skip_while(|x| trim(x).is_empty());
    let request_line = lines.next()
        .ok_or(Error::HandshakeInvalid("no request line"))?;
    let parts = request_line.split_whitespace().collect::<Vec<_>>();
    if parts.len() != 3 {
        return Err(Error::HandshakeInvalid("bad request line"));
    }
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in lines {
        let mut pair = line.splitn(2, ':');
        let (name, value) = match (pair.next(), pair.next()) {
            (Some(name), Some(value)) => (trim(name), trim(value)),
            _ => {
                trace!("Skipping handshake line without colon {:?}", line);
                continue;
            }
        };
        if name.is_empty() || value.is_empty() {
            continue;
        }
        headers.push((name.to_string(), value.to_string()));
    }
    Ok(HandshakeRequest {
        method: parts[0].to_string(),
        uri: parts[1].to_string(),
        version: parts[2].to_string(),
        headers: headers,
    })
}

fn validate(req: &HandshakeRequest) -> Result<(), Error> {
    let upgrade = req.header("Upgrade")
        .map(|x| x.eq_ignore_ascii_case("websocket"));
    if !upgrade.unwrap_or(false) {
        return Err(Error::HandshakeInvalid("no `Upgrade: websocket` header"));
    }
    let connection = req.header("Connection")
        .map(|x| has_token(x, "upgrade"));
    if !connection.unwrap_or(false) {
        return Err(Error::HandshakeInvalid("no `Connection: upgrade` header"));
    }
    match req.header("Sec-WebSocket-Version") {
        Some("13") => {}
        Some(_) => {
            return Err(Error::HandshakeInvalid("unsupported websocket version"));
        }
        None => {
            return Err(Error::HandshakeInvalid("no websocket version"));
        }
    }
    if req.key().is_empty() {
        return Err(Error::HandshakeInvalid("no websocket key"));
    }
    Ok(())
}

/// Try to parse a handshake request at the cursor of `buf`
///
/// Returns `Ok(None)` if the request is not complete yet (nothing is
/// consumed), otherwise the request and the number of bytes up to and
/// including the empty line. On success the cursor is advanced past the
/// request.
///
/// `scanned` is the number of bytes after the cursor that an earlier call
/// already searched for the empty line. Only the bytes after it (minus
/// the three that may hold a part of the terminator) are searched again.
/// Pass zero when nothing was searched yet.
///
/// If no empty line is found within `limit` bytes, the handshake is
/// rejected with `HandshakeTooLong`.
pub fn parse_handshake(buf: &mut ByteBuffer, limit: usize, scanned: usize)
    -> Result<Option<(HandshakeRequest, usize)>, Error>
{
    let (req, consumed) = {
        let data = buf.current();
        let window = &data[..min(data.len(), limit + 4)];
        let start = min(scanned.saturating_sub(3), window.len());
        let end = match find_terminator(&window[start..]) {
            Some(pos) => start + pos,
            None if data.len() > limit => return Err(Error::HandshakeTooLong),
            None => return Ok(None),
        };
        // invalid utf-8 may only appear in values we never look at
        let head = String::from_utf8_lossy(&data[..end]);
        (parse_head(&head)?, end + 4)
    };
    validate(&req)?;
    buf.skip(consumed);
    Ok(Some((req, consumed)))
}

/// Write `101 Switching Protocols` response for the key into `out`
pub fn write_handshake_response(out: &mut Vec<u8>, key: &str,
    protocol: Option<&str>)
{
    let accept = Accept::from_key_bytes(key.as_bytes());
    // writing into a Vec never fails
    write!(out, "HTTP/1.1 101 Switching Protocols\r\n\
                 Connection: upgrade\r\n\
                 Upgrade: websocket\r\n\
                 Sec-WebSocket-Accept: {}\r\n", accept).ok();
    if let Some(proto) = protocol {
        write!(out, "Sec-WebSocket-Protocol: {}\r\n", proto).ok();
    }
    out.extend_from_slice(b"\r\n");
}

/// Build `101 Switching Protocols` response for the key
pub fn build_handshake_response(key: &str, protocol: Option<&str>)
    -> Vec<u8>
{
    let mut out = Vec::with_capacity(160);
    write_handshake_response(&mut out, key, protocol);
    out
}
