use std::sync::Arc;

use websocket::{Config, HandshakeRequest};

impl Config {
    /// Create a config with defaults
    pub fn new() -> Config {
        Config {
            max_handshake_size: 100_000,
            max_frame_size: 10 << 20,
            max_message_size: 10 << 20,
            protocol: None,
        }
    }
    /// Maximum size of the handshake request
    ///
    /// Default is 100 000 bytes. If no empty line terminating the headers
    /// is found within this many bytes, the handshake is rejected.
    pub fn max_handshake_size(&mut self, size: usize) -> &mut Self {
        self.max_handshake_size = size;
        self
    }

    /// Maximum frame payload size
    ///
    /// If some frame declares size larger than this, we immediately abort
    /// the connection (without waiting for the payload)
    pub fn max_frame_size(&mut self, size: usize) -> &mut Self {
        self.max_frame_size = size;
        self
    }

    /// Maximum size of a message assembled from continuation frames
    pub fn max_message_size(&mut self, size: usize) -> &mut Self {
        self.max_message_size = size;
        self
    }

    /// Answer every `Sec-WebSocket-Protocol` request with this name
    ///
    /// By default the first requested protocol is echoed back. Requests
    /// without the header never get a protocol in the response.
    pub fn protocol<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.protocol = Some(name.into());
        self
    }

    /// Create a Arc'd config clone to pass to the constructor
    ///
    /// This is just a convenience method.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }

    pub(crate) fn handshake_limit(&self) -> usize {
        self.max_handshake_size
    }
    pub(crate) fn frame_limit(&self) -> usize {
        self.max_frame_size
    }
    pub(crate) fn message_limit(&self) -> usize {
        self.max_message_size
    }
    pub(crate) fn choose_protocol<'a>(&'a self, req: &'a HandshakeRequest)
        -> Option<&'a str>
    {
        req.protocols().next().map(|requested| {
            self.protocol.as_ref().map(|x| &x[..]).unwrap_or(requested)
        })
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}
