use std::time::Duration;
use std::sync::Arc;

use server::{Config};

impl Config {
    /// Create a config with defaults
    pub fn new() -> Config {
        Config {
            workers: 1,
            max_connections: 10000,
            accept_error_delay: Duration::from_millis(100),
            close_frame_on_error: true,
        }
    }
    /// Number of threads processing websocket input
    ///
    /// Default is 1. Input of each connection is processed in order by
    /// at most one thread at a time regardless of this value, so it only
    /// limits how many connections are processed in parallel.
    pub fn workers(&mut self, value: usize) -> &mut Self {
        assert!(value > 0, "at least one worker is needed");
        self.workers = value;
        self
    }
    /// Maximum number of simultaneous connections
    ///
    /// When reached we stop accepting until some connection is closed.
    pub fn max_connections(&mut self, value: usize) -> &mut Self {
        self.max_connections = value;
        self
    }
    /// Delay before accepting again after accept failed
    ///
    /// Accept usually fails when we are out of file descriptors.
    pub fn accept_error_delay(&mut self, value: Duration) -> &mut Self {
        self.accept_error_delay = value;
        self
    }
    /// Send close frame with status code before dropping a connection
    /// because of protocol error
    ///
    /// Default is `true`. Only applies after the handshake is done.
    pub fn close_frame_on_error(&mut self, value: bool) -> &mut Self {
        self.close_frame_on_error = value;
        self
    }
    /// Create a Arc'd config clone to pass to the constructor
    ///
    /// This is just a convenience method.
    pub fn done(&mut self) -> Arc<Config> {
        Arc::new(self.clone())
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}
