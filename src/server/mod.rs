//! Websocket server: accepts connections and runs sessions on a pool
//!
//! The event loop (`tokio_core::reactor::Core`) owns all sockets. Input
//! read from a socket is processed by the connection's `Session` on a
//! worker pool and the output is written back from the loop.
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{Future, Stream};
use futures_cpupool::{CpuPool, Builder};
use tokio_core::net::TcpListener;
use tokio_core::reactor::Handle;
use tk_listen::ListenExt;

use handler::Handler;
use websocket;

mod config;
mod connection;

pub use self::connection::Connection;


/// Fine-grained configuration of the websocket server
#[derive(Debug, Clone)]
pub struct Config {
    workers: usize,
    max_connections: usize,
    accept_error_delay: Duration,
    close_frame_on_error: bool,
}

/// A bound listener ready to serve connections
pub struct Server<H: Handler> {
    listener: TcpListener,
    handle: Handle,
    pool: CpuPool,
    config: Arc<Config>,
    ws_config: Arc<websocket::Config>,
    handler: Arc<H>,
}

impl<H: Handler> Server<H> {
    /// Bind a listener and start the worker pool
    pub fn bind(addr: &SocketAddr, handle: &Handle, config: &Arc<Config>,
        ws_config: &Arc<websocket::Config>, handler: H)
        -> Result<Server<H>, io::Error>
    {
        let listener = TcpListener::bind(addr, handle)?;
        let pool = Builder::new()
            .pool_size(config.workers)
            .name_prefix("ws-worker-")
            .create();
        debug!("Websocket server bound to {}, {} worker(s)",
            listener.local_addr()?, config.workers);
        Ok(Server {
            listener: listener,
            handle: handle.clone(),
            pool: pool,
            config: config.clone(),
            ws_config: ws_config.clone(),
            handler: Arc::new(handler),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A future that accepts connections forever
    ///
    /// Accept errors are logged and retried after a short delay, errors
    /// of a single connection never stop the server.
    pub fn run(self) -> impl Future<Item=(), Error=()> {
        let Server { listener, handle, pool, config, ws_config, handler } =
            self;
        let max_connections = config.max_connections;
        let delay = config.accept_error_delay;
        listener.incoming()
            .sleep_on_error(delay, &handle)
            .map(move |(socket, addr)| {
                info!("Peer {} connected", addr);
                Connection::new(socket, addr, &pool, &config,
                                &ws_config, &handler)
                .then(move |result| -> Result<(), ()> {
                    match result {
                        Ok(()) => info!("Peer {} disconnected", addr),
                        Err(e) => info!("Peer {} disconnected: {}", addr, e),
                    }
                    Ok(())
                })
            })
            .listen(max_connections)
    }
}
