use std::net::SocketAddr;
use std::sync::Arc;

use futures::{Future, Async, Poll};
use futures_cpupool::{CpuPool, CpuFuture};
use tk_bufstream::IoBuf;
use tokio_core::net::TcpStream;

use error::Error;
use handler::{Handler, Reply};
use server::Config;
use websocket::{self, Session, State, Output, Message};


/// Result of processing one chunk of input on the worker pool
struct Processed {
    session: Session,
    output: Vec<u8>,
    close: bool,
}

/// Session failed, connection must be closed after `output` is written
struct Failed {
    output: Vec<u8>,
    error: Error,
}

/// Routes session output of a single task into one reply buffer
struct Batch<'a, H: Handler + 'a> {
    handler: &'a H,
    reply: Reply,
}

/// A single websocket connection
///
/// This future owns the socket and the session. The session is moved to
/// the worker pool together with the input and comes back with the
/// output, so there is at most one task per connection at any time and
/// input is always processed in the order received.
pub struct Connection<H: Handler> {
    io: IoBuf<TcpStream>,
    peer: SocketAddr,
    pool: CpuPool,
    config: Arc<Config>,
    handler: Arc<H>,
    session: Option<Session>,
    task: Option<CpuFuture<Processed, Failed>>,
    unflushed: Option<Vec<u8>>,
    eof: bool,
    closing: bool,
    failure: Option<Error>,
}

impl<'a, H: Handler> Output for Batch<'a, H> {
    fn write(&mut self, data: Vec<u8>) {
        self.reply.write(&data);
    }
    fn deliver(&mut self, message: Message) {
        if self.reply.is_closing() {
            debug!("Ignoring {:?} message after close", message.opcode);
            return;
        }
        self.handler.message(message, &mut self.reply);
    }
}

fn process<H: Handler>(mut session: Session, data: Vec<u8>, handler: &H,
    close_frame: bool)
    -> Result<Processed, Failed>
{
    let mut batch = Batch {
        handler: handler,
        reply: Reply::new(),
    };
    match session.feed(&data, &mut batch) {
        Ok(()) => {
            let (output, close) = batch.reply.into_parts();
            Ok(Processed {
                session: session,
                output: output,
                close: close,
            })
        }
        Err(e) => {
            let mut reply = batch.reply;
            if close_frame && session.state() == State::Established {
                if let Some(code) = e.close_code() {
                    reply.close(code, &e.to_string());
                }
            }
            let (output, _) = reply.into_parts();
            Err(Failed {
                output: output,
                error: e,
            })
        }
    }
}

impl<H: Handler> Connection<H> {
    pub fn new(socket: TcpStream, peer: SocketAddr, pool: &CpuPool,
        config: &Arc<Config>, ws_config: &Arc<websocket::Config>,
        handler: &Arc<H>)
        -> Connection<H>
    {
        Connection {
            io: IoBuf::new(socket),
            peer: peer,
            pool: pool.clone(),
            config: config.clone(),
            handler: handler.clone(),
            session: Some(Session::new(ws_config)),
            task: None,
            unflushed: None,
            eof: false,
            closing: false,
            failure: None,
        }
    }

    fn fail(&mut self, err: Error) {
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }

    fn queue_output(&mut self, data: Vec<u8>) {
        if data.is_empty() {
            return;
        }
        assert!(self.unflushed.is_none(),
            "output for {} is produced before previous one is written",
            self.peer);
        self.unflushed = Some(data);
    }

    fn poll_task(&mut self) {
        let mut task = match self.task.take() {
            Some(task) => task,
            None => return,
        };
        match task.poll() {
            Ok(Async::NotReady) => {
                self.task = Some(task);
            }
            Ok(Async::Ready(done)) => {
                self.session = Some(done.session);
                self.queue_output(done.output);
                if done.close {
                    debug!("Closing connection to {} by handler", self.peer);
                    self.closing = true;
                }
            }
            Err(failed) => {
                if failed.error.is_invalid_handshake() {
                    debug!("Rejected handshake from {}: {}",
                        self.peer, failed.error);
                } else {
                    debug!("Websocket error from {}: {}",
                        self.peer, failed.error);
                }
                self.queue_output(failed.output);
                self.fail(failed.error);
            }
        }
    }

    fn read(&mut self) {
        if self.eof {
            return;
        }
        match self.io.read() {
            Ok(_) => {
                if self.io.done() {
                    debug!("Peer {} closed the connection", self.peer);
                    self.eof = true;
                }
            }
            Err(e) => {
                warn!("Error reading from {}: {}", self.peer, e);
                self.eof = true;
                self.fail(e.into());
            }
        }
    }

    fn spawn(&mut self, session: Session) {
        let data = self.io.in_buf[..].to_vec();
        self.io.in_buf.consume(data.len());
        trace!("Processing {} bytes from {}", data.len(), self.peer);
        let handler = self.handler.clone();
        let close_frame = self.config.close_frame_on_error;
        self.task = Some(self.pool.spawn_fn(move || {
            process(session, data, &*handler, close_frame)
        }));
    }

    fn is_finished(&self) -> bool {
        self.task.is_none() && (
            self.session.is_none() ||
            self.closing ||
            self.eof && self.io.in_buf.len() == 0
        )
    }
}

impl<H: Handler> Future for Connection<H> {
    type Item = ();
    type Error = Error;

    fn poll(&mut self) -> Poll<(), Error> {
        loop {
            self.poll_task();
            if let Some(data) = self.unflushed.take() {
                self.io.out_buf.extend(&data);
            }
            self.io.flush()?;
            if self.is_finished() {
                if self.io.out_buf.len() > 0 {
                    return Ok(Async::NotReady);
                }
                return match self.failure.take() {
                    Some(e) => Err(e),
                    None => Ok(Async::Ready(())),
                };
            }
            // Input arriving while a task is in flight stays in the buffer
            // and goes to the next task
            self.read();
            if self.task.is_none() && self.io.in_buf.len() > 0 {
                if let Some(session) = self.session.take() {
                    self.spawn(session);
                    continue;
                }
            }
            if self.is_finished() {
                continue;
            }
            return Ok(Async::NotReady);
        }
    }
}
