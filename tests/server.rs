extern crate tk_wsd;
extern crate tokio_core;

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::channel;
use std::thread;
use std::time::Duration;

use tokio_core::reactor::Core;

use tk_wsd::{Echo, Handler, Reply};
use tk_wsd::server::{Config, Server};
use tk_wsd::websocket::{self, Frame, Opcode, Message, MaskKey};
use tk_wsd::websocket::serialize_frame;


const HANDSHAKE: &'static str = "\
    GET /echo HTTP/1.1\r\n\
    Host: localhost\r\n\
    Upgrade: websocket\r\n\
    Connection: Upgrade\r\n\
    Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
    Sec-WebSocket-Version: 13\r\n\
    \r\n";

fn start<H: Handler>(handler: H, workers: usize) -> SocketAddr {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let mut lp = Core::new().expect("loop created");
        let addr = "127.0.0.1:0".parse().unwrap();
        let server = Server::bind(&addr, &lp.handle(),
            &Config::new().workers(workers).done(),
            &websocket::Config::new().done(), handler)
            .expect("bound");
        tx.send(server.local_addr().expect("local addr")).unwrap();
        lp.run(server.run()).ok();
    });
    rx.recv().expect("server started")
}

fn connect(addr: SocketAddr) -> TcpStream {
    let sock = TcpStream::connect(addr).expect("connected");
    sock.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    sock
}

fn read_exact(sock: &mut TcpStream, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    sock.read_exact(&mut buf).expect("read");
    buf
}

fn read_response(sock: &mut TcpStream) -> String {
    let mut data = Vec::new();
    while !data.ends_with(b"\r\n\r\n") {
        data.extend(read_exact(sock, 1));
    }
    String::from_utf8(data).unwrap()
}

fn send(sock: &mut TcpStream, opcode: Opcode, fin: bool, data: &[u8]) {
    let frame = Frame::new(opcode, data).fin(fin).masked(MaskKey::random());
    sock.write_all(&serialize_frame(&frame)).unwrap();
}

#[test]
fn echo() {
    let addr = start(Echo, 1);
    let mut sock = connect(addr);
    sock.write_all(HANDSHAKE.as_bytes()).unwrap();
    let resp = read_response(&mut sock);
    assert!(resp.starts_with("HTTP/1.1 101 Switching Protocols\r\n"));
    assert!(resp.contains(
        "\r\nSec-WebSocket-Accept: s3pPLMBiTxaQ9kYGzzhZRbK+xOo=\r\n"));

    send(&mut sock, Opcode::Text, true, b"Hello");
    assert_eq!(read_exact(&mut sock, 7), b"\x81\x05Hello");

    send(&mut sock, Opcode::Text, false, b"ab");
    send(&mut sock, Opcode::Continue, true, b"cd");
    assert_eq!(read_exact(&mut sock, 6), b"\x81\x04abcd");

    send(&mut sock, Opcode::Ping, true, b"p");
    assert_eq!(read_exact(&mut sock, 3), b"\x8A\x01p");

    send(&mut sock, Opcode::Close, true, b"\x03\xe8");
    assert_eq!(read_exact(&mut sock, 4), b"\x88\x02\x03\xe8");
    let mut rest = Vec::new();
    sock.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn pipelined_handshake_and_frames() {
    let addr = start(Echo, 2);
    let mut sock = connect(addr);
    let mut data = HANDSHAKE.as_bytes().to_vec();
    for i in 0..10u8 {
        data.extend(serialize_frame(&Frame::new(Opcode::Binary, vec![i; 3])
            .masked(MaskKey::random())));
    }
    sock.write_all(&data).unwrap();
    read_response(&mut sock);
    for i in 0..10u8 {
        assert_eq!(read_exact(&mut sock, 5), [0x82, 3, i, i, i]);
    }
}

#[test]
fn invalid_handshake_closes() {
    let addr = start(Echo, 1);
    let mut sock = connect(addr);
    let req = HANDSHAKE.replace("Sec-WebSocket-Version: 13\r\n", "");
    sock.write_all(req.as_bytes()).unwrap();
    let mut rest = Vec::new();
    sock.read_to_end(&mut rest).unwrap();
    assert!(rest.is_empty());
}

#[test]
fn protocol_error_sends_close() {
    let addr = start(Echo, 1);
    let mut sock = connect(addr);
    sock.write_all(HANDSHAKE.as_bytes()).unwrap();
    read_response(&mut sock);
    // fragmented ping
    send(&mut sock, Opcode::Ping, false, b"x");
    let mut rest = Vec::new();
    sock.read_to_end(&mut rest).unwrap();
    assert_eq!(rest[0], 0x88);
    assert_eq!(&rest[2..4], b"\x03\xea");
    assert_eq!(rest.len(), 2 + rest[1] as usize);
}

#[test]
fn connections_are_independent() {
    let counter = |msg: Message, reply: &mut Reply| {
        reply.text(&format!("{}", msg.data.len()));
    };
    let addr = start(counter, 4);
    let mut socks = (0..5).map(|_| {
        let mut sock = connect(addr);
        sock.write_all(HANDSHAKE.as_bytes()).unwrap();
        read_response(&mut sock);
        sock
    }).collect::<Vec<_>>();
    for (i, sock) in socks.iter_mut().enumerate() {
        send(sock, Opcode::Binary, true, &vec![0u8; i]);
    }
    for (i, sock) in socks.iter_mut().enumerate() {
        let expected = i.to_string();
        assert_eq!(read_exact(sock, 3), [0x81, 1, expected.as_bytes()[0]]);
    }
}
