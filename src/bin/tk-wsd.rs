extern crate tk_wsd;
extern crate argparse;
extern crate env_logger;
extern crate tokio_core;
#[macro_use] extern crate log;

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::exit;

use argparse::{ArgumentParser, Store, StoreOption};
use tokio_core::reactor::Core;

use tk_wsd::Echo;
use tk_wsd::server::{Config, Server};
use tk_wsd::websocket;


pub fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let mut port = 9000u16;
    let mut workers = 1usize;
    let mut protocol = None::<String>;
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("Websocket echo server");
        ap.refer(&mut port)
            .add_argument("port", Store, "
                Port to listen on (default 9000)
            ");
        ap.refer(&mut workers)
            .add_option(&["-w", "--workers"], Store,
                "Number of threads processing websocket input (default 1)");
        ap.refer(&mut protocol)
            .add_option(&["--protocol"], StoreOption,
                "Subprotocol name to answer with when client requests one
                 (by default the first requested one is echoed)");
        ap.parse_args_or_exit();
    }
    if workers == 0 {
        error!("At least one worker is needed");
        exit(2);
    }

    let mut lp = Core::new().expect("loop created");
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
    let cfg = Config::new().workers(workers).done();
    let mut ws_cfg = websocket::Config::new();
    if let Some(name) = protocol {
        ws_cfg.protocol(name);
    }

    let server = match Server::bind(&addr, &lp.handle(), &cfg,
                                    &ws_cfg.done(), Echo)
    {
        Ok(server) => server,
        Err(e) => {
            error!("Can't listen on {}: {}", addr, e);
            exit(1);
        }
    };
    info!("Serving on {}", addr);

    lp.run(server.run()).ok();
}
