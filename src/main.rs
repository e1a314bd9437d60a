use retro_http::{EchoHandler, Server};
use std::{env, net::SocketAddr};
use tokio::net::TcpListener;
use tracing::error;
use tracing_subscriber::EnvFilter;

const ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8008);

#[tokio::main]
async fn main() {
    init_tracing();

    let addr = SocketAddr::from(ADDR);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to bind");
            std::process::exit(1);
        }
    };

    Server::builder()
        .listener(listener)
        .handler(EchoHandler)
        .build()
        .launch()
        .await;
}

// RUST_LOG wins; otherwise `info`, or `debug` when started as `retro_http debug`
fn init_tracing() {
    let level = match env::args().skip(1).any(|arg| arg == "debug") {
        true => "debug",
        false => "info",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
