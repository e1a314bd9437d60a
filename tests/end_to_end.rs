use retro_http::{
    limits::{ConnLimits, ServerLimits},
    EchoHandler, Handler, Request, Response, Server, StatusCode, NO_HEADERS, SERVER_NAME,
};
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

async fn start<H: Handler>(handler: H, server_limits: ServerLimits) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = Server::builder()
        .listener(listener)
        .handler(handler)
        .server_limits(server_limits)
        .connection_limits(ConnLimits {
            socket_read_timeout: Duration::from_millis(300),
            ..ConnLimits::default()
        })
        .build();

    let addr = server.local_addr().unwrap();
    tokio::spawn(server.launch());
    addr
}

async fn exchange(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

struct BodyEcho;

impl Handler for BodyEcho {
    async fn handle(&self, req: &mut Request) -> Response {
        let length = req
            .header("content-length")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(0);

        let mut body = Vec::new();
        if req.body().take(length).read_to_end(&mut body).await.is_err() {
            return Response::error(req.protocol(), StatusCode::BadRequest, Some("unreadable body"));
        }

        Response::build(req.protocol(), StatusCode::Created, None, NO_HEADERS, body)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_echo_pages() {
    let addr = start(EchoHandler, ServerLimits::default()).await;

    let out = exchange(addr, b"GET /hello HTTP/1.0\r\nHost: localhost\r\n\r\n").await;
    assert!(out.starts_with("HTTP/1.0 200 OK\r\nDate: "));
    assert!(out.contains(&format!("\r\nServer: {SERVER_NAME}\r\n")));
    assert!(out.ends_with(&format!("<h3>viewing /hello</h3>{SERVER_NAME}</body></html>")));

    let out = exchange(addr, b"GET /\r\n").await;
    assert!(out.starts_with("<html><head><title>server ok</title>"));

    let out = exchange(addr, b"GET / HTTP/1.1\r\n\r\n").await;
    assert!(out.starts_with("HTTP/1.0 200 OK\r\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejects_bad_requests() {
    let addr = start(EchoHandler, ServerLimits::default()).await;

    let out = exchange(addr, b"DELETE /x HTTP/1.0\r\n\r\n").await;
    assert!(out.starts_with("HTTP/1.0 400 BadRequest - unsupported method\r\n"));

    let mut long = b"GET /".to_vec();
    long.extend(std::iter::repeat(b'a').take(2000));
    long.extend_from_slice(b" HTTP/1.0\r\n\r\n");

    let out = exchange(addr, &long).await;
    assert!(out.starts_with("HTTP/1.0 400 BadRequest - request line too long\r\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn silent_client_gets_nothing() {
    let addr = start(EchoHandler, ServerLimits::default()).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.0\r\n").await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn body_is_left_to_handler() {
    let addr = start(BodyEcho, ServerLimits::default()).await;

    let out = exchange(addr, b"POST /upload HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello").await;
    assert!(out.starts_with("HTTP/1.0 201 Created\r\n"));
    assert!(out.ends_with("\r\n\r\nhello"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overflow_gets_503() {
    let limits = ServerLimits {
        max_connections: 0,
        max_pending_connections: 0,
        ..ServerLimits::default()
    };
    let addr = start(EchoHandler, limits).await;

    // Overflow connections are answered without reading the request
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    let out = String::from_utf8(response).unwrap();
    assert!(out.starts_with("HTTP/1.0 503 ServiceUnavailable\r\n"));
    assert!(out.contains("<h3>ServiceUnavailable</h3>"));
}
