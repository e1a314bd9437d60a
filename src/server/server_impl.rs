use crate::{
    http::{
        request::Request,
        response::{placeholder, Response, NO_HEADERS, SERVER_NAME},
        types::StatusCode,
    },
    limits::{ConnLimits, ReqLimits, ServerLimits, WaitStrategy},
    server::connection::{send_unavailable, HttpConnection},
};
use crossbeam::queue::SegQueue;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    task::yield_now,
    time::sleep as tokio_sleep,
};
use tracing::{info, warn};

/// A trait for turning a parsed request into a response.
///
/// `&self` is shared by every worker, so it is the place for immutable
/// application state. The request is mutable so the handler can consume
/// its [`body`](Request::body).
///
/// A panic inside `handle` does not take the worker down: the client gets
/// `500 InternalServerError` instead.
///
/// # Examples
///
/// ```
/// use retro_http::{Handler, Request, Response, StatusCode, NO_HEADERS};
///
/// struct MyHandler;
///
/// impl Handler for MyHandler {
///     async fn handle(&self, req: &mut Request) -> Response {
///         match req.target().path() {
///             "/echo" => Response::html(req.protocol(), StatusCode::Ok, None, NO_HEADERS, "echo"),
///             _ => Response::error(req.protocol(), StatusCode::NotFound, None),
///         }
///     }
/// }
/// ```
pub trait Handler
where
    Self: Sync + Send + 'static,
{
    /// Processes a request and produces the response to send.
    ///
    /// Use [`request.protocol()`](Request::protocol) as the response
    /// protocol so HTTP/0.9 clients get a body-only answer.
    fn handle(&self, request: &mut Request) -> impl Future<Output = Response> + Send;
}

/// Answers every request with a `server ok` page reading `viewing <path>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl Handler for EchoHandler {
    async fn handle(&self, request: &mut Request) -> Response {
        let header = format!("viewing {}", request.target().path());

        Response::html(
            request.protocol(),
            StatusCode::Ok,
            None,
            NO_HEADERS,
            &placeholder("server ok", &header),
        )
    }
}

/// A TCP server answering one request per connection.
///
/// # Examples
///
/// ```no_run
/// use retro_http::{EchoHandler, Server};
/// use tokio::net::TcpListener;
///
/// #[tokio::main]
/// async fn main() {
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:8008").await.unwrap())
///         .handler(EchoHandler)
///         .build()
///         .launch()
///         .await
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    stream_queue: TcpQueue,
    error_queue: TcpQueue,
    server_limits: ServerLimits,
}

impl Server {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder<H: Handler>() -> ServerBuilder<H> {
        ServerBuilder {
            listener: None,
            handler: None,

            server_limits: None,
            request_limits: None,
            connection_limits: None,
        }
    }

    /// Returns the address the server accepts connections on.
    #[inline]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections. Never returns.
    ///
    /// Accepted streams are queued for the workers; once
    /// [`max_pending_connections`](ServerLimits::max_pending_connections)
    /// are waiting, new streams are handed to the `503` tasks instead.
    pub async fn launch(self) {
        match self.listener.local_addr() {
            Ok(addr) => info!(%addr, server = SERVER_NAME, "listening"),
            Err(err) => warn!(error = %err, "listening on an unknown address"),
        }

        loop {
            let value = match self.listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            match self.stream_queue.len() < self.server_limits.max_pending_connections {
                true => self.stream_queue.push(value),
                false => self.error_queue.push(value),
            }
        }
    }

    #[inline]
    async fn get_stream(queue: &TcpQueue, wait: &WaitStrategy) -> (TcpStream, SocketAddr) {
        loop {
            if let Some(value) = queue.pop() {
                return value;
            }

            match wait {
                WaitStrategy::Yield => yield_now().await,
                WaitStrategy::Sleep(time) => tokio_sleep(*time).await,
            }
        }
    }
}

/// Builder for configuring and creating [`Server`] instances.
pub struct ServerBuilder<H: Handler> {
    listener: Option<TcpListener>,
    handler: Option<Arc<H>>,

    server_limits: Option<ServerLimits>,
    request_limits: Option<ReqLimits>,
    connection_limits: Option<ConnLimits>,
}

impl<H: Handler> ServerBuilder<H> {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the request handler that will process incoming requests.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn handler(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Configures worker count, queueing and overload behavior.
    ///
    /// For more information, see [`ServerLimits`].
    #[inline(always)]
    pub fn server_limits(mut self, limits: ServerLimits) -> Self {
        self.server_limits = Some(limits);
        self
    }

    /// Configures the socket read and write timeouts.
    ///
    /// For more information, see [`ConnLimits`].
    #[inline(always)]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.connection_limits = Some(limits);
        self
    }

    /// Configures the request line and header block size limits.
    ///
    /// For more information, see [`ReqLimits`].
    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }

    /// Spawns the workers and returns the server, ready to
    /// [`launch`](Server::launch).
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Panics
    ///
    /// If [`listener`](Self::listener) or [`handler`](Self::handler) was not called.
    #[inline]
    #[track_caller]
    pub fn build(self) -> Server {
        let (listener, handler, limits) = self.get_all_parts();

        let stream_queue = Arc::new(SegQueue::new());
        let error_queue = Arc::new(SegQueue::new());

        for _ in 0..limits.0.max_connections {
            Self::spawn_worker(&stream_queue, &limits, &handler);
        }
        if limits.0.count_503_handlers != 0 {
            for _ in 0..limits.0.count_503_handlers {
                Self::spawn_alarmist(&error_queue, &limits);
            }
        } else {
            Self::spawn_quiet_alarmist(&error_queue, &limits);
        }

        Server {
            listener,
            stream_queue,
            error_queue,
            server_limits: limits.0,
        }
    }

    #[inline]
    fn spawn_worker(queue: &TcpQueue, limits: &AllLimits, handler: &Arc<H>) {
        let queue = queue.clone();
        let (server_limits, conn_limits, req_limits) = limits.clone();
        let conn = HttpConnection::new(handler.clone(), conn_limits, req_limits);

        tokio::spawn(async move {
            loop {
                let (stream, peer) = Server::get_stream(&queue, &server_limits.wait_strategy).await;
                conn.run(stream, peer).await;
            }
        });
    }

    #[inline]
    fn spawn_alarmist(queue: &TcpQueue, limits: &AllLimits) {
        let queue = queue.clone();
        let (server_limits, conn_limits, _) = limits.clone();

        tokio::spawn(async move {
            loop {
                let (stream, peer) = Server::get_stream(&queue, &server_limits.wait_strategy).await;
                send_unavailable(stream, peer, &conn_limits).await;
            }
        });
    }

    #[inline]
    fn spawn_quiet_alarmist(queue: &TcpQueue, limits: &AllLimits) {
        let queue = queue.clone();
        let (server_limits, ..) = limits.clone();

        tokio::spawn(async move {
            loop {
                let (stream, peer) = Server::get_stream(&queue, &server_limits.wait_strategy).await;

                warn!(%peer, "server overloaded, connection dropped");
                drop(stream);
            }
        });
    }

    #[inline]
    #[track_caller]
    fn get_all_parts(self) -> (TcpListener, Arc<H>, AllLimits) {
        (
            self.listener
                .expect("The `listener` method must be called to create"),
            self.handler
                .expect("The `handler` method must be called to create"),
            (
                self.server_limits.unwrap_or_default(),
                self.connection_limits.unwrap_or_default(),
                self.request_limits.unwrap_or_default(),
            ),
        )
    }
}

type TcpQueue = Arc<SegQueue<(TcpStream, SocketAddr)>>;
type AllLimits = (ServerLimits, ConnLimits, ReqLimits);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http::request::Parsed, tools::*};

    async fn request(input: &'static [u8]) -> Request {
        match crate::parse(input, &ReqLimits::default()).await {
            Parsed::Ready(request) => request,
            other => panic!("{other:?}"),
        }
    }

    #[tokio::test]
    async fn echo_pages() {
        #[rustfmt::skip]
        let cases: [(&'static [u8], &str); 3] = [
            (b"GET / HTTP/1.0\r\n\r\n",           "<h3>viewing /</h3>"),
            (b"GET /Docs/A%20B HTTP/1.0\r\n\r\n", "<h3>viewing /docs/a b</h3>"),
            (b"GET /<b> HTTP/1.0\r\n\r\n",        "<h3>viewing /&lt;b&gt;</h3>"),
        ];

        for (input, header) in cases {
            let response = EchoHandler.handle(&mut request(input).await).await;

            assert_eq!(response.status(), StatusCode::Ok);
            assert!(str_op(response.body()).contains(header), "{header}");
            assert!(str_op(response.body()).contains("<title>server ok</title>"));
        }
    }

    #[tokio::test]
    async fn echo_keeps_protocol() {
        let response = EchoHandler.handle(&mut request(b"GET /x\r\n").await).await;

        assert_eq!(response.protocol(), "HTTP/0.9");
        assert_eq!(response.serialize(), response.body());
    }

    #[tokio::test]
    async fn wait_strategies() {
        for wait in [WaitStrategy::Yield, WaitStrategy::Sleep(std::time::Duration::from_micros(10))] {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let queue: TcpQueue = Arc::new(SegQueue::new());

            let client = tokio::spawn(TcpStream::connect(addr));
            let accepted = listener.accept().await.unwrap();

            let pusher = queue.clone();
            tokio::spawn(async move {
                tokio_sleep(std::time::Duration::from_millis(5)).await;
                pusher.push(accepted);
            });

            let (_, peer) = Server::get_stream(&queue, &wait).await;
            let client = client.await.unwrap().unwrap();
            assert_eq!(peer, client.local_addr().unwrap());
        }
    }
}
