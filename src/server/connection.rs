use crate::{
    errors::ParseError,
    http::{
        request::{parse, Parsed, Request},
        response::Response,
        types::{Method, StatusCode, Version},
    },
    limits::{ConnLimits, ReqLimits},
    server::{server_impl::Handler, stream::write_all_bytes},
};
use futures_util::FutureExt;
use std::{any::Any, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
    time::timeout,
};
use tracing::{debug, error, info, warn};

/// Serves exactly one request per connection:
/// parse, handle, serialize, write, close.
pub(crate) struct HttpConnection<H: Handler> {
    handler: Arc<H>,
    conn_limits: ConnLimits,
    req_limits: ReqLimits,
}

impl<H: Handler> HttpConnection<H> {
    #[inline]
    pub(crate) fn new(handler: Arc<H>, conn_limits: ConnLimits, req_limits: ReqLimits) -> Self {
        Self {
            handler,
            conn_limits,
            req_limits,
        }
    }

    #[inline]
    pub(crate) async fn run(&self, stream: TcpStream, peer: SocketAddr) {
        let (reader, writer) = stream.into_split();
        self.serve(reader, writer, peer).await;
    }

    pub(crate) async fn serve<R, W>(&self, reader: R, mut writer: W, peer: SocketAddr)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let reading = parse(BufReader::new(reader), &self.req_limits);

        // A client that stays silent is treated like one that hung up
        let parsed = match timeout(self.conn_limits.socket_read_timeout, reading).await {
            Ok(parsed) => parsed,
            Err(_) => Parsed::Aborted(ParseError::ConnectionBroken),
        };

        let response = match parsed {
            Parsed::Ready(mut request) => {
                info!(
                    %peer,
                    method = request.method().as_str(),
                    path = request.target().path(),
                    protocol = request.protocol(),
                    "request"
                );
                self.respond(&mut request, peer).await
            }
            Parsed::Rejected(err, response) => {
                debug!(%peer, error = %err, "request rejected");
                response
            }
            Parsed::Aborted(err) => {
                debug!(%peer, error = %err, "connection closed without a request");
                return;
            }
        };

        send(&mut writer, &response, &self.conn_limits, peer).await;
    }

    async fn respond(&self, request: &mut Request, peer: SocketAddr) -> Response {
        let handled = AssertUnwindSafe(self.handler.handle(request))
            .catch_unwind()
            .await;

        let response = match handled {
            Ok(response) => response,
            Err(panic) => {
                error!(%peer, panic = panic_message(&*panic), "handler panicked");
                Response::error(request.protocol(), StatusCode::InternalServerError, None)
            }
        };

        match request.method() {
            Method::Head => response.without_body(),
            _ => response,
        }
    }
}

/// Answers a connection the server has no room for.
pub(crate) async fn send_unavailable(stream: TcpStream, peer: SocketAddr, limits: &ConnLimits) {
    let (_, mut writer) = stream.into_split();
    let response = Response::error(Version::HTTP_10, StatusCode::ServiceUnavailable, None);

    warn!(%peer, "server overloaded, connection rejected");
    send(&mut writer, &response, limits, peer).await;
}

async fn send<W>(writer: &mut W, response: &Response, limits: &ConnLimits, peer: SocketAddr)
where
    W: AsyncWrite + Unpin,
{
    let bytes = response.serialize();

    match write_all_bytes(writer, &bytes, limits.socket_write_timeout).await {
        Ok(()) => debug!(
            %peer,
            status = response.status().as_u16(),
            size = bytes.len(),
            "response sent"
        ),
        Err(err) => warn!(%peer, error = %err, "failed to write response"),
    }

    match writer.shutdown().await {
        Ok(()) => debug!(%peer, "connection closed"),
        Err(err) => debug!(%peer, error = %err, "failed to shut down connection"),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
