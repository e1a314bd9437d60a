//! Server configuration limits and timeouts
//!
//! Every limit is a plain struct with a [`Default`] implementation, so a
//! single value can be tuned with struct-update syntax.
//!
//! # Examples
//!
//! ```no_run
//! use retro_http::{limits::{ConnLimits, ReqLimits, ServerLimits}, EchoHandler, Server};
//! use tokio::net::TcpListener;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8008").await.unwrap())
//!         .handler(EchoHandler)
//!         .server_limits(ServerLimits {
//!             max_connections: 500,
//!             ..ServerLimits::default()
//!         })
//!         .connection_limits(ConnLimits {
//!             socket_read_timeout: Duration::from_secs(5),
//!             ..ConnLimits::default()
//!         })
//!         .request_limits(ReqLimits {
//!             request_line_size: 4096,
//!             ..ReqLimits::default()
//!         })
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

use std::time::Duration;

/// Controls server-level concurrency, queueing and overload behavior.
///
/// # Connection management
/// ```text
///                            [------------]
///                            [ Tcp accept ]
///                            [------------]
///                                  ||
///                                  || TCP_STREAM
///                                  \/
/// [--------------]   Yes   /----------------\   No   [-------------]
/// [ Add to queue ] <====== | Queue has room? | ====> [ Sending 503 ]
/// [--------------]         \----------------/        [-------------]
///        ||
///        \==================\\          //====================\
///                            V          V                    ||
/// [---------]   Yes   /--------------------------\   No   [------]
/// [ Worker  ] <====== | Is there a free worker?  | =====> [ Wait ]
/// [---------]         \--------------------------/        [------]
/// ```
///
/// A worker is a long-running task created once by
/// [`ServerBuilder::build`](crate::ServerBuilder::build). It serves one
/// connection at a time: request line, headers, handler, response, close.
#[derive(Debug, Clone)]
pub struct ServerLimits {
    /// Number of worker tasks, i.e. connections served at once (default: `100`).
    pub max_connections: usize,

    /// Accepted connections allowed to wait for a worker (default: `250`).
    ///
    /// When the queue is full, new connections are answered with
    /// [`503`](crate::StatusCode::ServiceUnavailable).
    pub max_pending_connections: usize,

    /// How idle workers wait for the next connection (default: `Sleep(50µs)`).
    pub wait_strategy: WaitStrategy,

    /// Tasks answering overflow connections with `503` (default: `1`).
    ///
    /// Set to 0 to close overflow connections silently.
    pub count_503_handlers: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_connections: 100,
            max_pending_connections: 250,
            wait_strategy: WaitStrategy::Sleep(Duration::from_micros(50)),
            count_503_handlers: 1,

            _priv: (),
        }
    }
}

/// Strategy for worker tasks waiting on an empty queue
#[derive(Debug, Clone)]
pub enum WaitStrategy {
    /// While waiting, uses [`tokio::task::yield_now()`]
    ///
    /// # Note
    /// Keeps a CPU core busy even when there is no traffic.
    Yield,

    /// While waiting, uses [`tokio::time::sleep()`]
    Sleep(Duration),
}

/// Per-connection timeouts
#[derive(Debug, Clone)]
pub struct ConnLimits {
    /// Maximum wait for the request line or the header block (default: `2 seconds`)
    ///
    /// A client that stays silent longer is treated as gone: the
    /// connection is closed without an answer.
    pub socket_read_timeout: Duration,

    /// Maximum duration of writing the response (default: `3 seconds`)
    pub socket_write_timeout: Duration,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            socket_read_timeout: Duration::from_secs(2),
            socket_write_timeout: Duration::from_secs(3),

            _priv: (),
        }
    }
}

/// Size limits applied while parsing a request
///
/// Both limits include the line terminators. Exceeding one is answered
/// with `400 BadRequest`.
#[derive(Debug, Clone, Copy)]
pub struct ReqLimits {
    /// Maximum length of the request line (default: `1024`)
    pub request_line_size: usize,

    /// Maximum length of the header block, blank line included (default: `8 KiB`)
    pub header_block_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            request_line_size: 1024,
            header_block_size: 8 * 1024,

            _priv: (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let server = ServerLimits::default();
        assert_eq!(server.max_connections, 100);
        assert_eq!(server.max_pending_connections, 250);
        assert_eq!(server.count_503_handlers, 1);
        assert!(matches!(
            server.wait_strategy,
            WaitStrategy::Sleep(time) if time == Duration::from_micros(50)
        ));

        let conn = ConnLimits::default();
        assert_eq!(conn.socket_read_timeout, Duration::from_secs(2));
        assert_eq!(conn.socket_write_timeout, Duration::from_secs(3));

        let req = ReqLimits::default();
        assert_eq!(req.request_line_size, 1024);
        assert_eq!(req.header_block_size, 8192);
    }
}
