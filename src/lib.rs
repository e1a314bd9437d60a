//! retro_http - HTTP/0.9 and HTTP/1.0 protocol layer with a small TCP server
//!
//! Parses a request from a byte stream, hands it to a [`Handler`] and writes
//! back the serialized [`Response`]. One request per connection, no
//! keep-alive.
//!
//! # Protocol Support
//!
//! - **HTTP/0.9**: `GET /path` requests, answered with the raw body only
//! - **HTTP/1.0**: request line with protocol token, folded headers,
//!   status line and response headers
//! - **Newer clients**: parsed like HTTP/1.0; responses never claim more
//!   than `HTTP/1.0`
//!
//! # Examples
//!
//! Quick start:
//! ```no_run
//! use retro_http::{Handler, Request, Response, Server, StatusCode, NO_HEADERS};
//! use tokio::net::TcpListener;
//!
//! struct MyHandler;
//!
//! impl Handler for MyHandler {
//!     async fn handle(&self, req: &mut Request) -> Response {
//!         Response::html(req.protocol(), StatusCode::Ok, None, NO_HEADERS, "Hello World!")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8008").await.unwrap())
//!         .handler(MyHandler)
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```
//! Parsing without a server:
//! ```
//! use retro_http::{limits::ReqLimits, parse, Method, Parsed};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let input: &[u8] = b"GET /search?q=rust+lang HTTP/1.0\r\nHost: example.com\r\n\r\n";
//!
//! match parse(input, &ReqLimits::default()).await {
//!     Parsed::Ready(req) => {
//!         assert_eq!(req.method(), Method::Get);
//!         assert_eq!(req.target().query("q"), Some("rust lang"));
//!         assert_eq!(req.header("host"), Some("example.com"));
//!     }
//!     Parsed::Rejected(err, _) | Parsed::Aborted(err) => panic!("{err}"),
//! }
//! # }
//! ```

pub(crate) mod http {
    pub mod date;
    pub mod headers;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod types;
    pub mod uri;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
    pub mod stream;
}
pub(crate) mod errors;
pub mod limits;

pub use crate::{
    errors::ParseError,
    http::{
        date, headers,
        headers::Headers,
        request::{parse, BodyReader, Parsed, Request},
        response::{placeholder, HeaderValue, Response, ResponseHeaders, NO_HEADERS, SERVER_NAME},
        types::{Method, StatusCode, Version},
        uri::{self, Authority, QueryParams, Uri},
    },
    server::{
        server_impl::{EchoHandler, Handler, Server, ServerBuilder},
        stream::{self, StreamError},
    },
};

#[cfg(test)]
pub mod tools {
    use std::{borrow::Cow, str::from_utf8};

    #[inline]
    pub fn str_op(value: &[u8]) -> &str {
        from_utf8(value).unwrap()
    }

    #[inline]
    pub fn lossy(value: &[u8]) -> Cow<'_, str> {
        String::from_utf8_lossy(value)
    }
}
