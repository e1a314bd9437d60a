//! HTTP response construction and serialization.

use crate::http::{
    date,
    types::{StatusCode, Version},
};
use indexmap::IndexMap;
use std::fmt;

/// Product identifier sent in every `Server` header and error page.
pub const SERVER_NAME: &str = concat!("retro_http/", env!("CARGO_PKG_VERSION"));

/// Response headers in insertion order.
pub type ResponseHeaders = IndexMap<String, HeaderValue>;

/// Empty extra-header set for [`Response::build`] and [`Response::html`].
pub const NO_HEADERS: [(&str, &str); 0] = [];

/// A response header value: text or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderValue {
    Text(String),
    Int(u64),
}

impl HeaderValue {
    #[inline]
    fn write_to(&self, buffer: &mut Vec<u8>) {
        match self {
            HeaderValue::Text(text) => buffer.extend_from_slice(text.as_bytes()),
            HeaderValue::Int(n) => {
                let (arr, start) = number_to_bytes(*n);
                buffer.extend_from_slice(&arr[start..]);
            }
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(text) => f.write_str(text),
            HeaderValue::Int(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Text(value.to_owned())
    }
}
impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Text(value)
    }
}
impl From<u64> for HeaderValue {
    fn from(value: u64) -> Self {
        HeaderValue::Int(value)
    }
}
impl From<usize> for HeaderValue {
    fn from(value: usize) -> Self {
        HeaderValue::Int(value as u64)
    }
}

/// A fully built HTTP response.
///
/// Built once through [`build`](Response::build), [`html`](Response::html)
/// or [`error`](Response::error) and never modified afterwards: the `Date`
/// header is captured at build time, so serializing the same response twice
/// yields identical bytes.
///
/// # Wire format
/// | Protocol   | Output                                                             |
/// |------------|--------------------------------------------------------------------|
/// | `HTTP/0.9` | body bytes only                                                    |
/// | other      | `PROTOCOL SP CODE SP REASON[ - EXPLANATION] CRLF`, headers, `CRLF`, body |
///
/// The protocol written on the status line is capped at `HTTP/1.0`.
///
/// # Examples
/// ```
/// use retro_http::{Response, StatusCode};
///
/// let resp = Response::html("HTTP/1.1", StatusCode::Ok, None, [("X-Id", 7u64)], "<h1>Hi</h1>");
/// let bytes = resp.serialize();
///
/// assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\nDate: "));
/// assert!(bytes.ends_with(b"X-Id: 7\r\n\r\n<h1>Hi</h1>"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    protocol: String,
    status: StatusCode,
    explanation: Option<String>,
    headers: ResponseHeaders,
    body: Vec<u8>,
}

impl Response {
    /// Builds a response with the default `Date` and `Server` headers.
    ///
    /// `extra_headers` are applied after the defaults, in order; a repeated
    /// name overrides the earlier value.
    pub fn build<P, I, K, V, B>(
        protocol: P,
        status: StatusCode,
        explanation: Option<&str>,
        extra_headers: I,
        body: B,
    ) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderValue>,
        B: Into<Vec<u8>>,
    {
        let mut headers = ResponseHeaders::new();
        headers.insert("Date".to_owned(), HeaderValue::Text(date::now()));
        headers.insert("Server".to_owned(), HeaderValue::from(SERVER_NAME));

        for (name, value) in extra_headers {
            headers.insert(name.into(), value.into());
        }

        Self {
            protocol: protocol.into(),
            status,
            explanation: explanation.map(str::to_owned),
            headers,
            body: body.into(),
        }
    }

    /// Builds a response with an HTML text body.
    ///
    /// Adds `Content-Type: text/html` and `Content-Length` before the
    /// caller's headers.
    pub fn html<P, I, K, V>(
        protocol: P,
        status: StatusCode,
        explanation: Option<&str>,
        extra_headers: I,
        text: &str,
    ) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderValue>,
    {
        let content = [
            ("Content-Type".to_owned(), HeaderValue::from("text/html")),
            ("Content-Length".to_owned(), HeaderValue::from(text.len())),
        ];
        let extra = extra_headers
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()));

        Self::build(
            protocol,
            status,
            explanation,
            content.into_iter().chain(extra),
            text,
        )
    }

    /// Builds the self-describing HTML error page for `status`.
    pub fn error<P: Into<String>>(protocol: P, status: StatusCode, explanation: Option<&str>) -> Self {
        Self::html(
            protocol,
            status,
            explanation,
            NO_HEADERS,
            &page(status, explanation),
        )
    }

    /// Drops the body but keeps every header, `Content-Length` included.
    ///
    /// Used to answer `HEAD` requests.
    #[inline]
    pub fn without_body(mut self) -> Self {
        self.body.clear();
        self
    }
}

// Public API
impl Response {
    #[inline(always)]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    #[inline(always)]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[inline(always)]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[inline(always)]
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Returns a header value with case-insensitive name matching.
    #[inline]
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    #[inline(always)]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response into a new buffer.
    #[inline]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(256 + self.body.len());
        self.write_to(&mut buffer);
        buffer
    }

    /// Appends the wire form of the response to `buffer`.
    pub fn write_to(&self, buffer: &mut Vec<u8>) {
        if Version::of(&self.protocol) == Version::Http09 {
            buffer.extend_from_slice(&self.body);
            return;
        }

        buffer.extend_from_slice(Version::capped(&self.protocol).as_bytes());
        buffer.push(b' ');
        let (arr, start) = number_to_bytes(self.status.as_u16() as u64);
        buffer.extend_from_slice(&arr[start..]);
        buffer.push(b' ');
        buffer.extend_from_slice(self.status.reason().as_bytes());

        if let Some(explanation) = &self.explanation {
            buffer.extend_from_slice(b" - ");
            // The status line must stay a single line
            buffer.extend(
                explanation
                    .bytes()
                    .map(|byte| if matches!(byte, b'\r' | b'\n') { b' ' } else { byte }),
            );
        }
        buffer.extend_from_slice(b"\r\n");

        for (name, value) in &self.headers {
            buffer.extend_from_slice(name.as_bytes());
            buffer.extend_from_slice(b": ");
            value.write_to(buffer);
            buffer.extend_from_slice(b"\r\n");
        }

        buffer.extend_from_slice(b"\r\n");
        buffer.extend_from_slice(&self.body);
    }
}

/// Renders the minimal HTML page used by error responses and [`EchoHandler`].
///
/// Both parts are HTML-escaped.
///
/// [`EchoHandler`]: crate::EchoHandler
pub fn placeholder(title: &str, header: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><h3>{}</h3>{SERVER_NAME}</body></html>",
        escape_html(title),
        escape_html(header),
    )
}

fn page(status: StatusCode, explanation: Option<&str>) -> String {
    let title = format!("{} {}", status.as_u16(), status.reason());
    placeholder(&title, explanation.unwrap_or(status.reason()))
}

fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            c => result.push(c),
        }
    }

    result
}

#[inline]
const fn number_to_bytes(mut n: u64) -> ([u8; 20], usize) {
    let mut buffer = [b'0'; 20];
    let mut i = 20;

    if n == 0 {
        return (buffer, 19);
    }

    while n > 0 {
        i -= 1;
        buffer[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    (buffer, i)
}


#[cfg(test)]
mod serialize_tests {
    use super::*;
    use crate::tools::*;

    fn date_of(resp: &Response) -> String {
        resp.header("Date").unwrap().to_string()
    }

    #[test]
    fn status_line() {
        let resp = Response::build("HTTP/1.0", StatusCode::Ok, None, NO_HEADERS, "");

        assert_eq!(
            str_op(&resp.serialize()),
            format!(
                "HTTP/1.0 200 OK\r\nDate: {}\r\nServer: {SERVER_NAME}\r\n\r\n",
                date_of(&resp)
            )
        );
    }

    #[test]
    fn explanation() {
        #[rustfmt::skip]
        let cases = [
            (StatusCode::BadRequest,          Some("unknown protocol"), "HTTP/1.0 400 BadRequest - unknown protocol\r\n"),
            (StatusCode::NotFound,            None,                     "HTTP/1.0 404 NotFound\r\n"),
            (StatusCode::InternalServerError, Some("a\r\nb"),           "HTTP/1.0 500 InternalServerError - a  b\r\n"),
        ];

        for (status, explanation, line) in cases {
            let resp = Response::build("HTTP/1.0", status, explanation, NO_HEADERS, "");
            assert!(str_op(&resp.serialize()).starts_with(line), "{line}");
        }
    }

    #[test]
    fn downgrade() {
        for token in ["HTTP/1.1", "HTTP/2.0", "HTTP/1.5", "HTTP/9.9", "HTTP/1.00"] {
            let resp = Response::build(token, StatusCode::Ok, None, NO_HEADERS, "");
            assert!(str_op(&resp.serialize()).starts_with("HTTP/1.0 200 OK\r\n"), "{token}");
            assert_eq!(resp.protocol(), token);
        }
    }

    #[test]
    fn legacy_body_only() {
        let resp = Response::html("HTTP/0.9", StatusCode::NotFound, Some("gone"), NO_HEADERS, "<b>x</b>");
        assert_eq!(str_op(&resp.serialize()), "<b>x</b>");
    }

    #[test]
    fn header_order_and_values() {
        let resp = Response::build(
            "HTTP/1.0",
            StatusCode::Created,
            None,
            [("X-Count", HeaderValue::Int(42)), ("X-Name", HeaderValue::from("n"))],
            "body",
        );
        let text = String::from_utf8(resp.serialize()).unwrap();

        assert!(text.starts_with("HTTP/1.0 201 Created\r\nDate: "));
        assert!(text.ends_with("X-Count: 42\r\nX-Name: n\r\n\r\nbody"));
    }

    #[test]
    fn idempotent() {
        let resp = Response::error("HTTP/1.0", StatusCode::BadRequest, Some("bad"));
        assert_eq!(resp.serialize(), resp.serialize());

        let mut appended = b"prefix".to_vec();
        resp.write_to(&mut appended);
        assert_eq!(&appended[6..], resp.serialize().as_slice());
    }
}
