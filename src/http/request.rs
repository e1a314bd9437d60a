use crate::{
    errors::ParseError,
    http::{
        headers::{self, Headers},
        types::{Method, Version},
        uri::Uri,
    },
    limits::ReqLimits,
    server::stream::read_until_bounded,
    Response,
};
use std::fmt;
use tokio::io::AsyncBufRead;

/// The unread rest of the connection, handed to the application as is.
pub type BodyReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// A parsed HTTP/0.9 or HTTP/1.x request.
///
/// # Input format
///
/// - `SP`: one or more ASCII whitespace characters
/// - `EOL`: `CRLF` or a bare `LF`
///
/// ## First line
/// | Version    | Template                                | Example                      |
/// |------------|-----------------------------------------|------------------------------|
/// | `HTTP/1.x` | `[METHOD] SP [TARGET] SP [PROTOCOL] EOL` | `GET /docs?page=2 HTTP/1.0`  |
/// | `HTTP/0.9` | `[METHOD] SP [TARGET] EOL`               | `GET /docs`                  |
///
/// Where:
/// - `[METHOD]`: one of [`Method`], case-sensitive;
///   HTTP/0.9 only allows `GET`
/// - `[TARGET]`: see [`Uri::decompose`]; HTTP/0.9 requires a leading `/`
/// - `[PROTOCOL]`: `HTTP/<major>.<minor>`, at least `1.0`
///
/// ## Headers
/// HTTP/1.x only: `[NAME]: [VALUE] EOL` lines up to an empty line, with
/// obsolete folding (see [`headers::fold`]). HTTP/0.9 requests have no
/// headers.
///
/// ## Body
/// Not interpreted: everything after the header block is left in
/// [`body`](Request::body).
pub struct Request {
    method: Method,
    target: Uri,
    protocol: String,
    version: Version,
    headers: Headers,
    body: BodyReader,
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("protocol", &self.protocol)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

// Public API
impl Request {
    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.method
    }

    #[inline(always)]
    pub const fn target(&self) -> &Uri {
        &self.target
    }

    /// Returns the protocol token as sent, e.g. `HTTP/1.1`.
    ///
    /// HTTP/0.9 requests report `HTTP/0.9`.
    #[inline(always)]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    #[inline(always)]
    pub const fn version(&self) -> Version {
        self.version
    }

    #[inline(always)]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns a header value with case-insensitive name matching.
    ///
    /// # Examples
    /// ```
    /// # use retro_http::{parse, Parsed, limits::ReqLimits};
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let input: &[u8] = b"GET / HTTP/1.0\r\nUser-Agent: curl\r\n\r\n";
    ///
    /// let Parsed::Ready(request) = parse(input, &ReqLimits::default()).await else {
    ///     panic!("request should parse");
    /// };
    ///
    /// assert_eq!(request.header("user-agent"), Some("curl"));
    /// # }
    /// ```
    #[inline]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the unread rest of the stream.
    #[inline(always)]
    pub fn body(&mut self) -> &mut BodyReader {
        &mut self.body
    }
}

/// Outcome of [`parse`].
#[derive(Debug)]
pub enum Parsed {
    /// A complete request, ready for the handler.
    Ready(Request),
    /// The request was invalid; the response must be sent before closing.
    Rejected(ParseError, Response),
    /// The peer went away; nothing can be sent.
    Aborted(ParseError),
}

struct Head {
    method: Method,
    target: Uri,
    protocol: String,
    version: Version,
    headers: Headers,
}

/// Reads one request from `reader`.
///
/// Consumes the request line and, for HTTP/1.x, the header block. The
/// reader itself becomes the request body.
///
/// A rejected request carries a `400 BadRequest` page explaining the
/// failure. It is shaped for HTTP/0.9 (body only) when the request line
/// had exactly two tokens, and for HTTP/1.0 otherwise.
pub async fn parse<R>(mut reader: R, limits: &ReqLimits) -> Parsed
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    match read_head(&mut reader, limits).await {
        Ok(head) => Parsed::Ready(Request {
            method: head.method,
            target: head.target,
            protocol: head.protocol,
            version: head.version,
            headers: head.headers,
            body: Box::new(reader),
        }),
        Err((err, _)) if !err.is_answerable() => Parsed::Aborted(err),
        Err((err, shape)) => Parsed::Rejected(err, err.to_response(shape)),
    }
}

async fn read_head<R>(reader: &mut R, limits: &ReqLimits) -> Result<Head, (ParseError, Version)>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut line = Vec::with_capacity(128);
    read_until_bounded(reader, b'\n', limits.request_line_size, &mut line)
        .await
        .map_err(|err| (ParseError::from_line_read(err), Version::Http10))?;

    let text = simdutf8::basic::from_utf8(strip_eol(&line))
        .map_err(|_| (ParseError::MalformedRequestLine, Version::Http10))?;
    let tokens: Vec<&str> = text.split_ascii_whitespace().collect();

    let shape = match tokens.len() {
        2 => Version::Http09,
        _ => Version::Http10,
    };
    let fail = |err: ParseError| (err, shape);

    let (raw_method, raw_target, protocol) = match tokens[..] {
        [method, target] => (method, target, None),
        [method, target, protocol] => (method, target, Some(protocol)),
        [] | [_] => return Err(fail(ParseError::MalformedRequestLine)),
        _ => return Err(fail(ParseError::TooManyTokens)),
    };

    let method =
        Method::from_bytes(raw_method.as_bytes()).ok_or(fail(ParseError::UnsupportedMethod))?;
    let target = Uri::decompose(raw_target.as_bytes());

    let Some(protocol) = protocol else {
        if method != Method::Get {
            return Err(fail(ParseError::UnsupportedMethod));
        }
        if !raw_target.starts_with('/') {
            return Err(fail(ParseError::MalformedRequestLine));
        }

        return Ok(Head {
            method,
            target,
            protocol: Version::HTTP_09.to_owned(),
            version: Version::Http09,
            headers: Headers::new(),
        });
    };

    match Version::numbers(protocol) {
        Some(numbers) if numbers >= (1, 0) => {}
        _ => return Err(fail(ParseError::UnknownProtocol)),
    }

    let block = read_header_block(reader, limits.header_block_size)
        .await
        .map_err(fail)?;

    Ok(Head {
        method,
        target,
        protocol: protocol.to_owned(),
        version: Version::of(protocol),
        headers: headers::fold(&block).map_err(fail)?,
    })
}

/// Reads header lines up to the empty line; the returned block excludes it.
async fn read_header_block<R>(reader: &mut R, limit: usize) -> Result<Vec<u8>, ParseError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut block = Vec::with_capacity(512);

    loop {
        let start = block.len();
        read_until_bounded(reader, b'\n', limit - start, &mut block)
            .await
            .map_err(ParseError::from_header_read)?;

        if strip_eol(&block[start..]).is_empty() {
            block.truncate(start);
            return Ok(block);
        }
    }
}

#[inline]
fn strip_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
