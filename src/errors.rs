use crate::{
    http::types::{StatusCode, Version},
    server::stream::StreamError,
    Response,
};
use thiserror::Error;

/// Reasons a request could not be parsed.
///
/// Every variant except [`ParseError::ConnectionBroken`] is answered on the
/// same connection with a `400 BadRequest` page whose explanation is the
/// variant's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("request line too long")]
    RequestLineTooLong,
    #[error("request headers too long")]
    HeadersTooLong,
    #[error("connection broken")]
    ConnectionBroken,
    #[error("request headers are not valid text")]
    HeaderDecode,
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("too many tokens in request line")]
    TooManyTokens,
    #[error("unsupported method")]
    UnsupportedMethod,
    #[error("unknown protocol")]
    UnknownProtocol,
}

impl ParseError {
    /// Returns `false` when the peer is already gone and nothing may be sent.
    #[inline]
    pub const fn is_answerable(&self) -> bool {
        !matches!(self, ParseError::ConnectionBroken)
    }

    /// Builds the ready-to-send error page for this failure.
    ///
    /// `version` decides the response shape: a legacy client gets the page
    /// body only.
    #[inline]
    pub fn to_response(&self, version: Version) -> Response {
        let protocol = match version {
            Version::Http09 => Version::HTTP_09,
            Version::Http10 => Version::HTTP_10,
        };

        Response::error(protocol, StatusCode::BadRequest, Some(&self.to_string()))
    }

    pub(crate) fn from_line_read(err: StreamError) -> Self {
        match err {
            StreamError::LimitExceeded => ParseError::RequestLineTooLong,
            StreamError::ConnectionBroken | StreamError::Io(_) => ParseError::ConnectionBroken,
        }
    }

    pub(crate) fn from_header_read(err: StreamError) -> Self {
        match err {
            StreamError::LimitExceeded => ParseError::HeadersTooLong,
            StreamError::ConnectionBroken | StreamError::Io(_) => ParseError::ConnectionBroken,
        }
    }
}
