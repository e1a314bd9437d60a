#![allow(rustdoc::bare_urls)]

//! Core HTTP protocol types: methods, protocol versions and status codes

// TO LOWER CASE

#[rustfmt::skip]
const ASCII_TABLE: [u8; 256] = [
    //   x0    x1    x2    x3    x4    x5    x6    x7    x8    x9    xA    xB    xC    xD    xE    xF
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, // 0x
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, // 1x
    0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2A, 0x2B, 0x2C, 0x2D, 0x2E, 0x2F, // 2x
    0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x3B, 0x3C, 0x3D, 0x3E, 0x3F, // 3x
    0x40, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', b'i', b'j', b'k', b'l', b'm', b'n', b'o', // 4x
    b'p', b'q', b'r', b's', b't', b'u', b'v', b'w', b'x', b'y', b'z', 0x5B, 0x5C, 0x5D, 0x5E, 0x5F, // 5x
    0x60, b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', b'i', b'j', b'k', b'l', b'm', b'n', b'o', // 6x
    b'p', b'q', b'r', b's', b't', b'u', b'v', b'w', b'x', b'y', b'z', 0x7B, 0x7C, 0x7D, 0x7E, 0x7F, // 7x
    0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x8D, 0x8E, 0x8F, // 8x
    0x90, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x9D, 0x9E, 0x9F, // 9x
    0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6, 0xA7, 0xA8, 0xA9, 0xAA, 0xAB, 0xAC, 0xAD, 0xAE, 0xAF, // Ax
    0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7, 0xB8, 0xB9, 0xBA, 0xBB, 0xBC, 0xBD, 0xBE, 0xBF, // Bx
    0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7, 0xC8, 0xC9, 0xCA, 0xCB, 0xCC, 0xCD, 0xCE, 0xCF, // Cx
    0xD0, 0xD1, 0xD2, 0xD3, 0xD4, 0xD5, 0xD6, 0xD7, 0xD8, 0xD9, 0xDA, 0xDB, 0xDC, 0xDD, 0xDE, 0xDF, // Dx
    0xE0, 0xE1, 0xE2, 0xE3, 0xE4, 0xE5, 0xE6, 0xE7, 0xE8, 0xE9, 0xEA, 0xEB, 0xEC, 0xED, 0xEE, 0xEF, // Ex
    0xF0, 0xF1, 0xF2, 0xF3, 0xF4, 0xF5, 0xF6, 0xF7, 0xF8, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0xFE, 0xFF, // Fx
];

#[inline(always)]
pub(crate) fn to_lower_case(src: &mut [u8]) {
    for byte in src.iter_mut() {
        *byte = ASCII_TABLE[*byte as usize];
    }
}

#[inline(always)]
pub(crate) fn slice_to_usize(bytes: &[u8]) -> Option<usize> {
    if bytes.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return None;
        }

        result = result
            .checked_mul(10)?
            .checked_add((byte - b'0') as usize)?;
    }

    Some(result)
}

// METHOD

/// HTTP request methods understood by the server.
///
/// The set is closed: anything else on the request line is rejected with
/// `400 BadRequest`.
///
/// # References
///
/// - [RFC 1945, Section 5.1.1](https://datatracker.ietf.org/doc/html/rfc1945#section-5.1.1)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method - retrieve the resource identified by the target
    /// [[RFC1945, Section 8.1](https://datatracker.ietf.org/doc/html/rfc1945#section-8.1)]
    Get,
    /// HEAD method - same as GET but without response body
    /// [[RFC1945, Section 8.2](https://datatracker.ietf.org/doc/html/rfc1945#section-8.2)]
    Head,
    /// POST method - hand the enclosed entity to the target resource
    /// [[RFC1945, Section 8.3](https://datatracker.ietf.org/doc/html/rfc1945#section-8.3)]
    Post,
}

impl Method {
    /// All recognised methods.
    pub const ALL: [Method; 3] = [Method::Get, Method::Head, Method::Post];

    /// Resolves a request-line token. Matching is case-sensitive.
    #[inline]
    pub fn from_bytes(src: &[u8]) -> Option<Self> {
        match src {
            b"GET" => Some(Method::Get),
            b"HEAD" => Some(Method::Head),
            b"POST" => Some(Method::Post),
            _ => None,
        }
    }

    /// Returns the wire name of the method.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }
}

// VERSION

/// HTTP protocol generation of a request or response
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Version {
    /// HTTP/0.9 - The original protocol (1991)
    ///
    /// Minimalist format: `GET /path\r\n` with raw response body.
    ///
    /// [Original specification](https://www.w3.org/Protocols/HTTP/AsImplemented.html)
    Http09,

    /// HTTP/1.0 - Added headers and status codes (1996)
    ///
    /// [RFC 1945](https://tools.ietf.org/html/rfc1945)
    Http10,
}

impl Version {
    /// Protocol token of the legacy generation.
    pub const HTTP_09: &'static str = "HTTP/0.9";
    /// Highest protocol token the server ever advertises.
    pub const HTTP_10: &'static str = "HTTP/1.0";

    /// Splits `HTTP/<major>.<minor>` into its numbers.
    #[inline]
    pub fn numbers(token: &str) -> Option<(usize, usize)> {
        let rest = token.strip_prefix("HTTP/")?;
        let (major, minor) = rest.split_once('.')?;

        Some((
            slice_to_usize(major.as_bytes())?,
            slice_to_usize(minor.as_bytes())?,
        ))
    }

    /// Classifies a protocol token.
    ///
    /// `HTTP/0.9` is the legacy generation, every other token is treated as
    /// a header-capable one.
    #[inline]
    pub fn of(token: &str) -> Self {
        match token == Self::HTTP_09 {
            true => Version::Http09,
            false => Version::Http10,
        }
    }

    /// Returns the token a response may carry on its status line.
    ///
    /// A server implementing HTTP/1.0 never claims a newer generation,
    /// whatever the client asked for. Any 1.x or later token, padded
    /// spellings like `HTTP/1.00` included, comes back as [`HTTP_10`](Self::HTTP_10).
    pub fn capped(token: &str) -> &str {
        let newer = match Self::numbers(token) {
            Some(numbers) => numbers >= (1, 0),
            None => token > Self::HTTP_10,
        };

        match newer {
            true => Self::HTTP_10,
            false => token,
        }
    }
}

// STATUS_CODE

macro_rules! set_status_codes {
    ($(
        $(#[$docs:meta])+
        $name:ident = ($num:literal, $str:literal);
    )+) => {
        /// HTTP status codes
        ///
        /// Each code carries a canonical short reason name that is written on
        /// the status line (`HTTP/1.0 404 NotFound`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode { $(
            #[doc = concat!(stringify!($num), " ", $str)]
            $(#[$docs])+
            $name = $num,
        )+ }

        impl StatusCode {
            /// Every registered status, in ascending code order.
            pub const ALL: &'static [StatusCode] = &[$(StatusCode::$name,)+];

            /// Returns the reason name (e.g., `"NotFound"`).
            #[inline]
            pub const fn reason(&self) -> &'static str {
                match self { $(
                    StatusCode::$name => $str,
                )+ }
            }

            /// Looks a status up by its numeric code.
            #[inline]
            pub const fn from_u16(code: u16) -> Option<StatusCode> {
                match code { $(
                    $num => Some(StatusCode::$name),
                )+
                    _ => None,
                }
            }
        }
    }
}

impl StatusCode {
    /// Returns the numeric code.
    #[inline(always)]
    pub const fn as_u16(&self) -> u16 {
        *self as u16
    }
}

set_status_codes! {
    /// [[RFC1945, Section 9.2](https://datatracker.ietf.org/doc/html/rfc1945#section-9.2)]
    Ok = (200, "OK");
    /// [[RFC1945, Section 9.2](https://datatracker.ietf.org/doc/html/rfc1945#section-9.2)]
    Created = (201, "Created");
    /// [[RFC1945, Section 9.2](https://datatracker.ietf.org/doc/html/rfc1945#section-9.2)]
    Accepted = (202, "Accepted");
    /// [[RFC1945, Section 9.2](https://datatracker.ietf.org/doc/html/rfc1945#section-9.2)]
    NoContent = (204, "NoContent");

    /// [[RFC1945, Section 9.3](https://datatracker.ietf.org/doc/html/rfc1945#section-9.3)]
    MovedPermanently = (301, "MovedPermanently");
    /// [[RFC1945, Section 9.3](https://datatracker.ietf.org/doc/html/rfc1945#section-9.3)]
    Found = (302, "Found");
    /// [[RFC1945, Section 9.3](https://datatracker.ietf.org/doc/html/rfc1945#section-9.3)]
    NotModified = (304, "NotModified");

    /// [[RFC1945, Section 9.4](https://datatracker.ietf.org/doc/html/rfc1945#section-9.4)]
    BadRequest = (400, "BadRequest");
    /// [[RFC1945, Section 9.4](https://datatracker.ietf.org/doc/html/rfc1945#section-9.4)]
    Unauthorized = (401, "Unauthorized");
    /// [[RFC1945, Section 9.4](https://datatracker.ietf.org/doc/html/rfc1945#section-9.4)]
    Forbidden = (403, "Forbidden");
    /// [[RFC1945, Section 9.4](https://datatracker.ietf.org/doc/html/rfc1945#section-9.4)]
    NotFound = (404, "NotFound");

    /// [[RFC1945, Section 9.5](https://datatracker.ietf.org/doc/html/rfc1945#section-9.5)]
    InternalServerError = (500, "InternalServerError");
    /// [[RFC1945, Section 9.5](https://datatracker.ietf.org/doc/html/rfc1945#section-9.5)]
    NotImplemented = (501, "NotImplemented");
    /// [[RFC1945, Section 9.5](https://datatracker.ietf.org/doc/html/rfc1945#section-9.5)]
    BadGateway = (502, "BadGateway");
    /// [[RFC1945, Section 9.5](https://datatracker.ietf.org/doc/html/rfc1945#section-9.5)]
    ServiceUnavailable = (503, "ServiceUnavailable");
}
