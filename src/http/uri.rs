//! Request target decomposition: path, query parameters and, for absolute
//! targets, the authority.

use crate::http::types::{slice_to_usize, to_lower_case};
use indexmap::IndexMap;
use memchr::memchr;
use std::borrow::Cow;
use url::form_urlencoded;

/// Query parameters in arrival order; a repeated key keeps its first
/// position and takes the last value.
pub type QueryParams = IndexMap<String, String>;

/// `host[:port]` of an absolute `http://` target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority {
    pub host: String,
    pub port: u16,
}

impl Authority {
    /// Port used when an absolute target does not name one.
    pub const DEFAULT_PORT: u16 = 80;
}

/// A decomposed request target.
///
/// # Components
///
/// - **Path**: always starts with `/`, lowercased, percent-unescaped
///   (e.g., `/api/users/123`)
/// - **Query**: `key=value` pairs split on `&`, unescaped, case preserved
/// - **Authority**: only for `http://host[:port]/path` targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    path: String,
    query: QueryParams,
    authority: Option<Authority>,
}

impl Default for Uri {
    fn default() -> Self {
        Self {
            path: String::from("/"),
            query: QueryParams::new(),
            authority: None,
        }
    }
}

impl Uri {
    /// Splits a raw request target into its components.
    ///
    /// Never fails: malformed escapes are kept literally, segments without
    /// `=` are skipped and an empty path becomes `/`.
    ///
    /// # Examples
    /// ```
    /// use retro_http::Uri;
    ///
    /// let uri = Uri::decompose(b"/Docs/A%20B?x=1&y=hello+world&flag&x=2");
    ///
    /// assert_eq!(uri.path(), "/docs/a b");
    /// assert_eq!(uri.query("x"), Some("2"));
    /// assert_eq!(uri.query("y"), Some("hello world"));
    /// assert_eq!(uri.query("flag"), None);
    /// ```
    pub fn decompose(raw: &[u8]) -> Uri {
        let (raw_path, raw_query) = match memchr(b'?', raw) {
            Some(pos) => (&raw[..pos], &raw[pos + 1..]),
            None => (raw, &b""[..]),
        };

        let mut lowered = raw_path.to_vec();
        to_lower_case(&mut lowered);

        let (authority, path) = match lowered.strip_prefix(b"http://") {
            Some(rest) => {
                let (authority, path) = Self::split_authority(rest);
                (Some(authority), path)
            }
            None => (None, lowered.as_slice()),
        };

        Uri {
            path: Self::normalize_path(percent_decode(path, false)),
            query: Self::parse_query(raw_query),
            authority,
        }
    }

    fn split_authority(rest: &[u8]) -> (Authority, &[u8]) {
        let slash = memchr(b'/', rest).unwrap_or(rest.len());
        let (net_addr, path) = rest.split_at(slash);

        let (host, port) = match memchr(b':', net_addr) {
            Some(colon) => {
                let port = slice_to_usize(&net_addr[colon + 1..])
                    .and_then(|port| u16::try_from(port).ok())
                    .unwrap_or(Authority::DEFAULT_PORT);
                (&net_addr[..colon], port)
            }
            None => (net_addr, Authority::DEFAULT_PORT),
        };

        let authority = Authority {
            host: String::from_utf8_lossy(&percent_decode(host, false)).into_owned(),
            port,
        };

        (authority, path)
    }

    fn normalize_path(decoded: Vec<u8>) -> String {
        let path = String::from_utf8_lossy(&decoded);

        match path.starts_with('/') {
            true => path.into_owned(),
            false => format!("/{path}"),
        }
    }

    fn parse_query(raw: &[u8]) -> QueryParams {
        let mut query = QueryParams::new();

        for segment in raw.split(|&byte| byte == b'&') {
            if memchr(b'=', segment).is_none() {
                continue;
            }

            // One segment holds one pair, split on its first `=`
            if let Some((key, value)) = form_urlencoded::parse(segment).next() {
                query.insert(key.into_owned(), value.into_owned());
            }
        }

        query
    }
}

// Public API
impl Uri {
    /// Returns the unescaped path, e.g. `/api/users/123`.
    #[inline(always)]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the value for the specified query parameter key.
    ///
    /// Lookup is case-sensitive.
    #[inline(always)]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns all query parameters in arrival order.
    #[inline(always)]
    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// Returns the authority of an absolute target.
    #[inline(always)]
    pub fn authority(&self) -> Option<&Authority> {
        self.authority.as_ref()
    }
}

/// Undoes `%XX` escapes.
///
/// Escapes that are not followed by two hex digits are copied literally.
/// With `plus_as_space`, `+` decodes to a space (form encoding).
pub fn percent_decode(src: &[u8], plus_as_space: bool) -> Vec<u8> {
    let src = match plus_as_space && memchr(b'+', src).is_some() {
        true => Cow::Owned(
            src.iter()
                .map(|&byte| if byte == b'+' { b' ' } else { byte })
                .collect(),
        ),
        false => Cow::Borrowed(src),
    };

    percent_encoding::percent_decode(&src).collect()
}
