//! Request header block folding.

use crate::errors::ParseError;
use indexmap::IndexMap;
use memchr::{memchr, memchr_iter};

/// Request headers in arrival order. Names are kept verbatim; a repeated
/// name keeps its first position and takes the last value.
pub type Headers = IndexMap<String, String>;

/// Turns a raw header block into an ordered name → value mapping.
///
/// `block` holds the lines between the request line and the blank line
/// that ends the headers, without that blank line. Line breaks may be
/// `CRLF` or a bare `LF`.
///
/// Obsolete line folding is resolved first: a line break followed by a
/// space or tab continues the previous value, joined by a single space.
/// Each line is then split on its first `:`; leading whitespace of the
/// value is dropped. Lines without `:` carry no header and are ignored.
///
/// # Errors
/// [`ParseError::HeaderDecode`] if the block is not valid UTF-8.
pub fn fold(block: &[u8]) -> Result<Headers, ParseError> {
    let text = simdutf8::basic::from_utf8(block).map_err(|_| ParseError::HeaderDecode)?;
    let unfolded = unfold(text);

    let mut headers = Headers::new();
    for line in unfolded.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);

        let Some(colon) = memchr(b':', line.as_bytes()) else {
            continue;
        };

        let value = line[colon + 1..].trim_start_matches([' ', '\t']);
        headers.insert(line[..colon].to_owned(), value.to_owned());
    }

    Ok(headers)
}

fn unfold(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut result = String::with_capacity(text.len());
    let mut start = 0;

    for lf in memchr_iter(b'\n', bytes) {
        if lf < start || !matches!(bytes.get(lf + 1), Some(b' ' | b'\t')) {
            continue;
        }

        let line_end = match lf > start && bytes[lf - 1] == b'\r' {
            true => lf - 1,
            false => lf,
        };

        result.push_str(&text[start..line_end]);
        result.push(' ');
        start = lf + 2;
    }

    result.push_str(&text[start..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(headers: &Headers) -> Vec<(&str, &str)> {
        headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn basic() {
        let headers = fold(b"Host: example.com\r\nUser-Agent:  curl/8.0\r\nAccept:*/*").unwrap();

        assert_eq!(
            pairs(&headers),
            [
                ("Host", "example.com"),
                ("User-Agent", "curl/8.0"),
                ("Accept", "*/*"),
            ]
        );
    }

    #[test]
    fn folding() {
        #[rustfmt::skip]
        let cases: [(&[u8], &str); 5] = [
            (b"Key: Val\r\n ue",          "Val ue"),
            (b"Key: Val\r\n\tue",         "Val ue"),
            (b"Key: Val\n ue",            "Val ue"),
            (b"Key: a\r\n b\r\n c",       "a b c"),
            (b"Key:\r\n value",           "value"),
        ];

        for (block, expected) in cases {
            let headers = fold(block).unwrap();
            assert_eq!(headers.get("Key").map(String::as_str), Some(expected));
            assert_eq!(headers.len(), 1);
        }

        assert_eq!(fold(b"Key: Val\r\n ue").unwrap(), fold(b"Key: Val ue").unwrap());
    }

    #[test]
    fn duplicates() {
        let headers = fold(b"A: 1\r\nB: 2\r\nA: 3").unwrap();
        assert_eq!(pairs(&headers), [("A", "3"), ("B", "2")]);
    }

    #[test]
    fn verbatim_keys_and_values() {
        let headers = fold(b"X-Token: AbC: dEf  \r\nhost: x").unwrap();

        assert_eq!(headers.get("X-Token").map(String::as_str), Some("AbC: dEf  "));
        assert_eq!(headers.get("host").map(String::as_str), Some("x"));
        assert_eq!(headers.get("Host"), None);
    }

    #[test]
    fn lines_without_colon() {
        let headers = fold(b"garbage\r\n\r\nKey: v").unwrap();
        assert_eq!(pairs(&headers), [("Key", "v")]);
    }

    #[test]
    fn empty() {
        assert!(fold(b"").unwrap().is_empty());
    }

    #[test]
    fn decode_error() {
        assert_eq!(fold(b"Key: \xFF\xFE"), Err(ParseError::HeaderDecode));
    }
}
