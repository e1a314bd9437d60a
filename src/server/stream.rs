//! Byte-stream boundary consumed by the protocol core.
//!
//! The parser only needs "read until a delimiter, bounded by N bytes" and
//! the connection only needs "write all bytes"; both work over any tokio
//! reader/writer, so tests drive them with in-memory buffers.

use std::{io, time::Duration};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time::timeout,
};

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The peer closed the stream before the delimiter arrived.
    #[error("connection closed before delimiter")]
    ConnectionBroken,
    /// The delimiter did not show up within the byte limit.
    #[error("read limit exceeded")]
    LimitExceeded,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Appends bytes to `buf` up to and including `delimiter`.
///
/// At most `limit` bytes are consumed from `reader`. Returns the number of
/// bytes appended, which always ends with the delimiter.
pub async fn read_until_bounded<R>(
    reader: &mut R,
    delimiter: u8,
    limit: usize,
    buf: &mut Vec<u8>,
) -> Result<usize, StreamError>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let read = (&mut *reader)
        .take(limit as u64)
        .read_until(delimiter, buf)
        .await?;

    if read > 0 && buf.last() == Some(&delimiter) {
        return Ok(read);
    }

    match read >= limit {
        true => Err(StreamError::LimitExceeded),
        false => Err(StreamError::ConnectionBroken),
    }
}

/// Writes the whole buffer and flushes it, giving up after `time`.
pub async fn write_all_bytes<W>(writer: &mut W, bytes: &[u8], time: Duration) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    timeout(time, async {
        writer.write_all(bytes).await?;
        writer.flush().await
    })
    .await
    .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "write timeout"))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::*;

    #[tokio::test]
    async fn reads_through_delimiter() {
        let mut reader: &[u8] = b"GET / HTTP/1.0\r\nHost: x\r\n";
        let mut buf = Vec::new();

        let n = read_until_bounded(&mut reader, b'\n', 64, &mut buf).await.unwrap();
        assert_eq!(n, 16);
        assert_eq!(str_op(&buf), "GET / HTTP/1.0\r\n");
        assert_eq!(reader, b"Host: x\r\n");
    }

    #[tokio::test]
    async fn exact_limit() {
        let mut reader: &[u8] = b"abc\nrest";
        let mut buf = Vec::new();

        assert_eq!(read_until_bounded(&mut reader, b'\n', 4, &mut buf).await.unwrap(), 4);
        assert_eq!(buf, b"abc\n");
    }

    #[tokio::test]
    async fn limit_exceeded() {
        let mut reader: &[u8] = b"abcdef\n";
        let mut buf = Vec::new();

        let result = read_until_bounded(&mut reader, b'\n', 4, &mut buf).await;
        assert!(matches!(result, Err(StreamError::LimitExceeded)));
    }

    #[tokio::test]
    async fn broken() {
        let cases: [&[u8]; 2] = [b"", b"GET /"];

        for input in cases {
            let mut reader = input;
            let mut buf = Vec::new();

            let result = read_until_bounded(&mut reader, b'\n', 64, &mut buf).await;
            assert!(matches!(result, Err(StreamError::ConnectionBroken)));
        }
    }

    #[tokio::test]
    async fn write_all() {
        let mut out = Vec::new();
        write_all_bytes(&mut out, b"hello", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(out, b"hello");
    }
}
