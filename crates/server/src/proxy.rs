//! Forwards `/httpbin/*` requests to the upstream and relays the answer as a chunked
//! body with a SHA-256 trailer.

use std::io::Cursor;

use anyhow::{bail, Context};
use httpfromtcp::connection::{ReadBuffer, ResponseWriter, StreamingRelay};
use httpfromtcp::handler::HandlerError;
use httpfromtcp::protocol::{header, HeaderMap, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Proxy {
    upstream: String,
    relay: StreamingRelay,
    read_buffer_capacity: usize,
}

impl Proxy {
    pub fn new<S: Into<String>>(upstream: S, relay: StreamingRelay, read_buffer_capacity: usize) -> Self {
        Self { upstream: upstream.into(), relay, read_buffer_capacity }
    }

    /// Fetches `path` from the upstream and streams it to `writer`.
    ///
    /// Fails with `500` if the upstream can't be reached or answers with something that
    /// is not an HTTP response; nothing has been written downstream at that point.
    pub async fn forward<W>(&self, path: &str, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin,
    {
        let path = if path.is_empty() { "/" } else { path };

        let (status, mut body) = self.open(path).await.map_err(|e| {
            warn!(upstream = %self.upstream, path, cause = %e, "upstream request failed");
            HandlerError::internal("Internal Server Error")
        })?;

        writer.write_status_line(status).await?;
        writer.write_headers(&StreamingRelay::declared_headers()).await?;

        let summary = self.relay.relay(&mut body, writer).await.map_err(|e| HandlerError::internal(e.to_string()))?;
        info!(path, status = status.as_u16(), length = summary.length, digest = %summary.digest, "proxied upstream response");
        Ok(())
    }

    /// Sends the upstream request and reads its status line and header block.
    ///
    /// Returns the upstream status and the body: the bytes already buffered past the
    /// header block followed by the rest of the connection. The head is only inspected
    /// for logging, so it is read leniently: empty values are kept and lines without a
    /// colon are skipped.
    async fn open(&self, path: &str) -> anyhow::Result<(StatusCode, impl AsyncRead + Unpin)> {
        let mut stream = TcpStream::connect(&self.upstream).await.with_context(|| format!("connect to {}", self.upstream))?;

        let host = self.upstream.rsplit_once(':').map_or(self.upstream.as_str(), |(host, _)| host);
        let request = format!("GET {path} HTTP/1.0\r\nHost: {host}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await?;
        debug!(upstream = %self.upstream, path, "sent upstream request");

        let mut buffer = ReadBuffer::with_capacity(self.read_buffer_capacity);
        let head_len = loop {
            if let Some(end) = buffer.filled().windows(4).position(|window| window == b"\r\n\r\n") {
                break end;
            }
            if buffer.fill(&mut stream).await? == 0 {
                bail!("upstream closed before the end of its response head");
            }
        };

        let (status, headers) = parse_head(&buffer.filled()[..head_len])?;
        buffer.consume(head_len + 4);

        debug!(status = status.as_u16(), ?headers, "upstream response head");
        if headers.contains_key(header::TRANSFER_ENCODING) {
            warn!(path, "upstream sent a transfer-encoded body, relaying it as is");
        }

        Ok((status, Cursor::new(buffer.into_inner()).chain(stream)))
    }
}

/// Splits a response head (without its blank line) into the status and the fields.
fn parse_head(head: &[u8]) -> anyhow::Result<(StatusCode, HeaderMap)> {
    let head = std::str::from_utf8(head).context("response head is not utf-8")?;
    let mut lines = head.split("\r\n");
    let status = parse_status_line(lines.next().unwrap_or_default())?;

    let mut headers = HeaderMap::new();
    for line in lines {
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => headers.append(name.trim(), value.trim()),
            _ => debug!(line, "skipping malformed upstream header line"),
        }
    }
    Ok((status, headers))
}

/// `HTTP/<version> <code> <reason>`
fn parse_status_line(line: &str) -> anyhow::Result<StatusCode> {
    let mut parts = line.splitn(3, ' ');

    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        bail!("invalid status line {line:?}");
    }

    let code = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .with_context(|| format!("invalid status code in {line:?}"))?;
    Ok(StatusCode::from_u16(code))
}
