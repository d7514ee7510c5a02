//! Chunked relay of an upstream body with a SHA-256 trailer.

use bytes::BytesMut;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, trace};

use crate::connection::ResponseWriter;
use crate::protocol::{default_headers, header, HeaderMap, HttpError};

/// Default number of bytes read from upstream per chunk.
pub const DEFAULT_RELAY_BLOCK_SIZE: usize = 1024;

/// What a finished relay sent downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    /// Lowercase hex SHA-256 of the relayed bytes.
    pub digest: String,
    pub length: u64,
}

/// Streams an upstream body to a [`ResponseWriter`] as chunks, then appends a trailer
/// with the body's SHA-256 and length.
#[derive(Debug, Clone, Copy)]
pub struct StreamingRelay {
    block_size: usize,
}

impl StreamingRelay {
    pub fn new() -> Self {
        Self::with_block_size(DEFAULT_RELAY_BLOCK_SIZE)
    }

    /// `block_size` is raised to one byte if zero is passed.
    pub fn with_block_size(block_size: usize) -> Self {
        Self { block_size: block_size.max(1) }
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Headers a relayed response has to be written with: the default set without
    /// `Content-Length`, declaring chunked transfer encoding and the trailer fields.
    pub fn declared_headers() -> HeaderMap {
        let mut headers = default_headers(0);
        headers.remove(header::CONTENT_LENGTH);
        headers.insert(header::TRANSFER_ENCODING, "chunked");
        headers.insert(header::TRAILER, "X-Content-SHA256, X-Content-Length");
        headers
    }

    /// Copies `upstream` to `writer` until end of stream.
    ///
    /// The status line and [`StreamingRelay::declared_headers`] must already be written.
    /// Each non-empty read goes out as one chunk, then the terminator and the trailer.
    ///
    /// # Errors
    ///
    /// [`HttpError::UpstreamError`] if reading `upstream` fails, or
    /// [`HttpError::ResponseError`] if writing fails. Either way no trailer is written.
    pub async fn relay<R, W>(&self, upstream: &mut R, writer: &mut ResponseWriter<W>) -> Result<RelaySummary, HttpError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut hasher = Sha256::new();
        let mut length = 0u64;
        let mut block = BytesMut::with_capacity(self.block_size);

        loop {
            block.clear();
            let read = (&mut *upstream).take(self.block_size as u64).read_buf(&mut block).await.map_err(HttpError::upstream)?;
            if read == 0 {
                break;
            }

            trace!(read, "relaying upstream block");
            hasher.update(&block);
            length += read as u64;
            writer.write_chunk(&block).await?;
        }

        writer.write_chunked_terminator().await?;

        let digest = hex::encode(hasher.finalize());
        let mut trailer = HeaderMap::with_capacity(2);
        trailer.insert(header::X_CONTENT_SHA256, digest.as_str());
        trailer.insert(header::X_CONTENT_LENGTH, length.to_string());
        writer.write_trailer(&trailer).await?;

        debug!(length, %digest, "relay finished");
        Ok(RelaySummary { digest, length })
    }
}

impl Default for StreamingRelay {
    fn default() -> Self {
        Self::new()
    }
}
