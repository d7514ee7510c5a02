use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::codec::ResponseEncoder;
use crate::protocol::{HeaderMap, Message, PayloadItem, SendError, StatusCode, WriterState};

const INIT_BUFFER_SIZE: usize = 4 * 1024;

/// Writes one response to `writer`, section by section.
///
/// Each call encodes its section into a scratch buffer and writes it out before
/// returning. Sections must come in order (status line, headers, body, then trailer
/// for chunked bodies that declared one); a call out of order fails with
/// [`SendError::OutOfOrder`] and writes nothing.
///
/// # Example
///
/// ```
/// # tokio_test_block_on(async {
/// use httpfromtcp::connection::ResponseWriter;
/// use httpfromtcp::protocol::{default_headers, StatusCode};
///
/// let mut writer = ResponseWriter::new(Vec::new());
/// let body = b"hello";
/// writer.write_status_line(StatusCode::OK).await.unwrap();
/// writer.write_headers(&default_headers(body.len())).await.unwrap();
/// writer.write_body(body).await.unwrap();
///
/// let bytes = writer.into_inner();
/// assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
/// assert!(bytes.ends_with(b"\r\n\r\nhello"));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, INIT_BUFFER_SIZE)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new() }
    }

    #[inline]
    pub fn state(&self) -> WriterState {
        self.encoder.state()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.send(Message::StatusLine(status)).await
    }

    /// Writes the header block. Its `Content-Length`, `Transfer-Encoding` and `Trailer`
    /// fields decide which body writes are accepted afterwards.
    pub async fn write_headers(&mut self, headers: &HeaderMap) -> Result<(), SendError> {
        self.send(Message::Headers(headers)).await
    }

    /// Writes raw body bytes for a response that is not chunked.
    ///
    /// A `Content-Length` body must not receive more than the declared number of bytes;
    /// the response is complete once exactly that many have been written.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<(), SendError> {
        self.encoder.expect_body("write body", false)?;
        self.send(Message::Payload(PayloadItem::Chunk(body))).await
    }

    /// Writes `chunk` as one chunk of a chunked body. An empty slice writes nothing.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), SendError> {
        self.encoder.expect_body("write chunk", true)?;
        self.send(Message::Payload(PayloadItem::Chunk(chunk))).await
    }

    /// Ends a chunked body with the zero length chunk.
    ///
    /// Without a declared trailer this writes `0\r\n\r\n` and completes the response.
    /// With one it writes `0\r\n` and [`ResponseWriter::write_trailer`] has to follow.
    pub async fn write_chunked_terminator(&mut self) -> Result<(), SendError> {
        self.encoder.expect_body("write chunked terminator", true)?;
        self.send(Message::Payload(PayloadItem::Eof)).await
    }

    /// Writes the trailer fields and the blank line ending the response.
    pub async fn write_trailer(&mut self, trailer: &HeaderMap) -> Result<(), SendError> {
        self.send(Message::Trailer(trailer)).await
    }

    /// Shuts down the underlying writer.
    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        Ok(self.writer.shutdown().await?)
    }

    async fn send(&mut self, message: Message<'_>) -> Result<(), SendError> {
        self.buffer.clear();
        self.encoder.encode(message, &mut self.buffer)?;
        self.flush().await
    }

    #[inline]
    async fn flush(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(self.writer.flush().await?)
    }
}
