use tokio::io::AsyncRead;
use tracing::{debug, trace};

use crate::codec::RequestDecoder;
use crate::connection::ReadBuffer;
use crate::protocol::{ParseError, Request};

/// Reads and parses one request from `reader`.
///
/// Uses a [`ReadBuffer`] with the default initial capacity, see
/// [`read_request_with_buffer`].
///
/// # Errors
///
/// See [`read_request_with_buffer`].
pub async fn read_request<R>(reader: &mut R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = ReadBuffer::new();
    read_request_with_buffer(reader, &mut buffer).await
}

/// Reads and parses one request from `reader`, staging bytes in `buffer`.
///
/// Each round fills the buffer with whatever the reader yields, runs the parser over
/// the unconsumed bytes and drops what it consumed, until the request is done. Bytes
/// that follow the request stay in `buffer`, whether or not it had a body, so the
/// outcome does not depend on how the reader splits its data.
///
/// # Errors
///
/// - any [`ParseError`] the parser raises for a malformed request
/// - [`ParseError::Truncated`] if the stream ends before the request is complete,
///   with state `Init` and nothing buffered when the peer sent nothing at all
/// - [`ParseError::Io`] if reading fails
pub async fn read_request_with_buffer<R>(reader: &mut R, buffer: &mut ReadBuffer) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = RequestDecoder::new();

    loop {
        // bytes may already be waiting from an earlier read
        if !buffer.is_empty() {
            let consumed = decoder.parse(buffer.filled())?;
            buffer.consume(consumed);

            if decoder.is_done() {
                if !buffer.is_empty() {
                    debug!(ignored = buffer.len(), "bytes left after a complete request");
                }
                return Ok(decoder.into_request());
            }
        }

        let read = buffer.fill(reader).await?;
        if read == 0 {
            debug!(state = ?decoder.state(), buffered = buffer.len(), "stream ended before request was complete");
            return Err(ParseError::truncated(decoder.state(), buffer.len()));
        }
        trace!(read, buffered = buffer.len(), state = ?decoder.state(), "read request bytes");
    }
}
