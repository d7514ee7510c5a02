use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info, warn};

use crate::connection::{read_request_with_buffer, ReadBuffer, ResponseWriter};
use crate::handler::{Handler, HandlerError};
use crate::protocol::{HttpError, WriterState};

/// One HTTP connection serving a single request.
///
/// `HttpConnection` reads one request, hands it to a [`Handler`] along with the
/// connection's [`ResponseWriter`] and shuts the write side down afterwards. Every
/// response carries `Connection: close`, so there is no keep-alive loop.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    reader: R,
    read_buffer: ReadBuffer,
    writer: ResponseWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_read_buffer(reader, writer, ReadBuffer::new())
    }

    pub fn with_read_buffer(reader: R, writer: W, read_buffer: ReadBuffer) -> Self {
        Self { reader, read_buffer, writer: ResponseWriter::new(writer) }
    }

    /// Serves one request with `handler`.
    ///
    /// A peer that closes without sending anything is not an error. A malformed or
    /// truncated request is answered with `400 Bad Request` and returned as an error.
    /// A handler error is rendered as a response only while nothing has been written.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<W> + ?Sized,
    {
        let result = self.serve(handler.as_ref()).await;
        if let Err(e) = self.writer.shutdown().await {
            warn!(cause = %e, "failed to shut down connection");
        }
        result
    }

    async fn serve<H>(&mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler<W> + ?Sized,
    {
        let request = match read_request_with_buffer(&mut self.reader, &mut self.read_buffer).await {
            Ok(request) => request,
            Err(e) if e.is_closed_before_request() => {
                info!("peer closed before sending a request");
                return Ok(());
            }
            Err(e) => {
                error!(cause = %e, "can't parse request");
                HandlerError::from(&e).write_to(&mut self.writer).await?;
                return Err(e.into());
            }
        };

        info!(method = request.method(), target = request.target(), "received request");

        match handler.call(request, &mut self.writer).await {
            Ok(()) if self.writer.state() != WriterState::Done => {
                warn!(state = ?self.writer.state(), "handler returned before the response was complete");
            }
            Ok(()) => {}
            Err(e) if self.writer.state() == WriterState::Init => {
                warn!(status = %e.status_code(), message = e.message(), "handler failed, rendering error response");
                e.write_to(&mut self.writer).await?;
            }
            Err(e) => {
                error!(state = ?self.writer.state(), cause = %e, "handler failed after response was started");
            }
        }

        Ok(())
    }
}
