//! Request handlers.
//!
//! A [`Handler`] receives the parsed [`Request`] together with the connection's
//! [`ResponseWriter`] and writes the whole response itself. Failing before anything was
//! written lets the connection render the returned [`HandlerError`] instead.

use std::fmt;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::{default_headers, ParseError, Request, SendError, StatusCode};

#[async_trait]
pub trait Handler<W>: Send + Sync
where
    W: AsyncWrite + Unpin + Send,
{
    async fn call(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError>;
}

/// A status code and message to answer with when handling fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    status_code: StatusCode,
    message: String,
}

impl HandlerError {
    pub fn new<S: Into<String>>(status_code: StatusCode, message: S) -> Self {
        Self { status_code, message: message.into() }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[inline]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Writes a complete plain text response: status line, default headers, message.
    pub async fn write_to<W>(&self, writer: &mut ResponseWriter<W>) -> Result<(), SendError>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_status_line(self.status_code).await?;
        writer.write_headers(&default_headers(self.message.len())).await?;
        writer.write_body(self.message.as_bytes()).await
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status_code, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<&ParseError> for HandlerError {
    fn from(e: &ParseError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<SendError> for HandlerError {
    fn from(e: SendError) -> Self {
        Self::internal(e.to_string())
    }
}
