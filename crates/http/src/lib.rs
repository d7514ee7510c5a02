//! HTTP/1.1 from raw TCP
//!
//! This crate parses HTTP/1.1 requests incrementally from any async byte stream and
//! writes responses section by section, built directly on tokio I/O with no HTTP
//! library underneath.
//!
//! # Features
//!
//! - Resumable request parsing: request line, header block, `Content-Length` body
//! - Case-insensitive header map that merges repeated fields
//! - Ordered response writing with fixed length or chunked bodies and trailers
//! - Chunked relay of an upstream body with a SHA-256 trailer
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use tokio::io::AsyncWrite;
//! use httpfromtcp::connection::{HttpConnection, ResponseWriter};
//! use httpfromtcp::handler::{Handler, HandlerError};
//! use httpfromtcp::protocol::{default_headers, Request, StatusCode};
//!
//! struct HelloWorld;
//!
//! #[async_trait]
//! impl<W> Handler<W> for HelloWorld
//! where
//!     W: AsyncWrite + Unpin + Send,
//! {
//!     async fn call(&self, request: Request, writer: &mut ResponseWriter<W>) -> Result<(), HandlerError> {
//!         let body = format!("Hello from {}!", request.target());
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&default_headers(body.len())).await?;
//!         writer.write_body(body.as_bytes()).await?;
//!         Ok(())
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! // any AsyncRead/AsyncWrite pair works, e.g. the halves of a `TcpStream`
//! let request: &[u8] = b"GET /tcp HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";
//! let mut response = Vec::new();
//!
//! HttpConnection::new(request, &mut response).process(Arc::new(HelloWorld)).await.unwrap();
//! assert!(response.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! assert!(response.ends_with(b"Hello from /tcp!"));
//! # });
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: header map, request and response types, errors
//! - [`codec`]: the request parser and response framer as buffer-level state machines
//! - [`connection`]: async I/O around the codecs, the relay and [`connection::HttpConnection`]
//! - [`handler`]: the [`handler::Handler`] trait and [`handler::HandlerError`]
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: top-level error type
//! - [`protocol::ParseError`]: request parsing errors
//! - [`protocol::SendError`]: response writing errors
//!
//! # Limitations
//!
//! - One request per connection, every response closes it
//! - Request bodies need `Content-Length`; chunked request bodies are not decoded

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
