//! HTTP connection handling module
//!
//! This module moves bytes between a transport and the [`codec`](crate::codec) state
//! machines.
//!
//! # Components
//!
//! - [`ReadBuffer`]: growable staging buffer for bytes read but not yet parsed
//! - [`read_request`]: reads until one request is fully parsed
//! - [`ResponseWriter`]: writes response sections in order to a sink
//! - [`StreamingRelay`]: copies an upstream body as chunks and appends a SHA-256 trailer
//! - [`HttpConnection`]: runs one request through a [`Handler`](crate::handler::Handler)
//!   and turns parse failures into `400` responses

mod http_connection;
mod read_buffer;
mod relay;
mod request_reader;
mod response_writer;

pub use http_connection::HttpConnection;
pub use read_buffer::{ReadBuffer, DEFAULT_READ_BUFFER_CAPACITY};
pub use relay::{RelaySummary, StreamingRelay, DEFAULT_RELAY_BLOCK_SIZE};
pub use request_reader::{read_request, read_request_with_buffer};
pub use response_writer::ResponseWriter;
