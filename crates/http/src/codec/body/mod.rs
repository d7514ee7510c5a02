//! HTTP body encoding for responses
//!
//! - [`ChunkedEncoder`](chunked_encoder::ChunkedEncoder): chunked transfer encoding,
//!   including the last chunk that precedes an optional trailer
//! - [`LengthEncoder`](length_encoder::LengthEncoder): verbatim bytes held to the
//!   declared `Content-Length`
//! - [`PayloadEncoder`]: picks one of the above from the [`PayloadSize`](crate::protocol::PayloadSize)
//!   the header block declared
//!
//! Request bodies are only ever `Content-Length` framed and are collected by the request
//! decoder itself.

mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use payload_encoder::PayloadEncoder;
