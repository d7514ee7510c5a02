//! HTTP codec module for decoding requests and encoding responses
//!
//! Both directions are state machines that work on in-memory buffers and never touch
//! I/O themselves, which is left to the [`connection`](crate::connection) layer.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: the incremental request parser
//!   - Header blocks are parsed by [`HeaderMap::parse`](crate::protocol::HeaderMap::parse)
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: serializes response sections in order
//!   - Status line and fields via the `header` module
//!   - Fixed length and chunked bodies via the `body` module
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use httpfromtcp::codec::{RequestDecoder, ResponseEncoder};
//! use httpfromtcp::protocol::{default_headers, Message, PayloadItem, StatusCode};
//! use tokio_util::codec::{Decoder, Encoder};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from(&b"GET /hello HTTP/1.1\r\n\r\n"[..]);
//! let request = decoder.decode(&mut request_buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/hello");
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! let headers = default_headers(2);
//! encoder.encode(Message::StatusLine(StatusCode::OK), &mut response_buffer).unwrap();
//! encoder.encode(Message::Headers(&headers), &mut response_buffer).unwrap();
//! encoder.encode(Message::Payload(PayloadItem::Chunk(&b"hi"[..])), &mut response_buffer).unwrap();
//! assert!(response_buffer.ends_with(b"\r\n\r\nhi"));
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use header::payload_size;
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;
