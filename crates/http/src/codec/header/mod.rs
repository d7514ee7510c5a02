//! HTTP header encoding for responses
//!
//! - [`HeaderEncoder`]: serializes status lines and header (or trailer) fields
//! - [`payload_size`]: reads the body framing a header block declares
//!
//! Request headers are parsed by [`crate::protocol::HeaderMap::parse`].

mod header_encoder;

pub use header_encoder::payload_size;
pub use header_encoder::HeaderEncoder;
