//! HTTP header encoder implementation for serializing response status lines and fields
//!
//! This module turns a [`StatusCode`] into a status line and a [`HeaderMap`] into
//! `name: value` lines closed by a blank line. Trailers share the field line format,
//! so the same encoder writes them too.
//!
//! It also derives the body framing a header block declares, see [`payload_size`].

use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{header, HeaderMap, PayloadSize, SendError, StatusCode};
use crate::utils::FastWrite;

/// Initial buffer size reserved for a header block
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for the status line and header fields implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<StatusCode> for HeaderEncoder {
    type Error = SendError;

    /// Writes `HTTP/1.1 <code> <reason>\r\n`. Unknown codes get an empty reason.
    fn encode(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), Self::Error> {
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status, status.canonical_reason())?;
        Ok(())
    }
}

impl Encoder<&HeaderMap> for HeaderEncoder {
    type Error = SendError;

    /// Writes one `name: value\r\n` line per field in map order, then the closing `\r\n`.
    fn encode(&mut self, headers: &HeaderMap, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Determines how the body following `headers` is framed.
///
/// A `Transfer-Encoding` whose final coding is `chunked` wins over `Content-Length`. A
/// chunked body announces a trailer when a non-empty `Trailer` field is present.
///
/// # Errors
///
/// Returns [`SendError::InvalidBody`] if `Content-Length` is not a non-negative integer.
pub fn payload_size(headers: &HeaderMap) -> Result<PayloadSize, SendError> {
    if is_chunked(headers.get(header::TRANSFER_ENCODING)) {
        let trailer = headers.get(header::TRAILER).is_some_and(|value| !value.trim().is_empty());
        return Ok(PayloadSize::Chunked { trailer });
    }

    match headers.get(header::CONTENT_LENGTH) {
        Some(value) => {
            let length = value
                .trim()
                .parse::<u64>()
                .map_err(|_| SendError::invalid_body(format!("content-length value {value:?} is not u64")))?;
            Ok(PayloadSize::Length(length))
        }
        None => Ok(PayloadSize::UntilClose),
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&str>) -> bool {
    header_value
        .and_then(|value| value.rsplit(',').next())
        .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
}
