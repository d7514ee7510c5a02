use bytes::Buf;

use crate::protocol::{HeaderMap, StatusCode};

/// One section of an outgoing response, in the order it goes on the wire.
///
/// The response encoder accepts these one at a time and rejects any that arrive out of
/// order.
#[derive(Debug)]
pub enum Message<'a> {
    /// `HTTP/1.1 <code> <reason>`
    StatusLine(StatusCode),
    /// The header block, also deciding how the body is framed
    Headers(&'a HeaderMap),
    /// Body bytes or the end of the body
    Payload(PayloadItem<&'a [u8]>),
    /// Trailer fields after a chunked body that declared them
    Trailer(&'a HeaderMap),
}

/// Represents an item in the HTTP message payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }
}

/// How a response body is delimited, as declared by its headers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// `Content-Length` framed body of exactly this many bytes
    Length(u64),
    /// `Transfer-Encoding: chunked`, with or without a declared trailer
    Chunked { trailer: bool },
    /// No framing header, the body runs until the connection closes
    UntilClose,
}

impl PayloadSize {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked { .. })
    }
}
