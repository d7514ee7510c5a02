use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::length_encoder::LengthEncoder;
use crate::protocol::{PayloadItem, PayloadSize, SendError};

/// encode payload for response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// content-length payload
    Length(LengthEncoder),

    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// no framing header, bytes pass through until the connection closes
    UntilClose { eof: bool },
}

impl PayloadEncoder {
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Length(encoder) => encoder.is_finish(),
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::UntilClose { eof } => *eof,
        }
    }
}

impl From<PayloadSize> for PayloadEncoder {
    fn from(payload_size: PayloadSize) -> Self {
        let kind = match payload_size {
            PayloadSize::Length(size) => Kind::Length(LengthEncoder::new(size)),
            PayloadSize::Chunked { trailer } => Kind::Chunked(ChunkedEncoder::new(trailer)),
            PayloadSize::UntilClose => Kind::UntilClose { eof: false },
        };
        Self { kind }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Length(encoder) => encoder.encode(item, dst),
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::UntilClose { eof } => {
                match item {
                    PayloadItem::Chunk(bytes) => dst.extend_from_slice(bytes.chunk()),
                    PayloadItem::Eof => *eof = true,
                }
                Ok(())
            }
        }
    }
}
