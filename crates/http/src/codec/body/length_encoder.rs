use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// Copies body bytes verbatim while holding them to the declared `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(bytes) => {
                let size = bytes.remaining() as u64;
                if size > self.length {
                    return Err(SendError::invalid_body(format!("body exceeds content-length by {} bytes", size - self.length)));
                }
                dst.extend_from_slice(bytes.chunk());
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof if self.length == 0 => Ok(()),
            PayloadItem::Eof => Err(SendError::invalid_body(format!("body ended {} bytes short of content-length", self.length))),
        }
    }
}
