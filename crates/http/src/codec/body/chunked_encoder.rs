use std::io::Write;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};
use crate::utils::FastWrite;

/// Frames a body with chunked transfer encoding.
///
/// Each chunk is written as its lowercase hex length, CRLF, the data and CRLF. `Eof`
/// writes the zero length last chunk. Without a trailer that is the full `0\r\n\r\n`
/// terminator; with a declared trailer only `0\r\n` is written and the trailer block
/// supplies the final blank line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    trailer: bool,
}

impl ChunkedEncoder {
    pub fn new(trailer: bool) -> Self {
        Self { eof: false, trailer }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Err(SendError::invalid_body("chunked body already terminated"));
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                // a zero size chunk would end the body early
                if !bytes.has_remaining() {
                    return Ok(());
                }
                write!(FastWrite(dst), "{:x}\r\n", bytes.remaining())?;
                dst.reserve(bytes.remaining() + 2);
                dst.extend_from_slice(bytes.chunk());
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                if self.trailer {
                    dst.extend_from_slice(b"0\r\n");
                } else {
                    dst.extend_from_slice(b"0\r\n\r\n");
                }
                Ok(())
            }
        }
    }
}
