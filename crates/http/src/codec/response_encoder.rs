//! HTTP response encoder module
//!
//! [`ResponseEncoder`] serializes the sections of one response and enforces the order
//! they go out in: status line, headers, body, and for chunked bodies that declared
//! one, the trailer. Every [`Message`] arriving out of order is rejected with
//! [`SendError::OutOfOrder`] before anything is written for it.

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::{error, trace};

use crate::codec::body::PayloadEncoder;
use crate::codec::header::{payload_size, HeaderEncoder};
use crate::protocol::{Message, PayloadSize, SendError, WriterState};

#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
    trailer: bool,
    state: WriterState,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Checks that a body write of the given shape is allowed right now.
    ///
    /// Plain body writes need a body that is not chunked and chunk writes need one that is.
    ///
    /// # Errors
    ///
    /// [`SendError::OutOfOrder`] before the headers or after the body finished,
    /// [`SendError::InvalidBody`] if the declared framing does not match `chunked`.
    pub fn expect_body(&self, operation: &'static str, chunked: bool) -> Result<(), SendError> {
        match (&self.payload_encoder, self.state) {
            (Some(encoder), WriterState::Headers | WriterState::Body) => {
                if encoder.is_chunked() == chunked {
                    Ok(())
                } else if chunked {
                    Err(SendError::invalid_body(format!("can't {operation}, headers did not declare chunked transfer encoding")))
                } else {
                    Err(SendError::invalid_body(format!("can't {operation}, headers declared chunked transfer encoding")))
                }
            }
            (_, state) => Err(SendError::out_of_order(operation, state)),
        }
    }

    fn expect_state(&self, operation: &'static str, expected: WriterState) -> Result<(), SendError> {
        if self.state == expected {
            Ok(())
        } else {
            error!(operation, state = ?self.state, "response section written out of order");
            Err(SendError::out_of_order(operation, self.state))
        }
    }
}

impl Encoder<Message<'_>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<'_>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::StatusLine(status) => {
                self.expect_state("write status line", WriterState::Init)?;
                self.header_encoder.encode(status, dst)?;
                self.state = WriterState::StatusLine;
            }

            Message::Headers(headers) => {
                self.expect_state("write headers", WriterState::StatusLine)?;
                let payload_size = payload_size(headers)?;
                self.header_encoder.encode(headers, dst)?;

                trace!(?payload_size, "response body framing");
                self.trailer = matches!(payload_size, PayloadSize::Chunked { trailer: true });
                self.payload_encoder = Some(payload_size.into());
                self.state = WriterState::Headers;
            }

            Message::Payload(payload_item) => {
                let operation = if payload_item.is_eof() { "finish body" } else { "write body" };
                if !matches!(self.state, WriterState::Headers | WriterState::Body) {
                    error!(operation, state = ?self.state, "response section written out of order");
                    return Err(SendError::out_of_order(operation, self.state));
                }
                let Some(encoder) = &mut self.payload_encoder else {
                    return Err(SendError::out_of_order(operation, self.state));
                };

                encoder.encode(payload_item, dst)?;

                self.state = match (encoder.is_finish(), self.trailer) {
                    (false, _) => WriterState::Body,
                    (true, true) => WriterState::Trailer,
                    (true, false) => WriterState::Done,
                };
            }

            Message::Trailer(fields) => {
                self.expect_state("write trailer", WriterState::Trailer)?;
                self.header_encoder.encode(fields, dst)?;
                self.state = WriterState::Done;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HeaderMap, PayloadItem, StatusCode};

    #[test]
    fn chunked_response_with_trailer() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let headers: HeaderMap = [("Transfer-Encoding", "chunked"), ("Trailer", "X-Checksum")].into_iter().collect();
        let trailer: HeaderMap = [("X-Checksum", "abc")].into_iter().collect();

        encoder.encode(Message::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(Message::Headers(&headers), &mut dst).unwrap();
        encoder.encode(Message::Payload(PayloadItem::Chunk(&b"hello"[..])), &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Body);
        encoder.encode(Message::Payload(PayloadItem::Eof), &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Trailer);
        encoder.encode(Message::Trailer(&trailer), &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Done);

        assert_eq!(
            &dst[..],
            &b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\ntrailer: X-Checksum\r\n\r\n5\r\nhello\r\n0\r\nx-checksum: abc\r\n\r\n"[..]
        );
    }

    #[test]
    fn sections_out_of_order_are_rejected() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers = HeaderMap::new();

        let result = encoder.encode(Message::Headers(&headers), &mut dst);
        assert!(matches!(result, Err(SendError::OutOfOrder { state: WriterState::Init, .. })));

        let result = encoder.encode(Message::Payload(PayloadItem::Chunk(&b"x"[..])), &mut dst);
        assert!(matches!(result, Err(SendError::OutOfOrder { state: WriterState::Init, .. })));

        encoder.encode(Message::StatusLine(StatusCode::OK), &mut dst).unwrap();
        let result = encoder.encode(Message::StatusLine(StatusCode::OK), &mut dst);
        assert!(matches!(result, Err(SendError::OutOfOrder { state: WriterState::StatusLine, .. })));

        let result = encoder.encode(Message::Trailer(&headers), &mut dst);
        assert!(matches!(result, Err(SendError::OutOfOrder { state: WriterState::StatusLine, .. })));

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\n");
    }

    #[test]
    fn fixed_length_body_completes_the_response() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();
        let headers: HeaderMap = [("Content-Length", "2")].into_iter().collect();

        encoder.encode(Message::StatusLine(StatusCode::OK), &mut dst).unwrap();
        encoder.encode(Message::Headers(&headers), &mut dst).unwrap();
        assert!(encoder.expect_body("write chunk", true).is_err());
        encoder.expect_body("write body", false).unwrap();

        encoder.encode(Message::Payload(PayloadItem::Chunk(&b"ok"[..])), &mut dst).unwrap();
        assert_eq!(encoder.state(), WriterState::Done);
        assert!(matches!(encoder.expect_body("write body", false), Err(SendError::OutOfOrder { .. })));
    }
}
