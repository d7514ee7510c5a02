use bytes::BytesMut;

use crate::protocol::{header, HeaderMap};

/// The first line of a request: `method SP target SP "HTTP/" version`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) version: String,
}

impl RequestLine {
    pub fn new<S: Into<String>>(method: S, target: S, version: S) -> Self {
        Self { method: method.into(), target: target.into(), version: version.into() }
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The version with the `HTTP/` prefix stripped, e.g. `1.1`.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Progress of a [`Request`] through the parser.
///
/// States only move forward: `Init -> ParsingHeaders -> [ParsingBody ->] Done`.
/// `ParsingBody` is skipped when the request carries no `Content-Length`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    #[default]
    Init,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// A request read from a single connection.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub(crate) request_line: RequestLine,
    pub(crate) headers: HeaderMap,
    pub(crate) body: BytesMut,
    pub(crate) state: ParseState,
}

impl Request {
    /// Builds a complete request without parsing, e.g. to drive a handler directly.
    pub fn from_parts(request_line: RequestLine, headers: HeaderMap, body: &[u8]) -> Self {
        Self { request_line, headers, body: BytesMut::from(body), state: ParseState::Done }
    }

    #[inline]
    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    #[inline]
    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    #[inline]
    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// The raw `Content-Length` value, if the request declared a non-empty one.
    pub fn content_length(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_LENGTH).filter(|value| !value.is_empty())
    }
}
