use std::io;
use thiserror::Error;

use crate::protocol::{ParseState, WriterState};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("upstream read error: {source}")]
    UpstreamError { source: io::Error },
}

impl HttpError {
    pub fn upstream<E: Into<io::Error>>(e: E) -> Self {
        Self::UpstreamError { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    /// `consumed` is the length of the offending line including its CRLF.
    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String, consumed: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("body length exceeds content-length, declared: {declared} received: {received}")]
    BodyOverrun { declared: u64, received: u64 },

    #[error("stream ended before the request was complete, state: {state:?} unparsed bytes: {buffered}")]
    Truncated { state: ParseState, buffered: usize },

    #[error("request already complete, no further parsing permitted")]
    AlreadyComplete,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn invalid_request_line<S: ToString>(str: S, consumed: usize) -> Self {
        Self::InvalidRequestLine { reason: str.to_string(), consumed }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn body_overrun(declared: u64, received: u64) -> Self {
        Self::BodyOverrun { declared, received }
    }

    pub fn truncated(state: ParseState, buffered: usize) -> Self {
        Self::Truncated { state, buffered }
    }

    /// The peer closed the stream without sending a single byte.
    pub fn is_closed_before_request(&self) -> bool {
        matches!(self, Self::Truncated { state: ParseState::Init, buffered: 0 })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("can't {operation} while response writer is in state {state:?}")]
    OutOfOrder { operation: &'static str, state: WriterState },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn out_of_order(operation: &'static str, state: WriterState) -> Self {
        Self::OutOfOrder { operation, state }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}
