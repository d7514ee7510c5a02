//! HTTP request decoder module
//!
//! This module holds the request parser: a forward-only state machine that reads the
//! request line, then the header block, then an optional `Content-Length` body.
//!
//! # States
//!
//! - `Init`: waiting for a complete request line
//! - `ParsingHeaders`: waiting for the blank line that ends the header block
//! - `ParsingBody`: collecting exactly `Content-Length` body bytes
//! - `Done`: the request is complete, further input is rejected
//!
//! Every step either consumes a whole syntactic unit or nothing at all, so the parser
//! can be re-run against the same unconsumed prefix once more bytes have arrived,
//! no matter how the transport split them.
//!
//! # Example
//!
//! ```
//! use httpfromtcp::codec::RequestDecoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let consumed = decoder.parse(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
//!
//! assert_eq!(consumed, 35);
//! assert!(decoder.is_done());
//! assert_eq!(decoder.request().headers().get("host"), Some("localhost"));
//! ```

use std::mem;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::ensure;
use crate::protocol::{find_crlf, ParseError, ParseState, Request, RequestLine};

const CRLF_LEN: usize = 2;

const VERSION_PREFIX: &str = "HTTP/";

/// Incremental parser for a single HTTP/1.1 request.
///
/// [`RequestDecoder::parse`] drives the state machine over a byte slice and reports how
/// many bytes it consumed; the caller drops those from its buffer. The decoder also
/// implements [`Decoder`] so it can sit inside a [`tokio_util::codec::FramedRead`],
/// yielding the finished [`Request`] once.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    request: Request,
    content_length: Option<u64>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` in the `Init` state
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.request.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.request.is_done()
    }

    /// The request as parsed so far.
    #[inline]
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_request(self) -> Request {
        self.request
    }

    /// Runs the state machine over `data` until it needs more input or the request is done.
    ///
    /// # Returns
    ///
    /// The total number of bytes consumed from the front of `data`. Zero means nothing
    /// could be parsed yet and the caller has to supply more bytes.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] aborts the message. Calling this after the request is done fails
    /// with [`ParseError::BodyOverrun`] when `data` holds bytes beyond a declared
    /// `Content-Length`, and with [`ParseError::AlreadyComplete`] otherwise.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.is_done() {
            self.reject_trailing(data)?;
            return Err(ParseError::AlreadyComplete);
        }

        let mut consumed = 0;
        while !self.is_done() {
            let state = self.state();
            let parsed = self.parse_single(&data[consumed..])?;
            consumed += parsed;

            // a zero length body completes without consuming anything
            if parsed == 0 && self.state() == state {
                break;
            }
        }

        trace!(consumed, buffered = data.len(), state = ?self.state(), "parsed request bytes");
        Ok(consumed)
    }

    /// Fails if `data` is non-empty and would extend a `Content-Length` framed body
    /// that is already complete. Only meaningful once the request is done.
    fn reject_trailing(&self, data: &[u8]) -> Result<(), ParseError> {
        if let Some(declared) = self.content_length {
            if !data.is_empty() {
                return Err(ParseError::body_overrun(declared, declared + data.len() as u64));
            }
        }
        Ok(())
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.request.state {
            ParseState::Init => {
                let Some((request_line, consumed)) = parse_request_line(data)? else {
                    return Ok(0);
                };

                debug!(method = request_line.method(), target = request_line.target(), version = request_line.version(), "parsed request line");
                self.request.request_line = request_line;
                self.request.state = ParseState::ParsingHeaders;
                Ok(consumed)
            }

            ParseState::ParsingHeaders => {
                let (consumed, done) = self.request.headers.parse(data)?;
                if !done {
                    return Ok(0);
                }

                self.request.state = if self.request.content_length().is_some() { ParseState::ParsingBody } else { ParseState::Done };
                debug!(header_count = self.request.headers.len(), next = ?self.request.state, "parsed request headers");
                Ok(consumed + CRLF_LEN)
            }

            ParseState::ParsingBody => {
                let declared = match self.content_length {
                    Some(length) => length,
                    None => {
                        let length = parse_content_length(self.request.content_length().unwrap_or_default())?;
                        self.content_length = Some(length);
                        length
                    }
                };

                let received = self.request.body.len() as u64;
                let Some(remaining) = declared.checked_sub(received) else {
                    return Err(ParseError::body_overrun(declared, received));
                };

                let to_append = usize::try_from(remaining).map_or(data.len(), |remaining| remaining.min(data.len()));
                self.request.body.extend_from_slice(&data[..to_append]);

                let received = self.request.body.len() as u64;
                ensure!(received <= declared, ParseError::body_overrun(declared, received));

                if received == declared {
                    debug!(body_size = received, "parsed request body");
                    self.request.state = ParseState::Done;
                }
                Ok(to_append)
            }

            ParseState::Done => Err(ParseError::AlreadyComplete),
        }
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode the request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete, its bytes have been split off `src`
    /// - `Ok(None)`: need more data to proceed, or the request was already yielded
    /// - `Err(_)`: the request is malformed
    ///
    /// Bytes following the request are left in `src` when it is yielded and dropped by
    /// the next call; the connection serves a single request.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.is_done() {
            if !src.is_empty() {
                debug!(ignored = src.len(), "ignoring bytes after a complete request");
                src.clear();
            }
            return Ok(None);
        }

        let consumed = self.parse(src)?;
        src.advance(consumed);

        if !self.is_done() {
            return Ok(None);
        }

        // keep a finished shell so later input still hits the `Done` checks
        let finished = Request { state: ParseState::Done, ..Default::default() };
        Ok(Some(mem::replace(&mut self.request, finished)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        if self.is_done() || (self.state() == ParseState::Init && src.is_empty()) {
            return Ok(None);
        }

        Err(ParseError::truncated(self.state(), src.len()))
    }
}

/// Parses the request line at the front of `data`.
///
/// Returns `Ok(None)` when no CRLF has arrived yet, otherwise the line and the number of
/// bytes it spans including the CRLF. Errors carry that same count.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_len) = find_crlf(data) else {
        return Ok(None);
    };
    let consumed = line_len + CRLF_LEN;

    let line = std::str::from_utf8(&data[..line_len])
        .map_err(|e| ParseError::invalid_request_line(format!("request line is not utf-8: {e}"), consumed))?;

    let mut parts = line.split_ascii_whitespace();
    let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::invalid_request_line(format!("expected method, target and version in {line:?}"), consumed));
    };

    let Some(version) = version.strip_prefix(VERSION_PREFIX).filter(|version| !version.is_empty()) else {
        return Err(ParseError::invalid_request_line(format!("invalid http version {version:?}"), consumed));
    };

    Ok(Some((RequestLine::new(method, target, version), consumed)))
}

fn parse_content_length(value: &str) -> Result<u64, ParseError> {
    value.trim().parse::<u64>().map_err(|_| ParseError::invalid_content_length(format!("value {value:?} is not a non-negative integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn crlf(s: &str) -> String {
        s.replace('\n', "\r\n")
    }

    #[test]
    fn good_get_request_line() {
        let mut decoder = RequestDecoder::new();
        let input = crlf(indoc! {"
            GET / HTTP/1.1
            Host: localhost:42069
            User-Agent: curl/7.81.0
            Accept: */*

        "});

        let consumed = decoder.parse(input.as_bytes()).unwrap();
        let request = decoder.into_request();

        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/");
        assert_eq!(request.request_line().version(), "1.1");
        assert_eq!(request.headers().get("host"), Some("localhost:42069"));
        assert_eq!(request.headers().get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers().get("accept"), Some("*/*"));
        assert_eq!(request.state(), ParseState::Done);
        assert!(request.body().is_empty());
        assert_eq!(consumed, input.trim_end_matches(' ').len());
    }

    #[test]
    fn no_content_length_goes_straight_to_done() {
        let mut decoder = RequestDecoder::new();
        let consumed = decoder.parse(b"GET /x HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(consumed, 19);
        assert!(decoder.is_done());
        assert_eq!(decoder.request().target(), "/x");
        assert!(decoder.request().body().is_empty());
    }

    #[test]
    fn partial_request_line_consumes_nothing() {
        let mut decoder = RequestDecoder::new();
        assert_eq!(decoder.parse(b"GET /coffee HTT").unwrap(), 0);
        assert_eq!(decoder.state(), ParseState::Init);
        assert_eq!(decoder.parse(b"").unwrap(), 0);
    }

    #[test]
    fn steps_resume_with_the_unconsumed_prefix() {
        let mut decoder = RequestDecoder::new();

        assert_eq!(decoder.parse(b"POST /coffee HTTP/1.1\r\nHost: loc").unwrap(), 23);
        assert_eq!(decoder.state(), ParseState::ParsingHeaders);

        assert_eq!(decoder.parse(b"Host: loc").unwrap(), 0);
        assert_eq!(decoder.parse(b"Host: localhost\r\n").unwrap(), 0);
        assert_eq!(decoder.parse(b"Host: localhost\r\n\r\n").unwrap(), 19);
        assert!(decoder.is_done());
        assert_eq!(decoder.request().headers().len(), 1);
    }

    #[test]
    fn invalid_request_lines() {
        let cases: &[&[u8]] = &[
            b"/coffee HTTP/1.1\r\n\r\n",
            b"GET /coffee\r\n\r\n",
            b"GET /coffee HTTP/1.1 extra\r\n\r\n",
            b"GET /coffee HTTPS/1.1\r\n\r\n",
            b"GET /coffee HTTP/\r\n\r\n",
            b"\r\n\r\n",
        ];

        for input in cases {
            let mut decoder = RequestDecoder::new();
            match decoder.parse(input) {
                Err(ParseError::InvalidRequestLine { consumed, .. }) => {
                    assert_eq!(consumed, find_crlf(input).unwrap() + CRLF_LEN, "{input:?}");
                }
                other => panic!("expected invalid request line for {input:?}, got {other:?}"),
            }
            assert_eq!(decoder.state(), ParseState::Init);
        }
    }

    #[test]
    fn invalid_header_aborts_the_request() {
        let mut decoder = RequestDecoder::new();
        let result = decoder.parse(b"GET / HTTP/1.1\r\nHost : localhost\r\n\r\n");

        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
        assert_eq!(decoder.state(), ParseState::ParsingHeaders);
    }

    #[test]
    fn body_across_two_reads() {
        let mut decoder = RequestDecoder::new();
        let head = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\n";

        let mut input = head.to_vec();
        input.extend_from_slice(b"he");
        assert_eq!(decoder.parse(&input).unwrap(), head.len() + 2);
        assert_eq!(decoder.state(), ParseState::ParsingBody);
        assert_eq!(decoder.request().body(), b"he");

        assert_eq!(decoder.parse(b"llo").unwrap(), 3);
        assert!(decoder.is_done());
        assert_eq!(decoder.request().body(), b"hello");

        let result = decoder.parse(b"!");
        assert!(matches!(result, Err(ParseError::BodyOverrun { declared: 5, received: 6 })));
    }

    #[test]
    fn body_leaves_excess_bytes_unconsumed() {
        let mut decoder = RequestDecoder::new();
        let input = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";

        let consumed = decoder.parse(input).unwrap();

        assert_eq!(&input[consumed..], b"def");
        assert_eq!(decoder.request().body(), b"abc");
        assert!(decoder.is_done());
    }

    #[test]
    fn short_body_is_not_done() {
        let mut decoder = RequestDecoder::new();
        decoder.parse(b"POST / HTTP/1.1\r\nContent-Length: 20\r\n\r\npartial content").unwrap();

        assert_eq!(decoder.state(), ParseState::ParsingBody);
        assert_eq!(decoder.request().body(), b"partial content");
    }

    #[test]
    fn zero_content_length_completes_without_more_input() {
        let mut decoder = RequestDecoder::new();
        let input = b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n";

        assert_eq!(decoder.parse(input).unwrap(), input.len());
        assert!(decoder.is_done());
        assert!(decoder.request().body().is_empty());
    }

    #[test]
    fn invalid_content_length() {
        for value in ["abc", "-1", "5, 5"] {
            let mut decoder = RequestDecoder::new();
            let input = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\nhello");
            let result = decoder.parse(input.as_bytes());
            assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })), "{value}");
        }
    }

    #[test]
    fn parsing_after_done_is_rejected() {
        let mut decoder = RequestDecoder::new();
        decoder.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();

        assert!(matches!(decoder.parse(b""), Err(ParseError::AlreadyComplete)));
        assert!(matches!(decoder.parse(b"GET / HTTP/1.1\r\n\r\n"), Err(ParseError::AlreadyComplete)));
    }

    #[test]
    fn decoder_splits_request_off_the_buffer() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"POST /a HTTP/1.1\r\nContent-"[..]);

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"Content-");

        buffer.extend_from_slice(b"Length: 4\r\n\r\nbo");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        buffer.extend_from_slice(b"dy");
        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.body(), b"body");
        assert_eq!(request.target(), "/a");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        buffer.extend_from_slice(b"x");
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn decoder_leaves_bytes_after_a_framed_body() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello!"[..]);

        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.body(), b"hello");
        assert_eq!(&buffer[..], b"!");

        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn decode_eof_reports_truncation() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort"[..]);

        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::Truncated { state: ParseState::ParsingBody, buffered: 0 })));

        let mut decoder = RequestDecoder::new();
        let mut buffer = BytesMut::from(&b"GET / HT"[..]);
        let result = decoder.decode_eof(&mut buffer);
        assert!(matches!(result, Err(ParseError::Truncated { state: ParseState::Init, buffered: 8 })));

        let mut decoder = RequestDecoder::new();
        assert!(decoder.decode_eof(&mut BytesMut::new()).unwrap().is_none());
    }
}
