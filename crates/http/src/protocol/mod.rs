//! Core HTTP protocol types.
//!
//! This module holds the data the codec and connection layers pass around:
//!
//! - **Headers**: [`HeaderMap`], the case-insensitive, duplicate-merging
//!   field collection, together with the restartable header block parser
//! - **Request**: [`Request`], [`RequestLine`] and the parser's
//!   [`ParseState`]
//! - **Response**: [`StatusCode`], the writer's [`WriterState`] and the
//!   default plain text header set
//! - **Messages**: [`Message`], the response sections fed to the encoder,
//!   [`PayloadItem`] and the body framing [`PayloadSize`]
//! - **Errors**: [`HttpError`], [`ParseError`] and [`SendError`]
//!
//! Well-known field names live in [`header`].

pub mod header;

mod header_map;
pub use header_map::HeaderMap;
pub(crate) use header_map::find_crlf;

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::default_headers;
pub use response::WriterState;

mod status;
pub use status::StatusCode;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
