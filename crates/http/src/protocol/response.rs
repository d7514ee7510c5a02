use crate::protocol::{header, HeaderMap};

/// Which section of a response has been written last.
///
/// Sections must be written in order: status line, headers, body, and for chunked
/// bodies that declared one, the trailer. `Trailer` means the chunked terminator is out
/// and the declared trailer block is still owed.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriterState {
    #[default]
    Init,
    StatusLine,
    Headers,
    Body,
    Trailer,
    Done,
}

/// Headers of a complete plain text response carrying `content_length` body bytes.
///
/// Callers override or add entries before handing the map to the writer.
pub fn default_headers(content_length: usize) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(4);
    headers.insert(header::CONTENT_TYPE, "text/plain");
    headers.insert(header::CONTENT_LENGTH, content_length.to_string());
    headers.insert(header::CONNECTION, "close");
    headers
}
