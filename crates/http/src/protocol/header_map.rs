//! Case-insensitive header collection and the header block parser.
//!
//! Field names are stored lowercase. Inserting a name that is already present
//! through [`HeaderMap::append`] merges the values with `", "` in arrival order,
//! which is also how repeated header lines are folded while parsing.
//!
//! [`HeaderMap::parse`] is restartable: it commits nothing and reports zero
//! consumed bytes until the whole block, blank line included, is available. A
//! caller can therefore feed it a growing prefix of the same input as many
//! times as it likes and get the same answer it would have got from the full
//! input in one go.

use std::fmt;

use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

const CRLF: &[u8] = b"\r\n";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Looks up a field value, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Sets `name` to `value`, returning the value it replaced.
    pub fn insert<V: Into<String>>(&mut self, name: &str, value: V) -> Option<String> {
        let value = value.into();
        match self.position(name) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((name.to_ascii_lowercase(), value));
                None
            }
        }
    }

    /// Adds `value` under `name`, joining it onto an existing value with `", "`.
    pub fn append<V: AsRef<str>>(&mut self, name: &str, value: V) {
        let value = value.as_ref();
        match self.position(name) {
            Some(index) => {
                let existing = &mut self.entries[index].1;
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.entries.push((name.to_ascii_lowercase(), value.to_owned())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Parses a header block from the front of `data`.
    ///
    /// # Returns
    ///
    /// - `Ok((consumed, true))` once the blank line ending the block was found. `consumed`
    ///   covers every header line but not the CRLF of the blank line itself, the caller
    ///   accounts for that one.
    /// - `Ok((0, false))` if the block is not complete yet.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHeader`] as soon as a complete line is malformed: no
    /// colon, whitespace right before the colon, a field name outside the token set, an
    /// empty name or value, or a line that is not UTF-8. Nothing is consumed in that case.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), ParseError> {
        let mut fields = Vec::new();
        let mut offset = 0;

        loop {
            let Some(line_len) = find_crlf(&data[offset..]) else {
                trace!(fields = fields.len(), buffered = data.len(), "header block incomplete");
                return Ok((0, false));
            };

            let line = &data[offset..offset + line_len];
            offset += line_len + CRLF.len();

            if line.is_empty() {
                break;
            }

            fields.push(parse_field(line)?);
        }

        for (name, value) in fields {
            self.append(&name, value);
        }

        Ok((offset - CRLF.len(), true))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = HeaderMap::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}

/// Returns the offset of the first CRLF in `data`.
pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|window| window == CRLF)
}

fn parse_field(line: &[u8]) -> Result<(String, String), ParseError> {
    let line = std::str::from_utf8(line).map_err(|e| ParseError::invalid_header(format!("header line is not utf-8: {e}")))?;

    let Some((raw_name, raw_value)) = line.split_once(':') else {
        return Err(ParseError::invalid_header(format!("missing colon in header line {line:?}")));
    };

    ensure!(
        !raw_name.ends_with(|c: char| c.is_ascii_whitespace()),
        ParseError::invalid_header(format!("whitespace before colon in header line {line:?}"))
    );

    let name = raw_name.trim();
    let value = raw_value.trim();

    ensure!(!name.is_empty(), ParseError::invalid_header(format!("empty field name in header line {line:?}")));
    ensure!(name.bytes().all(is_token_char), ParseError::invalid_header(format!("invalid field name {name:?}")));
    ensure!(!value.is_empty(), ParseError::invalid_header(format!("empty value for field {name:?}")));

    Ok((name.to_ascii_lowercase(), value.to_owned()))
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~')
}
