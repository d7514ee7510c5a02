use std::fmt;

/// An HTTP status code as written on the status line.
///
/// Any three digit code can be written; only 200, 400 and 500 carry a reason phrase,
/// every other code is emitted with an empty one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

const REASON_PHRASES: &[(u16, &str)] = &[(200, "OK"), (400, "Bad Request"), (500, "Internal Server Error")];

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn from_u16(code: u16) -> Self {
        Self(code)
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the fixed reason phrase for this code, or `""` when the code is not known.
    pub fn canonical_reason(&self) -> &'static str {
        REASON_PHRASES.iter().find(|(code, _)| *code == self.0).map_or("", |(_, reason)| reason)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_reasons() {
        assert_eq!(StatusCode::OK.canonical_reason(), "OK");
        assert_eq!(StatusCode::BAD_REQUEST.canonical_reason(), "Bad Request");
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.canonical_reason(), "Internal Server Error");
        assert_eq!(StatusCode::from(999).canonical_reason(), "");
        assert_eq!(StatusCode::from_u16(404).canonical_reason(), "");
    }
}
