//! Internal helpers shared by the parser and the encoders.

use bytes::{BufMut, BytesMut};
use std::io;

/// Returns `Err($error)` from the enclosing function unless `$predicate` holds.
///
/// ```ignore
/// ensure!(!name.is_empty(), ParseError::invalid_header("empty field name"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// `io::Write` adapter that appends straight into a `BytesMut`, so `write!` can format
/// into an encoder's destination buffer.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl io::Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
