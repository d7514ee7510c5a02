use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

/// Initial capacity of a [`ReadBuffer`].
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 8;

/// A growable buffer of bytes read from a stream but not yet consumed by the parser.
///
/// The buffer has a logical capacity that doubles whenever a fill finds it full. It
/// never shrinks and never drops bytes except through [`ReadBuffer::consume`].
#[derive(Debug)]
pub struct ReadBuffer {
    buf: BytesMut,
    capacity: usize,
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_READ_BUFFER_CAPACITY)
    }

    /// `capacity` is raised to one byte if zero is passed.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { buf: BytesMut::with_capacity(capacity), capacity }
    }

    /// Reads whatever `reader` yields next into the space past the filled bytes.
    ///
    /// Doubles the capacity first if the buffer is full, so a fill always has room for at
    /// least one byte.
    ///
    /// # Returns
    ///
    /// The number of bytes read. `0` means the reader reached end of stream.
    ///
    /// # Errors
    ///
    /// Any read error from `reader`.
    pub async fn fill<R>(&mut self, reader: &mut R) -> std::io::Result<usize>
    where
        R: AsyncRead + Unpin,
    {
        if self.buf.len() >= self.capacity {
            self.capacity *= 2;
            trace!(capacity = self.capacity, "read buffer grown");
        }

        let spare = self.capacity - self.buf.len();
        self.buf.reserve(spare);

        let read = (&mut *reader).take(spare as u64).read_buf(&mut self.buf).await?;
        trace!(read, filled = self.buf.len(), "read buffer filled");
        Ok(read)
    }

    /// Drops the first `n` filled bytes, keeping the rest at the front.
    ///
    /// # Panics
    ///
    /// If `n` is larger than [`ReadBuffer::len`].
    pub fn consume(&mut self, n: usize) {
        self.buf.advance(n);
    }

    /// The filled, unconsumed bytes.
    #[inline]
    pub fn filled(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hands out the unconsumed bytes, e.g. to replay them in front of the rest of a stream.
    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self::new()
    }
}
