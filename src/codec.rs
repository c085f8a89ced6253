use crate::data::NativeBytes;
use crate::errors::SplitError;

/// Check that a buffer of `available` bytes can hold `needed` bytes.
pub fn check_len(needed: usize, available: usize) -> Result<(), SplitError> {
    if available < needed {
        Err(SplitError::BufferTooShort { needed, available })
    } else {
        Ok(())
    }
}

/// Sequential writer over a caller provided buffer.
/// The length is validated once, when the writer is created,
/// so writing up to `needed` bytes can not go out of bounds.
pub struct ByteWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
    needed: usize,
}

impl<'a> ByteWriter<'a> {
    pub fn new(buf: &'a mut [u8], needed: usize) -> Result<Self, SplitError> {
        check_len(needed, buf.len())?;
        Ok(ByteWriter {
            buf,
            pos: 0,
            needed,
        })
    }

    pub fn put<T: NativeBytes>(&mut self, value: T) {
        debug_assert!(self.pos + T::WIDTH <= self.needed);
        value.put(&mut self.buf[self.pos..]);
        self.pos += T::WIDTH;
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Sequential reader, the counterpart of [`ByteWriter`].
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    needed: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8], needed: usize) -> Result<Self, SplitError> {
        check_len(needed, buf.len())?;
        Ok(ByteReader {
            buf,
            pos: 0,
            needed,
        })
    }

    pub fn take<T: NativeBytes>(&mut self) -> T {
        debug_assert!(self.pos + T::WIDTH <= self.needed);
        let value = T::take(&self.buf[self.pos..]);
        self.pos += T::WIDTH;
        value
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}
