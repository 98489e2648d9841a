//! Destinations a [`super::Writer`] can target.

use crate::{
    buffer::Buffer,
    endian::{normalize, ByteOrder},
    scalar::Scalar,
    Error,
};
use bytes::Bytes;
use std::io;

/// A destination for encoded bytes.
///
/// Operations that only make sense for an in-memory destination default to
/// [`Error::Unsupported`].
pub trait Sink {
    /// Returns the number of bytes logically written.
    fn position(&self) -> usize;

    /// Writes `value` through the untyped scalar path.
    fn put_scalar<T: Scalar>(&mut self, value: T, host: ByteOrder) -> Result<(), Error>;

    /// Writes `bytes` verbatim.
    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Pushes any pending output to the destination.
    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Rewinds the cursor to `position`, remembering how far it had gone.
    fn backtrack(&mut self, _position: usize) -> Result<(), Error> {
        Err(Error::Unsupported("backtrack"))
    }

    /// Restores the cursor saved by the last [`Sink::backtrack`].
    fn return_to_mark(&mut self) -> Result<(), Error> {
        Err(Error::Unsupported("return_to_mark"))
    }

    /// Copies out everything written so far.
    fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Err(Error::Unsupported("to_vec"))
    }

    /// Hands out everything written so far and starts over.
    fn take(&mut self) -> Result<Bytes, Error> {
        Err(Error::Unsupported("take"))
    }
}

/// Writes into a [`Buffer`].
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    buffer: Buffer,
    mark: Option<usize>,
}

impl BufferSink {
    /// Creates a sink whose buffer starts with `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Buffer::new(capacity),
            mark: None,
        }
    }

    /// Returns the underlying buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Returns the written bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Discards everything written and any pending mark.
    pub fn reset(&mut self) {
        self.buffer.reset();
        self.mark = None;
    }
}

impl Sink for BufferSink {
    fn position(&self) -> usize {
        self.buffer.len()
    }

    fn put_scalar<T: Scalar>(&mut self, value: T, host: ByteOrder) -> Result<(), Error> {
        let slot = self.buffer.slot(T::WIDTH);
        value.put_native(slot);
        normalize(slot, host);
        self.buffer.advance(T::WIDTH);
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buffer.put_slice(bytes);
        Ok(())
    }

    fn backtrack(&mut self, position: usize) -> Result<(), Error> {
        let size = self.buffer.len();
        self.mark = Some(self.mark.map_or(size, |mark| mark.max(size)));
        self.buffer.set_len(position.min(size));
        Ok(())
    }

    fn return_to_mark(&mut self) -> Result<(), Error> {
        let mark = self.mark.take().ok_or(Error::NoMark)?;
        let size = self.buffer.len().max(mark);
        self.buffer.set_len(size);
        Ok(())
    }

    fn to_vec(&self) -> Result<Vec<u8>, Error> {
        Ok(self.buffer.to_vec())
    }

    fn take(&mut self) -> Result<Bytes, Error> {
        self.mark = None;
        Ok(self.buffer.take())
    }
}

/// Writes straight through to an [`io::Write`].
///
/// Scalars are staged in a small reusable buffer so they can be normalized
/// before being handed to the stream.
#[derive(Debug)]
pub struct StreamSink<W: io::Write> {
    inner: W,
    staging: Vec<u8>,
    size: usize,
}

impl<W: io::Write> StreamSink<W> {
    /// Creates a sink writing to `inner` with a staging buffer of `capacity` bytes.
    pub fn new(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            staging: vec![0; capacity],
            size: 0,
        }
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> Sink for StreamSink<W> {
    fn position(&self) -> usize {
        self.size
    }

    fn put_scalar<T: Scalar>(&mut self, value: T, host: ByteOrder) -> Result<(), Error> {
        if self.staging.len() < T::WIDTH {
            self.staging.resize(T::WIDTH, 0);
        }
        let staged = &mut self.staging[..T::WIDTH];
        value.put_native(staged);
        normalize(staged, host);
        self.inner.write_all(staged)?;
        self.size += T::WIDTH;
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.inner.write_all(bytes)?;
        self.size += bytes.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.inner.flush()?;
        Ok(())
    }
}
