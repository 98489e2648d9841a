//! Growable byte region backing a buffer-mode writer.

use bytes::Bytes;
use std::mem;
use tracing::trace;

/// An owned byte region with a logical write cursor.
///
/// The allocation grows geometrically (at least 1.5x, and at least enough for
/// the pending write) and never shrinks unless the contents are taken or the
/// buffer is reset.
#[derive(Clone, Debug)]
pub struct Buffer {
    /// Backing storage. Its length is the capacity of the buffer.
    data: Vec<u8>,
    /// Number of bytes logically written.
    size: usize,
    /// Capacity restored by [`Buffer::take`].
    base_capacity: usize,
}

impl Buffer {
    /// Creates an empty buffer with `base_capacity` bytes pre-allocated.
    pub fn new(base_capacity: usize) -> Self {
        Self {
            data: vec![0; base_capacity],
            size: 0,
            base_capacity,
        }
    }

    /// Returns the number of bytes logically written.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of bytes that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Grows the allocation so that `new_size` bytes fit.
    ///
    /// The whole old allocation is carried over, so bytes past the cursor
    /// left behind by a backtrack survive.
    pub fn ensure_capacity(&mut self, new_size: usize) {
        let capacity = self.data.len();
        if new_size <= capacity {
            return;
        }
        let target = new_size.max(capacity + capacity / 2);
        trace!(from = capacity, to = target, "growing buffer");
        let mut data = vec![0; target];
        data[..capacity].copy_from_slice(&self.data);
        self.data = data;
    }

    /// Returns the logically written bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Copies the logically written bytes into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Hands out the logically written bytes without copying and resets the
    /// buffer to an empty allocation of `base_capacity` bytes.
    pub fn take(&mut self) -> Bytes {
        let mut data = mem::replace(&mut self.data, vec![0; self.base_capacity]);
        data.truncate(self.size);
        self.size = 0;
        Bytes::from(data)
    }

    /// Discards the contents, keeping the current allocation.
    pub fn reset(&mut self) {
        self.size = 0;
    }

    /// Returns the `width` bytes following the cursor, growing as needed.
    ///
    /// The cursor does not move until [`Buffer::advance`] is called.
    pub(crate) fn slot(&mut self, width: usize) -> &mut [u8] {
        self.ensure_capacity(self.size + width);
        &mut self.data[self.size..self.size + width]
    }

    /// Moves the cursor forward by `n` bytes previously filled through
    /// [`Buffer::slot`].
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.size + n <= self.data.len());
        self.size += n;
    }

    /// Appends `bytes` at the cursor.
    pub(crate) fn put_slice(&mut self, bytes: &[u8]) {
        self.slot(bytes.len()).copy_from_slice(bytes);
        self.advance(bytes.len());
    }

    /// Moves the cursor to `size` without touching the stored bytes.
    ///
    /// Bytes past the cursor stay in place, so moving back and forth never
    /// loses data that fits in the current allocation.
    pub(crate) fn set_len(&mut self, size: usize) {
        debug_assert!(size <= self.data.len());
        self.size = size;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INITIAL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_growth_within_capacity() {
        let mut buffer = Buffer::new(8);
        buffer.ensure_capacity(8);
        assert_eq!(buffer.capacity(), 8);
    }

    #[test]
    fn test_geometric_growth() {
        let mut buffer = Buffer::new(8);
        buffer.put_slice(&[1, 2, 3]);
        buffer.ensure_capacity(9);
        assert_eq!(buffer.capacity(), 12);
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);

        // A large pending write wins over the growth factor.
        buffer.ensure_capacity(100);
        assert_eq!(buffer.capacity(), 100);
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_growth_from_empty() {
        let mut buffer = Buffer::new(0);
        buffer.put_slice(&[7]);
        assert_eq!(buffer.capacity(), 1);
        buffer.put_slice(&[8]);
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.as_slice(), &[7, 8]);
    }

    #[test]
    fn test_take_resets() {
        let mut buffer = Buffer::new(4);
        buffer.put_slice(&[1, 2, 3, 4, 5, 6]);
        let taken = buffer.take();
        assert_eq!(&taken[..], &[1, 2, 3, 4, 5, 6]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
    }

    #[test]
    fn test_to_vec_copies() {
        let mut buffer = Buffer::new(4);
        buffer.put_slice(&[9, 9]);
        assert_eq!(buffer.to_vec(), vec![9, 9]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_reset_keeps_allocation() {
        let mut buffer = Buffer::new(2);
        buffer.put_slice(&[1, 2, 3, 4]);
        let capacity = buffer.capacity();
        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_set_len_preserves_tail() {
        let mut buffer = Buffer::new(8);
        buffer.put_slice(&[1, 2, 3, 4]);
        buffer.set_len(1);
        buffer.put_slice(&[9]);
        buffer.set_len(4);
        assert_eq!(buffer.as_slice(), &[1, 9, 3, 4]);
    }

    #[test]
    fn test_growth_preserves_tail() {
        let mut buffer = Buffer::new(4);
        buffer.put_slice(&[1, 2, 3, 4]);
        buffer.set_len(1);
        buffer.ensure_capacity(16);
        buffer.set_len(4);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    }
}
