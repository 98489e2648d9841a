//! Byte order normalization.
//!
//! Everything on the wire is little-endian. Scalars are first rendered in the
//! host's byte order and then passed through [`normalize`], which reverses them
//! in place when the host is big-endian. The same call undoes the reversal on
//! the read side.

/// A byte order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The byte order used on the wire.
    pub const WIRE: Self = Self::Little;

    /// The byte order of the compiling target.
    pub const NATIVE: Self = if cfg!(target_endian = "big") {
        Self::Big
    } else {
        Self::Little
    };

    /// Returns true if values rendered in this order must be reversed before
    /// hitting the wire.
    #[inline]
    pub const fn needs_swap(self) -> bool {
        !matches!(self, Self::Little)
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Reverses `bytes` in place if `host` differs from the wire order.
///
/// Single bytes are left untouched regardless of `host`.
#[inline]
pub fn normalize(bytes: &mut [u8], host: ByteOrder) {
    if host.needs_swap() && bytes.len() > 1 {
        bytes.reverse();
    }
}
