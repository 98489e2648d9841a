//! Fixed-width length headers.

/// Width of the unsigned length header that precedes a string or collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Prefix {
    /// `u8`, used by tiny strings.
    Tiny,
    /// `u16`, used by most strings and arrays.
    Short,
    /// `u32`, used by long strings, arrays, and byte payloads.
    Long,
}

impl Prefix {
    /// Largest length the header can express.
    pub(crate) const fn max(self) -> usize {
        match self {
            Self::Tiny => u8::MAX as usize,
            Self::Short => u16::MAX as usize,
            Self::Long => u32::MAX as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reader, Writer};

    #[test]
    fn test_limits() {
        assert_eq!(Prefix::Tiny.max(), 255);
        assert_eq!(Prefix::Short.max(), 65535);
        assert_eq!(Prefix::Long.max(), 4_294_967_295);
    }

    #[test]
    fn test_header_sizes() {
        for (prefix, size) in [(Prefix::Tiny, 1), (Prefix::Short, 2), (Prefix::Long, 4)] {
            let mut writer = Writer::new();
            writer.write_prefix(prefix, prefix.max()).unwrap();
            assert_eq!(writer.position(), size);

            let mut reader = Reader::new(writer.take().unwrap());
            assert_eq!(reader.read_prefix(prefix).unwrap(), prefix.max());
            assert_eq!(reader.position(), size);
        }
    }
}
