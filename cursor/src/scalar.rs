//! Fixed-width values that travel through the untyped write/read path.
//!
//! A [`Scalar`] knows its width and how to render itself in host byte order.
//! Cursors take care of endian normalization, so implementations never think
//! about the wire order.

/// Largest magnitude representable by the biased 24-bit signed encoding.
pub const INT24_MAX: i32 = 8_388_607;

/// Largest value representable by the 24-bit unsigned encoding.
pub const UINT24_MAX: u32 = 16_777_215;

/// A fixed-width value rendered in host byte order.
pub trait Scalar: Copy + Default {
    /// Number of bytes written on the wire.
    const WIDTH: usize;

    /// Writes the host-order representation into `out`.
    ///
    /// `out` is exactly [`Self::WIDTH`] bytes long.
    fn put_native(self, out: &mut [u8]);

    /// Rebuilds a value from exactly [`Self::WIDTH`] host-order bytes.
    fn from_native(bytes: &[u8]) -> Self;
}

/// Integers accepted by the zero-compressed codec.
pub trait Integer: Scalar + PartialEq {
    #[inline]
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

macro_rules! impl_scalar {
    ($type:ty) => {
        impl Scalar for $type {
            const WIDTH: usize = std::mem::size_of::<$type>();

            #[inline]
            fn put_native(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_ne_bytes());
            }

            #[inline]
            fn from_native(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$type>()];
                raw.copy_from_slice(bytes);
                <$type>::from_ne_bytes(raw)
            }
        }
    };
}

impl_scalar!(u8);
impl_scalar!(u16);
impl_scalar!(u32);
impl_scalar!(u64);
impl_scalar!(u128);
impl_scalar!(i8);
impl_scalar!(i16);
impl_scalar!(i32);
impl_scalar!(i64);
impl_scalar!(i128);
impl_scalar!(f32);
impl_scalar!(f64);

impl Integer for u8 {}
impl Integer for u16 {}
impl Integer for u32 {}
impl Integer for u64 {}
impl Integer for i8 {}
impl Integer for i16 {}
impl Integer for i32 {}
impl Integer for i64 {}

/// Splits a signed value into the biased 24-bit wire parts, saturating at
/// `±INT24_MAX`.
#[inline]
pub fn int24_parts(value: i32) -> (u16, u8) {
    let biased = (value.clamp(-INT24_MAX, INT24_MAX) + INT24_MAX) as u32;
    ((biased & 0xFFFF) as u16, (biased >> 16) as u8)
}

/// Inverse of [`int24_parts`].
///
/// The all-ones pattern, which no writer produces, decodes to [`INT24_MAX`].
#[inline]
pub fn int24_from_parts(low: u16, high: u8) -> i32 {
    let biased = (low as u32 | (high as u32) << 16) as i32;
    (biased - INT24_MAX).min(INT24_MAX)
}

/// Splits an unsigned value into 24-bit wire parts, saturating at
/// [`UINT24_MAX`].
#[inline]
pub fn uint24_parts(value: u32) -> (u16, u8) {
    let value = value.min(UINT24_MAX);
    ((value & 0xFFFF) as u16, (value >> 16) as u8)
}

/// Inverse of [`uint24_parts`].
#[inline]
pub fn uint24_from_parts(low: u16, high: u8) -> u32 {
    low as u32 | (high as u32) << 16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(u8::WIDTH, 1);
        assert_eq!(i16::WIDTH, 2);
        assert_eq!(f32::WIDTH, 4);
        assert_eq!(u64::WIDTH, 8);
        assert_eq!(i128::WIDTH, 16);
    }

    #[test]
    fn test_native_roundtrip() {
        let mut out = [0u8; 8];
        (-12345.678f64).put_native(&mut out);
        assert_eq!(f64::from_native(&out), -12345.678);
    }

    #[test]
    fn test_is_zero() {
        assert!(0u32.is_zero());
        assert!(!(-1i8).is_zero());
    }

    #[test]
    fn test_int24() {
        for value in [0, 1, -1, 1_000_000, -1_000_000, INT24_MAX, -INT24_MAX] {
            let (low, high) = int24_parts(value);
            assert_eq!(int24_from_parts(low, high), value);
        }
        let (low, high) = int24_parts(INT24_MAX + 1000);
        assert_eq!(int24_from_parts(low, high), INT24_MAX);
        let (low, high) = int24_parts(-(INT24_MAX + 1000));
        assert_eq!(int24_from_parts(low, high), -INT24_MAX);
        let (low, high) = int24_parts(i32::MIN);
        assert_eq!(int24_from_parts(low, high), -INT24_MAX);

        // Zero sits at the bias.
        assert_eq!(int24_parts(0), (0xFFFF, 0x7F));
    }

    #[test]
    fn test_int24_decode_stays_in_range() {
        assert_eq!(int24_from_parts(0xFFFF, 0xFF), INT24_MAX);
        assert_eq!(int24_from_parts(0, 0), -INT24_MAX);
        assert_eq!(int24_from_parts(0xFFFE, 0xFF), INT24_MAX);
    }

    #[test]
    fn test_uint24() {
        let (low, high) = uint24_parts(0x12_3456);
        assert_eq!((low, high), (0x3456, 0x12));
        assert_eq!(uint24_from_parts(low, high), 0x12_3456);
        let (low, high) = uint24_parts(u32::MAX);
        assert_eq!(uint24_from_parts(low, high), UINT24_MAX);
    }
}
