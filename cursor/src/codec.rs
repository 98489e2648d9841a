//! Compile-time dispatch of values to cursor operations.
//!
//! Implementing [`Write`] and [`Read`] for a type lets it be used with
//! [`Writer::write`] and [`Reader::read`], and nested inside options,
//! arrays, and maps.

use crate::{
    reader::{Reader, Source},
    scalar::Integer,
    types::Decimal,
    writer::{Sink, Writer},
    Error,
};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Trait for types that can be written to a [`Writer`].
pub trait Write {
    /// Encodes this value at the writer's cursor.
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error>;
}

/// Trait for types that can be read from a [`Reader`].
pub trait Read: Sized {
    /// Decodes a value at the reader's cursor.
    ///
    /// When the reader does not throw on overflow, a value that ran out of
    /// input is returned in its default form and [`Reader::has_failed`] is set.
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error>;
}

/// Trait for enumerations encoded as their underlying integer.
///
/// # Example
///
/// ```
/// use commonware_cursor::{Reader, WireEnum, Writer};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Color {
///     Red = 1,
///     Blue = 2,
/// }
///
/// impl WireEnum for Color {
///     type Repr = u8;
///
///     fn to_repr(self) -> u8 {
///         self as u8
///     }
///
///     fn from_repr(repr: u8) -> Option<Self> {
///         match repr {
///             1 => Some(Self::Red),
///             2 => Some(Self::Blue),
///             _ => None,
///         }
///     }
/// }
///
/// let mut writer = Writer::new();
/// writer.write_enum(Color::Blue).unwrap();
/// let mut reader = Reader::new(writer.take().unwrap());
/// assert_eq!(reader.read_enum::<Color>().unwrap(), Color::Blue);
/// ```
pub trait WireEnum: Copy {
    /// The underlying integer.
    type Repr: Integer + Into<i128>;

    /// Returns the underlying integer.
    fn to_repr(self) -> Self::Repr;

    /// Returns the variant for `repr`, if there is one.
    fn from_repr(repr: Self::Repr) -> Option<Self>;
}

macro_rules! impl_scalar_codec {
    ($type:ty, $write_method:ident, $read_method:ident) => {
        impl Write for $type {
            #[inline]
            fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
                writer.$write_method(*self)
            }
        }

        impl Read for $type {
            #[inline]
            fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
                reader.$read_method()
            }
        }
    };
}

impl_scalar_codec!(u8, write_u8, read_u8);
impl_scalar_codec!(u16, write_u16, read_u16);
impl_scalar_codec!(u32, write_u32, read_u32);
impl_scalar_codec!(u64, write_u64, read_u64);
impl_scalar_codec!(u128, write_u128, read_u128);
impl_scalar_codec!(i8, write_i8, read_i8);
impl_scalar_codec!(i16, write_i16, read_i16);
impl_scalar_codec!(i32, write_i32, read_i32);
impl_scalar_codec!(i64, write_i64, read_i64);
impl_scalar_codec!(i128, write_i128, read_i128);
impl_scalar_codec!(f32, write_f32, read_f32);
impl_scalar_codec!(f64, write_f64, read_f64);
impl_scalar_codec!(bool, write_bool, read_bool);
impl_scalar_codec!(char, write_char, read_char);
impl_scalar_codec!(Decimal, write_decimal, read_decimal);

impl Write for Uuid {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_uuid(self)
    }
}

impl Read for Uuid {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_uuid()
    }
}

impl Write for DateTime<Utc> {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_datetime(self)
    }
}

impl Read for DateTime<Utc> {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_datetime()
    }
}

impl Write for TimeDelta {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_timedelta(self)
    }
}

impl Read for TimeDelta {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_timedelta()
    }
}

// Strings and byte payloads default to the short (u16) header.
impl Write for str {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_str(self)
    }
}

impl Write for String {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_str(self)
    }
}

impl Read for String {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_str()
    }
}

impl Write for Bytes {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_bytes(self)
    }
}

impl Read for Bytes {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_bytes()
    }
}

// Fixed-size byte arrays carry no header.
impl<const N: usize> Write for [u8; N] {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_raw(self)
    }
}

impl<const N: usize> Read for [u8; N] {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        let mut out = [0u8; N];
        let raw = reader.read_raw(N)?;
        if raw.len() == N {
            out.copy_from_slice(&raw);
        }
        Ok(out)
    }
}

impl<T: Write> Write for Option<T> {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_nullable(self.as_ref())
    }
}

impl<T: Read> Read for Option<T> {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_nullable()
    }
}

impl<T: Write> Write for [T] {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_array(self)
    }
}

impl<T: Write> Write for Vec<T> {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_array(self)
    }
}

impl<T: Read> Read for Vec<T> {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_array()
    }
}

impl<K: Write, V: Write> Write for BTreeMap<K, V> {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        writer.write_map(self)
    }
}

impl<K: Read + Ord, V: Read> Read for BTreeMap<K, V> {
    #[inline]
    fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
        reader.read_map()
    }
}

impl<T: Write + ?Sized> Write for &T {
    #[inline]
    fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
        (**self).write(writer)
    }
}
