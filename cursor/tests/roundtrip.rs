//! Round-trip every supported value through buffer and stream cursors.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use commonware_cursor::{Decimal, Read, Reader, Write, Writer, INT24_MAX, UINT24_MAX};
use paste::paste;
use std::{collections::BTreeMap, fmt::Debug, io::Cursor};
use uuid::Uuid;

/// Encodes `value` in both modes, checks they agree, and returns the bytes.
fn encode<T: Write + ?Sized>(value: &T) -> Vec<u8> {
    let mut buffered = Writer::new();
    buffered.write(value).unwrap();

    let mut streamed = Writer::stream(Vec::new());
    streamed.write(value).unwrap();
    assert_eq!(streamed.position(), buffered.position());
    let (_, streamed) = streamed.into_buffer();

    let buffered = buffered.to_vec().unwrap();
    assert_eq!(buffered, streamed);
    buffered
}

fn roundtrip<T: Write + Read + PartialEq + Debug>(value: T) {
    let bytes = encode(&value);

    let mut reader = Reader::new(bytes.clone());
    assert_eq!(reader.read::<T>().unwrap(), value);
    assert_eq!(reader.remaining(), Some(0));

    let mut reader = Reader::stream(Cursor::new(bytes.clone()));
    assert_eq!(reader.read::<T>().unwrap(), value);
    assert_eq!(reader.position(), bytes.len());
}

macro_rules! impl_num_test {
    ($type:ty) => {
        paste! {
            #[test]
            fn [<test_ $type>]() {
                let values: [$type; 5] =
                    [0 as $type, 1 as $type, 42 as $type, <$type>::MAX, <$type>::MIN];
                for value in values {
                    assert_eq!(encode(&value).len(), std::mem::size_of::<$type>());
                    roundtrip(value);
                    roundtrip(Some(value));
                    roundtrip(None::<$type>);
                    roundtrip(vec![value; 3]);
                }
            }
        }
    };
}

impl_num_test!(u8);
impl_num_test!(u16);
impl_num_test!(u32);
impl_num_test!(u64);
impl_num_test!(u128);
impl_num_test!(i8);
impl_num_test!(i16);
impl_num_test!(i32);
impl_num_test!(i64);
impl_num_test!(i128);
impl_num_test!(f32);
impl_num_test!(f64);

#[test]
fn test_float_specials() {
    for value in [f64::INFINITY, f64::NEG_INFINITY, -0.0, f64::MIN_POSITIVE] {
        roundtrip(value);
    }
    let bytes = encode(&f32::NAN);
    let mut reader = Reader::new(bytes);
    assert!(reader.read_f32().unwrap().is_nan());
}

#[test]
fn test_bool() {
    roundtrip(true);
    roundtrip(false);
    roundtrip(Some(true));
    roundtrip(None::<bool>);
    assert_eq!(encode(&true), vec![1]);
}

#[test]
fn test_char() {
    for value in ['a', '\0', 'é', '\u{FFFF}', '中'] {
        roundtrip(value);
    }
    let mut writer = Writer::new();
    assert!(writer.write_char('🦀').is_err());
}

#[test]
fn test_int24() {
    let mut writer = Writer::new();
    for value in [0, -1, 1, INT24_MAX, -INT24_MAX, INT24_MAX + 1, i32::MIN] {
        writer.write_i24(value).unwrap();
    }
    for value in [0, 1, UINT24_MAX, UINT24_MAX + 1, u32::MAX] {
        writer.write_u24(value).unwrap();
    }
    let bytes = writer.take().unwrap();
    assert_eq!(bytes.len(), 12 * 3);

    let mut reader = Reader::new(bytes);
    for expected in [0, -1, 1, INT24_MAX, -INT24_MAX, INT24_MAX, -INT24_MAX] {
        assert_eq!(reader.read_i24().unwrap(), expected);
    }
    for expected in [0, 1, UINT24_MAX, UINT24_MAX, UINT24_MAX] {
        assert_eq!(reader.read_u24().unwrap(), expected);
    }
}

#[test]
fn test_strings() {
    for value in ["", "hello", "naïve ☃", &"x".repeat(70_000)[..65_535]] {
        roundtrip(value.to_string());
        roundtrip(Some(value.to_string()));
    }
    roundtrip(None::<String>);

    let mut writer = Writer::new();
    writer.write_tiny_str("tiny").unwrap();
    writer.write_long_str(&"y".repeat(70_000)).unwrap();
    writer.write_tiny_ascii("plain").unwrap();
    writer.write_nullable_str(Some("here")).unwrap();
    writer.write_nullable_str(None).unwrap();
    let mut reader = Reader::new(writer.take().unwrap());
    assert_eq!(reader.read_tiny_str().unwrap(), "tiny");
    assert_eq!(reader.read_long_str().unwrap().len(), 70_000);
    assert_eq!(reader.read_tiny_ascii().unwrap(), "plain");
    assert_eq!(reader.read_nullable_str().unwrap().as_deref(), Some("here"));
    assert_eq!(reader.read_nullable_str().unwrap(), None);
    assert_eq!(reader.remaining(), Some(0));
}

#[test]
fn test_bytes() {
    roundtrip(Bytes::new());
    roundtrip(Bytes::from_static(b"payload"));

    let long = vec![0xAB; 100_000];
    let mut writer = Writer::new();
    writer.write_long_bytes(&long).unwrap();
    let mut reader = Reader::stream(Cursor::new(writer.take().unwrap().to_vec()));
    assert_eq!(&reader.read_long_bytes().unwrap()[..], &long[..]);
}

#[test]
fn test_uuid() {
    let value = Uuid::from_u128(0x0011_2233_4455_6677_8899_AABB_CCDD_EEFF);
    roundtrip(value);
    roundtrip(Uuid::nil());
    roundtrip(Some(value));

    // The first three groups are little-endian on the wire.
    assert_eq!(
        encode(&value),
        vec![
            0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF
        ]
    );
}

#[test]
fn test_datetime() {
    let values: [DateTime<Utc>; 3] = [
        Utc.timestamp_opt(0, 0).unwrap(),
        Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap(),
        Utc.with_ymd_and_hms(2100, 6, 1, 0, 0, 0).unwrap() + TimeDelta::nanoseconds(1_234_500),
    ];
    for value in values {
        roundtrip(value);
    }
    roundtrip(TimeDelta::milliseconds(-86_400_123));
    roundtrip(Some(TimeDelta::zero()));
}

#[test]
fn test_decimal() {
    for value in [
        Decimal::default(),
        Decimal::new(-1, 28).unwrap(),
        Decimal::new(Decimal::MAX_MANTISSA as i128, 0).unwrap(),
        Decimal::new(31_415_926, 7).unwrap(),
    ] {
        roundtrip(value);
    }

    // Unused flag bits are rejected.
    let mut writer = Writer::new();
    for word in [1u32, 0, 0, 0x0000_8000] {
        writer.write_u32(word).unwrap();
    }
    let mut reader = Reader::new(writer.take().unwrap());
    assert!(reader.read_decimal().is_err());
}

#[test]
fn test_collections() {
    roundtrip(Vec::<u32>::new());
    roundtrip(vec![Some(1i16), None, Some(-1)]);
    roundtrip(vec![vec!["a".to_string()], vec![]]);
    roundtrip(Some(vec![1u8, 2, 3]));

    let map: BTreeMap<u16, Option<String>> =
        [(1, Some("one".to_string())), (2, None)].into_iter().collect();
    roundtrip(map);

    let mut writer = Writer::new();
    writer.write_long_array(&[7u64; 3]).unwrap();
    writer.write_nullable_array(Some(&[1i8, 2][..])).unwrap();
    writer.write_nullable_array::<i8>(None).unwrap();
    writer
        .write_bools(&[true, false, true, true, false, false, false, false, true])
        .unwrap();
    let mut reader = Reader::new(writer.take().unwrap());
    assert_eq!(reader.read_long_array::<u64>().unwrap(), vec![7; 3]);
    assert_eq!(reader.read_nullable_array::<i8>().unwrap(), Some(vec![1, 2]));
    assert_eq!(reader.read_nullable_array::<i8>().unwrap(), None);
    assert_eq!(
        reader.read_bools().unwrap(),
        vec![true, false, true, true, false, false, false, false, true]
    );
    assert_eq!(reader.remaining(), Some(0));
}

#[test]
fn test_stream_writer_flushes_to_inner() {
    let mut writer = Writer::stream(Cursor::new(Vec::new()));
    writer.write_u32(0xDEAD_BEEF).unwrap();
    writer.write_str("tail").unwrap();
    writer.flush().unwrap();
    assert_eq!(writer.position(), 4 + 2 + 4);
    let inner = writer.into_sink().into_inner().into_inner();
    assert_eq!(inner, vec![0xEF, 0xBE, 0xAD, 0xDE, 4, 0, b't', b'a', b'i', b'l']);
}
