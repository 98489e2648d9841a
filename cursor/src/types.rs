//! Value types with a dedicated wire layout.
//!
//! # Date and time
//!
//! [`DateTime<Utc>`] and [`TimeDelta`] travel as a signed 64-bit count of
//! 100-nanosecond ticks. Timestamps count from 0001-01-01T00:00:00Z. Anything
//! finer than a tick is truncated toward zero on the way out.
//!
//! # Decimal
//!
//! [`Decimal`] is a 96-bit integer mantissa with a base-10 scale of at most
//! 28, laid out as four `u32` words: `lo`, `mid`, `hi`, `flags`. `flags` holds
//! the scale in bits 16..24 and the sign in bit 31; every other bit is zero.

use crate::Error;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// Number of ticks in one second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01T00:00:00Z and the Unix epoch.
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const NANOS_PER_TICK: i64 = 100;

/// Converts a timestamp to ticks.
pub fn datetime_to_ticks(value: &DateTime<Utc>) -> Result<i64, Error> {
    let ticks = UNIX_EPOCH_TICKS as i128
        + value.timestamp() as i128 * TICKS_PER_SECOND as i128
        + (value.timestamp_subsec_nanos() as i64 / NANOS_PER_TICK) as i128;
    i64::try_from(ticks)
        .map_err(|_| Error::InvalidData("DateTime", format!("{value} is out of range")))
}

/// Converts ticks to a timestamp.
pub fn datetime_from_ticks(ticks: i64) -> Result<DateTime<Utc>, Error> {
    let since_epoch = ticks as i128 - UNIX_EPOCH_TICKS as i128;
    let secs = since_epoch.div_euclid(TICKS_PER_SECOND as i128) as i64;
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND as i128) as i64 * NANOS_PER_TICK) as u32;
    DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| Error::InvalidData("DateTime", format!("{ticks} ticks is out of range")))
}

/// Converts a duration to ticks.
pub fn timedelta_to_ticks(value: &TimeDelta) -> Result<i64, Error> {
    let ticks = value.num_seconds() as i128 * TICKS_PER_SECOND as i128
        + (value.subsec_nanos() as i64 / NANOS_PER_TICK) as i128;
    i64::try_from(ticks)
        .map_err(|_| Error::InvalidData("TimeDelta", format!("{value} is out of range")))
}

/// Converts ticks to a duration.
pub fn timedelta_from_ticks(ticks: i64) -> TimeDelta {
    TimeDelta::seconds(ticks.div_euclid(TICKS_PER_SECOND))
        + TimeDelta::nanoseconds(ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK)
}

const SCALE_SHIFT: u32 = 16;
const SCALE_MASK: u32 = 0x00FF_0000;
const SIGN_MASK: u32 = 0x8000_0000;

/// A 128-bit base-10 fixed point number.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Decimal {
    lo: u32,
    mid: u32,
    hi: u32,
    flags: u32,
}

impl Decimal {
    /// Largest supported scale.
    pub const MAX_SCALE: u8 = 28;

    /// Largest supported mantissa magnitude.
    pub const MAX_MANTISSA: u128 = (1 << 96) - 1;

    /// Creates `mantissa * 10^-scale`.
    pub fn new(mantissa: i128, scale: u8) -> Result<Self, Error> {
        if scale > Self::MAX_SCALE {
            return Err(Error::InvalidData(
                "Decimal",
                format!("scale {scale} exceeds {}", Self::MAX_SCALE),
            ));
        }
        let magnitude = mantissa.unsigned_abs();
        if magnitude > Self::MAX_MANTISSA {
            return Err(Error::InvalidData(
                "Decimal",
                format!("mantissa {mantissa} exceeds 96 bits"),
            ));
        }
        let mut flags = (scale as u32) << SCALE_SHIFT;
        if mantissa < 0 {
            flags |= SIGN_MASK;
        }
        Ok(Self {
            lo: magnitude as u32,
            mid: (magnitude >> 32) as u32,
            hi: (magnitude >> 64) as u32,
            flags,
        })
    }

    /// Rebuilds a value from its four wire words, rejecting malformed flags.
    pub fn from_parts(lo: u32, mid: u32, hi: u32, flags: u32) -> Result<Self, Error> {
        let scale = (flags & SCALE_MASK) >> SCALE_SHIFT;
        if flags & !(SCALE_MASK | SIGN_MASK) != 0 || scale > Self::MAX_SCALE as u32 {
            return Err(Error::InvalidData(
                "Decimal",
                format!("invalid flags {flags:#010x}"),
            ));
        }
        Ok(Self { lo, mid, hi, flags })
    }

    /// Returns the four wire words `(lo, mid, hi, flags)`.
    pub fn parts(&self) -> (u32, u32, u32, u32) {
        (self.lo, self.mid, self.hi, self.flags)
    }

    /// Returns the signed mantissa.
    pub fn mantissa(&self) -> i128 {
        let magnitude =
            (self.lo as u128 | (self.mid as u128) << 32 | (self.hi as u128) << 64) as i128;
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Returns the number of digits after the decimal point.
    pub fn scale(&self) -> u8 {
        ((self.flags & SCALE_MASK) >> SCALE_SHIFT) as u8
    }

    /// Returns true if the sign bit is set.
    pub fn is_negative(&self) -> bool {
        self.flags & SIGN_MASK != 0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa().unsigned_abs().to_string();
        let scale = self.scale() as usize;
        let sign = if self.is_negative() { "-" } else { "" };
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let digits = format!("{digits:0>width$}", width = scale + 1);
        let (whole, fraction) = digits.split_at(digits.len() - scale);
        write!(f, "{sign}{whole}.{fraction}")
    }
}
