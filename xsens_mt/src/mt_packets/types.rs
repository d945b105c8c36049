use core::convert::TryFrom;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::packets::UtcRef;
use crate::error::DateTimeError;

/// Orientation sub-format carried in bits 2-3 of the output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationMode {
    Quaternion,
    Euler,
    /// Rotation matrix: consumed for its width, never decoded.
    Matrix,
}

impl OrientationMode {
    /// Field value 3 is reserved by the vendor; it is mapped to `Matrix` so
    /// the section width stays accounted for.
    pub(crate) fn from_field(raw: u8) -> Self {
        match raw & 0x3 {
            0 => OrientationMode::Quaternion,
            1 => OrientationMode::Euler,
            _ => OrientationMode::Matrix,
        }
    }
}

/// GPS fix quality derived from the MTData status byte, using the same
/// values the downstream GPS state expects on the wire.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum GpsFix {
    #[default]
    NoFix = 0x00,
    /// No satellite fix, but the onboard estimator output is valid.
    EstimatorValid = 0x01,
    Fix3D = 0x03,
}

impl GpsFix {
    /// Status byte bit 2 flags a satellite fix, bit 1 a valid estimator.
    pub fn from_status_byte(status: u8) -> Self {
        if status & 0x04 != 0 {
            GpsFix::Fix3D
        } else if status & 0x02 != 0 {
            GpsFix::EstimatorValid
        } else {
            GpsFix::NoFix
        }
    }
}

impl<'a> TryFrom<&UtcRef<'a>> for NaiveDateTime {
    type Error = DateTimeError;

    fn try_from(utc: &UtcRef<'a>) -> Result<Self, Self::Error> {
        let date = NaiveDate::from_ymd_opt(
            i32::from(utc.year()),
            u32::from(utc.month()),
            u32::from(utc.day()),
        )
        .ok_or(DateTimeError::InvalidDate)?;
        let time = NaiveTime::from_hms_opt(
            u32::from(utc.hour()),
            u32::from(utc.min()),
            u32::from(utc.sec()),
        )
        .ok_or(DateTimeError::InvalidTime)?;
        const NANOS_LIM: u32 = 1_000_000_000;
        if utc.nanosec() >= NANOS_LIM {
            return Err(DateTimeError::InvalidNanoseconds);
        }
        Ok(NaiveDateTime::new(date, time)
            + chrono::Duration::nanoseconds(i64::from(utc.nanosec())))
    }
}
