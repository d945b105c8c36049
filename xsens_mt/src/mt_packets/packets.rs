use bitflags::bitflags;

use crate::{
    constants::{frame_len, MT_BUS_ID, MT_PREAMBLE},
    parser::MtChecksumCalc,
};

use super::types::OrientationMode;

/// Switch the device to its configuration state.
pub const MSG_GO_TO_CONFIG: u8 = 0x30;
/// Switch the device back to measurement output.
pub const MSG_GO_TO_MEASUREMENT: u8 = 0x10;
/// Set the output-mode bitfield.
pub const MSG_SET_OUTPUT_MODE: u8 = 0xd0;
/// Acknowledgement carrying the active output-mode bitfield.
pub const MSG_OUTPUT_MODE_ACK: u8 = 0xd1;
/// Set the output-settings bitfield.
pub const MSG_SET_OUTPUT_SETTINGS: u8 = 0xd2;
/// Acknowledgement carrying the active output-settings bitfield.
pub const MSG_OUTPUT_SETTINGS_ACK: u8 = 0xd3;
/// Device error report.
pub const MSG_ERROR: u8 = 0x42;
/// Request a GPS channel-status report.
pub const MSG_REQ_GPS_STATUS: u8 = 0xa6;
/// GPS channel-status report.
pub const MSG_GPS_STATUS: u8 = 0xa7;
/// Periodic measurement data; payload layout is selected by the output
/// mode/settings bitfields.
pub const MSG_MT_DATA: u8 = 0x32;

bitflags! {
    /// Output-mode register: selects which sections an MTData payload
    /// carries. Bit positions are wire-compatible with the vendor register;
    /// unnamed bits are reserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputMode: u16 {
        const TEMP = 0x0001;
        const CALIBRATED = 0x0002;
        const ORIENTATION = 0x0004;
        const AUXILIARY = 0x0008;
        const POSITION = 0x0010;
        const VELOCITY = 0x0020;
        const STATUS = 0x0800;
        const RAW_GPS = 0x1000;
        const RAW_INERTIAL = 0x4000;
    }
}

bitflags! {
    /// Output-settings register: sub-encodings and per-field suppression.
    ///
    /// Bits 2-3 form a two-bit orientation sub-format field, exposed through
    /// [`OutputSettings::orientation_mode`] rather than as single flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutputSettings: u32 {
        /// Payload carries a sample-counter timestamp section.
        const TIMESTAMP_SAMPLE = 0x0000_0001;
        /// Payload carries a UTC section.
        const TIMESTAMP_UTC = 0x0000_0002;
        const ORIENTATION_MODE_EULER = 0x0000_0004;
        const ORIENTATION_MODE_MATRIX = 0x0000_0008;
        /// Suppress the accelerometer third of the calibrated section.
        const ACC_OUT_DISABLED = 0x0000_0010;
        /// Suppress the gyroscope third of the calibrated section.
        const GYRO_OUT_DISABLED = 0x0000_0020;
        /// Suppress the magnetometer third of the calibrated section.
        const MAG_OUT_DISABLED = 0x0000_0040;
        /// Suppress auxiliary analog channel 1.
        const AUX1_OUT_DISABLED = 0x0000_0400;
        /// Suppress auxiliary analog channel 2.
        const AUX2_OUT_DISABLED = 0x0000_0800;
        /// North-East-Down output frame (vs X-North-Z-Up).
        const NED = 0x8000_0000;
    }
}

impl OutputSettings {
    const ORIENTATION_MODE_SHIFT: u32 = 2;
    const ORIENTATION_MODE_MASK: u32 = 0x3;

    /// Decode the two-bit orientation sub-format field.
    pub fn orientation_mode(self) -> OrientationMode {
        let raw = (self.bits() >> Self::ORIENTATION_MODE_SHIFT) & Self::ORIENTATION_MODE_MASK;
        OrientationMode::from_field(raw as u8)
    }
}

/// Default output mode for autopilot use: calibrated, orientation,
/// position, velocity, status, GPS PVT. Temperature stays off.
pub const DEFAULT_OUTPUT_MODE: OutputMode = OutputMode::from_bits_retain(0x1836);
/// Matching default settings: sample-counter timestamp, Euler orientation,
/// both auxiliary channels suppressed, NED frame.
pub const DEFAULT_OUTPUT_SETTINGS: OutputSettings = OutputSettings::from_bits_retain(0x8000_0c05);

/// Big-endian field read at a fixed offset inside a section slice.
macro_rules! read_be {
    (u8, $buf:expr, $off:expr) => {
        $buf[$off]
    };
    (i8, $buf:expr, $off:expr) => {
        $buf[$off] as i8
    };
    (u16, $buf:expr, $off:expr) => {
        u16::from_be_bytes([$buf[$off], $buf[$off + 1]])
    };
    (i16, $buf:expr, $off:expr) => {
        i16::from_be_bytes([$buf[$off], $buf[$off + 1]])
    };
    (u32, $buf:expr, $off:expr) => {
        u32::from_be_bytes([$buf[$off], $buf[$off + 1], $buf[$off + 2], $buf[$off + 3]])
    };
    (i32, $buf:expr, $off:expr) => {
        i32::from_be_bytes([$buf[$off], $buf[$off + 1], $buf[$off + 2], $buf[$off + 3]])
    };
    (f32, $buf:expr, $off:expr) => {
        f32::from_be_bytes([$buf[$off], $buf[$off + 1], $buf[$off + 2], $buf[$off + 3]])
    };
}

/// Declares a zero-copy section reader: a named wrapper over a byte slice
/// with a fixed `LEN` and per-field getters at fixed offsets. This is the
/// fixed field-codec table the decoder walks; offsets are never computed at
/// decode time.
macro_rules! mt_section {
    (
        $(#[$meta:meta])*
        struct $name:ident($len:expr) {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ident @ $off:expr, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a>(&'a [u8]);

        impl<'a> $name<'a> {
            /// Byte width this section occupies in an MTData payload.
            pub const LEN: usize = $len;

            /// Wrap a section slice. Callers must hand in at least
            /// [`Self::LEN`] bytes.
            pub fn new(data: &'a [u8]) -> Self {
                debug_assert!(data.len() >= Self::LEN);
                Self(data)
            }

            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> $ty {
                    read_be!($ty, self.0, $off)
                }
            )*
        }
    };
}

mt_section! {
    /// Raw inertial record: uncalibrated accelerometer, rate gyro and
    /// magnetometer triplets.
    struct RawInertialRef(36) {
        acc_x: f32 @ 0,
        acc_y: f32 @ 4,
        acc_z: f32 @ 8,
        gyr_x: f32 @ 12,
        gyr_y: f32 @ 16,
        gyr_z: f32 @ 20,
        mag_x: f32 @ 24,
        mag_y: f32 @ 28,
        mag_z: f32 @ 32,
    }
}

mt_section! {
    /// Raw GPS PVT block with barometric pressure.
    struct RawGpsRef(44) {
        press: u16 @ 0,
        press_age: u8 @ 2,
        /// GPS time of week, 10 ms units.
        itow: u32 @ 3,
        /// Latitude, 1e-7 degrees.
        lat: i32 @ 7,
        /// Longitude, 1e-7 degrees.
        lon: i32 @ 11,
        /// Height above ellipsoid, millimeters.
        alt: i32 @ 15,
        /// North velocity, cm/s.
        vel_n: i32 @ 19,
        /// East velocity, cm/s.
        vel_e: i32 @ 23,
        /// Down velocity, cm/s.
        vel_d: i32 @ 27,
        /// Horizontal accuracy estimate, cm.
        hacc: u32 @ 31,
        /// Vertical accuracy estimate, cm.
        vacc: u32 @ 35,
        /// Speed accuracy estimate, cm/s.
        sacc: u32 @ 39,
        gps_age: u8 @ 43,
    }
}

mt_section! {
    /// One calibrated (or velocity) vector: three floats.
    struct VectorRef(12) {
        x: f32 @ 0,
        y: f32 @ 4,
        z: f32 @ 8,
    }
}

mt_section! {
    /// Orientation as a unit quaternion, scalar first.
    struct QuaternionRef(16) {
        q0: f32 @ 0,
        q1: f32 @ 4,
        q2: f32 @ 8,
        q3: f32 @ 12,
    }
}

mt_section! {
    /// Orientation as Euler angles, degrees.
    struct EulerRef(12) {
        roll: f32 @ 0,
        pitch: f32 @ 4,
        yaw: f32 @ 8,
    }
}

mt_section! {
    /// Geodetic position: latitude/longitude in degrees, altitude in meters.
    struct PositionRef(12) {
        lat: f32 @ 0,
        lon: f32 @ 4,
        alt: f32 @ 8,
    }
}

mt_section! {
    /// Device status byte.
    struct StatusRef(1) {
        status: u8 @ 0,
    }
}

mt_section! {
    /// Sample-counter timestamp.
    struct TimeStampRef(2) {
        counter: u16 @ 0,
    }
}

mt_section! {
    /// UTC time record.
    struct UtcRef(12) {
        nanosec: u32 @ 0,
        year: u16 @ 4,
        month: u8 @ 6,
        day: u8 @ 7,
        hour: u8 @ 8,
        min: u8 @ 9,
        sec: u8 @ 10,
        valid: u8 @ 11,
    }
}

/// Width of the temperature section (consumed, reserved).
pub const TEMP_LEN: usize = 4;
/// Width of the full calibrated section; each of its three thirds is
/// [`VectorRef::LEN`].
pub const CALIBRATED_LEN: usize = 3 * VectorRef::LEN;
/// Width of the rotation-matrix orientation sub-format (consumed only).
pub const MATRIX_LEN: usize = 36;
/// Width of one auxiliary analog channel.
pub const AUX_CHANNEL_LEN: usize = 2;

/// One record of a GPS channel-status report.
#[derive(Debug, Clone, Copy)]
pub struct ChannelRef<'a>(&'a [u8]);

impl<'a> ChannelRef<'a> {
    pub const LEN: usize = 5;

    /// Channel table slot this record targets.
    pub fn chn(&self) -> u8 {
        self.0[0]
    }

    /// Satellite identifier.
    pub fn svid(&self) -> u8 {
        self.0[1]
    }

    /// Per-channel status bitmask.
    pub fn bitmask(&self) -> u8 {
        self.0[2]
    }

    /// Quality indicator.
    pub fn qi(&self) -> u8 {
        self.0[3]
    }

    /// Carrier-to-noise ratio, dBHz.
    pub fn cnr(&self) -> u8 {
        self.0[4]
    }
}

/// GPS channel-status payload: a channel count followed by fixed-width
/// per-channel records.
#[derive(Debug, Clone, Copy)]
pub struct GpsStatusRef<'a>(&'a [u8]);

impl<'a> GpsStatusRef<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self(payload)
    }

    /// Declared channel count; may exceed the number of complete records
    /// actually present in the payload.
    pub fn nch(&self) -> u8 {
        if self.0.is_empty() {
            0
        } else {
            self.0[0]
        }
    }

    /// Record `index`, if the payload actually contains all of its bytes.
    pub fn channel(&self, index: usize) -> Option<ChannelRef<'a>> {
        let start = 1 + index * ChannelRef::LEN;
        let end = start + ChannelRef::LEN;
        if end > self.0.len() {
            return None;
        }
        Some(ChannelRef(&self.0[start..end]))
    }
}

/// Writes the header, copies the payload and appends the checksum trailer.
/// `frame` must be exactly `frame_len(payload.len())` bytes.
fn finalize_frame(frame: &mut [u8], message_id: u8, payload: &[u8]) {
    frame[0] = MT_PREAMBLE;
    frame[1] = MT_BUS_ID;
    frame[2] = message_id;
    frame[3] = payload.len() as u8;
    frame[4..4 + payload.len()].copy_from_slice(payload);
    let mut ck = MtChecksumCalc::new();
    ck.update(&frame[1..frame.len() - 1]);
    frame[frame.len() - 1] = ck.trailer();
}

/// Builder for the GoToConfig command frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoToConfigBuilder;

impl GoToConfigBuilder {
    pub fn into_frame_bytes(self) -> [u8; frame_len(0)] {
        let mut frame = [0; frame_len(0)];
        finalize_frame(&mut frame, MSG_GO_TO_CONFIG, &[]);
        frame
    }
}

/// Builder for the GoToMeasurement command frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoToMeasurementBuilder;

impl GoToMeasurementBuilder {
    pub fn into_frame_bytes(self) -> [u8; frame_len(0)] {
        let mut frame = [0; frame_len(0)];
        finalize_frame(&mut frame, MSG_GO_TO_MEASUREMENT, &[]);
        frame
    }
}

/// Builder for the SetOutputMode command frame.
#[derive(Debug, Clone, Copy)]
pub struct SetOutputModeBuilder {
    pub mode: OutputMode,
}

impl SetOutputModeBuilder {
    pub fn into_frame_bytes(self) -> [u8; frame_len(2)] {
        let mut frame = [0; frame_len(2)];
        finalize_frame(&mut frame, MSG_SET_OUTPUT_MODE, &self.mode.bits().to_be_bytes());
        frame
    }
}

/// Builder for the SetOutputSettings command frame.
#[derive(Debug, Clone, Copy)]
pub struct SetOutputSettingsBuilder {
    pub settings: OutputSettings,
}

impl SetOutputSettingsBuilder {
    pub fn into_frame_bytes(self) -> [u8; frame_len(4)] {
        let mut frame = [0; frame_len(4)];
        finalize_frame(
            &mut frame,
            MSG_SET_OUTPUT_SETTINGS,
            &self.settings.bits().to_be_bytes(),
        );
        frame
    }
}

/// Builder for the ReqGPSStatus command frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqGpsStatusBuilder;

impl ReqGpsStatusBuilder {
    pub fn into_frame_bytes(self) -> [u8; frame_len(0)] {
        let mut frame = [0; frame_len(0)];
        finalize_frame(&mut frame, MSG_REQ_GPS_STATUS, &[]);
        frame
    }
}

/// Encode an arbitrary `(message_id, payload)` as a complete frame.
///
/// Fails only when the payload exceeds the protocol maximum.
#[cfg(any(feature = "std", feature = "alloc"))]
pub fn frame_bytes(
    message_id: u8,
    payload: &[u8],
) -> Result<alloc::vec::Vec<u8>, crate::error::ParserError> {
    use crate::constants::MAX_PAYLOAD_LEN;

    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(crate::error::ParserError::InvalidPayloadLen {
            declared: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let mut frame = alloc::vec![0; frame_len(payload.len())];
    finalize_frame(&mut frame, message_id, payload);
    Ok(frame)
}
