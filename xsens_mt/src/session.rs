//! Per-link session: one frame assembler, the persistent output
//! mode/settings registers and the navigation-state sink.

use num_traits::Float;

use crate::{
    geodetic::{utm_zone, UtmProjector},
    mt_packets::{
        EulerRef, GpsFix, GpsStatusRef, OrientationMode, OutputMode, OutputSettings, PositionRef,
        QuaternionRef, RawGpsRef, RawInertialRef, StatusRef, TimeStampRef, UtcRef, VectorRef,
        AUX_CHANNEL_LEN, DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS, MATRIX_LEN, MSG_ERROR,
        MSG_GPS_STATUS, MSG_MT_DATA, MSG_OUTPUT_MODE_ACK, MSG_OUTPUT_SETTINGS_ACK, TEMP_LEN,
    },
    navigation::{NavigationState, GPS_NB_CHANNELS},
    parser::{Assembler, Frame},
};

/// Session state for one physical MT link.
///
/// Owns the assembler (one in-progress frame), the two persistent output
/// bitfields and the navigation state the decoder writes into. One instance
/// per link; two redundant sensors need two sessions with nothing shared.
/// The decode pass runs synchronously inside [`handle_byte`](Self::handle_byte)
/// on the byte that completes a frame.
pub struct Session<P> {
    assembler: Assembler,
    projector: P,
    output_mode: OutputMode,
    output_settings: OutputSettings,
    error_code: u8,
    nav: NavigationState,
}

impl<P: UtmProjector> Session<P> {
    /// Session with the default output configuration.
    pub fn new(projector: P) -> Self {
        Self::with_config(projector, DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS)
    }

    /// Session with an explicit output configuration, matching what was (or
    /// will be) sent to the device with the `SetOutput*` builders.
    pub fn with_config(projector: P, mode: OutputMode, settings: OutputSettings) -> Self {
        Self {
            assembler: Assembler::new(),
            projector,
            output_mode: mode,
            output_settings: settings,
            error_code: 0,
            nav: NavigationState::new(),
        }
    }

    /// Feed one byte from the transport. Returns `true` when this byte
    /// completed a frame and the decode pass ran.
    pub fn handle_byte(&mut self, byte: u8) -> bool {
        let Self {
            assembler,
            projector,
            output_mode,
            output_settings,
            error_code,
            nav,
        } = self;
        match assembler.feed(byte) {
            Some(frame) => {
                decode_frame(frame, projector, output_mode, output_settings, error_code, nav);
                true
            },
            None => false,
        }
    }

    /// Feed a byte slice, returning the number of frames decoded.
    pub fn consume(&mut self, bytes: &[u8]) -> usize {
        let mut frames = 0;
        for byte in bytes {
            if self.handle_byte(*byte) {
                frames += 1;
            }
        }
        frames
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn output_settings(&self) -> OutputSettings {
        self.output_settings
    }

    /// Record a locally commanded output mode before the device acks it.
    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Record locally commanded output settings before the device acks them.
    pub fn set_output_settings(&mut self, settings: OutputSettings) {
        self.output_settings = settings;
    }

    /// Last device-reported error code (0 when none).
    pub fn error_code(&self) -> u8 {
        self.error_code
    }

    /// Frames discarded by the assembler since construction.
    pub fn discarded_frames(&self) -> u32 {
        self.assembler.discarded_frames()
    }
}

/// Take the next `len` payload bytes, advancing the running offset.
///
/// `None` when the payload is shorter than the bitmask-derived section
/// widths imply; the caller stops decoding the frame without having read
/// out of bounds.
fn section<'a>(payload: &'a [u8], offset: &mut usize, len: usize) -> Option<&'a [u8]> {
    let end = offset.checked_add(len)?;
    if end > payload.len() {
        return None;
    }
    let data = &payload[*offset..end];
    *offset = end;
    Some(data)
}

fn decode_frame<P: UtmProjector>(
    frame: Frame<'_>,
    projector: &P,
    output_mode: &mut OutputMode,
    output_settings: &mut OutputSettings,
    error_code: &mut u8,
    nav: &mut NavigationState,
) {
    let payload = frame.payload();
    match frame.message_id() {
        MSG_OUTPUT_MODE_ACK => {
            if payload.len() >= 2 {
                *output_mode =
                    OutputMode::from_bits_retain(u16::from_be_bytes([payload[0], payload[1]]));
            }
        },
        MSG_OUTPUT_SETTINGS_ACK => {
            if payload.len() >= 4 {
                *output_settings = OutputSettings::from_bits_retain(u32::from_be_bytes([
                    payload[0], payload[1], payload[2], payload[3],
                ]));
            }
        },
        MSG_ERROR => {
            if let Some(code) = payload.first() {
                *error_code = *code;
            }
        },
        MSG_GPS_STATUS => decode_gps_status(nav, payload),
        MSG_MT_DATA => {
            decode_mt_data(nav, payload, *output_mode, *output_settings, projector);
        },
        // Unrecognized message types are a no-op, not an error.
        _ => {},
    }
}

fn decode_gps_status(nav: &mut NavigationState, payload: &[u8]) {
    let status = GpsStatusRef::new(payload);
    let nch = status.nch();
    nav.gps_nb_channels = nch;
    nav.gps_num_sv = nch;
    for i in 0..usize::from(nch).min(GPS_NB_CHANNELS) {
        let Some(record) = status.channel(i) else {
            break;
        };
        let ch = usize::from(record.chn());
        // A record may target any table slot; out-of-range slots are
        // skipped without aborting the rest of the report.
        if ch >= GPS_NB_CHANNELS {
            continue;
        }
        nav.svinfos[ch].svid = record.svid();
        nav.svinfos[ch].flags = record.bitmask();
        nav.svinfos[ch].qi = record.qi();
        nav.svinfos[ch].cno = record.cnr();
    }
}

/// Walk the MTData payload in canonical section order. Absent sections
/// contribute zero bytes; the offset advances only past present sections.
fn decode_mt_data<P: UtmProjector>(
    nav: &mut NavigationState,
    payload: &[u8],
    mode: OutputMode,
    settings: OutputSettings,
    projector: &P,
) {
    let mut offset = 0;

    if mode.contains(OutputMode::RAW_INERTIAL) {
        let Some(data) = section(payload, &mut offset, RawInertialRef::LEN) else {
            return;
        };
        let raw = RawInertialRef::new(data);
        nav.ins_p = raw.gyr_x();
        nav.ins_q = raw.gyr_y();
        nav.ins_r = raw.gyr_z();
    }

    if mode.contains(OutputMode::RAW_GPS) {
        let Some(data) = section(payload, &mut offset, RawGpsRef::LEN) else {
            return;
        };
        let raw = RawGpsRef::new(data);
        nav.gps_week = 0; // Not carried by the raw GPS block.
        nav.gps_itow = raw.itow().wrapping_mul(10);
        nav.gps_lat = raw.lat();
        nav.gps_lon = raw.lon();
        let lat_deg = f64::from(raw.lat()) / 1e7;
        let lon_deg = f64::from(raw.lon()) / 1e7;
        nav.gps_utm_zone = utm_zone(lon_deg);
        let (utm_x, utm_y) =
            projector.utm_of(lat_deg.to_radians(), lon_deg.to_radians(), nav.gps_utm_zone);
        nav.gps_utm_east = (utm_x * 100.0) as i32;
        nav.gps_utm_north = (utm_y * 100.0) as i32;
        nav.ins_x = utm_x as f32;
        nav.ins_y = utm_y as f32;
        nav.gps_alt = raw.alt() / 10;
        nav.ins_z = -(nav.gps_alt as f32) / 100.0;
        nav.ins_vx = raw.vel_e() as f32 / 100.0;
        nav.ins_vy = raw.vel_n() as f32 / 100.0;
        nav.ins_vz = raw.vel_d() as f32 / 100.0;
        nav.gps_climb_raw = -raw.vel_d() / 10;
        nav.gps_hacc = raw.hacc() / 100;
        nav.gps_sacc = raw.sacc() / 100;
        nav.gps_pdop = 5; // Block carries no DOP; fixed placeholder.
    }

    if mode.contains(OutputMode::TEMP) {
        // Reserved: consumed for width, nothing decoded.
        if section(payload, &mut offset, TEMP_LEN).is_none() {
            return;
        }
    }

    if mode.contains(OutputMode::CALIBRATED) {
        if !settings.contains(OutputSettings::ACC_OUT_DISABLED) {
            let Some(data) = section(payload, &mut offset, VectorRef::LEN) else {
                return;
            };
            let acc = VectorRef::new(data);
            nav.ins_ax = acc.x();
            nav.ins_ay = acc.y();
            nav.ins_az = acc.z();
        }
        if !settings.contains(OutputSettings::GYRO_OUT_DISABLED) {
            let Some(data) = section(payload, &mut offset, VectorRef::LEN) else {
                return;
            };
            let gyr = VectorRef::new(data);
            nav.ins_p = gyr.x();
            nav.ins_q = gyr.y();
            nav.ins_r = gyr.z();
        }
        if !settings.contains(OutputSettings::MAG_OUT_DISABLED) {
            let Some(data) = section(payload, &mut offset, VectorRef::LEN) else {
                return;
            };
            let mag = VectorRef::new(data);
            nav.ins_mx = mag.x();
            nav.ins_my = mag.y();
            nav.ins_mz = mag.z();
        }
    }

    if mode.contains(OutputMode::ORIENTATION) {
        match settings.orientation_mode() {
            OrientationMode::Quaternion => {
                let Some(data) = section(payload, &mut offset, QuaternionRef::LEN) else {
                    return;
                };
                let quat = QuaternionRef::new(data);
                let (q0, q1, q2, q3) = (quat.q0(), quat.q1(), quat.q2(), quat.q3());
                // The three DCM entries needed for a Z-Y-X Euler extraction.
                let dcm00 = 1.0 - 2.0 * (q2 * q2 + q3 * q3);
                let dcm01 = 2.0 * (q1 * q2 + q0 * q3);
                let dcm02 = 2.0 * (q1 * q3 - q0 * q2);
                let dcm12 = 2.0 * (q2 * q3 + q0 * q1);
                let dcm22 = 1.0 - 2.0 * (q1 * q1 + q2 * q2);
                nav.ins_phi = Float::atan2(dcm12, dcm22);
                nav.ins_theta = -Float::asin(dcm02);
                nav.ins_psi = Float::atan2(dcm01, dcm00);
            },
            OrientationMode::Euler => {
                let Some(data) = section(payload, &mut offset, EulerRef::LEN) else {
                    return;
                };
                let euler = EulerRef::new(data);
                nav.ins_phi = euler.roll().to_radians();
                nav.ins_theta = euler.pitch().to_radians();
                nav.ins_psi = euler.yaw().to_radians();
            },
            OrientationMode::Matrix => {
                // Accepted coverage gap: width consumed, nothing decoded,
                // later section offsets stay correct.
                if section(payload, &mut offset, MATRIX_LEN).is_none() {
                    return;
                }
            },
        }
    }

    if mode.contains(OutputMode::AUXILIARY) {
        let mut channels = 0;
        if !settings.contains(OutputSettings::AUX1_OUT_DISABLED) {
            channels += 1;
        }
        if !settings.contains(OutputSettings::AUX2_OUT_DISABLED) {
            channels += 1;
        }
        if section(payload, &mut offset, channels * AUX_CHANNEL_LEN).is_none() {
            return;
        }
    }

    if mode.contains(OutputMode::POSITION) {
        let Some(data) = section(payload, &mut offset, PositionRef::LEN) else {
            return;
        };
        let pos = PositionRef::new(data);
        let (lat, lon) = (pos.lat(), pos.lon());
        nav.gps_lat = (lat * 1e7) as i32;
        nav.gps_lon = (lon * 1e7) as i32;
        nav.gps_utm_zone = utm_zone(f64::from(lon));
        let (utm_x, utm_y) = projector.utm_of(
            f64::from(lat).to_radians(),
            f64::from(lon).to_radians(),
            nav.gps_utm_zone,
        );
        nav.ins_x = utm_x as f32;
        nav.ins_y = utm_y as f32;
        nav.gps_utm_east = (nav.ins_x * 100.0) as i32;
        nav.gps_utm_north = (nav.ins_y * 100.0) as i32;
        nav.ins_z = pos.alt();
        nav.gps_alt = (nav.ins_z * 100.0) as i32;
    }

    if mode.contains(OutputMode::VELOCITY) {
        let Some(data) = section(payload, &mut offset, VectorRef::LEN) else {
            return;
        };
        let vel = VectorRef::new(data);
        nav.ins_vx = vel.x();
        nav.ins_vy = vel.y();
        nav.ins_vz = vel.z();
    }

    if mode.contains(OutputMode::STATUS) {
        let Some(data) = section(payload, &mut offset, StatusRef::LEN) else {
            return;
        };
        let status = StatusRef::new(data).status();
        nav.status_bits = status;
        nav.gps_mode = GpsFix::from_status_byte(status);
    }

    if settings.contains(OutputSettings::TIMESTAMP_SAMPLE) {
        let Some(data) = section(payload, &mut offset, TimeStampRef::LEN) else {
            return;
        };
        let ts = TimeStampRef::new(data).counter();
        nav.time_stamp = ts;
        nav.gps_itow = u32::from(ts);
    }

    if settings.contains(OutputSettings::TIMESTAMP_UTC) {
        let Some(data) = section(payload, &mut offset, UtcRef::LEN) else {
            return;
        };
        let utc = UtcRef::new(data);
        nav.utc.hour = utc.hour();
        nav.utc.min = utc.min();
        nav.utc.sec = utc.sec();
        nav.utc.nanosec = utc.nanosec();
        nav.utc.year = utc.year();
        nav.utc.month = utc.month();
        nav.utc.day = utc.day();
    }
}
