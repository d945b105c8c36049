//! End-to-end decode tests: encoded MTData frames are fed byte-wise through
//! a `Session` and the resulting navigation state is checked.

use byteorder::{BigEndian, WriteBytesExt};
use xsens_mt::{
    navigation::NavigationState, GpsFix, OutputMode, OutputSettings, Session, UtmProjector,
    DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS, MSG_ERROR, MSG_GPS_STATUS, MSG_MT_DATA,
    MSG_OUTPUT_MODE_ACK, MSG_OUTPUT_SETTINGS_ACK, MT_BUS_ID, MT_PREAMBLE,
};

/// Projector returning a fixed point so scaling and routing are observable
/// without real geodesy.
struct FixedUtm;

impl UtmProjector for FixedUtm {
    fn utm_of(&self, _lat_rad: f64, _lon_rad: f64, _zone: u8) -> (f64, f64) {
        (448_251.25, 5_411_932.5)
    }
}

fn encode(message_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![MT_PREAMBLE, MT_BUS_ID, message_id, payload.len() as u8];
    out.extend_from_slice(payload);
    let sum: u8 = out[1..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    out.push(0u8.wrapping_sub(sum));
    out
}

fn raw_gps_payload() -> Vec<u8> {
    let mut wtr = Vec::with_capacity(44);
    wtr.write_u16::<BigEndian>(10132).unwrap(); // press
    wtr.write_u8(0).unwrap(); // press age
    wtr.write_u32::<BigEndian>(25_500).unwrap(); // itow, 10 ms units
    wtr.write_i32::<BigEndian>(488_563_210).unwrap(); // lat, 1e-7 deg
    wtr.write_i32::<BigEndian>(22_876_540).unwrap(); // lon, 1e-7 deg
    wtr.write_i32::<BigEndian>(152_430).unwrap(); // alt, mm
    wtr.write_i32::<BigEndian>(310).unwrap(); // vel N, cm/s
    wtr.write_i32::<BigEndian>(-120).unwrap(); // vel E, cm/s
    wtr.write_i32::<BigEndian>(-50).unwrap(); // vel D, cm/s
    wtr.write_u32::<BigEndian>(250).unwrap(); // hacc, cm
    wtr.write_u32::<BigEndian>(400).unwrap(); // vacc, cm
    wtr.write_u32::<BigEndian>(30).unwrap(); // sacc, cm/s
    wtr.write_u8(0).unwrap(); // gps age
    wtr
}

fn session_with(mode: OutputMode, settings: OutputSettings) -> Session<FixedUtm> {
    Session::with_config(FixedUtm, mode, settings)
}

#[test]
fn raw_inertial_updates_rates_only() {
    let mut payload = vec![];
    for v in [
        0.1f32, 0.2, 9.8, // acc
        0.01, -0.02, 0.03, // gyr
        0.4, 0.5, 0.6, // mag
    ] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let mut session = session_with(OutputMode::RAW_INERTIAL, OutputSettings::empty());
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    assert_eq!(nav.ins_p, 0.01);
    assert_eq!(nav.ins_q, -0.02);
    assert_eq!(nav.ins_r, 0.03);
    // Raw accelerometer/magnetometer stay out of the calibrated slots.
    assert_eq!(nav.ins_ax, 0.0);
    assert_eq!(nav.ins_mx, 0.0);
}

#[test]
fn raw_gps_scales_into_navigation_units() {
    let mut session = session_with(OutputMode::RAW_GPS, OutputSettings::empty());
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &raw_gps_payload())), 1);
    let nav = session.nav();
    assert_eq!(nav.gps_itow, 255_000); // ms
    assert_eq!(nav.gps_week, 0);
    assert_eq!(nav.gps_lat, 488_563_210);
    assert_eq!(nav.gps_lon, 22_876_540);
    assert_eq!(nav.gps_utm_zone, 31); // lon 2.29 deg
    assert_eq!(nav.gps_utm_east, 44_825_125); // cm
    assert_eq!(nav.gps_utm_north, 541_193_250); // cm
    assert_eq!(nav.ins_x, 448_251.25);
    assert_eq!(nav.ins_y, 5_411_932.5);
    assert_eq!(nav.gps_alt, 15_243); // cm
    assert_eq!(nav.ins_z, -152.43);
    assert_eq!(nav.ins_vx, -1.2); // east
    assert_eq!(nav.ins_vy, 3.1); // north
    assert_eq!(nav.ins_vz, -0.5); // down
    assert_eq!(nav.gps_climb_raw, 5);
    assert_eq!(nav.gps_hacc, 2);
    assert_eq!(nav.gps_sacc, 0);
    assert_eq!(nav.gps_pdop, 5);
}

#[test]
fn quaternion_identity_decodes_to_level_attitude() {
    let mut payload = vec![];
    for v in [1.0f32, 0.0, 0.0, 0.0] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let mut session = session_with(OutputMode::ORIENTATION, OutputSettings::empty());
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    assert_eq!(nav.ins_phi, 0.0);
    assert_eq!(nav.ins_theta, 0.0);
    assert_eq!(nav.ins_psi, 0.0);
}

#[test]
fn quaternion_yaw_rotation_decodes_to_heading() {
    let h = core::f32::consts::FRAC_1_SQRT_2;
    let mut payload = vec![];
    for v in [h, 0.0, 0.0, h] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let mut session = session_with(OutputMode::ORIENTATION, OutputSettings::empty());
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    assert!(nav.ins_phi.abs() < 1e-6);
    assert!(nav.ins_theta.abs() < 1e-6);
    assert!((nav.ins_psi - core::f32::consts::FRAC_PI_2).abs() < 1e-6);
}

#[test]
fn euler_section_converts_degrees_to_radians() {
    let mut payload = vec![];
    for v in [10.0f32, -5.0, 90.0] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let settings = OutputSettings::ORIENTATION_MODE_EULER;
    let mut session = session_with(OutputMode::ORIENTATION, settings);
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    assert!((nav.ins_phi - 10.0f32.to_radians()).abs() < 1e-6);
    assert!((nav.ins_theta - (-5.0f32).to_radians()).abs() < 1e-6);
    assert!((nav.ins_psi - 90.0f32.to_radians()).abs() < 1e-6);
}

#[test]
fn calibrated_thirds_pack_when_acc_is_suppressed() {
    // Only gyro and mag present: 24 bytes, packed back to back.
    let mut payload = vec![];
    for v in [0.5f32, 0.6, 0.7, 0.8, 0.9, 1.0] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let settings = OutputSettings::ACC_OUT_DISABLED;
    let mut session = session_with(OutputMode::CALIBRATED, settings);
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    assert_eq!(nav.ins_ax, 0.0);
    assert_eq!((nav.ins_p, nav.ins_q, nav.ins_r), (0.5, 0.6, 0.7));
    assert_eq!((nav.ins_mx, nav.ins_my, nav.ins_mz), (0.8, 0.9, 1.0));
}

#[test]
fn status_byte_routes_fix_quality() {
    let mut session = session_with(OutputMode::STATUS, OutputSettings::empty());
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &[0x04])), 1);
    assert_eq!(session.nav().gps_mode, GpsFix::Fix3D);
    assert_eq!(session.nav().status_bits, 0x04);
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &[0x02])), 1);
    assert_eq!(session.nav().gps_mode, GpsFix::EstimatorValid);
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &[0x00])), 1);
    assert_eq!(session.nav().gps_mode, GpsFix::NoFix);
}

#[test]
fn default_configuration_decodes_combined_frame() {
    // Canonical section order under the default registers:
    // RawGPS, Calibrated, Euler, Position, Velocity, Status, TimeStamp.
    let mut payload = raw_gps_payload();
    for v in [
        0.1f32, 0.2, 9.8, // acc
        0.01, 0.02, 0.03, // gyr
        0.4, 0.5, 0.6, // mag
    ] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    for v in [0.0f32, 0.0, 45.0] {
        payload.write_f32::<BigEndian>(v).unwrap(); // euler, degrees
    }
    // Exactly representable values so the scaled integers are exact.
    for v in [48.5f32, 2.5, 152.5] {
        payload.write_f32::<BigEndian>(v).unwrap(); // position
    }
    for v in [1.5f32, -2.5, 0.25] {
        payload.write_f32::<BigEndian>(v).unwrap(); // velocity
    }
    payload.push(0x04); // status
    payload.write_u16::<BigEndian>(5_123).unwrap(); // sample counter

    let mut session = session_with(DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS);
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    let nav = session.nav();
    // Raw GPS came first, Position overwrote its geodetic fields.
    assert_eq!(nav.gps_lat, 485_000_000);
    assert_eq!(nav.gps_lon, 25_000_000);
    assert_eq!(nav.ins_z, 152.5);
    assert_eq!(nav.gps_alt, 15_250);
    assert_eq!((nav.ins_ax, nav.ins_ay, nav.ins_az), (0.1, 0.2, 9.8));
    assert_eq!((nav.ins_p, nav.ins_q, nav.ins_r), (0.01, 0.02, 0.03));
    assert_eq!(nav.ins_phi, 0.0);
    assert!((nav.ins_psi - 45.0f32.to_radians()).abs() < 1e-6);
    // Velocity section overwrote the raw GPS velocity.
    assert_eq!((nav.ins_vx, nav.ins_vy, nav.ins_vz), (1.5, -2.5, 0.25));
    assert_eq!(nav.gps_mode, GpsFix::Fix3D);
    assert_eq!(nav.time_stamp, 5_123);
    assert_eq!(nav.gps_itow, 5_123);
}

#[test]
fn truncated_payload_stops_cleanly() {
    // Orientation enabled but only half a quaternion present.
    let mut payload = vec![];
    for v in [1.0f32, 0.0] {
        payload.write_f32::<BigEndian>(v).unwrap();
    }
    let mut session = session_with(
        OutputMode::ORIENTATION | OutputMode::STATUS,
        OutputSettings::empty(),
    );
    assert_eq!(session.consume(&encode(MSG_MT_DATA, &payload)), 1);
    // Nothing decoded, nothing panicked.
    assert_eq!(session.nav().ins_phi, 0.0);
    assert_eq!(session.nav().gps_mode, GpsFix::NoFix);
}

#[test]
fn gps_status_report_fills_channel_table() {
    let mut payload = vec![4u8];
    payload.extend_from_slice(&[0, 12, 0x01, 7, 45]);
    payload.extend_from_slice(&[3, 25, 0x01, 6, 38]);
    // Slot beyond the table: skipped, rest still applies.
    payload.extend_from_slice(&[200, 1, 0x01, 1, 10]);
    payload.extend_from_slice(&[15, 31, 0x00, 2, 20]);
    let mut session = session_with(DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS);
    assert_eq!(session.consume(&encode(MSG_GPS_STATUS, &payload)), 1);
    let nav = session.nav();
    assert_eq!(nav.gps_nb_channels, 4);
    assert_eq!(nav.gps_num_sv, 4);
    assert_eq!(nav.svinfos[0].svid, 12);
    assert_eq!(nav.svinfos[0].cno, 45);
    assert_eq!(nav.svinfos[3].svid, 25);
    assert_eq!(nav.svinfos[15].svid, 31);
    assert_eq!(nav.svinfos[15].qi, 2);
}

#[test]
fn acks_update_session_registers() {
    let mut session = session_with(DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS);
    assert_eq!(session.consume(&encode(MSG_OUTPUT_MODE_ACK, &[0x40, 0x04])), 1);
    assert_eq!(
        session.output_mode(),
        OutputMode::RAW_INERTIAL | OutputMode::ORIENTATION
    );
    assert_eq!(
        session.consume(&encode(MSG_OUTPUT_SETTINGS_ACK, &[0x80, 0x00, 0x00, 0x01])),
        1
    );
    assert_eq!(
        session.output_settings(),
        OutputSettings::NED | OutputSettings::TIMESTAMP_SAMPLE
    );
}

#[test]
fn error_frame_records_code() {
    let mut session = session_with(DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS);
    assert_eq!(session.error_code(), 0);
    assert_eq!(session.consume(&encode(MSG_ERROR, &[0x21])), 1);
    assert_eq!(session.error_code(), 0x21);
}

#[test]
fn unknown_message_is_ignored() {
    let mut session = session_with(DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS);
    assert_eq!(session.consume(&encode(0x3e, &[1, 2, 3])), 1);
    let untouched = NavigationState::new();
    assert_eq!(session.nav().gps_lat, untouched.gps_lat);
    assert_eq!(session.discarded_frames(), 0);
}

#[test]
fn corrupted_frame_counts_as_discarded() {
    let mut session = session_with(OutputMode::STATUS, OutputSettings::empty());
    let mut bad = encode(MSG_MT_DATA, &[0x04]);
    let n = bad.len();
    bad[n - 1] ^= 0xff;
    assert_eq!(session.consume(&bad), 0);
    assert_eq!(session.discarded_frames(), 1);
    assert_eq!(session.nav().gps_mode, GpsFix::NoFix);
}
