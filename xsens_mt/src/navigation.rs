//! Shared navigation state written by the decoder and read by the
//! estimator/navigation consumers.

use num_traits::Float;

use crate::mt_packets::GpsFix;

/// Capacity of the GPS channel table.
pub const GPS_NB_CHANNELS: usize = 16;

/// One GPS channel slot.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvInfo {
    /// Satellite identifier.
    pub svid: u8,
    /// Per-channel status bitmask.
    pub flags: u8,
    /// Quality indicator.
    pub qi: u8,
    /// Carrier-to-noise ratio, dBHz.
    pub cno: u8,
}

/// Decoded UTC time fields, copied verbatim from the UTC payload section.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UtcTime {
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub nanosec: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Navigation state sink.
///
/// The decoder overwrites these fields one at a time as frames arrive; there
/// is no snapshot guarantee across fields within one decode pass. A consumer
/// reading mid-decode may observe, for example, a position from the current
/// frame next to a velocity from the previous one. Consumers tolerate this
/// by contract; do not add locking here.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct NavigationState {
    /// Roll, radians.
    pub ins_phi: f32,
    /// Pitch, radians.
    pub ins_theta: f32,
    /// Yaw, radians.
    pub ins_psi: f32,

    /// Body rates, rad/s.
    pub ins_p: f32,
    pub ins_q: f32,
    pub ins_r: f32,

    /// Body accelerations, m/s^2.
    pub ins_ax: f32,
    pub ins_ay: f32,
    pub ins_az: f32,

    /// Magnetic field vector, arbitrary units.
    pub ins_mx: f32,
    pub ins_my: f32,
    pub ins_mz: f32,

    /// Local position: UTM easting/northing in meters, z down-positive-up
    /// depending on the section that produced it.
    pub ins_x: f32,
    pub ins_y: f32,
    pub ins_z: f32,

    /// Velocity, m/s.
    pub ins_vx: f32,
    pub ins_vy: f32,
    pub ins_vz: f32,

    pub gps_mode: GpsFix,
    /// GPS time of week, ms.
    pub gps_itow: u32,
    pub gps_week: u16,
    /// Latitude/longitude, 1e-7 degrees.
    pub gps_lat: i32,
    pub gps_lon: i32,
    /// Altitude, cm.
    pub gps_alt: i32,
    /// UTM easting/northing, cm.
    pub gps_utm_east: i32,
    pub gps_utm_north: i32,
    pub gps_utm_zone: u8,
    /// Horizontal position accuracy, m.
    pub gps_hacc: u32,
    /// Speed accuracy, m/s.
    pub gps_sacc: u32,
    pub gps_pdop: u16,
    /// Raw-GPS climb rate, mm/s (vendor scaling preserved).
    pub gps_climb_raw: i32,

    /// Channels the last status report declared.
    pub gps_nb_channels: u8,
    pub gps_num_sv: u8,
    pub svinfos: [SvInfo; GPS_NB_CHANNELS],

    /// Raw MTData status byte.
    pub status_bits: u8,
    /// Sample-counter timestamp from the last frame that carried one.
    pub time_stamp: u16,
    pub utc: UtcTime,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            ins_phi: 0.0,
            ins_theta: 0.0,
            ins_psi: 0.0,
            ins_p: 0.0,
            ins_q: 0.0,
            ins_r: 0.0,
            ins_ax: 0.0,
            ins_ay: 0.0,
            ins_az: 0.0,
            ins_mx: 0.0,
            ins_my: 0.0,
            ins_mz: 0.0,
            ins_x: 0.0,
            ins_y: 0.0,
            ins_z: 0.0,
            ins_vx: 0.0,
            ins_vy: 0.0,
            ins_vz: 0.0,
            gps_mode: GpsFix::NoFix,
            gps_itow: 0,
            gps_week: 0,
            gps_lat: 0,
            gps_lon: 0,
            gps_alt: 0,
            gps_utm_east: 0,
            gps_utm_north: 0,
            gps_utm_zone: 0,
            gps_hacc: 0,
            gps_sacc: 0,
            gps_pdop: 0,
            gps_climb_raw: 0,
            gps_nb_channels: 0,
            gps_num_sv: 0,
            svinfos: [SvInfo::default(); GPS_NB_CHANNELS],
            status_bits: 0,
            time_stamp: 0,
            utc: UtcTime::default(),
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ground track from horizontal velocity, tenths of a degree.
    pub fn course(&self) -> i16 {
        (Float::atan2(self.ins_vx, self.ins_vy).to_degrees() * 10.0) as i16
    }

    /// Climb rate from vertical velocity, cm/s, positive up.
    pub fn climb(&self) -> i16 {
        (-self.ins_vz * 100.0) as i16
    }

    /// Ground speed from horizontal velocity, cm/s.
    pub fn ground_speed(&self) -> u16 {
        (Float::sqrt(self.ins_vx * self.ins_vx + self.ins_vy * self.ins_vy) * 100.0) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ground_track_quantities() {
        let mut nav = NavigationState::new();
        nav.ins_vx = 3.0;
        nav.ins_vy = 4.0;
        nav.ins_vz = -1.5;
        assert_eq!(nav.ground_speed(), 500);
        assert_eq!(nav.climb(), 150);
        // atan2(3, 4) = 36.87 deg.
        assert_eq!(nav.course(), 368);
    }

    #[test]
    fn default_state_is_zeroed() {
        let nav = NavigationState::default();
        assert_eq!(nav.gps_mode, GpsFix::NoFix);
        assert_eq!(nav.ground_speed(), 0);
        assert_eq!(nav.svinfos[GPS_NB_CHANNELS - 1], SvInfo::default());
    }
}
