use std::io::{self, Read};

use clap::{Arg, ArgAction, Command};
use log::{info, warn};
use xsens_mt::{
    GoToConfigBuilder, GoToMeasurementBuilder, OutputMode, OutputSettings, ReqGpsStatusBuilder,
    Session, SetOutputModeBuilder, SetOutputSettingsBuilder, UtmProjector,
    DEFAULT_OUTPUT_MODE, DEFAULT_OUTPUT_SETTINGS,
};

/// WGS-84 transverse Mercator forward projection (Snyder's series), good to
/// centimeters inside a UTM zone.
struct Wgs84Projector;

impl UtmProjector for Wgs84Projector {
    fn utm_of(&self, lat_rad: f64, lon_rad: f64, zone: u8) -> (f64, f64) {
        const A: f64 = 6_378_137.0;
        const F: f64 = 1.0 / 298.257_223_563;
        const K0: f64 = 0.9996;
        let e2 = F * (2.0 - F);
        let ep2 = e2 / (1.0 - e2);
        let lon0 = (f64::from(zone) * 6.0 - 183.0).to_radians();

        let sin_lat = lat_rad.sin();
        let cos_lat = lat_rad.cos();
        let n = A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let t = lat_rad.tan().powi(2);
        let c = ep2 * cos_lat * cos_lat;
        let a = cos_lat * (lon_rad - lon0);

        let m = A
            * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0) * lat_rad
                - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2 * e2 * e2 / 1024.0)
                    * (2.0 * lat_rad).sin()
                + (15.0 * e2 * e2 / 256.0 + 45.0 * e2 * e2 * e2 / 1024.0) * (4.0 * lat_rad).sin()
                - (35.0 * e2 * e2 * e2 / 3072.0) * (6.0 * lat_rad).sin());

        let easting = K0
            * n
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
            + 500_000.0;
        let northing = K0
            * (m + n
                * lat_rad.tan()
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
        (easting, northing)
    }
}

fn hex_dump(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let trimmed = s.trim_start_matches("0x");
    u32::from_str_radix(trimmed, 16).map_err(|e| format!("bad hex value {:?}: {}", s, e))
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let trimmed = s.trim_start_matches("0x");
    u16::from_str_radix(trimmed, 16).map_err(|e| format!("bad hex value {:?}: {}", s, e))
}

fn main() {
    env_logger::init();
    let matches = Command::new("xsens_cli")
        .about("Decode an Xsens MT byte stream from stdin, or emit configuration frames")
        .arg(
            Arg::new("emit-config")
                .long("emit-config")
                .action(ArgAction::SetTrue)
                .help("Print the configuration frame sequence instead of decoding stdin"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .value_name("HEX")
                .help("Output mode register, hex (default 0x1836)"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("HEX")
                .help("Output settings register, hex (default 0x80000C05)"),
        )
        .get_matches();

    let mode = match matches.get_one::<String>("mode") {
        Some(s) => OutputMode::from_bits_retain(parse_hex_u16(s).unwrap()),
        None => DEFAULT_OUTPUT_MODE,
    };
    let settings = match matches.get_one::<String>("settings") {
        Some(s) => OutputSettings::from_bits_retain(parse_hex_u32(s).unwrap()),
        None => DEFAULT_OUTPUT_SETTINGS,
    };

    if matches.get_flag("emit-config") {
        println!("go_to_config:        {}", hex_dump(&GoToConfigBuilder.into_frame_bytes()));
        println!(
            "set_output_mode:     {}",
            hex_dump(&SetOutputModeBuilder { mode }.into_frame_bytes())
        );
        println!(
            "set_output_settings: {}",
            hex_dump(&SetOutputSettingsBuilder { settings }.into_frame_bytes())
        );
        println!(
            "req_gps_status:      {}",
            hex_dump(&ReqGpsStatusBuilder.into_frame_bytes())
        );
        println!(
            "go_to_measurement:   {}",
            hex_dump(&GoToMeasurementBuilder.into_frame_bytes())
        );
        return;
    }

    let mut session = Session::with_config(Wgs84Projector, mode, settings);
    let mut data = Vec::new();
    io::stdin().lock().read_to_end(&mut data).unwrap();
    let started = chrono::Utc::now();
    let frames = session.consume(&data);
    info!(
        "{} bytes, {} frames in {} ms",
        data.len(),
        frames,
        (chrono::Utc::now() - started).num_milliseconds()
    );
    if session.discarded_frames() > 0 {
        warn!("{} frames discarded", session.discarded_frames());
    }
    if session.error_code() != 0 {
        warn!("device reported error {:#04x}", session.error_code());
    }

    let nav = session.nav();
    println!(
        "attitude: phi {:.4} theta {:.4} psi {:.4} rad",
        nav.ins_phi, nav.ins_theta, nav.ins_psi
    );
    println!(
        "rates: p {:.4} q {:.4} r {:.4} rad/s",
        nav.ins_p, nav.ins_q, nav.ins_r
    );
    println!(
        "position: lat {:.7} lon {:.7} deg, utm {} {} cm zone {}",
        f64::from(nav.gps_lat) / 1e7,
        f64::from(nav.gps_lon) / 1e7,
        nav.gps_utm_east,
        nav.gps_utm_north,
        nav.gps_utm_zone
    );
    println!(
        "velocity: vx {:.2} vy {:.2} vz {:.2} m/s, course {} ground_speed {} climb {}",
        nav.ins_vx,
        nav.ins_vy,
        nav.ins_vz,
        nav.course(),
        nav.ground_speed(),
        nav.climb()
    );
    println!(
        "gps: {:?} itow {} sv {} pdop {}",
        nav.gps_mode, nav.gps_itow, nav.gps_num_sv, nav.gps_pdop
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_register_parsing() {
        assert_eq!(parse_hex_u16("0x1836"), Ok(0x1836));
        assert_eq!(parse_hex_u16("1836"), Ok(0x1836));
        assert_eq!(parse_hex_u32("0x80000C05"), Ok(0x8000_0c05));
        // A mode wider than the 16-bit register is an error, not a
        // silent truncation.
        assert!(parse_hex_u16("0x18360").is_err());
        assert!(parse_hex_u16("garbage").is_err());
    }
}
