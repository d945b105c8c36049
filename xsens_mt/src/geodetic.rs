//! Seam to the geodetic coordinate-transform collaborator.

/// Planar UTM projection capability, injected into a
/// [`Session`](crate::Session).
///
/// Zone-boundary and datum behavior are the implementor's contract; the
/// decoder only forwards the zone it estimated from longitude.
pub trait UtmProjector {
    /// Project a geodetic coordinate (radians) into UTM `zone`, returning
    /// `(easting, northing)` in meters.
    fn utm_of(&self, lat_rad: f64, lon_rad: f64, zone: u8) -> (f64, f64);
}

impl<T: UtmProjector + ?Sized> UtmProjector for &T {
    fn utm_of(&self, lat_rad: f64, lon_rad: f64, zone: u8) -> (f64, f64) {
        (**self).utm_of(lat_rad, lon_rad, zone)
    }
}

/// Integer UTM zone estimate from longitude in degrees.
pub fn utm_zone(lon_deg: f64) -> u8 {
    ((lon_deg + 180.0) / 6.0) as u8 + 1
}
