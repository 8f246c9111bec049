//! Geographische Punkte und Großkreis-Geometrie.
//!
//! Alle Distanzen werden intern in Großkreis-Radiant (great-arc radians)
//! geführt: 1 Radiant entspricht einem Erdradius Bogenlänge. Winkel in
//! Grad, Kurse rechtweisend im Uhrzeigersinn ab Nord.

use glam::DVec3;

/// Erdradius in Metern (äquatorial).
pub const EARTH_RADIUS_METERS: f64 = 6_378_100.0;
/// Meter pro nautischer Meile.
pub const METERS_PER_NM: f64 = 1_852.0;

/// Rechnet nautische Meilen in Großkreis-Radiant um.
pub fn ga_from_nm(nm: f64) -> f64 {
    nm * METERS_PER_NM / EARTH_RADIUS_METERS
}

/// Rechnet Meter in Großkreis-Radiant um.
pub fn ga_from_meters(meters: f64) -> f64 {
    meters / EARTH_RADIUS_METERS
}

/// Rechnet Großkreis-Radiant in Meter um.
pub fn meters_from_ga(ga: f64) -> f64 {
    ga * EARTH_RADIUS_METERS
}

/// Normalisiert eine Länge in den Bereich (-180, 180].
pub fn wrap_longitude(lon: f64) -> f64 {
    let mut wrapped = (lon + 180.0) % 360.0;
    if wrapped <= 0.0 {
        wrapped += 360.0;
    }
    wrapped - 180.0
}

/// Geographischer Punkt in Grad (Breite positiv nach Norden,
/// Länge positiv nach Osten).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    /// Geographische Breite in Grad
    pub lat: f64,
    /// Geographische Länge in Grad
    pub lon: f64,
}

impl GeoPoint {
    /// Erstellt einen Punkt aus Breite/Länge in Grad.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: lat.clamp(-90.0, 90.0),
            lon: wrap_longitude(lon),
        }
    }

    /// Großkreis-Distanz zu einem anderen Punkt in Radiant (Haversine).
    pub fn distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * a.sqrt().min(1.0).asin()
    }

    /// Anfangskurs (rechtweisend, Grad) des Großkreises zu `other`.
    pub fn initial_bearing(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let y = dlon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }

    /// Punkt in `distance` Radiant entlang des Großkreises mit
    /// Anfangskurs `bearing` (Grad). Negative Distanz läuft rückwärts.
    pub fn offset(&self, bearing: f64, distance: f64) -> GeoPoint {
        let (bearing, distance) = if distance < 0.0 {
            ((bearing + 180.0) % 360.0, -distance)
        } else {
            (bearing, distance)
        };

        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let theta = bearing.to_radians();

        let lat2 =
            (lat1.sin() * distance.cos() + lat1.cos() * distance.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * distance.sin() * lat1.cos())
                .atan2(distance.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }

    /// Kartesischer Einheitsvektor (x zum Nullmeridian, z zur Nordachse).
    pub fn to_cartesian(&self) -> DVec3 {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Punkt aus einem kartesischen Richtungsvektor.
    pub fn from_cartesian(v: DVec3) -> Self {
        let v = v.normalize_or_zero();
        if v == DVec3::ZERO {
            return GeoPoint::default();
        }
        GeoPoint::new(v.z.asin().to_degrees(), v.y.atan2(v.x).to_degrees())
    }

    /// Großkreis-Mittelpunkt zwischen zwei Punkten.
    ///
    /// Für (nahezu) antipodale Punkte ist der Mittelpunkt nicht eindeutig;
    /// in dem Fall wird `self` zurückgegeben.
    pub fn midpoint(&self, other: &GeoPoint) -> GeoPoint {
        let sum = self.to_cartesian() + other.to_cartesian();
        if sum.length_squared() < 1e-12 {
            return *self;
        }
        GeoPoint::from_cartesian(sum)
    }

    /// Näherungsgleichheit mit Toleranz in Grad.
    pub fn approx_eq(&self, other: &GeoPoint, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon
            && wrap_longitude(self.lon - other.lon).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_equator_quarter() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 90.0);
        assert_relative_eq!(a.distance(&b), std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = GeoPoint::new(47.26, 11.34);
        let b = GeoPoint::new(40.64, -73.78);
        assert_relative_eq!(a.distance(&b), b.distance(&a), epsilon = 1e-12);
    }

    #[test]
    fn test_initial_bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert_relative_eq!(
            origin.initial_bearing(&GeoPoint::new(1.0, 0.0)),
            0.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            origin.initial_bearing(&GeoPoint::new(0.0, 1.0)),
            90.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            origin.initial_bearing(&GeoPoint::new(-1.0, 0.0)),
            180.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_offset_roundtrip_along_bearing() {
        let start = GeoPoint::new(51.0, 7.0);
        let distance = ga_from_nm(120.0);
        let moved = start.offset(45.0, distance);

        assert_relative_eq!(start.distance(&moved), distance, epsilon = 1e-9);

        // Negativer Offset entlang desselben Anfangskurses führt zurück
        let back = moved.offset(moved.initial_bearing(&start), start.distance(&moved));
        assert!(back.approx_eq(&start, 1e-6));
    }

    #[test]
    fn test_midpoint_lies_on_great_circle() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 90.0);
        let mid = a.midpoint(&b);
        assert_relative_eq!(mid.lat, 0.0, epsilon = 1e-9);
        assert_relative_eq!(mid.lon, 45.0, epsilon = 1e-9);
    }

    #[test]
    fn test_wrap_longitude() {
        assert_relative_eq!(wrap_longitude(190.0), -170.0);
        assert_relative_eq!(wrap_longitude(-190.0), 170.0);
        assert_relative_eq!(wrap_longitude(180.0), 180.0);
    }

    #[test]
    fn test_unit_conversions() {
        assert_relative_eq!(meters_from_ga(ga_from_meters(1234.5)), 1234.5, epsilon = 1e-9);
        assert_relative_eq!(ga_from_nm(1.0) * EARTH_RADIUS_METERS, 1852.0, epsilon = 1e-9);
    }
}
