//! Mercator-Projektion zwischen geographischen und Pixel-Koordinaten.
//!
//! Die Projektion ist eine reine Funktion ihrer Parameter: geographisches
//! Zentrum (Pre-Rotation gegen Antimeridian-Sprünge), Skalierungsfaktor,
//! planare Post-Rotation und Pixel-Translation. Bei Skalierungsfaktor 1
//! wird ein Großkreis-Radiant auf einen Pixel abgebildet.

use super::geo::{wrap_longitude, GeoPoint};
use glam::DVec2;

/// Breiten-Klammer vor der Mercator-Abbildung (ψ divergiert an den Polen).
const MAX_LATITUDE_DEG: f64 = 89.99;
/// Kleinster zulässiger Skalierungsfaktor.
const MIN_SCALE_FACTOR: f64 = 1e-12;

/// Mercator-Streckenfunktion ψ(φ).
fn mercator_psi(lat_deg: f64) -> f64 {
    let lat = lat_deg.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG).to_radians();
    (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln()
}

/// Mercator-Projektion mit Zentrum, Skalierung, Rotation und Translation.
///
/// Die y-Achse zeigt nach unten (Screen-Konvention): nördlich des Zentrums
/// liegende Punkte erhalten kleinere y-Werte.
#[derive(Debug, Clone)]
pub struct MercatorProjection {
    center: GeoPoint,
    scale_factor: f64,
    post_rotation: f64,
    translation: DVec2,
    psi_center: f64,
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl MercatorProjection {
    /// Erstellt eine Projektion mit Zentrum (0, 0) und Skalierung 1.
    pub fn new() -> Self {
        Self {
            center: GeoPoint::default(),
            scale_factor: 1.0,
            post_rotation: 0.0,
            translation: DVec2::ZERO,
            psi_center: 0.0,
        }
    }

    /// Geographisches Zentrum der Projektion.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Setzt das geographische Zentrum.
    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
        self.psi_center = mercator_psi(center.lat);
    }

    /// Aktueller Skalierungsfaktor (Pixel pro Großkreis-Radiant).
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Setzt den Skalierungsfaktor; Werte ≤ 0 werden geklammert.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor.max(MIN_SCALE_FACTOR);
    }

    /// Planare Rotation nach der Projektion (Radiant).
    pub fn post_rotation(&self) -> f64 {
        self.post_rotation
    }

    /// Setzt die planare Rotation (Radiant).
    pub fn set_post_rotation(&mut self, rotation: f64) {
        self.post_rotation = rotation;
    }

    /// Pixel-Translation (Projektionsort des Zentrums).
    pub fn translation(&self) -> DVec2 {
        self.translation
    }

    /// Setzt die Pixel-Translation.
    pub fn set_translation(&mut self, translation: DVec2) {
        self.translation = translation;
    }

    /// Projiziert einen geographischen Punkt auf Pixel-Koordinaten.
    pub fn project(&self, point: &GeoPoint) -> DVec2 {
        let dlon = wrap_longitude(point.lon - self.center.lon).to_radians();
        let x = dlon * self.scale_factor;
        let y = -(mercator_psi(point.lat) - self.psi_center) * self.scale_factor;

        let (sin_r, cos_r) = self.post_rotation.sin_cos();
        DVec2::new(x * cos_r - y * sin_r, x * sin_r + y * cos_r) + self.translation
    }

    /// Invertiert Pixel-Koordinaten zum geographischen Punkt.
    pub fn invert(&self, projected: DVec2) -> GeoPoint {
        let d = projected - self.translation;
        let (sin_r, cos_r) = (-self.post_rotation).sin_cos();
        let x = d.x * cos_r - d.y * sin_r;
        let y = d.x * sin_r + d.y * cos_r;

        let lon = self.center.lon + (x / self.scale_factor).to_degrees();
        let psi = self.psi_center - y / self.scale_factor;
        let lat = (2.0 * psi.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();

        GeoPoint::new(lat, lon)
    }
}
