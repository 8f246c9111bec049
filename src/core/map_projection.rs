//! Projektions-Parametermodell der Moving Map.
//!
//! `MapProjection` besitzt die pro Frame veränderlichen Parameter
//! (Target, Range, Rotation, Target-Offset, Fenstergröße) und hält die
//! Mercator-Projektion dazu konsistent: Das Target landet beim Punkt
//! Fenstermitte + Offset, und die Distanz zwischen den beiden
//! Range-Endpunkten entspricht exakt der eingestellten Range.

use super::geo::GeoPoint;
use super::geo_projection::MercatorProjection;
use glam::DVec2;

/// Kleinste zulässige Range in Großkreis-Radiant (~0.6 m).
const MIN_RANGE: f64 = 1e-7;
/// Maximale Iterationen der Skalierungsfaktor-Konvergenz.
const SCALE_FACTOR_MAX_ITER: u32 = 20;
/// Konvergenz-Toleranz des Range-Verhältnisses.
const SCALE_FACTOR_TOLERANCE: f64 = 1e-6;

/// Teil-Parametersatz für `MapProjection::set`.
/// Nicht gesetzte Felder bleiben unverändert.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionParams {
    /// Geographisches Target
    pub target: Option<GeoPoint>,
    /// Range zwischen den Range-Endpunkten (Großkreis-Radiant)
    pub range: Option<f64>,
    /// Planare Rotation (Radiant)
    pub rotation: Option<f64>,
    /// Pixel-Offset des Targets relativ zur Fenstermitte
    pub target_projected_offset: Option<DVec2>,
    /// Fenstergröße in Pixeln
    pub projected_size: Option<DVec2>,
    /// Range-Endpunkte [relX1, relY1, relX2, relY2] in Fensteranteilen
    pub range_endpoints: Option<[f64; 4]>,
}

impl ProjectionParams {
    /// Überschreibt gesetzte Felder mit denen aus `other`.
    fn merge(&mut self, other: &ProjectionParams) {
        if other.target.is_some() {
            self.target = other.target;
        }
        if other.range.is_some() {
            self.range = other.range;
        }
        if other.rotation.is_some() {
            self.rotation = other.rotation;
        }
        if other.target_projected_offset.is_some() {
            self.target_projected_offset = other.target_projected_offset;
        }
        if other.projected_size.is_some() {
            self.projected_size = other.projected_size;
        }
        if other.range_endpoints.is_some() {
            self.range_endpoints = other.range_endpoints;
        }
    }
}

/// Änderungsflags eines `set`-Aufrufs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionChanges {
    /// Target geändert
    pub target: bool,
    /// Geographisches Fensterzentrum geändert
    pub center: bool,
    /// Projizierte Target-Position geändert
    pub target_projected: bool,
    /// Range geändert
    pub range: bool,
    /// Range-Endpunkte geändert
    pub range_endpoints: bool,
    /// Skalierungsfaktor geändert
    pub scale_factor: bool,
    /// Rotation geändert
    pub rotation: bool,
    /// Fenstergröße geändert
    pub projected_size: bool,
    /// Auflösung (Radiant pro Pixel) geändert
    pub projected_resolution: bool,
}

impl ProjectionChanges {
    /// Ob irgendein Parameter geändert wurde.
    pub fn any(&self) -> bool {
        self.target
            || self.center
            || self.target_projected
            || self.range
            || self.range_endpoints
            || self.scale_factor
            || self.rotation
            || self.projected_size
            || self.projected_resolution
    }
}

/// Schnappschuss der Parameter für die Änderungs-Erkennung.
#[derive(Debug, Clone, Copy)]
struct ParameterSnapshot {
    target: GeoPoint,
    center: GeoPoint,
    target_projected: DVec2,
    range: f64,
    range_endpoints: [f64; 4],
    scale_factor: f64,
    rotation: f64,
    projected_size: DVec2,
    projected_resolution: f64,
}

/// Projektionsmodell der Moving Map.
#[derive(Debug, Clone)]
pub struct MapProjection {
    geo: MercatorProjection,

    // einstellbare Parameter
    target: GeoPoint,
    target_projected_offset: DVec2,
    range: f64,
    range_endpoints: [f64; 4],
    projected_size: DVec2,

    // abgeleitete Parameter
    target_projected: DVec2,
    center: GeoPoint,
    center_projected: DVec2,
    projected_range: f64,
    width_range: f64,
    height_range: f64,

    queued: ProjectionParams,
    update_queued: bool,
}

impl MapProjection {
    /// Erstellt eine Projektion für ein Fenster gegebener Pixelgröße.
    pub fn new(projected_width: f64, projected_height: f64) -> Self {
        let projected_size = DVec2::new(projected_width, projected_height);
        let center_projected = projected_size / 2.0;

        let mut geo = MercatorProjection::new();
        geo.set_translation(center_projected);

        let mut projection = Self {
            geo,
            target: GeoPoint::default(),
            target_projected_offset: DVec2::ZERO,
            range: 1.0,
            // Standard: Range von Fenstermitte-oben bis Fenstermitte-unten
            range_endpoints: [0.5, 0.0, 0.5, 1.0],
            projected_size,
            target_projected: center_projected,
            center: GeoPoint::default(),
            center_projected,
            projected_range: 0.0,
            width_range: 0.0,
            height_range: 0.0,
            queued: ProjectionParams::default(),
            update_queued: false,
        };
        projection.recompute();
        projection
    }

    // ── Getter ──────────────────────────────────────────────────────

    /// Geographisches Target.
    pub fn target(&self) -> GeoPoint {
        self.target
    }

    /// Pixel-Offset des Targets relativ zur Fenstermitte.
    pub fn target_projected_offset(&self) -> DVec2 {
        self.target_projected_offset
    }

    /// Projizierte Target-Position (Fenstermitte + Offset).
    pub fn target_projected(&self) -> DVec2 {
        self.target_projected
    }

    /// Range zwischen den Range-Endpunkten in Großkreis-Radiant.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Range-Endpunkte in relativen Fensterkoordinaten.
    pub fn range_endpoints(&self) -> [f64; 4] {
        self.range_endpoints
    }

    /// Range über die Fensterbreite (Mitte-links bis Mitte-rechts).
    pub fn width_range(&self) -> f64 {
        self.width_range
    }

    /// Range über die Fensterhöhe (Mitte-oben bis Mitte-unten).
    pub fn height_range(&self) -> f64 {
        self.height_range
    }

    /// Aktueller Skalierungsfaktor der Mercator-Projektion.
    pub fn scale_factor(&self) -> f64 {
        self.geo.scale_factor()
    }

    /// Planare Rotation in Radiant.
    pub fn rotation(&self) -> f64 {
        self.geo.post_rotation()
    }

    /// Fenstergröße in Pixeln.
    pub fn projected_size(&self) -> DVec2 {
        self.projected_size
    }

    /// Geographischer Punkt in der Fenstermitte.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Fenstermitte in Pixeln.
    pub fn center_projected(&self) -> DVec2 {
        self.center_projected
    }

    /// Mittlere Auflösung in Großkreis-Radiant pro Pixel entlang der
    /// Strecke zwischen den Range-Endpunkten.
    pub fn projected_resolution(&self) -> f64 {
        if self.projected_range <= 0.0 {
            return 0.0;
        }
        self.range / self.projected_range
    }

    // ── Projektion ──────────────────────────────────────────────────

    /// Projiziert einen geographischen Punkt auf Pixel-Koordinaten.
    pub fn project(&self, point: &GeoPoint) -> DVec2 {
        self.geo.project(point)
    }

    /// Invertiert Pixel-Koordinaten zum geographischen Punkt.
    pub fn invert(&self, projected: DVec2) -> GeoPoint {
        self.geo.invert(projected)
    }

    /// Prüft, ob ein projizierter Punkt innerhalb der Grenzen liegt
    /// (`bounds` als [links, oben, rechts, unten]; Standard: Fenster).
    pub fn is_in_projected_bounds(&self, projected: DVec2, bounds: Option<[f64; 4]>) -> bool {
        let [left, top, right, bottom] = bounds.unwrap_or([
            0.0,
            0.0,
            self.projected_size.x,
            self.projected_size.y,
        ]);
        projected.x >= left && projected.x <= right && projected.y >= top && projected.y <= bottom
    }

    /// Großkreis-Distanz zweier Pixel-Positionen in Radiant.
    pub fn geo_distance(&self, a: DVec2, b: DVec2) -> f64 {
        self.invert(a).distance(&self.invert(b))
    }

    /// Euklidische Pixel-Distanz zweier geographischer Punkte.
    pub fn projected_distance(&self, a: &GeoPoint, b: &GeoPoint) -> f64 {
        self.project(a).distance(self.project(b))
    }

    // ── Parameter setzen ────────────────────────────────────────────

    /// Setzt Parameter und berechnet die Projektion neu.
    /// Gibt die Änderungsflags gegenüber dem vorherigen Zustand zurück.
    pub fn set(&mut self, params: &ProjectionParams) -> ProjectionChanges {
        let old = self.snapshot();

        if let Some(size) = params.projected_size {
            self.set_projected_size(size);
        }
        if let Some(target) = params.target {
            self.target = target;
        }
        if let Some(offset) = params.target_projected_offset {
            self.set_target_projected_offset(offset);
        }
        if let Some(range) = params.range {
            self.range = range.max(MIN_RANGE);
        }
        if let Some(endpoints) = params.range_endpoints {
            self.range_endpoints = endpoints;
        }
        if let Some(rotation) = params.rotation {
            self.geo.set_post_rotation(rotation);
        }

        self.recompute();
        self.change_flags(&old)
    }

    /// Merkt Parameteränderungen für `apply_queued` vor.
    /// Mehrere Aufrufe innerhalb eines Frames werden zusammengefasst.
    pub fn set_queued(&mut self, params: &ProjectionParams) {
        self.queued.merge(params);
        self.update_queued = true;
    }

    /// Wendet vorgemerkte Parameteränderungen an, falls vorhanden.
    pub fn apply_queued(&mut self) -> ProjectionChanges {
        if !self.update_queued {
            return ProjectionChanges::default();
        }
        self.update_queued = false;
        let params = std::mem::take(&mut self.queued);
        self.set(&params)
    }

    fn set_projected_size(&mut self, size: DVec2) {
        self.projected_size = size;
        self.center_projected = size / 2.0;
        self.geo.set_translation(self.center_projected);
        self.target_projected = self.center_projected + self.target_projected_offset;
    }

    fn set_target_projected_offset(&mut self, offset: DVec2) {
        self.target_projected_offset = offset;
        self.target_projected = self.center_projected + self.target_projected_offset;
    }

    // ── Neuberechnung ───────────────────────────────────────────────

    /// Range, die sich bei hypothetischer Fenstermitte `center_projected`
    /// zwischen den Range-Endpunkten ergibt.
    fn range_at_center(&self, center_projected: DVec2) -> f64 {
        let [x1, y1, x2, y2] = self.range_endpoints;
        let e1 = DVec2::new(
            center_projected.x + self.projected_size.x * (x1 - 0.5),
            center_projected.y + self.projected_size.y * (y1 - 0.5),
        );
        let e2 = DVec2::new(
            center_projected.x + self.projected_size.x * (x2 - 0.5),
            center_projected.y + self.projected_size.y * (y2 - 0.5),
        );
        self.geo.invert(e1).distance(&self.geo.invert(e2))
    }

    /// Konvergiert den Skalierungsfaktor, bis die gemessene Range der
    /// eingestellten entspricht, und richtet das Zentrum neu aus.
    /// Konvergiert empirisch in unter 4 Iterationen.
    fn recompute(&mut self) {
        let mut target_projected = self.geo.project(&self.target);
        if !target_projected.is_finite() {
            return;
        }

        let mut center_projected = target_projected - self.target_projected_offset;
        let mut current_range = self.range_at_center(center_projected);
        let mut ratio = current_range / self.range;
        if !ratio.is_finite() || ratio == 0.0 {
            return;
        }

        let mut iterations = 0;
        let mut ratio_error = (ratio - 1.0).abs();
        let mut delta_ratio_error = SCALE_FACTOR_TOLERANCE + 1.0;
        while iterations < SCALE_FACTOR_MAX_ITER
            && ratio_error > SCALE_FACTOR_TOLERANCE
            && delta_ratio_error > SCALE_FACTOR_TOLERANCE
        {
            self.geo.set_scale_factor(ratio * self.geo.scale_factor());
            target_projected = self.geo.project(&self.target);
            center_projected = target_projected - self.target_projected_offset;
            current_range = self.range_at_center(center_projected);
            ratio = current_range / self.range;

            let new_ratio_error = (ratio - 1.0).abs();
            delta_ratio_error = (new_ratio_error - ratio_error).abs();
            ratio_error = new_ratio_error;
            iterations += 1;
        }

        // Zentrum so wählen, dass das Target auf Fenstermitte + Offset fällt
        self.center = self.geo.invert(center_projected);
        self.geo.set_center(self.center);
        self.target_projected = self.center_projected + self.target_projected_offset;

        let width = self.projected_size.x;
        let height = self.projected_size.y;
        let [x1, y1, x2, y2] = self.range_endpoints;
        self.projected_range = ((x2 - x1) * width).hypot((y2 - y1) * height);

        self.width_range = self.geo_distance(
            DVec2::new(0.0, height / 2.0),
            DVec2::new(width, height / 2.0),
        );
        self.height_range = self.geo_distance(
            DVec2::new(width / 2.0, 0.0),
            DVec2::new(width / 2.0, height),
        );
    }

    fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            target: self.target,
            center: self.center,
            target_projected: self.target_projected,
            range: self.range,
            range_endpoints: self.range_endpoints,
            scale_factor: self.geo.scale_factor(),
            rotation: self.geo.post_rotation(),
            projected_size: self.projected_size,
            projected_resolution: self.projected_resolution(),
        }
    }

    fn change_flags(&self, old: &ParameterSnapshot) -> ProjectionChanges {
        ProjectionChanges {
            target: old.target != self.target,
            center: old.center != self.center,
            target_projected: old.target_projected != self.target_projected,
            range: old.range != self.range,
            range_endpoints: old.range_endpoints != self.range_endpoints,
            scale_factor: old.scale_factor != self.geo.scale_factor(),
            rotation: old.rotation != self.geo.post_rotation(),
            projected_size: old.projected_size != self.projected_size,
            projected_resolution: old.projected_resolution != self.projected_resolution(),
        }
    }
}
