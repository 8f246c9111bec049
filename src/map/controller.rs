//! Range-, Target- und Rotations-Steuerung der Moving Map.
//!
//! Der Controller besitzt die Projektions-Parameter (Target, Range,
//! Rotation, Target-Offset) und schreibt sie einmal pro Frame in die
//! `MapProjection`. Alle Eingänge (Range-Stufe, Dead-Zone, Orientierung,
//! Aircraft-Daten, Pointer) setzen nur Dirty-Flags; die eigentliche
//! Geometriearbeit passiert gesammelt in `update()`.

use super::pointer::PointerState;
use crate::core::geo::ga_from_nm;
use crate::core::{GeoPoint, MapProjection, ProjectionChanges, ProjectionParams};
use crate::shared::MapOptions;
use glam::DVec2;

/// Dead-Zone: Display-Ränder, die von Chrome überdeckt werden und aus
/// allen Nutzflächen-Berechnungen herausfallen (Pixel).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeadZone {
    /// Linker Rand
    pub left: f64,
    /// Oberer Rand
    pub top: f64,
    /// Rechter Rand
    pub right: f64,
    /// Unterer Rand
    pub bottom: f64,
}

impl DeadZone {
    /// Dead-Zone ohne Ränder.
    pub const ZERO: DeadZone = DeadZone {
        left: 0.0,
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
    };

    /// Erstellt eine Dead-Zone aus vier Rändern.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Klammert die Ränder so, dass eine positive Nutzfläche bleibt.
    pub fn clamped_to(&self, size: DVec2) -> DeadZone {
        let clamp_pair = |a: f64, b: f64, extent: f64| {
            let a = a.clamp(0.0, extent);
            let b = b.clamp(0.0, extent);
            if a + b >= extent {
                // Ränder größer als das Fenster → proportional stauchen
                let scale = (extent * 0.5) / (a + b).max(1e-9);
                (a * scale, b * scale)
            } else {
                (a, b)
            }
        };
        let (left, right) = clamp_pair(self.left, self.right, size.x);
        let (top, bottom) = clamp_pair(self.top, self.bottom, size.y);
        DeadZone {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Karten-Orientierung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapOrientation {
    /// Norden oben
    #[default]
    NorthUp,
    /// Track oben
    TrackUp,
    /// Heading oben
    HeadingUp,
}

/// Benutzer-Einstellung der Orientierung (vor Auflösung von
/// Auto-North-Up, Bodenkontakt und Heading-Signalausfall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrientationSetting {
    /// Norden oben
    #[default]
    NorthUp,
    /// Track oben
    TrackUp,
    /// Heading oben
    HeadingUp,
}

/// Layout-Parameter einer Map-Variante: Range-Faktoren und relative
/// Target-Offsets pro Orientierung. Varianten (MFD-Map, Inset-Map, …)
/// unterscheiden sich ausschließlich in diesen Konstanten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapLayout {
    /// Range-Faktor bei North-Up
    pub north_up_range_factor: f64,
    /// Range-Faktor bei Heading-/Track-Up
    pub track_up_range_factor: f64,
    /// Relativer Target-Offset bei North-Up (Anteile der Fenstergröße)
    pub north_up_target_offset_rel: DVec2,
    /// Relativer Target-Offset bei Heading-/Track-Up
    pub track_up_target_offset_rel: DVec2,
}

impl MapLayout {
    /// Layout aus den Optionen.
    pub fn from_options(options: &MapOptions) -> Self {
        Self {
            north_up_range_factor: options.north_up_range_factor,
            track_up_range_factor: options.track_up_range_factor,
            north_up_target_offset_rel: DVec2::ZERO,
            track_up_target_offset_rel: DVec2::new(
                options.track_up_target_offset_rel[0],
                options.track_up_target_offset_rel[1],
            ),
        }
    }

    /// Rechnet eine nominale Range (Großkreis-Radiant) in die wahre
    /// Map-Range um. North-Up zeigt die Range als Viertel, Heading-/
    /// Track-Up als Drittel der nutzbaren Display-Höhe, jeweils um die
    /// Dead-Zone korrigiert.
    pub fn convert_to_true_range(
        &self,
        nominal_range: f64,
        orientation: MapOrientation,
        projected_size: DVec2,
        dead_zone: &DeadZone,
    ) -> f64 {
        let projected_height = projected_size.y.max(1.0);
        let corrected_height = (projected_height - dead_zone.top - dead_zone.bottom).max(1.0);
        let factor = match orientation {
            MapOrientation::NorthUp => self.north_up_range_factor,
            MapOrientation::TrackUp | MapOrientation::HeadingUp => self.track_up_range_factor,
        };
        nominal_range * projected_height / corrected_height * factor
    }

    /// Gewünschter Pixel-Offset des Targets relativ zur Fenstermitte.
    /// Der Offset wird auf die wahre Mitte der Nutzfläche bezogen, damit
    /// Dead-Zone-Ränder die Aircraft-Position nicht verschieben.
    pub fn desired_target_offset(
        &self,
        orientation: MapOrientation,
        projected_size: DVec2,
        dead_zone: &DeadZone,
    ) -> DVec2 {
        let true_center_offset = DVec2::new(
            (dead_zone.left - dead_zone.right) / 2.0,
            (dead_zone.top - dead_zone.bottom) / 2.0,
        );
        let relative = match orientation {
            MapOrientation::NorthUp => self.north_up_target_offset_rel,
            MapOrientation::TrackUp | MapOrientation::HeadingUp => {
                self.track_up_target_offset_rel
            }
        };
        relative * projected_size + true_center_offset
    }
}

/// Aktuelle Projektions-Parameter des Controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentMapParameters {
    /// Geographisches Target
    pub target: GeoPoint,
    /// Wahre Range in Großkreis-Radiant (nie der nominale Tabellenwert)
    pub range: f64,
    /// Rotation in Radiant
    pub rotation: f64,
    /// Pixel-Offset des Targets relativ zur Fenstermitte
    pub target_projected_offset: DVec2,
}

/// Controller für Range-, Target- und Rotationsänderungen.
#[derive(Debug)]
pub struct RangeTargetRotationController {
    layout: MapLayout,
    range_table_nm: Vec<f64>,
    range_index: usize,
    dead_zone: DeadZone,
    pointer_bounds: [f64; 4],

    orientation_setting: OrientationSetting,
    auto_north_up_active: bool,
    auto_north_up_range_index: usize,
    orientation: MapOrientation,
    force_north_up: bool,

    has_gps_signal: bool,
    is_on_ground: bool,
    pointer_active: bool,
    airplane_position: GeoPoint,
    airplane_track_deg: f64,
    airplane_heading_deg: f64,

    params: CurrentMapParameters,
    need_update_projection: bool,
}

impl RangeTargetRotationController {
    /// Erstellt einen Controller mit den Optionen und der initialen
    /// Projektionsgeometrie.
    pub fn new(options: &MapOptions, projection: &MapProjection) -> Self {
        let mut controller = Self {
            layout: MapLayout::from_options(options),
            range_table_nm: options.range_table_nm.clone(),
            range_index: options.default_range_index,
            dead_zone: DeadZone::ZERO,
            pointer_bounds: [
                0.0,
                0.0,
                projection.projected_size().x,
                projection.projected_size().y,
            ],
            orientation_setting: OrientationSetting::NorthUp,
            auto_north_up_active: false,
            auto_north_up_range_index: options.auto_north_up_range_index,
            orientation: MapOrientation::NorthUp,
            force_north_up: false,
            has_gps_signal: true,
            is_on_ground: false,
            pointer_active: false,
            airplane_position: GeoPoint::default(),
            airplane_track_deg: 0.0,
            airplane_heading_deg: 0.0,
            params: CurrentMapParameters {
                target: GeoPoint::default(),
                range: 1.0,
                rotation: 0.0,
                target_projected_offset: DVec2::ZERO,
            },
            need_update_projection: false,
        };
        controller.clamp_range_index();
        controller.update_range_from_index(projection);
        controller.update_target_offset(projection);
        controller.schedule_projection_update();
        controller
    }

    // ── Getter ──────────────────────────────────────────────────────

    /// Aktuelle Orientierung (nach Auflösung aller Regeln).
    pub fn orientation(&self) -> MapOrientation {
        self.orientation
    }

    /// Aktueller Range-Index.
    pub fn range_index(&self) -> usize {
        self.range_index
    }

    /// Nominale Range der aktuellen Stufe in NM.
    pub fn nominal_range_nm(&self) -> Option<f64> {
        self.range_table_nm.get(self.range_index).copied()
    }

    /// Anzahl der Range-Stufen.
    pub fn range_count(&self) -> usize {
        self.range_table_nm.len()
    }

    /// Aktuelle Projektions-Parameter.
    pub fn current_parameters(&self) -> CurrentMapParameters {
        self.params
    }

    /// Aktuelle Dead-Zone.
    pub fn dead_zone(&self) -> DeadZone {
        self.dead_zone
    }

    /// Aktuelle Pointer-Bounds [links, oben, rechts, unten].
    pub fn pointer_bounds(&self) -> [f64; 4] {
        self.pointer_bounds
    }

    // ── Eingänge ────────────────────────────────────────────────────

    /// Setzt die Dead-Zone; Ränder werden auf das Fenster geklammert.
    pub fn set_dead_zone(&mut self, dead_zone: DeadZone, projection: &MapProjection) {
        let clamped = dead_zone.clamped_to(projection.projected_size());
        if self.dead_zone == clamped {
            return;
        }
        self.dead_zone = clamped;
        self.update_range_from_index(projection);
        self.update_target_offset(projection);
        self.schedule_projection_update();
    }

    /// Setzt den Range-Index (auf die Tabelle geklammert).
    pub fn set_range_index(&mut self, index: usize, projection: &MapProjection) {
        let clamped = index.min(self.range_table_nm.len().saturating_sub(1));
        if clamped == self.range_index {
            return;
        }
        self.range_index = clamped;
        if self.auto_north_up_active {
            self.update_orientation(projection);
        }
        self.update_range_from_index(projection);
        self.schedule_projection_update();
    }

    /// Ersetzt die Range-Tabelle; der Index wird neu geklammert.
    pub fn set_range_table(&mut self, table_nm: Vec<f64>, projection: &MapProjection) {
        self.range_table_nm = table_nm;
        self.clamp_range_index();
        self.update_range_from_index(projection);
        self.schedule_projection_update();
    }

    /// Setzt die Orientierungs-Einstellung des Benutzers.
    pub fn set_orientation_setting(
        &mut self,
        setting: OrientationSetting,
        projection: &MapProjection,
    ) {
        self.orientation_setting = setting;
        self.update_orientation(projection);
    }

    /// Schaltet Auto-North-Up (North-Up oberhalb der Index-Schwelle).
    pub fn set_auto_north_up(&mut self, active: bool, projection: &MapProjection) {
        self.auto_north_up_active = active;
        self.update_orientation(projection);
    }

    /// Erzwingt North-Up unabhängig von der Einstellung.
    pub fn set_force_north_up(&mut self, forced: bool, projection: &MapProjection) {
        self.force_north_up = forced;
        self.update_orientation(projection);
    }

    /// Meldet den Verlust/die Rückkehr des Heading-Signals.
    pub fn set_heading_signal_valid(&mut self, valid: bool, projection: &MapProjection) {
        self.set_force_north_up(!valid, projection);
    }

    /// Meldet den Verlust/die Rückkehr des GPS-Signals.
    pub fn set_gps_signal_valid(&mut self, valid: bool) {
        self.has_gps_signal = valid;
        if valid && !self.pointer_active {
            self.params.target = self.airplane_position;
            self.schedule_projection_update();
        }
    }

    /// Meldet Bodenkontakt (Track-Up fällt am Boden auf Heading-Up zurück).
    pub fn set_on_ground(&mut self, on_ground: bool, projection: &MapProjection) {
        if self.is_on_ground == on_ground {
            return;
        }
        self.is_on_ground = on_ground;
        self.update_orientation(projection);
    }

    /// Aircraft-Positionsmeldung. Treibt das Target nur, solange der
    /// Pointer inaktiv ist und ein GPS-Signal anliegt.
    pub fn set_airplane_position(&mut self, position: GeoPoint) {
        self.airplane_position = position;
        if self.has_gps_signal && !self.pointer_active && self.params.target != position {
            self.params.target = position;
            self.schedule_projection_update();
        }
    }

    /// Aircraft-Lagemeldung (Track und Heading, Grad rechtweisend).
    pub fn set_airplane_rotation(&mut self, track_deg: f64, heading_deg: f64) {
        self.airplane_track_deg = track_deg;
        self.airplane_heading_deg = heading_deg;
        if self.pointer_active {
            return;
        }
        let rotation = self.rotation_for_orientation();
        if self.params.rotation != rotation {
            self.params.rotation = rotation;
            self.schedule_projection_update();
        }
    }

    /// Reagiert auf Fenstergrößen-Änderungen der Projektion.
    pub fn on_projected_size_changed(&mut self, projection: &MapProjection) {
        self.dead_zone = self.dead_zone.clamped_to(projection.projected_size());
        self.update_range_from_index(projection);
        self.update_target_offset(projection);
        self.schedule_projection_update();
    }

    /// Reagiert auf Pointer-Aktivierung/-Deaktivierung.
    pub fn on_pointer_active_changed(
        &mut self,
        pointer: &mut PointerState,
        projection: &MapProjection,
    ) {
        self.pointer_active = pointer.is_active;

        if pointer.is_active {
            // Target auf den Pointer übergeben; Rotation bleibt eingefroren
            if pointer.take_target_changed() {
                self.params.target = pointer.target;
            }
        } else {
            // Aircraft übernimmt wieder Target und Rotation
            if self.has_gps_signal {
                self.params.target = self.airplane_position;
            }
            self.params.rotation = self.rotation_for_orientation();
        }
        self.schedule_projection_update();
    }

    /// Setzt die Pointer-Bounds und klammert die Pointer-Position sofort.
    pub fn set_pointer_bounds(&mut self, bounds: [f64; 4], pointer: &mut PointerState) {
        self.pointer_bounds = bounds;
        pointer.position = DVec2::new(
            pointer.position.x.clamp(bounds[0], bounds[2]),
            pointer.position.y.clamp(bounds[1], bounds[3]),
        );
    }

    // ── Frame-Update ────────────────────────────────────────────────

    /// Wendet ausstehende Änderungen einmal pro Frame an: zuerst
    /// Pointer-Scrolling, dann die gesammelte Projektionsänderung.
    pub fn update(
        &mut self,
        projection: &mut MapProjection,
        pointer: &mut PointerState,
    ) -> ProjectionChanges {
        if self.pointer_active {
            if pointer.take_target_changed() {
                self.params.target = pointer.target;
                self.schedule_projection_update();
            }
            self.update_pointer_scroll(projection, pointer);
        }
        self.update_map_projection(projection)
    }

    /// Klammert die Pointer-Position auf die Bounds und lenkt den
    /// überschießenden Anteil als Map-Scrolling um. Es gilt pro Achse:
    /// angewandtes Klammer-Delta + Scroll-Delta = angefordertes Delta.
    fn update_pointer_scroll(&mut self, projection: &MapProjection, pointer: &mut PointerState) {
        if !pointer.take_need_scroll_update() {
            return;
        }

        let [min_x, min_y, max_x, max_y] = self.pointer_bounds;
        let clamped = DVec2::new(
            pointer.position.x.clamp(min_x, max_x),
            pointer.position.y.clamp(min_y, max_y),
        );
        let scroll_delta = pointer.position - clamped;
        if scroll_delta == DVec2::ZERO {
            return;
        }

        pointer.position = clamped;

        let new_target_projected = projection.target_projected() + scroll_delta;
        self.params.target = projection.invert(new_target_projected);
        pointer.target = self.params.target;
        self.schedule_projection_update();
    }

    fn update_map_projection(&mut self, projection: &mut MapProjection) -> ProjectionChanges {
        if !self.need_update_projection {
            return ProjectionChanges::default();
        }
        self.need_update_projection = false;

        projection.set(&ProjectionParams {
            target: Some(self.params.target),
            range: Some(self.params.range),
            rotation: Some(self.params.rotation),
            target_projected_offset: Some(self.params.target_projected_offset),
            ..Default::default()
        })
    }

    // ── Interne Neuberechnung ───────────────────────────────────────

    fn schedule_projection_update(&mut self) {
        self.need_update_projection = true;
    }

    fn clamp_range_index(&mut self) {
        if self.range_table_nm.is_empty() {
            log::warn!("Leere Range-Tabelle, Range bleibt unverändert");
            self.range_index = 0;
            return;
        }
        self.range_index = self.range_index.min(self.range_table_nm.len() - 1);
    }

    fn update_range_from_index(&mut self, projection: &MapProjection) {
        let Some(&nominal_nm) = self.range_table_nm.get(self.range_index) else {
            return;
        };
        self.params.range = self.layout.convert_to_true_range(
            ga_from_nm(nominal_nm),
            self.orientation,
            projection.projected_size(),
            &self.dead_zone,
        );
    }

    fn update_target_offset(&mut self, projection: &MapProjection) {
        self.params.target_projected_offset = self.layout.desired_target_offset(
            self.orientation,
            projection.projected_size(),
            &self.dead_zone,
        );
    }

    /// Löst die effektive Orientierung aus Einstellung, Auto-North-Up,
    /// Bodenkontakt und Heading-Signal auf.
    fn update_orientation(&mut self, projection: &MapProjection) {
        let orientation = if self.force_north_up {
            MapOrientation::NorthUp
        } else if self.orientation_setting == OrientationSetting::NorthUp
            || (self.auto_north_up_active && self.range_index > self.auto_north_up_range_index)
        {
            MapOrientation::NorthUp
        } else if self.orientation_setting == OrientationSetting::TrackUp && !self.is_on_ground {
            MapOrientation::TrackUp
        } else {
            MapOrientation::HeadingUp
        };

        if orientation == self.orientation {
            return;
        }
        self.orientation = orientation;

        if !self.pointer_active {
            self.params.rotation = self.rotation_for_orientation();
        }
        self.update_range_from_index(projection);
        self.update_target_offset(projection);
        self.schedule_projection_update();
    }

    fn rotation_for_orientation(&self) -> f64 {
        match self.orientation {
            MapOrientation::NorthUp => 0.0,
            MapOrientation::TrackUp => -self.airplane_track_deg.to_radians(),
            MapOrientation::HeadingUp => -self.airplane_heading_deg.to_radians(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn setup() -> (MapProjection, RangeTargetRotationController) {
        let projection = MapProjection::new(800.0, 600.0);
        let controller = RangeTargetRotationController::new(&MapOptions::default(), &projection);
        (projection, controller)
    }

    #[test]
    fn test_range_index_is_clamped() {
        let (projection, mut controller) = setup();
        controller.set_range_index(9999, &projection);
        assert_eq!(controller.range_index(), controller.range_count() - 1);
    }

    #[test]
    fn test_true_range_differs_between_orientations() {
        let (mut projection, mut controller) = setup();
        controller.set_range_index(5, &projection);
        controller.update(&mut projection, &mut PointerState::new());
        let north_up_range = projection.range();

        controller.set_orientation_setting(OrientationSetting::HeadingUp, &projection);
        controller.update(&mut projection, &mut PointerState::new());
        let heading_up_range = projection.range();

        // North-Up: Faktor 4, Heading-Up: Faktor 3
        assert_relative_eq!(
            north_up_range / heading_up_range,
            4.0 / 3.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_dead_zone_preserves_true_center() {
        let (projection, mut controller) = setup();
        controller.set_orientation_setting(OrientationSetting::HeadingUp, &projection);

        let symmetric_offset = controller.current_parameters().target_projected_offset;
        // Symmetrische Dead-Zone verschiebt die wahre Mitte nicht
        controller.set_dead_zone(DeadZone::new(20.0, 30.0, 20.0, 30.0), &projection);
        assert_eq!(
            controller.current_parameters().target_projected_offset,
            symmetric_offset
        );

        // Asymmetrischer unterer Rand zieht die Mitte nach oben
        controller.set_dead_zone(DeadZone::new(0.0, 0.0, 0.0, 60.0), &projection);
        let offset = controller.current_parameters().target_projected_offset;
        assert_relative_eq!(offset.y, 600.0 / 6.0 - 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dead_zone_correction_of_true_range() {
        let (projection, mut controller) = setup();
        let before = controller.current_parameters().range;

        // 100 px Dead-Zone oben+unten → Range wächst um 600/400
        controller.set_dead_zone(DeadZone::new(0.0, 100.0, 0.0, 100.0), &projection);
        let after = controller.current_parameters().range;
        assert_relative_eq!(after / before, 600.0 / 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_airplane_drives_target_only_without_pointer() {
        let (mut projection, mut controller) = setup();
        let mut pointer = PointerState::new();

        let position = GeoPoint::new(48.1, 11.5);
        controller.set_airplane_position(position);
        controller.update(&mut projection, &mut pointer);
        assert!(projection.target().approx_eq(&position, 1e-12));

        // Pointer aktivieren → Aircraft-Position friert das Target nicht mehr an
        crate::map::pointer::MapPointerController::set_pointer_active(
            &mut pointer,
            &projection,
            true,
        );
        controller.on_pointer_active_changed(&mut pointer, &projection);
        controller.update(&mut projection, &mut pointer);

        controller.set_airplane_position(GeoPoint::new(50.0, 12.0));
        controller.update(&mut projection, &mut pointer);
        assert!(projection.target().approx_eq(&position, 1e-12));

        // Deaktivieren → Aircraft übernimmt wieder
        crate::map::pointer::MapPointerController::set_pointer_active(
            &mut pointer,
            &projection,
            false,
        );
        controller.on_pointer_active_changed(&mut pointer, &projection);
        controller.update(&mut projection, &mut pointer);
        assert!(projection.target().approx_eq(&GeoPoint::new(50.0, 12.0), 1e-12));
    }

    #[test]
    fn test_orientation_resolution_rules() {
        let (projection, mut controller) = setup();

        controller.set_orientation_setting(OrientationSetting::TrackUp, &projection);
        assert_eq!(controller.orientation(), MapOrientation::TrackUp);

        // Am Boden fällt Track-Up auf Heading-Up zurück
        controller.set_on_ground(true, &projection);
        assert_eq!(controller.orientation(), MapOrientation::HeadingUp);
        controller.set_on_ground(false, &projection);

        // Heading-Signalausfall erzwingt North-Up
        controller.set_heading_signal_valid(false, &projection);
        assert_eq!(controller.orientation(), MapOrientation::NorthUp);
        controller.set_heading_signal_valid(true, &projection);
        assert_eq!(controller.orientation(), MapOrientation::TrackUp);

        // Auto-North-Up oberhalb der Schwelle
        controller.set_auto_north_up(true, &projection);
        controller.set_range_index(controller.range_count() - 1, &projection);
        assert_eq!(controller.orientation(), MapOrientation::NorthUp);
    }

    #[test]
    fn test_rotation_follows_track_when_track_up() {
        let (mut projection, mut controller) = setup();
        controller.set_orientation_setting(OrientationSetting::TrackUp, &projection);
        controller.set_airplane_rotation(90.0, 85.0);
        controller.update(&mut projection, &mut PointerState::new());

        assert_relative_eq!(
            projection.rotation(),
            -std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_updates_coalesce_into_single_projection_set() {
        let (mut projection, mut controller) = setup();
        let mut pointer = PointerState::new();

        controller.set_range_index(3, &projection);
        controller.set_airplane_position(GeoPoint::new(47.0, 11.0));
        controller.set_airplane_rotation(10.0, 10.0);

        let changes = controller.update(&mut projection, &mut pointer);
        assert!(changes.any());

        // Ohne neue Eingänge keine weitere Projektionsänderung
        let changes = controller.update(&mut projection, &mut pointer);
        assert!(!changes.any());
    }

    #[test]
    fn test_empty_range_table_does_not_panic() {
        let (projection, mut controller) = setup();
        controller.set_range_table(Vec::new(), &projection);
        controller.set_range_index(5, &projection);
        assert!(controller.nominal_range_nm().is_none());
    }
}
