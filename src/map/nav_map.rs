//! Frame-getriebener Map-Host.
//!
//! `NavMap` verdrahtet Projektion, Range-Target-Rotation-Controller,
//! Pointer, Wegpunkt-Arbiter und Flugplan-Layer und wird einmal pro
//! Display-Frame über `update()` getrieben. Alle Zustandsänderungen
//! laufen auf diesem einen Callstack; Nebenläufigkeit gibt es nicht.

use super::controller::{DeadZone, OrientationSetting, RangeTargetRotationController};
use super::data_provider::FlightPlanDataProvider;
use super::flight_plan_layer::FlightPlanLayer;
use super::path_renderer::PathStyles;
use super::pointer::{MapPointerController, PointerState};
use super::waypoint_renderer::WaypointRenderer;
use crate::core::{GeoPoint, MapProjection, ProjectionParams};
use crate::render::surface::MapSurface;
use crate::shared::MapOptions;
use glam::DVec2;

/// Intervall der periodischen Status-Logzeile (Sekunden).
const STATUS_LOG_INTERVAL_S: f64 = 10.0;

/// Die Moving Map als frame-getriebene Einheit.
pub struct NavMap {
    options: MapOptions,
    projection: MapProjection,
    controller: RangeTargetRotationController,
    pointer: PointerState,
    waypoint_renderer: WaypointRenderer,
    flight_plan_layer: FlightPlanLayer,
    last_status_log_time: f64,
}

impl NavMap {
    /// Erstellt eine Map mit Fenstergröße in Pixeln.
    pub fn new(projected_width: f64, projected_height: f64, options: MapOptions) -> Self {
        let projection = MapProjection::new(projected_width, projected_height);
        let controller = RangeTargetRotationController::new(&options, &projection);
        let flight_plan_layer =
            FlightPlanLayer::new("flightplan-layer", PathStyles::default(), &options);

        let mut nav_map = Self {
            options,
            projection,
            controller,
            pointer: PointerState::new(),
            waypoint_renderer: WaypointRenderer::new(),
            flight_plan_layer,
            last_status_log_time: f64::NEG_INFINITY,
        };
        nav_map.update_pointer_bounds();
        nav_map
    }

    // ── Zugriff ─────────────────────────────────────────────────────

    /// Aktuelle Projektion.
    pub fn projection(&self) -> &MapProjection {
        &self.projection
    }

    /// Aktueller Pointer-Zustand.
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Range-/Target-/Rotations-Controller.
    pub fn controller(&self) -> &RangeTargetRotationController {
        &self.controller
    }

    /// Wegpunkt-Arbiter.
    pub fn waypoint_renderer(&self) -> &WaypointRenderer {
        &self.waypoint_renderer
    }

    /// Mutable Zugriff auf den Wegpunkt-Arbiter (für weitere Layer).
    pub fn waypoint_renderer_mut(&mut self) -> &mut WaypointRenderer {
        &mut self.waypoint_renderer
    }

    /// Flugplan-Layer.
    pub fn flight_plan_layer(&self) -> &FlightPlanLayer {
        &self.flight_plan_layer
    }

    // ── Eingänge ────────────────────────────────────────────────────

    /// Setzt die Fenstergröße (wird im nächsten Update angewandt).
    pub fn set_projected_size(&mut self, width: f64, height: f64) {
        if self.projection.projected_size() == DVec2::new(width, height) {
            return;
        }
        self.projection.set_queued(&ProjectionParams {
            projected_size: Some(DVec2::new(width, height)),
            ..Default::default()
        });
    }

    /// Setzt die Dead-Zone der Display-Ränder.
    pub fn set_dead_zone(&mut self, dead_zone: DeadZone) {
        self.controller.set_dead_zone(dead_zone, &self.projection);
        self.update_pointer_bounds();
    }

    /// Setzt den Range-Index (geklammert).
    pub fn set_range_index(&mut self, index: usize) {
        self.controller.set_range_index(index, &self.projection);
    }

    /// Aktueller Range-Index.
    pub fn range_index(&self) -> usize {
        self.controller.range_index()
    }

    /// Anzahl der Range-Stufen.
    pub fn range_count(&self) -> usize {
        self.controller.range_count()
    }

    /// Setzt die Orientierungs-Einstellung.
    pub fn set_orientation_setting(&mut self, setting: OrientationSetting) {
        self.controller
            .set_orientation_setting(setting, &self.projection);
    }

    /// Meldet Aircraft-Zustand (Position, Track, Heading, Bodenkontakt).
    pub fn set_airplane_state(
        &mut self,
        position: GeoPoint,
        track_deg: f64,
        heading_deg: f64,
        on_ground: bool,
    ) {
        self.controller.set_airplane_position(position);
        self.controller.set_airplane_rotation(track_deg, heading_deg);
        self.controller.set_on_ground(on_ground, &self.projection);
    }

    /// Meldet GPS-Signalvalidität.
    pub fn set_gps_signal_valid(&mut self, valid: bool) {
        self.controller.set_gps_signal_valid(valid);
    }

    /// Meldet Heading-Signalvalidität (Ausfall erzwingt North-Up).
    pub fn set_heading_signal_valid(&mut self, valid: bool) {
        self.controller
            .set_heading_signal_valid(valid, &self.projection);
    }

    /// Schaltet "gesamten Plan zeichnen" um.
    pub fn set_draw_entire_plan(&mut self, draw_entire_plan: bool) {
        self.flight_plan_layer.set_draw_entire_plan(draw_entire_plan);
    }

    // ── Pointer-Eingaben ────────────────────────────────────────────

    /// Kippt den Pointer-Zustand; gibt den resultierenden Zustand zurück.
    pub fn toggle_pointer_active(&mut self) -> bool {
        let is_active =
            MapPointerController::toggle_pointer_active(&mut self.pointer, &self.projection);
        self.controller
            .on_pointer_active_changed(&mut self.pointer, &self.projection);
        is_active
    }

    /// Aktiviert/deaktiviert den Pointer.
    pub fn set_pointer_active(&mut self, is_active: bool) {
        if MapPointerController::set_pointer_active(&mut self.pointer, &self.projection, is_active)
        {
            self.controller
                .on_pointer_active_changed(&mut self.pointer, &self.projection);
        }
    }

    /// Verschiebt den Pointer um ein Pixel-Delta.
    pub fn move_pointer(&mut self, dx: f64, dy: f64) {
        MapPointerController::move_pointer(&mut self.pointer, dx, dy);
    }

    /// Verschiebt den Pointer um eine Schrittweite in Richtung (x, y).
    pub fn step_pointer(&mut self, direction_x: f64, direction_y: f64) {
        let step = self.options.pointer_move_increment_px;
        self.move_pointer(direction_x * step, direction_y * step);
    }

    /// Übernimmt die Pointer-Position als neues Map-Target.
    pub fn target_pointer(&mut self) {
        MapPointerController::target_pointer(&mut self.pointer, &self.projection);
    }

    // ── Frame-Update ────────────────────────────────────────────────

    /// Ein Display-Frame: vorgemerkte Projektionsänderungen, Controller
    /// (Pointer-Scroll + Projektions-Set), Flugplan-Layer, Wegpunkte.
    pub fn update(
        &mut self,
        time_s: f64,
        provider: &FlightPlanDataProvider,
        surface: &mut dyn MapSurface,
    ) {
        let queued_changes = self.projection.apply_queued();
        if queued_changes.projected_size {
            self.controller.on_projected_size_changed(&self.projection);
            self.update_pointer_bounds();
        }

        let controller_changes = self.controller.update(&mut self.projection, &mut self.pointer);
        let projection_changed = queued_changes.any() || controller_changes.any();

        self.flight_plan_layer.update(
            provider,
            &self.projection,
            projection_changed,
            &mut self.waypoint_renderer,
            surface,
        );
        self.waypoint_renderer.update(&self.projection, surface);

        self.log_status(time_s);
    }

    /// Baut die Map ab und räumt alle Registrierungen aus.
    pub fn destroy(&mut self) {
        self.flight_plan_layer.destroy(&mut self.waypoint_renderer);
    }

    // ── Intern ──────────────────────────────────────────────────────

    /// Pointer-Bounds: nutzbare Fläche abzüglich der konfigurierten
    /// Inset-Anteile, nie kleiner als die wahre Mitte.
    fn update_pointer_bounds(&mut self) {
        let size = self.projection.projected_size();
        let dead_zone = self.controller.dead_zone();
        let inset = self.options.pointer_bounds_inset;

        let min_x = dead_zone.left;
        let min_y = dead_zone.top;
        let max_x = size.x - dead_zone.right;
        let max_y = size.y - dead_zone.bottom;
        let width = max_x - min_x;
        let height = max_y - min_y;
        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;

        let bounds = [
            center_x.min(min_x + width * inset[0]),
            center_y.min(min_y + height * inset[1]),
            center_x.max(max_x - width * inset[2]),
            center_y.max(max_y - height * inset[3]),
        ];
        self.controller.set_pointer_bounds(bounds, &mut self.pointer);
    }

    fn log_status(&mut self, time_s: f64) {
        if time_s - self.last_status_log_time < STATUS_LOG_INTERVAL_S {
            return;
        }
        self.last_status_log_time = time_s;
        log::debug!(
            "Map-Status: Range-Index {} ({:?} NM), Orientierung {:?}, Pointer {}",
            self.controller.range_index(),
            self.controller.nominal_range_nm(),
            self.controller.orientation(),
            if self.pointer.is_active {
                "aktiv"
            } else {
                "inaktiv"
            }
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::DisplayList;

    fn nav_map() -> NavMap {
        NavMap::new(800.0, 600.0, MapOptions::default())
    }

    #[test]
    fn test_pointer_bounds_respect_insets_and_dead_zone() {
        let mut map = nav_map();
        map.set_dead_zone(DeadZone::new(0.0, 0.0, 0.0, 100.0));

        let bounds = map.controller().pointer_bounds();
        // Nutzfläche 800x500, Inset 10 %
        assert!((bounds[0] - 80.0).abs() < 1e-9);
        assert!((bounds[1] - 50.0).abs() < 1e-9);
        assert!((bounds[2] - 720.0).abs() < 1e-9);
        assert!((bounds[3] - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_is_applied_on_next_update() {
        let mut map = nav_map();
        let provider = FlightPlanDataProvider::new();
        let mut surface = DisplayList::new();

        map.set_projected_size(1024.0, 768.0);
        // Noch nicht angewandt
        assert_eq!(map.projection().projected_size(), DVec2::new(800.0, 600.0));

        map.update(0.0, &provider, &mut surface);
        assert_eq!(map.projection().projected_size(), DVec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_destroy_leaves_no_registrations() {
        let mut map = nav_map();
        let provider = FlightPlanDataProvider::new();
        let mut surface = DisplayList::new();
        map.update(0.0, &provider, &mut surface);

        map.destroy();
        assert_eq!(map.waypoint_renderer().entry_count(), 0);
    }
}
