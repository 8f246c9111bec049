//! Flugplan-Layer: Pfad-Rendering, Leg-Wegpunkte und VNAV-Marker.
//!
//! Der Layer beobachtet den Datenprovider poll-basiert und sammelt
//! Änderungen in drei Dirty-Flags (`need_draw_route`,
//! `need_refresh_waypoints`, `need_repick_waypoints`), die einmal pro
//! Frame in `update()` abgearbeitet werden. Der gezeichnete Pfad wird
//! als Display-Liste gecacht und pro Frame abgespielt.
//!
//! TOD-/BOD-Marker werden mit Hysterese geführt: Neu bewertet wird nur
//! bei VNAV-Zustands-/Pfadmodus-Änderungen, Leg-Index-Änderungen,
//! Plan-Neuberechnung oder einem expliziten Schwellen-Durchgang der
//! TOD-Distanz, nie bei jedem Distanz-Tick.

use super::data_provider::{FlightPlanDataProvider, VNavPathMode, VNavState};
use super::path_renderer::{FlightPlanPathRenderer, PathStyles};
use super::waypoint_records::FlightPlanWaypointRecords;
use super::waypoint_renderer::{RenderRole, WaypointRenderer};
use crate::core::{FlightPlan, MapProjection, SegmentType, VNavWaypointKind, Waypoint};
use crate::render::surface::{DisplayList, MapSurface};
use crate::shared::{MapOptions, SubjectObserver};

/// Map-Layer für den angezeigten Flugplan.
pub struct FlightPlanLayer {
    owner_key: String,
    path_renderer: FlightPlanPathRenderer,
    records: FlightPlanWaypointRecords,
    route_cache: DisplayList,

    draw_entire_plan: bool,
    is_obs_active: bool,
    obs_course: f64,
    tod_distance_threshold_m: f64,

    tod_waypoint: Option<Waypoint>,
    bod_waypoint: Option<Waypoint>,

    need_draw_route: bool,
    need_refresh_waypoints: bool,
    need_repick_waypoints: bool,

    plan_observer: SubjectObserver,
    plan_modified_observer: SubjectObserver,
    plan_calculated_observer: SubjectObserver,
    active_leg_observer: SubjectObserver,
    lnav_observer: SubjectObserver,
    vnav_state_observer: SubjectObserver,
    vnav_path_mode_observer: SubjectObserver,
    tod_leg_observer: SubjectObserver,
    bod_leg_observer: SubjectObserver,
    tod_leg_distance_observer: SubjectObserver,
    distance_to_tod_observer: SubjectObserver,
    obs_course_observer: SubjectObserver,
}

impl FlightPlanLayer {
    /// Erstellt einen Layer. Der `owner_key` identifiziert dessen
    /// Registrierungen beim Wegpunkt-Arbiter.
    pub fn new(owner_key: impl Into<String>, styles: PathStyles, options: &MapOptions) -> Self {
        let owner_key = owner_key.into();
        Self {
            records: FlightPlanWaypointRecords::new(owner_key.clone()),
            owner_key,
            path_renderer: FlightPlanPathRenderer::new(styles),
            route_cache: DisplayList::new(),
            draw_entire_plan: false,
            is_obs_active: false,
            obs_course: 0.0,
            tod_distance_threshold_m: options.tod_distance_threshold_m,
            tod_waypoint: None,
            bod_waypoint: None,
            need_draw_route: false,
            need_refresh_waypoints: false,
            need_repick_waypoints: false,
            plan_observer: SubjectObserver::new(),
            plan_modified_observer: SubjectObserver::new(),
            plan_calculated_observer: SubjectObserver::new(),
            active_leg_observer: SubjectObserver::new(),
            lnav_observer: SubjectObserver::new(),
            vnav_state_observer: SubjectObserver::new(),
            vnav_path_mode_observer: SubjectObserver::new(),
            tod_leg_observer: SubjectObserver::new(),
            bod_leg_observer: SubjectObserver::new(),
            tod_leg_distance_observer: SubjectObserver::new(),
            distance_to_tod_observer: SubjectObserver::new(),
            obs_course_observer: SubjectObserver::new(),
        }
    }

    /// Schaltet zwischen "gesamten Plan zeichnen" und "ab aktivem Leg".
    pub fn set_draw_entire_plan(&mut self, draw_entire_plan: bool) {
        if self.draw_entire_plan == draw_entire_plan {
            return;
        }
        self.draw_entire_plan = draw_entire_plan;
        self.schedule_updates(true, true, true);
    }

    /// Ob aktuell ein TOD-Marker angezeigt wird.
    pub fn has_tod_waypoint(&self) -> bool {
        self.tod_waypoint.is_some()
    }

    /// Ob aktuell ein BOD-Marker angezeigt wird.
    pub fn has_bod_waypoint(&self) -> bool {
        self.bod_waypoint.is_some()
    }

    /// Frame-Update: Provider abfragen, Dirty-Flags abarbeiten, Pfad
    /// zeichnen (Cache) und auf die Zeichenfläche abspielen.
    pub fn update(
        &mut self,
        provider: &FlightPlanDataProvider,
        projection: &MapProjection,
        projection_changed: bool,
        renderer: &mut WaypointRenderer,
        surface: &mut dyn MapSurface,
    ) {
        self.poll_provider(provider, renderer);

        if self.need_draw_route || projection_changed {
            self.draw_route(provider, projection);
            self.need_draw_route = false;
        }
        self.route_cache.replay(surface);

        if self.need_refresh_waypoints {
            self.refresh_waypoints(provider, renderer);
            self.need_refresh_waypoints = false;
            self.need_repick_waypoints = false;
        }
    }

    /// Baut den Layer ab: alle Registrierungen werden entfernt, damit
    /// keine Render-Einträge verwaisen.
    pub fn destroy(&mut self, renderer: &mut WaypointRenderer) {
        self.records.deregister_all(renderer);
        if let Some(waypoint) = self.tod_waypoint.take() {
            renderer.deregister(&waypoint, RenderRole::VNav, &self.owner_key);
        }
        if let Some(waypoint) = self.bod_waypoint.take() {
            renderer.deregister(&waypoint, RenderRole::VNav, &self.owner_key);
        }
        self.route_cache.clear();
    }

    // ── Provider-Beobachtung ────────────────────────────────────────

    /// Sammelt alle seit dem letzten Frame eingetroffenen Änderungen in
    /// die Dirty-Flags; mehrere Änderungen kollabieren zu einem Update.
    fn poll_provider(
        &mut self,
        provider: &FlightPlanDataProvider,
        renderer: &mut WaypointRenderer,
    ) {
        let mut need_tod_bod_update = false;

        if self.plan_observer.poll(&provider.plan) {
            self.schedule_updates(true, true, true);
            need_tod_bod_update = true;
        }
        if self.plan_modified_observer.poll(&provider.plan_modified) {
            self.schedule_updates(false, true, true);
        }
        if self.plan_calculated_observer.poll(&provider.plan_calculated) {
            self.schedule_updates(true, true, false);
            need_tod_bod_update = true;
        }
        if self
            .active_leg_observer
            .poll(&provider.active_lateral_leg_index)
        {
            self.schedule_updates(true, true, true);
        }
        if self.lnav_observer.poll(&provider.lnav_data) {
            self.schedule_updates(true, false, false);
        }

        if self.vnav_state_observer.poll(&provider.vnav_state) {
            need_tod_bod_update = true;
        }
        if self.vnav_path_mode_observer.poll(&provider.vnav_path_mode) {
            need_tod_bod_update = true;
        }
        if self.tod_leg_observer.poll(&provider.vnav_tod_leg_index) {
            need_tod_bod_update = true;
        }
        if self.bod_leg_observer.poll(&provider.vnav_bod_leg_index) {
            need_tod_bod_update = true;
        }
        if self
            .tod_leg_distance_observer
            .poll(&provider.vnav_tod_leg_distance_m)
            && self.tod_waypoint.is_some()
        {
            need_tod_bod_update = true;
        }

        // Hysterese: Distanz-Ticks lösen nur bei Schwellen-Durchgang aus
        if self
            .distance_to_tod_observer
            .poll(&provider.vnav_distance_to_tod_m)
        {
            let above = *provider.vnav_distance_to_tod_m.get() >= self.tod_distance_threshold_m;
            let crossed = (above && self.tod_waypoint.is_none())
                || (!above && self.tod_waypoint.is_some());
            if crossed {
                need_tod_bod_update = true;
            }
        }

        if self.obs_course_observer.poll(&provider.obs_course) {
            let course = *provider.obs_course.get();
            let is_active = course.is_some();
            let need_full_update = is_active != self.is_obs_active;
            self.is_obs_active = is_active;
            if let Some(course) = course {
                self.obs_course = course;
            }
            self.schedule_updates(is_active || need_full_update, need_full_update, need_full_update);
        }

        if need_tod_bod_update {
            self.on_tod_bod_changed(provider, renderer);
        }
    }

    fn schedule_updates(&mut self, draw_route: bool, refresh: bool, repick: bool) {
        self.need_draw_route |= draw_route;
        self.need_refresh_waypoints |= refresh;
        self.need_repick_waypoints |= repick;
    }

    // ── Pfad ────────────────────────────────────────────────────────

    fn draw_route(&mut self, provider: &FlightPlanDataProvider, projection: &MapProjection) {
        self.route_cache.clear();
        let Some(plan) = provider.plan.get() else {
            return;
        };
        self.path_renderer.render(
            plan,
            projection,
            &mut self.route_cache,
            self.draw_entire_plan,
            *provider.active_lateral_leg_index.get(),
            provider.lnav_data.get().as_ref(),
            self.is_obs_active.then_some(self.obs_course),
        );
    }

    // ── Leg-Wegpunkte ───────────────────────────────────────────────

    fn refresh_waypoints(
        &mut self,
        provider: &FlightPlanDataProvider,
        renderer: &mut WaypointRenderer,
    ) {
        let plan = provider.plan.get().as_deref();
        let active_leg_index = *provider.active_lateral_leg_index.get();
        let start_index = plan
            .map(|plan| self.pick_waypoints_start_index(plan, active_leg_index))
            .unwrap_or(0);

        self.records.refresh(
            plan,
            active_leg_index,
            self.need_repick_waypoints,
            start_index,
            renderer,
        );
    }

    /// Erstes Leg, dessen Wegpunkt angezeigt wird: ein Leg vor dem
    /// nominalen Ursprung des aktiven Legs, damit auch der Fix sichtbar
    /// ist, von dem der sichtbare Pfad ausgeht.
    fn pick_waypoints_start_index(
        &self,
        plan: &FlightPlan,
        active_leg_index: Option<usize>,
    ) -> usize {
        if self.draw_entire_plan {
            return 0;
        }
        let Some(active_index) = active_leg_index else {
            return plan.len();
        };
        if self.is_obs_active {
            return active_index;
        }
        plan.nominal_from_leg_index(active_index)
            .map(|index| index.saturating_sub(1))
            .unwrap_or(0)
    }

    // ── TOD/BOD ─────────────────────────────────────────────────────

    /// Baut die TOD-/BOD-Marker neu auf. Die beiden Marker schließen
    /// sich gegenseitig aus: TOD solange der Pfad nicht aktiv geflogen
    /// wird und die Distanz über der Schwelle liegt, sonst BOD.
    /// Ungültige Leg-Indizes und nicht-endliche Distanzen degradieren
    /// zu "kein Marker in diesem Zyklus".
    fn on_tod_bod_changed(
        &mut self,
        provider: &FlightPlanDataProvider,
        renderer: &mut WaypointRenderer,
    ) {
        if let Some(waypoint) = self.tod_waypoint.take() {
            renderer.deregister(&waypoint, RenderRole::VNav, &self.owner_key);
        }
        if let Some(waypoint) = self.bod_waypoint.take() {
            renderer.deregister(&waypoint, RenderRole::VNav, &self.owner_key);
        }

        let Some(plan) = provider.plan.get() else {
            return;
        };
        if plan.segment_count() < 1
            || plan
                .segment(0)
                .map(|segment| segment.segment_type == SegmentType::RandomDirectTo)
                .unwrap_or(true)
        {
            return;
        }
        if *provider.vnav_state.get() == VNavState::Disabled {
            return;
        }

        let path_mode = *provider.vnav_path_mode.get();
        let tod_leg_index = *provider.vnav_tod_leg_index.get();
        let bod_leg_index = *provider.vnav_bod_leg_index.get();
        let tod_leg_distance = *provider.vnav_tod_leg_distance_m.get();
        let distance_to_tod = *provider.vnav_distance_to_tod_m.get();

        let show_tod = tod_leg_index.is_some()
            && distance_to_tod >= self.tod_distance_threshold_m
            && path_mode != VNavPathMode::PathActive;

        if show_tod {
            let Some(tod_index) = tod_leg_index else {
                return;
            };
            if tod_leg_distance.is_finite() && !plan.is_empty() {
                match plan.leg(tod_index) {
                    Some(leg) => {
                        match Waypoint::vnav(leg, tod_leg_distance, VNavWaypointKind::Tod) {
                            Ok(waypoint) => {
                                renderer.register(&waypoint, RenderRole::VNav, &self.owner_key);
                                self.tod_waypoint = Some(waypoint);
                            }
                            Err(e) => log::warn!("Ungültiges TOD-Leg {}: {}", tod_index, e),
                        }
                    }
                    None => log::warn!("Ungültiger TOD-Leg-Index: {}", tod_index),
                }
            } else if !tod_leg_distance.is_finite() {
                log::warn!("Ungültige TOD-Restdistanz: {}", tod_leg_distance);
            }
        } else if let Some(bod_index) = bod_leg_index {
            match plan.leg(bod_index) {
                Some(leg) => match Waypoint::vnav(leg, 0.0, VNavWaypointKind::Bod) {
                    Ok(waypoint) => {
                        renderer.register(&waypoint, RenderRole::VNav, &self.owner_key);
                        self.bod_waypoint = Some(waypoint);
                    }
                    Err(e) => log::warn!("Ungültiges BOD-Leg {}: {}", bod_index, e),
                },
                None => log::warn!("Ungültiger BOD-Leg-Index: {}", bod_index),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::ga_from_nm;
    use crate::core::{
        GeoPoint, LegCalculations, LegDefinition, LegFlags, LegType, ProjectionParams,
    };
    use std::sync::Arc;

    fn sample_plan() -> Arc<FlightPlan> {
        let mut plan = FlightPlan::new();
        let legs = (0..4)
            .map(|i| {
                let from = GeoPoint::new(47.0, 11.0 + i as f64 * 0.2);
                let to = GeoPoint::new(47.0, 11.2 + i as f64 * 0.2);
                LegDefinition::new(format!("L{}", i), LegType::TrackToFix, LegFlags::NONE)
                    .with_calculated(LegCalculations::line(from, to))
            })
            .collect();
        plan.push_segment(SegmentType::Enroute, legs);
        Arc::new(plan)
    }

    fn projection() -> MapProjection {
        let mut projection = MapProjection::new(800.0, 600.0);
        projection.set(&ProjectionParams {
            target: Some(GeoPoint::new(47.0, 11.4)),
            range: Some(ga_from_nm(80.0)),
            ..Default::default()
        });
        projection
    }

    fn setup() -> (
        FlightPlanLayer,
        FlightPlanDataProvider,
        WaypointRenderer,
        MapProjection,
    ) {
        let options = MapOptions::default();
        let layer = FlightPlanLayer::new("flightplan-layer", PathStyles::default(), &options);
        let mut provider = FlightPlanDataProvider::new();
        provider.set_plan(Some(sample_plan()));
        provider.active_lateral_leg_index.set(Some(1));
        (layer, provider, WaypointRenderer::new(), projection())
    }

    fn run_frame(
        layer: &mut FlightPlanLayer,
        provider: &FlightPlanDataProvider,
        renderer: &mut WaypointRenderer,
        projection: &MapProjection,
    ) -> DisplayList {
        let mut surface = DisplayList::new();
        layer.update(provider, projection, false, renderer, &mut surface);
        surface
    }

    #[test]
    fn test_route_cache_rebuilds_only_on_changes() {
        let (mut layer, provider, mut renderer, projection) = setup();

        let first = run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(first.stroke_count() > 0);

        // Ohne Änderungen: identische Wiedergabe aus dem Cache
        let second = run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert_eq!(first.ops(), second.ops());
    }

    #[test]
    fn test_tod_marker_requires_vnav_enabled() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_tod_leg_index.set(Some(2));
        provider.vnav_tod_leg_distance_m.set(5000.0);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());

        provider.vnav_state.set(VNavState::EnabledActive);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());
        assert!(renderer.is_registered("vnav-tod", Some(RenderRole::VNav)));
    }

    #[test]
    fn test_tod_bod_hysteresis_at_threshold() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(2));
        provider.vnav_bod_leg_index.set(Some(3));
        provider.vnav_tod_leg_distance_m.set(5000.0);
        provider.vnav_distance_to_tod_m.set(150.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());
        assert!(!layer.has_bod_waypoint());

        // Distanz-Ticks oberhalb der Schwelle ändern nichts
        provider.vnav_distance_to_tod_m.set(120.0);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        provider.vnav_distance_to_tod_m.set(101.0);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());

        // Genau auf der Schwelle bleibt TOD stehen (>= Schwelle)
        provider.vnav_distance_to_tod_m.set(100.0);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());

        // Durchgang unter die Schwelle → BOD ersetzt TOD
        provider.vnav_distance_to_tod_m.set(99.0);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());
        assert!(layer.has_bod_waypoint());
        assert!(renderer.is_registered("vnav-bod", Some(RenderRole::VNav)));

        // Oszillation zurück über die Schwelle → wieder TOD
        provider.vnav_distance_to_tod_m.set(101.0);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());
        assert!(!layer.has_bod_waypoint());
    }

    #[test]
    fn test_path_active_shows_bod_instead_of_tod() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(2));
        provider.vnav_bod_leg_index.set(Some(3));
        provider.vnav_tod_leg_distance_m.set(5000.0);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(layer.has_tod_waypoint());

        provider.vnav_path_mode.set(VNavPathMode::PathActive);
        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());
        assert!(layer.has_bod_waypoint());
    }

    #[test]
    fn test_invalid_tod_leg_index_degrades_to_no_marker() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(99));
        provider.vnav_tod_leg_distance_m.set(5000.0);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());
        assert!(!layer.has_bod_waypoint());
    }

    #[test]
    fn test_non_finite_tod_distance_degrades_to_no_marker() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(2));
        provider.vnav_tod_leg_distance_m.set(f64::NAN);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());
    }

    #[test]
    fn test_random_direct_to_plan_has_no_markers() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        let mut plan = FlightPlan::new();
        plan.push_segment(
            SegmentType::RandomDirectTo,
            vec![LegDefinition::new("DTO", LegType::DirectToFix, LegFlags::DIRECT_TO)
                .with_calculated(LegCalculations::line(
                    GeoPoint::new(47.0, 11.0),
                    GeoPoint::new(47.0, 11.5),
                ))],
        );
        provider.set_plan(Some(Arc::new(plan)));
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(0));
        provider.vnav_tod_leg_distance_m.set(1000.0);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(!layer.has_tod_waypoint());
    }

    #[test]
    fn test_destroy_deregisters_everything() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_tod_leg_index.set(Some(2));
        provider.vnav_tod_leg_distance_m.set(5000.0);
        provider.vnav_distance_to_tod_m.set(20_000.0);

        run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert!(renderer.entry_count() > 0);

        layer.destroy(&mut renderer);
        assert_eq!(renderer.entry_count(), 0);
    }

    #[test]
    fn test_obs_activation_redraws_route() {
        let (mut layer, mut provider, mut renderer, projection) = setup();
        let without_obs = run_frame(&mut layer, &provider, &mut renderer, &projection);

        provider.obs_course.set(Some(90.0));
        let with_obs = run_frame(&mut layer, &provider, &mut renderer, &projection);
        assert_ne!(without_obs.ops(), with_obs.ops());
    }
}
