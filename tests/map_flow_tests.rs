//! Integrationstests für das Zusammenspiel der Map-Komponenten:
//! - Projektions-Roundtrip über den vollen Parameterraum
//! - Pointer-Klammern mit Scroll-Umlenkung (Erhaltungssatz)
//! - Rollen-Arbitrierung über mehrere Layer
//! - Range-Konvertierung pro Orientierung durch den ganzen Stack

use efis_moving_map::core::geo::ga_from_nm;
use efis_moving_map::{
    DeadZone, DisplayList, FlightPlan, FlightPlanDataProvider, GeoPoint, LegCalculations,
    LegDefinition, LegFlags, LegType, MapOptions, MapProjection, NavMap, OrientationSetting,
    ProjectionParams, RenderRole, SegmentType, Waypoint, WaypointCategory, WaypointRenderer,
};
use std::sync::Arc;

/// Erstellt einen Plan mit `count` aufgelösten TF-Legs entlang 47°N.
fn plan_with_legs(count: usize) -> Arc<FlightPlan> {
    let mut plan = FlightPlan::new();
    let legs = (0..count)
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

fn nav_map() -> NavMap {
    NavMap::new(800.0, 600.0, MapOptions::default())
}

fn run_frame(map: &mut NavMap, provider: &FlightPlanDataProvider, time: f64) {
    let mut surface = DisplayList::new();
    map.update(time, provider, &mut surface);
}

#[test]
fn projection_roundtrip_over_parameter_sets() {
    let targets = [
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(47.26, 11.34),
        GeoPoint::new(-33.95, 151.18),
        GeoPoint::new(61.2, -149.9),
    ];
    let ranges_nm = [2.5, 40.0, 500.0];
    let rotations = [0.0, 0.7, -1.3];

    for target in targets {
        for range_nm in ranges_nm {
            for rotation in rotations {
                let mut projection = MapProjection::new(800.0, 600.0);
                projection.set(&ProjectionParams {
                    target: Some(target),
                    range: Some(ga_from_nm(range_nm)),
                    rotation: Some(rotation),
                    target_projected_offset: Some(glam::DVec2::new(30.0, 80.0)),
                    ..Default::default()
                });

                let probe = GeoPoint::new(target.lat + 0.05, target.lon - 0.07);
                let restored = projection.invert(projection.project(&probe));
                assert!(
                    restored.approx_eq(&probe, 1e-9),
                    "Roundtrip-Abweichung bei target={:?} range={} rot={}",
                    target,
                    range_nm,
                    rotation
                );
            }
        }
    }
}

#[test]
fn pointer_clamp_and_scroll_conserve_requested_delta() {
    let mut map = nav_map();
    let provider = FlightPlanDataProvider::new();

    map.set_airplane_state(GeoPoint::new(47.0, 11.0), 0.0, 0.0, false);
    run_frame(&mut map, &provider, 0.0);

    map.set_pointer_active(true);
    run_frame(&mut map, &provider, 0.1);

    let bounds = map.controller().pointer_bounds();
    let start_position = map.pointer().position;
    let target_projected_before = map.projection().target_projected();

    // Delta, das die rechte und untere Bounds-Kante deutlich überschreitet
    let delta = glam::DVec2::new(500.0, 400.0);
    map.move_pointer(delta.x, delta.y);

    // Erwartetes Scroll-Delta vor dem Update bestimmen
    let unclamped = start_position + delta;
    let clamped = glam::DVec2::new(
        unclamped.x.clamp(bounds[0], bounds[2]),
        unclamped.y.clamp(bounds[1], bounds[3]),
    );
    let expected_scroll = unclamped - clamped;
    let expected_target = map
        .projection()
        .invert(target_projected_before + expected_scroll);

    run_frame(&mut map, &provider, 0.2);

    // Erhaltungssatz: Klammer-Delta + Scroll-Delta = angefordertes Delta
    let applied = map.pointer().position - start_position;
    assert!((applied + expected_scroll - delta).length() < 1e-9);

    // Pointer liegt auf den Bounds, das Target ist um den Rest gescrollt
    assert!(map.pointer().position.x <= bounds[2] + 1e-9);
    assert!(map.pointer().position.y <= bounds[3] + 1e-9);
    assert!(map.projection().target().approx_eq(&expected_target, 1e-6));
}

#[test]
fn pointer_moves_within_bounds_do_not_scroll() {
    let mut map = nav_map();
    let provider = FlightPlanDataProvider::new();
    map.set_airplane_state(GeoPoint::new(47.0, 11.0), 0.0, 0.0, false);
    run_frame(&mut map, &provider, 0.0);

    map.set_pointer_active(true);
    run_frame(&mut map, &provider, 0.1);
    let target_before = map.projection().target();

    map.move_pointer(5.0, -5.0);
    run_frame(&mut map, &provider, 0.2);

    assert!(map.projection().target().approx_eq(&target_before, 1e-12));
}

#[test]
fn deactivated_pointer_resumes_airplane_tracking() {
    let mut map = nav_map();
    let provider = FlightPlanDataProvider::new();
    map.set_airplane_state(GeoPoint::new(47.0, 11.0), 0.0, 0.0, false);
    run_frame(&mut map, &provider, 0.0);

    map.set_pointer_active(true);
    run_frame(&mut map, &provider, 0.1);

    // Aircraft fliegt weiter; Map bleibt stehen
    map.set_airplane_state(GeoPoint::new(47.5, 11.5), 0.0, 0.0, false);
    run_frame(&mut map, &provider, 0.2);
    assert!(map
        .projection()
        .target()
        .approx_eq(&GeoPoint::new(47.0, 11.0), 1e-9));

    map.set_pointer_active(false);
    run_frame(&mut map, &provider, 0.3);
    assert!(map
        .projection()
        .target()
        .approx_eq(&GeoPoint::new(47.5, 11.5), 1e-9));
}

#[test]
fn role_arbitration_is_deterministic_across_layers() {
    let mut renderer = WaypointRenderer::new();
    let waypoint = Waypoint::new(
        "WPT",
        "WPT",
        GeoPoint::new(47.0, 11.0),
        WaypointCategory::Intersection,
    );

    // Zwei unabhängige Layer registrieren denselben Wegpunkt
    renderer.register(&waypoint, RenderRole::Normal, "waypoints-layer");
    renderer.register(&waypoint, RenderRole::FlightPlanInactive, "flightplan-layer");

    assert_eq!(
        renderer.select_role_to_render("WPT"),
        Some(RenderRole::FlightPlanInactive)
    );

    // Declutter blendet die Flugplan-Rolle aus → Fallback auf Normal
    renderer.set_visibility_handler(RenderRole::FlightPlanInactive, |_| false);
    assert_eq!(renderer.select_role_to_render("WPT"), Some(RenderRole::Normal));

    // Ein Layer zieht sich zurück; der andere hält den Eintrag am Leben
    renderer.deregister(&waypoint, RenderRole::FlightPlanInactive, "flightplan-layer");
    assert!(renderer.is_registered("WPT", None));
    renderer.deregister(&waypoint, RenderRole::Normal, "waypoints-layer");
    assert!(!renderer.is_registered("WPT", None));
}

#[test]
fn range_conversion_depends_on_orientation_through_full_stack() {
    let provider = FlightPlanDataProvider::new();

    let mut north_up = nav_map();
    north_up.set_orientation_setting(OrientationSetting::NorthUp);
    north_up.set_range_index(5);
    run_frame(&mut north_up, &provider, 0.0);

    let mut heading_up = nav_map();
    heading_up.set_orientation_setting(OrientationSetting::HeadingUp);
    heading_up.set_range_index(5);
    run_frame(&mut heading_up, &provider, 0.0);

    let north_range = north_up.projection().range();
    let heading_range = heading_up.projection().range();
    assert!(north_range > heading_range);
    assert!((north_range / heading_range - 4.0 / 3.0).abs() < 1e-9);
}

#[test]
fn flight_plan_layer_renders_through_nav_map() {
    let mut map = nav_map();
    let mut provider = FlightPlanDataProvider::new();
    provider.set_plan(Some(plan_with_legs(5)));
    provider.active_lateral_leg_index.set(Some(2));

    map.set_airplane_state(GeoPoint::new(47.0, 11.5), 90.0, 90.0, false);

    let mut surface = DisplayList::new();
    map.update(0.0, &provider, &mut surface);

    // Pfad-Strokes und Wegpunkt-Zeichnungen kommen im selben Frame an
    assert!(surface.stroke_count() > 0);
    assert!(map.waypoint_renderer().entry_count() > 0);

    map.destroy();
    assert_eq!(map.waypoint_renderer().entry_count(), 0);
}

#[test]
fn dead_zone_larger_than_viewport_is_clamped() {
    let mut map = nav_map();
    let provider = FlightPlanDataProvider::new();

    map.set_dead_zone(DeadZone::new(500.0, 400.0, 500.0, 400.0));
    run_frame(&mut map, &provider, 0.0);

    // Range bleibt endlich und positiv
    let range = map.projection().range();
    assert!(range.is_finite() && range > 0.0);

    let bounds = map.controller().pointer_bounds();
    assert!(bounds[0] <= bounds[2]);
    assert!(bounds[1] <= bounds[3]);
}
