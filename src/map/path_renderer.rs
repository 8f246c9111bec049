//! Lateraler Flugplan-Pfad-Renderer.
//!
//! Der Plan wird in zwei pro Leg disjunkten Pässen gezeichnet:
//! Die Base-Route zeigt Kontext/Historie vor dem Start-Index als gedeckte
//! Linie (nur Through-Vektoren); die Full-Route zeichnet ab dem
//! Start-Index jeden Pfad-Vektor mit statusabhängigem Stil. Ein aktiver
//! OBS-Kurs ersetzt die Full-Route des aktiven Legs durch einen festen
//! Kursstrahl. Legs ohne aufgelöste Geometrie werden übersprungen.

use super::data_provider::{LNavData, TransitionMode};
use crate::core::{FlightPlan, GeoPoint, LegDefinition, LegFlags, LegType, MapProjection};
use crate::render::surface::{MapSurface, Stroke};
use crate::shared::options;
use glam::DVec2;

/// Adaptive Großkreis-Unterteilung: projizierte Sehnen werden rekursiv
/// halbiert, bis die Abweichung unter der Pixel-Toleranz liegt oder die
/// Maximaltiefe erreicht ist.
#[derive(Debug, Clone, Copy)]
pub struct GeodesicResampler {
    /// Winkeldistanz, ab der immer unterteilt wird (Radiant)
    pub min_angular_distance: f64,
    /// Toleranz der Sehnen-Abweichung in Pixeln
    pub pixel_tolerance: f64,
    /// Maximale Rekursionstiefe
    pub max_depth: u32,
}

impl Default for GeodesicResampler {
    fn default() -> Self {
        Self {
            min_angular_distance: options::RESAMPLE_MIN_ANGULAR_DISTANCE,
            pixel_tolerance: options::RESAMPLE_PIXEL_TOLERANCE,
            max_depth: options::RESAMPLE_MAX_DEPTH,
        }
    }
}

impl GeodesicResampler {
    /// Tastet den Großkreis von `start` nach `end` ab und liefert die
    /// Stützpunkte (ohne den Startpunkt) an den Sink.
    pub fn resample(
        &self,
        projection: &MapProjection,
        start: &GeoPoint,
        end: &GeoPoint,
        sink: &mut dyn FnMut(DVec2),
    ) {
        let start_projected = projection.project(start);
        let end_projected = projection.project(end);
        self.resample_segment(projection, start, start_projected, end, end_projected, 0, sink);
    }

    #[allow(clippy::too_many_arguments)]
    fn resample_segment(
        &self,
        projection: &MapProjection,
        start: &GeoPoint,
        start_projected: DVec2,
        end: &GeoPoint,
        end_projected: DVec2,
        depth: u32,
        sink: &mut dyn FnMut(DVec2),
    ) {
        if depth < self.max_depth {
            let midpoint = start.midpoint(end);
            let midpoint_projected = projection.project(&midpoint);
            let chord_midpoint = (start_projected + end_projected) / 2.0;
            let deviation = midpoint_projected.distance(chord_midpoint);

            if start.distance(end) > self.min_angular_distance || deviation > self.pixel_tolerance
            {
                self.resample_segment(
                    projection,
                    start,
                    start_projected,
                    &midpoint,
                    midpoint_projected,
                    depth + 1,
                    sink,
                );
                self.resample_segment(
                    projection,
                    &midpoint,
                    midpoint_projected,
                    end,
                    end_projected,
                    depth + 1,
                    sink,
                );
                return;
            }
        }
        sink(end_projected);
    }
}

/// Unveränderliche Stil-Konfiguration des Pfad-Renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyles {
    /// Base-Route (Kontext/Historie)
    pub base: Stroke,
    /// Aktives Leg
    pub active: Stroke,
    /// Legs vor dem aktiven Leg
    pub prior: Stroke,
    /// Missed Approach, solange nicht aktiv
    pub missed: Stroke,
    /// Kommende Legs
    pub upcoming: Stroke,
    /// OBS-Strahl zum Fix (inbound)
    pub obs_inbound: Stroke,
    /// OBS-Strahl hinter dem Fix (outbound)
    pub obs_outbound: Stroke,
}

impl Default for PathStyles {
    fn default() -> Self {
        Self {
            base: Stroke::new(options::PATH_BASE_STROKE_WIDTH, options::PATH_BASE_COLOR),
            active: Stroke::new(options::PATH_ACTIVE_STROKE_WIDTH, options::PATH_ACTIVE_COLOR),
            prior: Stroke::new(options::PATH_PRIOR_STROKE_WIDTH, options::PATH_PRIOR_COLOR),
            missed: Stroke::new(options::PATH_MISSED_STROKE_WIDTH, options::PATH_MISSED_COLOR),
            upcoming: Stroke::new(
                options::PATH_UPCOMING_STROKE_WIDTH,
                options::PATH_UPCOMING_COLOR,
            ),
            obs_inbound: Stroke::new(
                options::PATH_ACTIVE_STROKE_WIDTH,
                options::PATH_ACTIVE_COLOR,
            ),
            obs_outbound: Stroke::new(
                options::PATH_UPCOMING_STROKE_WIDTH,
                options::PATH_UPCOMING_COLOR,
            ),
        }
    }
}

/// Renderer für den lateralen Flugplan-Pfad.
#[derive(Debug, Clone)]
pub struct FlightPlanPathRenderer {
    styles: PathStyles,
    resampler: GeodesicResampler,
    obs_ray_length_nm: f64,
    vtf_ray_length_nm: f64,
    dto_ray_length_nm: f64,
}

impl Default for FlightPlanPathRenderer {
    fn default() -> Self {
        Self::new(PathStyles::default())
    }
}

impl FlightPlanPathRenderer {
    /// Erstellt einen Renderer mit den übergebenen Stilen.
    pub fn new(styles: PathStyles) -> Self {
        Self {
            styles,
            resampler: GeodesicResampler::default(),
            obs_ray_length_nm: options::OBS_RAY_LENGTH_NM,
            vtf_ray_length_nm: options::VTF_RAY_LENGTH_NM,
            dto_ray_length_nm: options::DTO_RAY_LENGTH_NM,
        }
    }

    /// Zeichnet den Plan auf die Zeichenfläche.
    ///
    /// `active_leg_index` ist `None`, wenn kein Leg aktiv ist; dann wird
    /// der gesamte Plan als statische Base-Route gezeichnet (sofern
    /// `draw_entire_plan` nicht die Full-Route erzwingt).
    pub fn render(
        &self,
        plan: &FlightPlan,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
        draw_entire_plan: bool,
        active_leg_index: Option<usize>,
        lnav_data: Option<&LNavData>,
        obs_course: Option<f64>,
    ) {
        let is_obs_active = obs_course.is_some();

        let base_route_end =
            self.base_route_end_index(plan, draw_entire_plan, active_leg_index, is_obs_active);
        for leg_index in 0..base_route_end {
            let Some(leg) = plan.leg(leg_index) else {
                continue;
            };
            self.render_base_route_leg(leg, leg_index, active_leg_index, projection, surface);
        }

        if let (Some(course), Some(active_index)) = (obs_course, active_leg_index) {
            if let Some(active_leg) = plan.leg(active_index) {
                self.render_obs_leg(active_leg, course, projection, surface);
            }
        } else {
            let full_route_start =
                self.full_route_start_index(plan, draw_entire_plan, active_leg_index);
            let is_missed_approach_active = active_leg_index
                .and_then(|index| plan.leg(index))
                .map(|leg| leg.flags.is_any(LegFlags::MISSED_APPROACH))
                .unwrap_or(false);

            for leg_index in full_route_start..plan.len() {
                let Some(leg) = plan.leg(leg_index) else {
                    continue;
                };
                self.render_full_route_leg(
                    leg,
                    leg_index,
                    active_leg_index,
                    is_missed_approach_active,
                    lnav_data,
                    projection,
                    surface,
                );
            }
        }
    }

    // ── Start-Index-Berechnung ──────────────────────────────────────

    /// Exklusives Ende der Base-Route. Bei aktivem OBS reicht die
    /// Base-Route genau bis einschließlich des aktiven Legs, da der
    /// OBS-Strahl dessen eigenen Pfad ersetzt.
    fn base_route_end_index(
        &self,
        plan: &FlightPlan,
        draw_entire_plan: bool,
        active_leg_index: Option<usize>,
        is_obs_active: bool,
    ) -> usize {
        if draw_entire_plan {
            return 0;
        }
        let Some(active_index) = active_leg_index else {
            // Kein aktives Leg: statischer Plan, alles Base-Route
            return plan.len();
        };
        if is_obs_active {
            return (active_index + 1).min(plan.len());
        }
        plan.nominal_from_leg_index(active_index).unwrap_or(0)
    }

    /// Start der Full-Route: das nominale Ursprungs-Leg des aktiven Legs,
    /// damit der Kontext unmittelbar davor sichtbar bleibt.
    fn full_route_start_index(
        &self,
        plan: &FlightPlan,
        draw_entire_plan: bool,
        active_leg_index: Option<usize>,
    ) -> usize {
        if draw_entire_plan {
            return 0;
        }
        let Some(active_index) = active_leg_index else {
            return plan.len();
        };
        plan.nominal_from_leg_index(active_index).unwrap_or(0)
    }

    // ── Leg-Rendering ───────────────────────────────────────────────

    /// Base-Route: nur Through-Vektoren, fester gedeckter Stil.
    /// Direct-To-Legs erscheinen hier nur, wenn sie das aktive Leg sind
    /// (OBS-Fall); sonst würden sie den Kontext doppelt zeichnen.
    fn render_base_route_leg(
        &self,
        leg: &LegDefinition,
        leg_index: usize,
        active_leg_index: Option<usize>,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        if leg.flags.is_all(LegFlags::DIRECT_TO) && Some(leg_index) != active_leg_index {
            return;
        }

        if leg.leg_type == LegType::CourseToFix && leg.flags.is_all(LegFlags::DIRECT_TO) {
            self.render_dto_course_leg(leg, self.styles.base, projection, surface);
        } else if leg.leg_type == LegType::CourseToFix
            && leg.flags.is_any(LegFlags::VECTORS_TO_FINAL)
        {
            self.render_vtf_leg(leg, self.styles.base, projection, surface);
        } else {
            self.render_leg_vectors(leg, true, true, self.styles.base, projection, surface);
        }
    }

    /// Full-Route: jeder Vektor, Stil nach Leg-Status; Hold-Typen
    /// delegieren an den Hold-Renderer mit Live-Tracking-Daten.
    #[allow(clippy::too_many_arguments)]
    fn render_full_route_leg(
        &self,
        leg: &LegDefinition,
        leg_index: usize,
        active_leg_index: Option<usize>,
        is_missed_approach_active: bool,
        lnav_data: Option<&LNavData>,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        let stroke = self.full_route_stroke(leg, leg_index, active_leg_index, is_missed_approach_active);

        match leg.leg_type {
            LegType::HoldManual | LegType::HoldToFix | LegType::HoldToAltitude => {
                self.render_hold_leg(
                    leg,
                    leg_index,
                    active_leg_index,
                    is_missed_approach_active,
                    lnav_data,
                    stroke,
                    projection,
                    surface,
                );
            }
            LegType::CourseToFix => {
                if leg.flags.is_all(LegFlags::DIRECT_TO) {
                    self.render_dto_course_leg(leg, stroke, projection, surface);
                } else if leg.flags.is_any(LegFlags::VECTORS_TO_FINAL) {
                    self.render_vtf_leg(leg, stroke, projection, surface);
                } else {
                    self.render_leg_vectors(leg, false, false, stroke, projection, surface);
                }
            }
            LegType::InitialFix
            | LegType::TrackToFix
            | LegType::DirectToFix
            | LegType::Discontinuity => {
                self.render_leg_vectors(leg, false, false, stroke, projection, surface);
            }
        }
    }

    /// Stil-Tabelle der Full-Route.
    fn full_route_stroke(
        &self,
        leg: &LegDefinition,
        leg_index: usize,
        active_leg_index: Option<usize>,
        is_missed_approach_active: bool,
    ) -> Stroke {
        match active_leg_index {
            Some(active) if leg_index == active => self.styles.active,
            Some(active) if leg_index < active => self.styles.prior,
            _ => {
                if !is_missed_approach_active && leg.flags.is_any(LegFlags::MISSED_APPROACH) {
                    self.styles.missed
                } else {
                    self.styles.upcoming
                }
            }
        }
    }

    /// Hold-Legs: Welche Vektor-Anteile (Ingress/Racetrack) gezeichnet
    /// werden, hängt davon ab, ob LNAV das Leg gerade jenseits der
    /// Eingangs-Transition trackt und ob die Sequenzierung suspendiert ist.
    #[allow(clippy::too_many_arguments)]
    fn render_hold_leg(
        &self,
        leg: &LegDefinition,
        leg_index: usize,
        active_leg_index: Option<usize>,
        is_missed_approach_active: bool,
        lnav_data: Option<&LNavData>,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        let is_prior = matches!(active_leg_index, Some(active) if leg_index < active);
        let is_upcoming = match active_leg_index {
            Some(active) => leg_index > active,
            None => true,
        };

        if is_prior
            || (leg.flags.is_all(LegFlags::MISSED_APPROACH) && !is_missed_approach_active)
        {
            self.render_leg_vectors(leg, true, false, stroke, projection, surface);
        } else if is_upcoming {
            self.render_leg_vectors(leg, false, false, stroke, projection, surface);
        } else {
            let in_hold = leg.calculated.is_some()
                && lnav_data
                    .map(|data| {
                        data.current_leg_index == leg_index
                            && data.transition_mode != TransitionMode::Ingress
                    })
                    .unwrap_or(false);
            let is_suspended = lnav_data.map(|data| data.is_suspended).unwrap_or(false);

            if in_hold && !is_suspended {
                self.render_leg_vectors(leg, true, false, stroke, projection, surface);
            } else if in_hold {
                self.render_leg_vectors(leg, true, true, stroke, projection, surface);
            } else {
                self.render_leg_vectors(leg, false, false, stroke, projection, surface);
            }
        }
    }

    /// Zeichnet die Pfad-Vektoren eines Legs als einen Pfad.
    /// Lücken zwischen Vektoren beginnen einen neuen Subpfad.
    fn render_leg_vectors(
        &self,
        leg: &LegDefinition,
        exclude_ingress: bool,
        exclude_egress: bool,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        let Some(calculated) = leg.calculated.as_ref() else {
            // Geometrie noch nicht aufgelöst → in diesem Pass überspringen
            return;
        };

        let vectors: Vec<_> = if exclude_ingress && exclude_egress {
            calculated.through.iter().collect()
        } else if exclude_ingress {
            calculated.through.iter().chain(&calculated.egress).collect()
        } else if exclude_egress {
            calculated.ingress.iter().chain(&calculated.through).collect()
        } else {
            calculated.all_vectors().collect()
        };
        if vectors.is_empty() {
            return;
        }

        surface.begin_path();
        let mut previous_end: Option<GeoPoint> = None;
        for vector in vectors {
            let continuous = previous_end
                .map(|end| end.approx_eq(&vector.start, 1e-9))
                .unwrap_or(false);
            if !continuous {
                surface.move_to(projection.project(&vector.start));
            }
            self.resampler
                .resample(projection, &vector.start, &vector.end, &mut |point| {
                    surface.line_to(point)
                });
            previous_end = Some(vector.end);
        }
        surface.stroke(stroke);
    }

    /// Direct-To-Legs: fester Kursstrahl aus der Ursprungsrichtung zum
    /// Zielfix statt des eigenen Vektor-Pfads.
    fn render_dto_course_leg(
        &self,
        leg: &LegDefinition,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        self.render_course_ray_to_fix(leg, self.dto_ray_length_nm, stroke, projection, surface);
    }

    /// Vectors-to-Final: Kursstrahl, der am Final Approach Fix endet.
    fn render_vtf_leg(
        &self,
        leg: &LegDefinition,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        self.render_course_ray_to_fix(leg, self.vtf_ray_length_nm, stroke, projection, surface);
    }

    /// Kursstrahl fester Länge entlang des letzten Pfad-Vektors,
    /// terminierend am Leg-Ende.
    fn render_course_ray_to_fix(
        &self,
        leg: &LegDefinition,
        ray_length_nm: f64,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        let Some(vector) = leg
            .calculated
            .as_ref()
            .and_then(|calc| calc.all_vectors().last().copied())
        else {
            return;
        };

        // Rückwärts-Peilung am Vektor-Ende bleibt auf demselben Großkreis
        let back_bearing = vector.end.initial_bearing(&vector.start);
        let ray_start = vector
            .end
            .offset(back_bearing, crate::core::geo::ga_from_nm(ray_length_nm));

        self.stroke_geo_line(&ray_start, &vector.end, stroke, projection, surface);
    }

    /// OBS-Override: magenta Strahl zum Fix, weißer Strahl dahinter,
    /// beide entlang des OBS-Kurses.
    fn render_obs_leg(
        &self,
        leg: &LegDefinition,
        obs_course_deg: f64,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        let Some(fix) = leg.calculated.as_ref().and_then(|calc| calc.end) else {
            return;
        };

        let ray_length = crate::core::geo::ga_from_nm(self.obs_ray_length_nm);
        let inbound_start = fix.offset((obs_course_deg + 180.0) % 360.0, ray_length);
        let outbound_end = fix.offset(obs_course_deg, ray_length);

        self.stroke_geo_line(&inbound_start, &fix, self.styles.obs_inbound, projection, surface);
        self.stroke_geo_line(&fix, &outbound_end, self.styles.obs_outbound, projection, surface);
    }

    /// Zeichnet eine einzelne Großkreis-Linie als eigenen Pfad.
    fn stroke_geo_line(
        &self,
        start: &GeoPoint,
        end: &GeoPoint,
        stroke: Stroke,
        projection: &MapProjection,
        surface: &mut dyn MapSurface,
    ) {
        surface.begin_path();
        surface.move_to(projection.project(start));
        self.resampler
            .resample(projection, start, end, &mut |point| surface.line_to(point));
        surface.stroke(stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::ga_from_nm;
    use crate::core::{LegCalculations, ProjectionParams, SegmentType};
    use crate::render::surface::{DisplayList, SurfaceOp};

    fn fix(index: usize) -> GeoPoint {
        GeoPoint::new(47.0, 11.0 + index as f64 * 0.2)
    }

    fn leg_between(name: &str, from: GeoPoint, to: GeoPoint) -> LegDefinition {
        LegDefinition::new(name, LegType::TrackToFix, LegFlags::NONE)
            .with_calculated(LegCalculations::line(from, to))
    }

    /// Plan mit 5 Legs A→B→C→D→E in einem Enroute-Segment.
    fn five_leg_plan() -> FlightPlan {
        let mut plan = FlightPlan::new();
        let legs = (0..5)
            .map(|i| leg_between(&format!("L{}", i), fix(i), fix(i + 1)))
            .collect();
        plan.push_segment(SegmentType::Enroute, legs);
        plan
    }

    fn projection() -> MapProjection {
        let mut projection = MapProjection::new(800.0, 600.0);
        projection.set(&ProjectionParams {
            target: Some(GeoPoint::new(47.0, 11.5)),
            range: Some(ga_from_nm(120.0)),
            ..Default::default()
        });
        projection
    }

    fn strokes(surface: &DisplayList) -> Vec<Stroke> {
        surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Stroke(stroke) => Some(*stroke),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_path_range_coverage_with_active_leg() {
        let plan = five_leg_plan();
        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let styles = PathStyles::default();

        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, false, Some(2), None, None);

        // Ursprung von Leg 2 ist Leg 1: Base-Route [0,1), Full-Route [1,5)
        let strokes = strokes(&surface);
        assert_eq!(strokes.len(), 5);
        assert_eq!(strokes[0], styles.base);
        assert_eq!(strokes[1], styles.prior);
        assert_eq!(strokes[2], styles.active);
        assert_eq!(strokes[3], styles.upcoming);
        assert_eq!(strokes[4], styles.upcoming);
    }

    #[test]
    fn test_no_active_leg_renders_static_base_route() {
        let plan = five_leg_plan();
        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let styles = PathStyles::default();

        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, false, None, None, None);

        let strokes = strokes(&surface);
        assert_eq!(strokes.len(), 5);
        assert!(strokes.iter().all(|s| *s == styles.base));
    }

    #[test]
    fn test_draw_entire_plan_uses_full_route_only() {
        let plan = five_leg_plan();
        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let styles = PathStyles::default();

        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, true, None, None, None);

        let strokes = strokes(&surface);
        assert_eq!(strokes.len(), 5);
        assert!(strokes.iter().all(|s| *s == styles.upcoming));
    }

    #[test]
    fn test_obs_override_replaces_active_leg_path() {
        let plan = five_leg_plan();
        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let styles = PathStyles::default();

        let mut surface = DisplayList::new();
        renderer.render(
            &plan,
            &projection,
            &mut surface,
            false,
            Some(3),
            None,
            Some(90.0),
        );

        // Base-Route deckt [0,4) ab, dann exakt zwei OBS-Strahlen
        let strokes = strokes(&surface);
        assert_eq!(strokes.len(), 6);
        assert!(strokes[..4].iter().all(|s| *s == styles.base));
        assert_eq!(strokes[4], styles.obs_inbound);
        assert_eq!(strokes[5], styles.obs_outbound);
    }

    #[test]
    fn test_missed_approach_style_until_active() {
        let mut plan = FlightPlan::new();
        plan.push_segment(
            SegmentType::Approach,
            vec![
                leg_between("FAF", fix(0), fix(1)),
                leg_between("RWY", fix(1), fix(2)),
            ],
        );
        let missed = vec![LegDefinition::new("MA1", LegType::TrackToFix, LegFlags::MISSED_APPROACH)
            .with_calculated(LegCalculations::line(fix(2), fix(3)))];
        plan.push_segment(SegmentType::MissedApproach, missed);

        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let styles = PathStyles::default();

        // Aktiv auf dem Approach: MA-Leg dünn/gedimmt
        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, false, Some(1), None, None);
        let rendered = strokes(&surface);
        assert_eq!(*rendered.last().unwrap(), styles.missed);

        // Missed Approach aktiv: MA-Leg ist das aktive Leg
        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, false, Some(2), None, None);
        let rendered = strokes(&surface);
        assert_eq!(*rendered.last().unwrap(), styles.active);
    }

    #[test]
    fn test_unresolved_legs_are_skipped() {
        let mut plan = FlightPlan::new();
        plan.push_segment(
            SegmentType::Enroute,
            vec![
                leg_between("A", fix(0), fix(1)),
                LegDefinition::new("PENDING", LegType::TrackToFix, LegFlags::NONE),
                leg_between("B", fix(2), fix(3)),
            ],
        );

        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();
        let mut surface = DisplayList::new();
        renderer.render(&plan, &projection, &mut surface, true, None, None, None);

        // Nur die beiden aufgelösten Legs zeichnen
        assert_eq!(surface.stroke_count(), 2);
    }

    #[test]
    fn test_hold_leg_uses_lnav_tracking_state() {
        let hold_vectors = LegCalculations {
            end: Some(fix(2)),
            ingress: vec![crate::core::FlightPathVector::new(fix(1), fix(2))],
            through: vec![
                crate::core::FlightPathVector::new(fix(2), fix(3)),
                crate::core::FlightPathVector::new(fix(3), fix(2)),
            ],
            egress: Vec::new(),
        };
        let mut plan = FlightPlan::new();
        plan.push_segment(
            SegmentType::Enroute,
            vec![
                leg_between("A", fix(0), fix(1)),
                LegDefinition::new("HOLD", LegType::HoldManual, LegFlags::NONE)
                    .with_calculated(hold_vectors),
            ],
        );

        let projection = projection();
        let renderer = FlightPlanPathRenderer::default();

        let count_line_points = |lnav: Option<&LNavData>| {
            let mut surface = DisplayList::new();
            renderer.render(&plan, &projection, &mut surface, false, Some(1), lnav, None);
            surface
                .ops()
                .iter()
                .filter(|op| matches!(op, SurfaceOp::MoveTo(_)))
                .count()
        };

        // Vor dem Hold (Ingress wird noch geflogen): kompletter Pfad
        let entering = LNavData {
            current_leg_index: 1,
            vector_index: 0,
            transition_mode: TransitionMode::Ingress,
            is_suspended: false,
        };
        // Im Hold: Ingress wird nicht mehr gezeichnet → weniger Subpfade
        let established = LNavData {
            current_leg_index: 1,
            vector_index: 0,
            transition_mode: TransitionMode::None,
            is_suspended: false,
        };

        let with_ingress = count_line_points(Some(&entering));
        let without_ingress = count_line_points(Some(&established));
        assert!(without_ingress <= with_ingress);
    }
}
