//! EFIS Moving Map (Demo-Shell).
//!
//! Simuliert ein Aircraft entlang eines Beispiel-Flugplans und treibt
//! die Moving Map einmal pro Frame. Tastatur: Bild↑/Bild↓ Range,
//! N/T/H Orientierung, P Pointer, Pfeiltasten Pointer bewegen,
//! Eingabe Pointer-Target übernehmen, E gesamten Plan, O OBS.

use eframe::egui;
use efis_moving_map::core::geo::{ga_from_nm, meters_from_ga};
use efis_moving_map::{
    DeadZone, EguiSurface, FlightPlan, FlightPlanDataProvider, GeoPoint, LNavData, LegCalculations,
    LegDefinition, LegFlags, LegType, MapOptions, NavMap, OrientationSetting, SegmentType,
    TransitionMode, VNavPathMode, VNavState,
};

/// Simulierte Grundgeschwindigkeit in Knoten.
const SIM_GROUND_SPEED_KT: f64 = 140.0;
/// Zeitraffer der Simulation.
const SIM_TIME_SCALE: f64 = 20.0;

fn main() -> Result<(), eframe::Error> {
    AppRunner::run()
}

struct AppRunner;

impl AppRunner {
    fn run() -> Result<(), eframe::Error> {
        // Logger initialisieren
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();

        log::info!("EFIS Moving Map v{} startet...", env!("CARGO_PKG_VERSION"));

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1024.0, 768.0])
                .with_title("EFIS Moving Map"),
            ..Default::default()
        };

        eframe::run_native(
            "EFIS Moving Map",
            options,
            Box::new(|_cc| Ok(Box::new(MapApp::new()))),
        )
    }
}

/// Haupt-Anwendungsstruktur
struct MapApp {
    nav_map: NavMap,
    provider: FlightPlanDataProvider,
    simulator: FlightSimulator,
    entire_plan: bool,
    last_frame_time: Option<f64>,
}

impl MapApp {
    fn new() -> Self {
        let map_options = MapOptions::load_from_file(&MapOptions::config_path());

        let plan = std::sync::Arc::new(build_demo_plan());
        let simulator = FlightSimulator::new(&plan);

        let mut provider = FlightPlanDataProvider::new();
        provider.set_plan(Some(plan.clone()));
        provider.plan_calculated.notify();
        provider.vnav_state.set(VNavState::EnabledActive);
        provider.vnav_path_mode.set(VNavPathMode::None);
        // TOD auf dem letzten Enroute-Leg, 3 km vor dessen Ende
        provider.vnav_tod_leg_index.set(Some(3));
        provider.vnav_bod_leg_index.set(Some(5));
        provider.vnav_tod_leg_distance_m.set(3_000.0);

        let mut nav_map = NavMap::new(1024.0, 768.0, map_options);
        nav_map.set_orientation_setting(OrientationSetting::TrackUp);
        nav_map.set_dead_zone(DeadZone::new(0.0, 0.0, 0.0, 40.0));

        Self {
            nav_map,
            provider,
            simulator,
            entire_plan: false,
            last_frame_time: None,
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        ctx.input(|input| {
            if input.key_pressed(egui::Key::PageUp) {
                let index = self.nav_map.range_index();
                self.nav_map.set_range_index(index.saturating_sub(1));
            }
            if input.key_pressed(egui::Key::PageDown) {
                let index = self.nav_map.range_index();
                self.nav_map.set_range_index(index + 1);
            }
            if input.key_pressed(egui::Key::N) {
                self.nav_map
                    .set_orientation_setting(OrientationSetting::NorthUp);
            }
            if input.key_pressed(egui::Key::T) {
                self.nav_map
                    .set_orientation_setting(OrientationSetting::TrackUp);
            }
            if input.key_pressed(egui::Key::H) {
                self.nav_map
                    .set_orientation_setting(OrientationSetting::HeadingUp);
            }
            if input.key_pressed(egui::Key::P) {
                let active = self.nav_map.toggle_pointer_active();
                log::info!("Pointer {}", if active { "aktiviert" } else { "deaktiviert" });
            }
            if input.key_pressed(egui::Key::Enter) {
                self.nav_map.target_pointer();
            }
            if input.key_pressed(egui::Key::E) {
                self.entire_plan = !self.entire_plan;
                self.nav_map.set_draw_entire_plan(self.entire_plan);
            }
            if input.key_pressed(egui::Key::O) {
                let obs = self.provider.obs_course.get().is_none().then_some(240.0);
                self.provider.obs_course.set(obs);
            }
            if input.key_pressed(egui::Key::ArrowLeft) {
                self.nav_map.step_pointer(-1.0, 0.0);
            }
            if input.key_pressed(egui::Key::ArrowRight) {
                self.nav_map.step_pointer(1.0, 0.0);
            }
            if input.key_pressed(egui::Key::ArrowUp) {
                self.nav_map.step_pointer(0.0, -1.0);
            }
            if input.key_pressed(egui::Key::ArrowDown) {
                self.nav_map.step_pointer(0.0, 1.0);
            }
        });
    }
}

impl eframe::App for MapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let time = ctx.input(|input| input.time);
        let elapsed = self
            .last_frame_time
            .map(|last| (time - last).max(0.0))
            .unwrap_or(0.0);
        self.last_frame_time = Some(time);

        self.handle_input(ctx);
        self.simulator.advance(elapsed * SIM_TIME_SCALE);
        self.simulator.publish(&mut self.provider);
        self.nav_map.set_airplane_state(
            self.simulator.position,
            self.simulator.track_deg,
            self.simulator.track_deg,
            false,
        );

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.available_rect_before_wrap();
                self.nav_map
                    .set_projected_size(f64::from(rect.width()), f64::from(rect.height()));

                let painter = ui.painter_at(rect);
                painter.rect_filled(rect, egui::CornerRadius::ZERO, egui::Color32::from_rgb(8, 12, 20));

                let mut surface = EguiSurface::new(&painter, rect.min);
                self.nav_map.update(time, &self.provider, &mut surface);

                draw_ownship(&painter, rect, &self.nav_map, &self.simulator);
                draw_pointer(&painter, rect, &self.nav_map);
                draw_hud(&painter, rect, &self.nav_map, &self.provider);
            });

        ctx.request_repaint();
    }
}

/// Zeichnet das Ownship-Symbol an der projizierten Aircraft-Position.
fn draw_ownship(
    painter: &egui::Painter,
    rect: egui::Rect,
    nav_map: &NavMap,
    simulator: &FlightSimulator,
) {
    let projected = nav_map.projection().project(&simulator.position);
    let center = egui::Pos2::new(
        rect.min.x + projected.x as f32,
        rect.min.y + projected.y as f32,
    );

    // Screen-Winkel = Heading + Karten-Rotation
    let angle = simulator.track_deg.to_radians() + nav_map.projection().rotation();
    let (sin_a, cos_a) = (angle.sin() as f32, angle.cos() as f32);
    let forward = egui::Vec2::new(sin_a, -cos_a);
    let right = egui::Vec2::new(cos_a, sin_a);

    let tip = center + forward * 12.0;
    let left_base = center - forward * 8.0 - right * 7.0;
    let right_base = center - forward * 8.0 + right * 7.0;
    painter.add(egui::Shape::convex_polygon(
        vec![tip, right_base, left_base],
        egui::Color32::WHITE,
        egui::Stroke::new(1.0, egui::Color32::BLACK),
    ));
}

/// Zeichnet das Pointer-Kreuz, solange der Pointer aktiv ist.
fn draw_pointer(painter: &egui::Painter, rect: egui::Rect, nav_map: &NavMap) {
    if !nav_map.pointer().is_active {
        return;
    }
    let position = nav_map.pointer().position;
    let center = egui::Pos2::new(
        rect.min.x + position.x as f32,
        rect.min.y + position.y as f32,
    );
    let stroke = egui::Stroke::new(2.0, egui::Color32::CYAN);
    painter.line_segment(
        [center - egui::vec2(10.0, 0.0), center + egui::vec2(10.0, 0.0)],
        stroke,
    );
    painter.line_segment(
        [center - egui::vec2(0.0, 10.0), center + egui::vec2(0.0, 10.0)],
        stroke,
    );
}

/// Status-Overlay oben links.
fn draw_hud(
    painter: &egui::Painter,
    rect: egui::Rect,
    nav_map: &NavMap,
    provider: &FlightPlanDataProvider,
) {
    let range = nav_map
        .controller()
        .nominal_range_nm()
        .map(|nm| format!("{:.2} NM", nm))
        .unwrap_or_else(|| "--".to_string());
    let obs = provider
        .obs_course
        .get()
        .map(|course| format!("  OBS {:.0}°", course))
        .unwrap_or_default();
    let text = format!(
        "Range {}  {:?}{}",
        range,
        nav_map.controller().orientation(),
        obs
    );
    painter.text(
        rect.min + egui::vec2(10.0, 10.0),
        egui::Align2::LEFT_TOP,
        text,
        egui::FontId::monospace(14.0),
        egui::Color32::LIGHT_GREEN,
    );
}

/// Beispiel-Flugplan: Abflug Innsbruck, Enroute nach Osten, Approach
/// mit Missed-Approach-Hold.
fn build_demo_plan() -> FlightPlan {
    let lowi = GeoPoint::new(47.260, 11.344);
    let rtt = GeoPoint::new(47.430, 11.940);
    let kogol = GeoPoint::new(47.290, 12.180);
    let stein = GeoPoint::new(47.170, 12.520);
    let faf = GeoPoint::new(47.080, 12.760);
    let rwy = GeoPoint::new(47.020, 12.900);
    let ma_fix = GeoPoint::new(46.960, 13.060);

    let leg = |name: &str, from: GeoPoint, to: GeoPoint, flags: LegFlags| {
        LegDefinition::new(name, LegType::TrackToFix, flags)
            .with_calculated(LegCalculations::line(from, to))
    };

    let mut plan = FlightPlan::new();
    plan.push_segment(
        SegmentType::Departure,
        vec![
            LegDefinition::new("LOWI", LegType::InitialFix, LegFlags::NONE)
                .with_calculated(LegCalculations::line(lowi, lowi)),
            leg("RTT", lowi, rtt, LegFlags::NONE),
        ],
    );
    plan.push_segment(
        SegmentType::Enroute,
        vec![
            leg("KOGOL", rtt, kogol, LegFlags::NONE),
            leg("STEIN", kogol, stein, LegFlags::NONE),
        ],
    );
    plan.push_segment(
        SegmentType::Approach,
        vec![leg("FAF26", stein, faf, LegFlags::NONE), leg("RW26", faf, rwy, LegFlags::NONE)],
    );

    // Missed Approach: Climb-out und Hold am MA-Fix
    let hold = build_hold_geometry(ma_fix, 60.0);
    plan.push_segment(
        SegmentType::MissedApproach,
        vec![
            leg("MA26", rwy, ma_fix, LegFlags::MISSED_APPROACH),
            LegDefinition::new("HOLD", LegType::HoldManual, LegFlags::MISSED_APPROACH)
                .with_calculated(hold),
        ],
    );

    plan
}

/// Racetrack-Geometrie eines Holds am Fix mit Inbound-Kurs.
fn build_hold_geometry(fix: GeoPoint, inbound_course_deg: f64) -> LegCalculations {
    use efis_moving_map::FlightPathVector;

    let leg_length = ga_from_nm(4.0);
    let turn_width = ga_from_nm(1.5);

    let outbound_course = (inbound_course_deg + 180.0) % 360.0;
    let side_course = (inbound_course_deg + 90.0) % 360.0;

    let entry_end = fix.offset(outbound_course, leg_length);
    let outbound_start = entry_end.offset(side_course, turn_width);
    let outbound_end = fix.offset(side_course, turn_width);

    LegCalculations {
        end: Some(fix),
        ingress: vec![FlightPathVector::new(fix, entry_end)],
        through: vec![
            FlightPathVector::new(entry_end, outbound_start),
            FlightPathVector::new(outbound_start, outbound_end),
            FlightPathVector::new(outbound_end, fix),
        ],
        egress: Vec::new(),
    }
}

/// Bewegt ein simuliertes Aircraft entlang der Plan-Vertices.
struct FlightSimulator {
    route: Vec<(usize, GeoPoint)>,
    next_index: usize,
    position: GeoPoint,
    track_deg: f64,
    tod_point: GeoPoint,
}

impl FlightSimulator {
    fn new(plan: &FlightPlan) -> Self {
        let mut route = Vec::new();
        for (leg_index, leg) in plan.legs().enumerate() {
            if let Some(calculated) = leg.calculated.as_ref() {
                for vector in calculated.all_vectors() {
                    route.push((leg_index, vector.end));
                }
            }
        }

        let start = route
            .first()
            .map(|(_, point)| *point)
            .unwrap_or_else(|| GeoPoint::new(47.26, 11.34));
        // TOD-Referenzpunkt: Ende des Enroute-Teils
        let tod_point = plan
            .leg(3)
            .and_then(|leg| leg.calculated.as_ref())
            .and_then(|calc| calc.end)
            .unwrap_or(start);

        Self {
            route,
            next_index: 1,
            position: start,
            track_deg: 0.0,
            tod_point,
        }
    }

    /// Rückt die Position um `elapsed` Sekunden Flugzeit vor.
    fn advance(&mut self, elapsed_s: f64) {
        if elapsed_s <= 0.0 {
            return;
        }
        let mut remaining = ga_from_nm(SIM_GROUND_SPEED_KT / 3600.0) * elapsed_s;

        while remaining > 0.0 {
            let Some(&(_, next_point)) = self.route.get(self.next_index) else {
                return;
            };
            let distance = self.position.distance(&next_point);
            if distance < 1e-9 {
                if self.next_index + 1 >= self.route.len() {
                    return;
                }
                self.next_index += 1;
                continue;
            }

            let bearing = self.position.initial_bearing(&next_point);
            self.track_deg = bearing;
            if remaining < distance {
                self.position = self.position.offset(bearing, remaining);
                return;
            }

            self.position = next_point;
            remaining -= distance;
            if self.next_index + 1 >= self.route.len() {
                return;
            }
            self.next_index += 1;
        }
    }

    /// Schreibt den Simulationszustand in den Datenprovider.
    fn publish(&self, provider: &mut FlightPlanDataProvider) {
        let current_leg = self
            .route
            .get(self.next_index)
            .or_else(|| self.route.last())
            .map(|(leg_index, _)| *leg_index);

        provider.active_lateral_leg_index.set(current_leg);
        provider.lnav_data.set(current_leg.map(|leg_index| LNavData {
            current_leg_index: leg_index,
            vector_index: 0,
            transition_mode: TransitionMode::None,
            is_suspended: false,
        }));

        let distance_to_tod =
            meters_from_ga(self.position.distance(&self.tod_point)).max(0.0) - 3_000.0;
        provider.vnav_distance_to_tod_m.set(distance_to_tod.max(0.0));
    }
}
