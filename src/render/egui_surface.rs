//! egui-Backend der Map-Zeichenfläche.
//!
//! Übersetzt `MapSurface`-Aufrufe in egui-Painter-Shapes. Die Map
//! arbeitet in fensterlokalen Pixel-Koordinaten; `origin` verschiebt
//! sie in den Ziel-Rect des Panels.

use super::surface::{MapSurface, Stroke};
use glam::DVec2;

/// Zeichenfläche auf einem `egui::Painter`.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    origin: egui::Pos2,
    subpaths: Vec<Vec<egui::Pos2>>,
}

impl<'a> EguiSurface<'a> {
    /// Erstellt eine Zeichenfläche; `origin` ist die linke obere Ecke
    /// des Map-Rects in Screen-Koordinaten.
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self {
            painter,
            origin,
            subpaths: Vec::new(),
        }
    }

    fn to_screen(&self, point: DVec2) -> egui::Pos2 {
        egui::Pos2::new(
            self.origin.x + point.x as f32,
            self.origin.y + point.y as f32,
        )
    }
}

fn to_color(color: [f32; 4]) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(
        (color[0].clamp(0.0, 1.0) * 255.0) as u8,
        (color[1].clamp(0.0, 1.0) * 255.0) as u8,
        (color[2].clamp(0.0, 1.0) * 255.0) as u8,
        (color[3].clamp(0.0, 1.0) * 255.0) as u8,
    )
}

fn to_stroke(stroke: Stroke) -> egui::Stroke {
    egui::Stroke::new(stroke.width, to_color(stroke.color))
}

impl MapSurface for EguiSurface<'_> {
    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, point: DVec2) {
        let screen = self.to_screen(point);
        self.subpaths.push(vec![screen]);
    }

    fn line_to(&mut self, point: DVec2) {
        let screen = self.to_screen(point);
        if let Some(subpath) = self.subpaths.last_mut() {
            subpath.push(screen);
        } else {
            // line_to ohne move_to: Subpfad implizit beginnen
            self.subpaths.push(vec![screen]);
        }
    }

    fn stroke(&mut self, stroke: Stroke) {
        let egui_stroke = to_stroke(stroke);
        for subpath in self.subpaths.drain(..) {
            if subpath.len() >= 2 {
                self.painter.add(egui::Shape::line(subpath, egui_stroke));
            }
        }
    }

    fn fill_circle(&mut self, center: DVec2, radius: f32, color: [f32; 4]) {
        self.painter
            .circle_filled(self.to_screen(center), radius, to_color(color));
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f32, stroke: Stroke) {
        self.painter.circle(
            self.to_screen(center),
            radius,
            egui::Color32::TRANSPARENT,
            to_stroke(stroke),
        );
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: [f32; 4]) {
        let screen_points: Vec<egui::Pos2> = points.iter().map(|p| self.to_screen(*p)).collect();
        self.painter.add(egui::Shape::convex_polygon(
            screen_points,
            to_color(color),
            egui::Stroke::NONE,
        ));
    }

    fn text(&mut self, position: DVec2, text: &str, size: f32, color: [f32; 4]) {
        self.painter.text(
            self.to_screen(position),
            egui::Align2::LEFT_CENTER,
            text,
            egui::FontId::proportional(size),
            to_color(color),
        );
    }
}
