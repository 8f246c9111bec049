//! Zeichenflächen-Abstraktion der Moving Map.
//!
//! Die Map-Renderer zeichnen gegen `MapSurface` statt gegen ein konkretes
//! Backend. `DisplayList` ist eine aufzeichnende Implementierung: Sie dient
//! als Render-Cache der Layer (einmal aufbauen, pro Frame abspielen) und
//! als beobachtbares Backend in Tests.

use glam::DVec2;

/// Linienstil für Pfad-Strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Linienstärke in Pixeln
    pub width: f32,
    /// Farbe (RGBA, 0..1)
    pub color: [f32; 4],
}

impl Stroke {
    /// Erstellt einen Linienstil.
    pub const fn new(width: f32, color: [f32; 4]) -> Self {
        Self { width, color }
    }
}

/// Abstrakte 2D-Zeichenfläche in Pixel-Koordinaten.
///
/// Pfade werden aus Subpfaden aufgebaut (`move_to` beginnt einen neuen
/// Subpfad) und mit `stroke` gezeichnet; `begin_path` verwirft den
/// aktuellen Pfadaufbau.
pub trait MapSurface {
    /// Beginnt einen neuen, leeren Pfad.
    fn begin_path(&mut self);
    /// Beginnt einen neuen Subpfad am Punkt.
    fn move_to(&mut self, point: DVec2);
    /// Linie vom aktuellen Punkt zum Punkt.
    fn line_to(&mut self, point: DVec2);
    /// Zeichnet den aufgebauten Pfad.
    fn stroke(&mut self, stroke: Stroke);
    /// Gefüllter Kreis.
    fn fill_circle(&mut self, center: DVec2, radius: f32, color: [f32; 4]);
    /// Kreis-Umriss.
    fn stroke_circle(&mut self, center: DVec2, radius: f32, stroke: Stroke);
    /// Gefülltes konvexes Polygon.
    fn fill_polygon(&mut self, points: &[DVec2], color: [f32; 4]);
    /// Text linksbündig an der Position.
    fn text(&mut self, position: DVec2, text: &str, size: f32, color: [f32; 4]);
}

/// Eine aufgezeichnete Zeichenoperation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Pfadaufbau verworfen/neu begonnen
    BeginPath,
    /// Subpfad-Start
    MoveTo(DVec2),
    /// Linie zum Punkt
    LineTo(DVec2),
    /// Pfad gezeichnet
    Stroke(Stroke),
    /// Gefüllter Kreis
    FillCircle {
        /// Mittelpunkt
        center: DVec2,
        /// Radius in Pixeln
        radius: f32,
        /// Farbe
        color: [f32; 4],
    },
    /// Kreis-Umriss
    StrokeCircle {
        /// Mittelpunkt
        center: DVec2,
        /// Radius in Pixeln
        radius: f32,
        /// Linienstil
        stroke: Stroke,
    },
    /// Gefülltes Polygon
    FillPolygon {
        /// Eckpunkte
        points: Vec<DVec2>,
        /// Farbe
        color: [f32; 4],
    },
    /// Text
    Text {
        /// Position (linksbündig)
        position: DVec2,
        /// Inhalt
        text: String,
        /// Schriftgröße
        size: f32,
        /// Farbe
        color: [f32; 4],
    },
}

/// Aufzeichnende Zeichenfläche (Render-Cache und Test-Backend).
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    ops: Vec<SurfaceOp>,
}

impl DisplayList {
    /// Erstellt eine leere Display-Liste.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verwirft alle aufgezeichneten Operationen.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Aufgezeichnete Operationen.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Anzahl gezeichneter Strokes (für Tests).
    pub fn stroke_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Stroke(_)))
            .count()
    }

    /// Spielt die Aufzeichnung auf eine andere Zeichenfläche ab.
    pub fn replay(&self, surface: &mut dyn MapSurface) {
        for op in &self.ops {
            match op {
                SurfaceOp::BeginPath => surface.begin_path(),
                SurfaceOp::MoveTo(point) => surface.move_to(*point),
                SurfaceOp::LineTo(point) => surface.line_to(*point),
                SurfaceOp::Stroke(stroke) => surface.stroke(*stroke),
                SurfaceOp::FillCircle {
                    center,
                    radius,
                    color,
                } => surface.fill_circle(*center, *radius, *color),
                SurfaceOp::StrokeCircle {
                    center,
                    radius,
                    stroke,
                } => surface.stroke_circle(*center, *radius, *stroke),
                SurfaceOp::FillPolygon { points, color } => surface.fill_polygon(points, *color),
                SurfaceOp::Text {
                    position,
                    text,
                    size,
                    color,
                } => surface.text(*position, text, *size, *color),
            }
        }
    }
}

impl MapSurface for DisplayList {
    fn begin_path(&mut self) {
        self.ops.push(SurfaceOp::BeginPath);
    }

    fn move_to(&mut self, point: DVec2) {
        self.ops.push(SurfaceOp::MoveTo(point));
    }

    fn line_to(&mut self, point: DVec2) {
        self.ops.push(SurfaceOp::LineTo(point));
    }

    fn stroke(&mut self, stroke: Stroke) {
        self.ops.push(SurfaceOp::Stroke(stroke));
    }

    fn fill_circle(&mut self, center: DVec2, radius: f32, color: [f32; 4]) {
        self.ops.push(SurfaceOp::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: DVec2, radius: f32, stroke: Stroke) {
        self.ops.push(SurfaceOp::StrokeCircle {
            center,
            radius,
            stroke,
        });
    }

    fn fill_polygon(&mut self, points: &[DVec2], color: [f32; 4]) {
        self.ops.push(SurfaceOp::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn text(&mut self, position: DVec2, text: &str, size: f32, color: [f32; 4]) {
        self.ops.push(SurfaceOp::Text {
            position,
            text: text.to_string(),
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_list_records_and_replays() {
        let mut list = DisplayList::new();
        list.begin_path();
        list.move_to(DVec2::new(0.0, 0.0));
        list.line_to(DVec2::new(10.0, 0.0));
        list.stroke(Stroke::new(2.0, [1.0, 1.0, 1.0, 1.0]));

        let mut replayed = DisplayList::new();
        list.replay(&mut replayed);
        assert_eq!(list.ops(), replayed.ops());
        assert_eq!(replayed.stroke_count(), 1);
    }

    #[test]
    fn test_clear_discards_ops() {
        let mut list = DisplayList::new();
        list.fill_circle(DVec2::ZERO, 4.0, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(list.ops().len(), 1);
        list.clear();
        assert!(list.ops().is_empty());
    }
}
