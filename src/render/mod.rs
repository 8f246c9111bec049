//! Render-Backends der Map-Zeichenfläche.

pub mod egui_surface;
pub mod surface;

pub use egui_surface::EguiSurface;
pub use surface::{DisplayList, MapSurface, Stroke, SurfaceOp};
