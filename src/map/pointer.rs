//! Map-Pointer: benutzergesteuertes Panning unabhängig vom Aircraft.
//!
//! Der Pointer hat zwei Zustände: inaktiv (Map folgt dem Aircraft) und
//! aktiv (Map-Target eingefroren, Pointer frei beweglich). Bewegungen
//! werden hier unklammert entgegengenommen; das Klammern auf die
//! Pointer-Bounds und das Umlenken des Rests in Map-Scrolling übernimmt
//! der Range-Target-Rotation-Controller im Frame-Update.

use crate::core::{GeoPoint, MapProjection};
use glam::DVec2;

/// Zustand des Map-Pointers. Wird einmal pro Map-Instanz erstellt.
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Ob der Pointer aktiv ist
    pub is_active: bool,
    /// Pixel-Position des Pointers
    pub position: DVec2,
    /// Gewünschtes Map-Target des Pointers
    pub target: GeoPoint,
    need_scroll_update: bool,
    target_changed: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    /// Erstellt einen inaktiven Pointer.
    pub fn new() -> Self {
        Self {
            is_active: false,
            position: DVec2::ZERO,
            target: GeoPoint::default(),
            need_scroll_update: false,
            target_changed: false,
        }
    }

    /// Holt und löscht das Scroll-Update-Flag.
    pub fn take_need_scroll_update(&mut self) -> bool {
        std::mem::take(&mut self.need_scroll_update)
    }

    /// Holt und löscht das Target-Änderungs-Flag.
    pub fn take_target_changed(&mut self) -> bool {
        std::mem::take(&mut self.target_changed)
    }
}

/// Operationen auf dem Map-Pointer.
pub struct MapPointerController;

impl MapPointerController {
    /// Aktiviert oder deaktiviert den Pointer. Beim Aktivieren werden
    /// aktuelles Projektions-Target und projizierte Target-Position als
    /// Startwerte übernommen. Gibt zurück, ob sich der Zustand geändert hat.
    pub fn set_pointer_active(
        pointer: &mut PointerState,
        projection: &MapProjection,
        is_active: bool,
    ) -> bool {
        if pointer.is_active == is_active {
            return false;
        }

        if is_active {
            pointer.target = projection.target();
            pointer.position = projection.target_projected();
            pointer.target_changed = true;
        } else {
            pointer.need_scroll_update = false;
            pointer.target_changed = false;
        }

        pointer.is_active = is_active;
        true
    }

    /// Kippt den Pointer-Zustand und gibt den resultierenden Zustand zurück.
    pub fn toggle_pointer_active(pointer: &mut PointerState, projection: &MapProjection) -> bool {
        let next = !pointer.is_active;
        Self::set_pointer_active(pointer, projection, next);
        pointer.is_active
    }

    /// Verschiebt den Pointer um ein Pixel-Delta (an dieser Stelle
    /// bewusst unklammert).
    pub fn move_pointer(pointer: &mut PointerState, dx: f64, dy: f64) {
        if !pointer.is_active {
            return;
        }
        pointer.position += DVec2::new(dx, dy);
        pointer.need_scroll_update = true;
    }

    /// Übernimmt die aktuelle Pointer-Position als neues Map-Target
    /// (Re-Zentrierung) und lässt den Pointer auf die projizierte
    /// Target-Position zurückschnappen.
    pub fn target_pointer(pointer: &mut PointerState, projection: &MapProjection) {
        if !pointer.is_active {
            return;
        }
        pointer.target = projection.invert(pointer.position);
        pointer.position = projection.target_projected();
        pointer.target_changed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProjectionParams;

    fn projection() -> MapProjection {
        let mut projection = MapProjection::new(800.0, 600.0);
        projection.set(&ProjectionParams {
            target: Some(GeoPoint::new(47.0, 11.0)),
            range: Some(crate::core::geo::ga_from_nm(20.0)),
            ..Default::default()
        });
        projection
    }

    #[test]
    fn test_activation_captures_projection_state() {
        let projection = projection();
        let mut pointer = PointerState::new();

        assert!(MapPointerController::set_pointer_active(
            &mut pointer,
            &projection,
            true
        ));
        assert!(pointer.is_active);
        assert_eq!(pointer.position, projection.target_projected());
        assert!(pointer.target.approx_eq(&projection.target(), 1e-12));
        assert!(pointer.take_target_changed());
    }

    #[test]
    fn test_activation_is_idempotent() {
        let projection = projection();
        let mut pointer = PointerState::new();
        MapPointerController::set_pointer_active(&mut pointer, &projection, true);
        pointer.take_target_changed();

        assert!(!MapPointerController::set_pointer_active(
            &mut pointer,
            &projection,
            true
        ));
        assert!(!pointer.take_target_changed());
    }

    #[test]
    fn test_move_accumulates_unclamped() {
        let projection = projection();
        let mut pointer = PointerState::new();
        MapPointerController::set_pointer_active(&mut pointer, &projection, true);
        let start = pointer.position;

        MapPointerController::move_pointer(&mut pointer, 5000.0, -3000.0);
        assert_eq!(pointer.position, start + DVec2::new(5000.0, -3000.0));
        assert!(pointer.take_need_scroll_update());
    }

    #[test]
    fn test_move_ignored_while_inactive() {
        let mut pointer = PointerState::new();
        MapPointerController::move_pointer(&mut pointer, 10.0, 10.0);
        assert_eq!(pointer.position, DVec2::ZERO);
        assert!(!pointer.take_need_scroll_update());
    }

    #[test]
    fn test_target_pointer_commits_and_snaps() {
        let projection = projection();
        let mut pointer = PointerState::new();
        MapPointerController::set_pointer_active(&mut pointer, &projection, true);
        pointer.take_target_changed();

        MapPointerController::move_pointer(&mut pointer, 50.0, 80.0);
        let expected_target = projection.invert(pointer.position);

        MapPointerController::target_pointer(&mut pointer, &projection);
        assert!(pointer.target.approx_eq(&expected_target, 1e-12));
        assert_eq!(pointer.position, projection.target_projected());
        assert!(pointer.take_target_changed());
    }

    #[test]
    fn test_toggle_returns_resulting_state() {
        let projection = projection();
        let mut pointer = PointerState::new();

        assert!(MapPointerController::toggle_pointer_active(
            &mut pointer,
            &projection
        ));
        assert!(!MapPointerController::toggle_pointer_active(
            &mut pointer,
            &projection
        ));
    }
}
