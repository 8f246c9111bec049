//! Render-Rollen-Arbiter für Wegpunkte.
//!
//! Mehrere unabhängige Layer können denselben Wegpunkt unter
//! verschiedenen Rollen registrieren. Pro Frame gewinnt genau eine
//! Rolle: der Prioritäts-Durchlauf wählt die höchste Rolle, die
//! registriert und laut ihrem Sichtbarkeits-Prädikat sichtbar ist.
//! Registrierung ist idempotent pro (Wegpunkt, Rolle, Owner-Key);
//! ein Eintrag stirbt erst, wenn keine Rolle mehr registriert ist.

use crate::core::{MapProjection, Waypoint, WaypointCategory};
use crate::render::surface::{MapSurface, Stroke};
use crate::shared::options;
use glam::DVec2;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Render-Rolle eines Wegpunkts, absteigend priorisiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderRole {
    /// Hervorgehobener Wegpunkt
    Highlight,
    /// Aktiver Flugplan-Wegpunkt
    FlightPlanActive,
    /// Inaktiver Flugplan-Wegpunkt
    FlightPlanInactive,
    /// Normal angezeigter Wegpunkt
    Normal,
    /// Wegpunkt eines Airways
    Airway,
    /// VNAV-Wegpunkt (TOD/BOD)
    VNav,
}

impl RenderRole {
    /// Alle Rollen in Prioritätsreihenfolge (höchste zuerst).
    pub const PRIORITY_ORDER: [RenderRole; 6] = [
        RenderRole::Highlight,
        RenderRole::FlightPlanActive,
        RenderRole::FlightPlanInactive,
        RenderRole::Normal,
        RenderRole::Airway,
        RenderRole::VNav,
    ];

    fn slot(&self) -> usize {
        match self {
            RenderRole::Highlight => 0,
            RenderRole::FlightPlanActive => 1,
            RenderRole::FlightPlanInactive => 2,
            RenderRole::Normal => 3,
            RenderRole::Airway => 4,
            RenderRole::VNav => 5,
        }
    }
}

/// Stil einer Render-Rolle (unveränderliche Konfiguration des Aufrufers).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointRoleStyle {
    /// Icon-Größe in Pixeln
    pub icon_size: f32,
    /// Icon-Farbe (RGBA)
    pub color: [f32; 4],
    /// Zeichenpriorität: höhere Werte werden später (obenauf) gezeichnet
    pub draw_priority: f32,
    /// Ob das Label gezeichnet wird
    pub show_label: bool,
    /// Label-Farbe (RGBA)
    pub label_color: [f32; 4],
}

impl WaypointRoleStyle {
    fn default_for(role: RenderRole) -> Self {
        match role {
            RenderRole::Highlight => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_ACTIVE,
                color: [0.0, 1.0, 1.0, 1.0],
                draw_priority: 50.0,
                show_label: true,
                label_color: [0.0, 1.0, 1.0, 1.0],
            },
            RenderRole::FlightPlanActive => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_ACTIVE,
                color: [1.0, 0.0, 1.0, 1.0],
                draw_priority: 40.0,
                show_label: true,
                label_color: [1.0, 0.0, 1.0, 1.0],
            },
            RenderRole::FlightPlanInactive => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_FLIGHT_PLAN,
                color: [1.0, 1.0, 1.0, 1.0],
                draw_priority: 30.0,
                show_label: true,
                label_color: [1.0, 1.0, 1.0, 1.0],
            },
            RenderRole::Normal => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_NORMAL,
                color: [0.7, 0.7, 0.7, 1.0],
                draw_priority: 20.0,
                show_label: false,
                label_color: [0.7, 0.7, 0.7, 1.0],
            },
            RenderRole::Airway => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_NORMAL,
                color: [0.5, 0.5, 0.5, 1.0],
                draw_priority: 10.0,
                show_label: false,
                label_color: [0.5, 0.5, 0.5, 1.0],
            },
            RenderRole::VNav => Self {
                icon_size: options::WAYPOINT_ICON_SIZE_VNAV,
                color: [1.0, 1.0, 1.0, 1.0],
                draw_priority: 45.0,
                show_label: true,
                label_color: [1.0, 1.0, 1.0, 1.0],
            },
        }
    }
}

/// Sichtbarkeits-Prädikat einer Rolle (z.B. Range-basiertes Declutter).
type VisibilityHandler = Box<dyn Fn(&Waypoint) -> bool>;

struct RoleInfo {
    style: WaypointRoleStyle,
    visibility: VisibilityHandler,
}

/// Registrierungs-Eintrag eines Wegpunkts: pro Rolle die Menge der
/// Owner-Keys, die sie angefordert haben.
struct WaypointEntry {
    waypoint: Waypoint,
    owners: [HashSet<String>; 6],
    last_shown_role: Option<RenderRole>,
}

impl WaypointEntry {
    fn new(waypoint: Waypoint) -> Self {
        Self {
            waypoint,
            owners: Default::default(),
            last_shown_role: None,
        }
    }

    fn has_role(&self, role: RenderRole) -> bool {
        !self.owners[role.slot()].is_empty()
    }

    fn has_any_role(&self) -> bool {
        self.owners.iter().any(|set| !set.is_empty())
    }

    fn add_role(&mut self, role: RenderRole, owner_key: &str) {
        self.owners[role.slot()].insert(owner_key.to_string());
    }

    fn remove_role(&mut self, role: RenderRole, owner_key: &str) {
        self.owners[role.slot()].remove(owner_key);
    }
}

/// Arbiter und Renderer für Wegpunkt-Rollen.
///
/// Die Registrierung liegt in einer `IndexMap`, damit die Zeichenfolge
/// bei gleicher Priorität deterministisch der Registrierreihenfolge folgt.
pub struct WaypointRenderer {
    entries: IndexMap<String, WaypointEntry>,
    role_infos: [RoleInfo; 6],
}

impl Default for WaypointRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointRenderer {
    /// Erstellt einen Arbiter mit Standard-Stilen und
    /// Immer-sichtbar-Prädikaten.
    pub fn new() -> Self {
        let role_infos = RenderRole::PRIORITY_ORDER.map(|role| RoleInfo {
            style: WaypointRoleStyle::default_for(role),
            visibility: Box::new(|_| true),
        });
        Self {
            entries: IndexMap::new(),
            role_infos,
        }
    }

    /// Setzt den Stil einer Rolle.
    pub fn set_style(&mut self, role: RenderRole, style: WaypointRoleStyle) {
        self.role_infos[role.slot()].style = style;
    }

    /// Stil einer Rolle.
    pub fn style(&self, role: RenderRole) -> WaypointRoleStyle {
        self.role_infos[role.slot()].style
    }

    /// Setzt das Sichtbarkeits-Prädikat einer Rolle.
    pub fn set_visibility_handler(
        &mut self,
        role: RenderRole,
        handler: impl Fn(&Waypoint) -> bool + 'static,
    ) {
        self.role_infos[role.slot()].visibility = Box::new(handler);
    }

    /// Registriert einen Wegpunkt unter einer Rolle für einen Owner.
    /// Wiederholte Registrierung derselben Kombination ist ein No-Op.
    pub fn register(&mut self, waypoint: &Waypoint, role: RenderRole, owner_key: &str) {
        if owner_key.is_empty() {
            return;
        }
        self.entries
            .entry(waypoint.uid.clone())
            .or_insert_with(|| WaypointEntry::new(waypoint.clone()))
            .add_role(role, owner_key);
    }

    /// Entfernt genau die Registrierung (Wegpunkt, Rolle, Owner).
    /// Der Eintrag wird zerstört, sobald keine Rolle mehr registriert ist.
    pub fn deregister(&mut self, waypoint: &Waypoint, role: RenderRole, owner_key: &str) {
        if owner_key.is_empty() {
            return;
        }
        let Some(entry) = self.entries.get_mut(&waypoint.uid) else {
            return;
        };
        entry.remove_role(role, owner_key);
        if !entry.has_any_role() {
            self.entries.shift_remove(&waypoint.uid);
        }
    }

    /// Ob ein Wegpunkt registriert ist; optional auf eine Rolle geprüft.
    pub fn is_registered(&self, uid: &str, role: Option<RenderRole>) -> bool {
        match (self.entries.get(uid), role) {
            (Some(entry), Some(role)) => entry.has_role(role),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Anzahl registrierter Wegpunkte.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Wählt die zu zeichnende Rolle eines Wegpunkts: der erste Treffer
    /// im Prioritäts-Durchlauf, der registriert und sichtbar ist.
    /// `None`, wenn der Wegpunkt in diesem Frame nicht gezeichnet wird.
    pub fn select_role_to_render(&self, uid: &str) -> Option<RenderRole> {
        let entry = self.entries.get(uid)?;
        RenderRole::PRIORITY_ORDER.into_iter().find(|role| {
            entry.has_role(*role) && (self.role_infos[role.slot()].visibility)(&entry.waypoint)
        })
    }

    /// Zeichnet alle sichtbaren Wegpunkte. Einträge außerhalb des
    /// Fensters werden gecullt; die Zeichenreihenfolge ist nach
    /// Zeichenpriorität sortiert (stabil, daher deterministisch).
    pub fn update(&mut self, projection: &MapProjection, surface: &mut dyn MapSurface) {
        let mut to_draw: Vec<(f32, usize, RenderRole)> = Vec::new();

        let uids: Vec<String> = self.entries.keys().cloned().collect();
        for (index, uid) in uids.iter().enumerate() {
            let selected = self.select_role_to_render(uid);
            let entry = &mut self.entries[index];
            entry.last_shown_role = selected;

            let Some(role) = selected else {
                continue;
            };
            let style = self.role_infos[role.slot()].style;

            let projected = projection.project(&entry.waypoint.location);
            let margin = f64::from(style.icon_size);
            let size = projection.projected_size();
            let in_window = projection.is_in_projected_bounds(
                projected,
                Some([-margin, -margin, size.x + margin, size.y + margin]),
            );
            if !in_window {
                continue;
            }

            to_draw.push((style.draw_priority, index, role));
        }

        to_draw.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, index, role) in to_draw {
            let entry = &self.entries[index];
            let style = self.role_infos[role.slot()].style;
            let projected = projection.project(&entry.waypoint.location);
            draw_waypoint_icon(surface, &entry.waypoint, projected, &style);
        }
    }
}

/// Zeichnet das Icon (und Label) eines Wegpunkts nach Kategorie.
fn draw_waypoint_icon(
    surface: &mut dyn MapSurface,
    waypoint: &Waypoint,
    position: DVec2,
    style: &WaypointRoleStyle,
) {
    let half = f64::from(style.icon_size) / 2.0;

    match waypoint.category {
        WaypointCategory::Airport => {
            surface.fill_circle(position, style.icon_size * 0.35, style.color);
            surface.stroke_circle(
                position,
                style.icon_size * 0.5,
                Stroke::new(1.5, style.color),
            );
        }
        WaypointCategory::Vor | WaypointCategory::Ndb => {
            let points = [
                position + DVec2::new(0.0, -half),
                position + DVec2::new(half, 0.0),
                position + DVec2::new(0.0, half),
                position + DVec2::new(-half, 0.0),
            ];
            surface.fill_polygon(&points, style.color);
        }
        WaypointCategory::Intersection
        | WaypointCategory::User
        | WaypointCategory::FlightPath => {
            let points = [
                position + DVec2::new(0.0, -half),
                position + DVec2::new(half, half * 0.8),
                position + DVec2::new(-half, half * 0.8),
            ];
            surface.fill_polygon(&points, style.color);
        }
        WaypointCategory::Runway => {
            surface.fill_circle(position, style.icon_size * 0.3, style.color);
        }
        WaypointCategory::VNav => {
            surface.stroke_circle(
                position,
                style.icon_size * 0.5,
                Stroke::new(2.0, style.color),
            );
            surface.fill_circle(position, style.icon_size * 0.15, style.color);
        }
    }

    if style.show_label {
        surface.text(
            position + DVec2::new(half + 3.0, -half - 3.0),
            &waypoint.name,
            options::WAYPOINT_LABEL_FONT_SIZE,
            style.label_color,
        );
    }
}
