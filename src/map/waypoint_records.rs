//! Wegpunkt-Records der Flugplan-Legs.
//!
//! Verwaltet die Registrierungen der Leg-Fixe beim Rollen-Arbiter:
//! Der Fix des aktiven Legs läuft unter `FlightPlanActive`, alle anderen
//! unter `FlightPlanInactive`. Legs ohne aufgelöste Geometrie werden
//! übersprungen und beim nächsten Refresh erneut versucht.

use super::waypoint_renderer::{RenderRole, WaypointRenderer};
use crate::core::{FlightPlan, LegType, Waypoint, WaypointCategory};

/// Ein registrierter Leg-Fix.
#[derive(Debug, Clone)]
struct LegWaypointRecord {
    leg_index: usize,
    waypoint: Waypoint,
    role: RenderRole,
}

/// Verwalter der Flugplan-Wegpunkt-Registrierungen eines Layers.
#[derive(Debug)]
pub struct FlightPlanWaypointRecords {
    owner_key: String,
    records: Vec<LegWaypointRecord>,
    pick_start_index: usize,
}

impl FlightPlanWaypointRecords {
    /// Erstellt einen leeren Record-Verwalter für einen Owner-Key.
    pub fn new(owner_key: impl Into<String>) -> Self {
        Self {
            owner_key: owner_key.into(),
            records: Vec::new(),
            pick_start_index: 0,
        }
    }

    /// Anzahl aktuell registrierter Records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Baut die Records neu auf. Bei `repick` wird der Start-Index
    /// übernommen, sonst bleibt der zuletzt gewählte bestehen; dadurch
    /// löst ein reiner Geometrie-Refresh keine neue Wegpunkt-Auswahl aus.
    pub fn refresh(
        &mut self,
        plan: Option<&FlightPlan>,
        active_leg_index: Option<usize>,
        repick: bool,
        pick_start_index: usize,
        renderer: &mut WaypointRenderer,
    ) {
        self.deregister_all(renderer);

        let Some(plan) = plan else {
            return;
        };
        if repick {
            self.pick_start_index = pick_start_index;
        }

        for leg_index in self.pick_start_index..plan.len() {
            let Some(leg) = plan.leg(leg_index) else {
                continue;
            };
            if leg.leg_type == LegType::Discontinuity {
                continue;
            }
            // Fix-Position kommt aus der berechneten Geometrie; ohne sie
            // wird das Leg übersprungen und beim nächsten Refresh geholt
            let Some(location) = leg.calculated.as_ref().and_then(|calc| calc.end) else {
                continue;
            };

            let role = if Some(leg_index) == active_leg_index {
                RenderRole::FlightPlanActive
            } else {
                RenderRole::FlightPlanInactive
            };
            let waypoint = Waypoint::new(
                format!("fp-{}-{}", leg_index, leg.name),
                leg.name.clone(),
                location,
                WaypointCategory::FlightPath,
            );

            renderer.register(&waypoint, role, &self.owner_key);
            self.records.push(LegWaypointRecord {
                leg_index,
                waypoint,
                role,
            });
        }
    }

    /// Ob ein Record für den Leg-Index existiert.
    pub fn has_record_for_leg(&self, leg_index: usize) -> bool {
        self.records.iter().any(|r| r.leg_index == leg_index)
    }

    /// Deregistriert alle Records (Layer-Abbau, Plan entfernt).
    pub fn deregister_all(&mut self, renderer: &mut WaypointRenderer) {
        for record in self.records.drain(..) {
            renderer.deregister(&record.waypoint, record.role, &self.owner_key);
        }
    }
}
