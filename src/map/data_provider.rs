//! Datenschnittstelle zwischen Guidance-Systemen und der Flugplan-Anzeige.
//!
//! Der Provider ist ein Bündel versionierter Zellen, das der Host einmal
//! pro Frame aus seinen Quellen (FMS, LNAV, VNAV) befüllt. Die Layer
//! beobachten die Zellen poll-basiert über `SubjectObserver`.

use crate::core::FlightPlan;
use crate::shared::Subject;
use std::sync::Arc;

/// Übergangsphase des aktuell getrackten Legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// Kein Übergang aktiv
    #[default]
    None,
    /// Eingangs-Transition wird geflogen
    Ingress,
    /// Ausgangs-Transition wird geflogen
    Egress,
}

/// LNAV-Tracking-Daten des aktiven Flugplans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LNavData {
    /// Global getracktes Leg
    pub current_leg_index: usize,
    /// Index des getrackten Pfad-Vektors im Leg
    pub vector_index: usize,
    /// Aktive Übergangsphase
    pub transition_mode: TransitionMode,
    /// Ob die automatische Leg-Sequenzierung ausgesetzt ist
    pub is_suspended: bool,
}

/// Zustand des VNAV-Systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VNavState {
    /// VNAV abgeschaltet
    #[default]
    Disabled,
    /// VNAV eingeschaltet, aber nicht aktiv
    EnabledInactive,
    /// VNAV eingeschaltet und aktiv
    EnabledActive,
}

/// Modus des vertikalen Pfads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VNavPathMode {
    /// Kein Pfad aktiv
    #[default]
    None,
    /// Pfad vorgewählt (armed)
    PathArmed,
    /// Pfad wird aktiv abgeflogen
    PathActive,
}

/// Flugplan-Datenprovider für die Map-Layer.
///
/// `active_lateral_leg_index` ist `None`, wenn kein Leg aktiv ist
/// (entspricht dem -1-Sentinel der Bus-Schnittstelle).
#[derive(Debug, Clone, Default)]
pub struct FlightPlanDataProvider {
    /// Anzuzeigender Flugplan
    pub plan: Subject<Option<Arc<FlightPlan>>>,
    /// Ereignis: Plan wurde modifiziert (Legs eingefügt/entfernt)
    pub plan_modified: Subject<()>,
    /// Ereignis: Pfadgeometrie des Plans wurde neu berechnet
    pub plan_calculated: Subject<()>,
    /// Global aktives laterales Leg
    pub active_lateral_leg_index: Subject<Option<usize>>,
    /// LNAV-Tracking-Daten; `None` wenn LNAV den Plan nicht trackt
    pub lnav_data: Subject<Option<LNavData>>,
    /// VNAV-Systemzustand
    pub vnav_state: Subject<VNavState>,
    /// Modus des vertikalen Pfads
    pub vnav_path_mode: Subject<VNavPathMode>,
    /// Leg, auf dem der Top-of-Descent liegt
    pub vnav_tod_leg_index: Subject<Option<usize>>,
    /// Leg, auf dem der Bottom-of-Descent liegt
    pub vnav_bod_leg_index: Subject<Option<usize>>,
    /// Pfaddistanz vom TOD bis zum Ende seines Legs (Meter)
    pub vnav_tod_leg_distance_m: Subject<f64>,
    /// Pfaddistanz von der aktuellen Position zum TOD (Meter)
    pub vnav_distance_to_tod_m: Subject<f64>,
    /// Aktiver OBS-Kurs in Grad; `None` wenn OBS inaktiv
    pub obs_course: Subject<Option<f64>>,
}

impl FlightPlanDataProvider {
    /// Erstellt einen Provider ohne Plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Setzt den anzuzeigenden Plan (zählt immer als Änderung).
    pub fn set_plan(&mut self, plan: Option<Arc<FlightPlan>>) {
        self.plan.set_raw(plan);
    }
}
