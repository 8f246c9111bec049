//! Wegpunkte der Moving Map.
//!
//! Ein Wegpunkt ist nach Erstellung unveränderlich: stabile ID,
//! geographische Position und Kategorie. Synthetische VNAV-Wegpunkte
//! (Top-of-Descent / Bottom-of-Descent) werden aus der Pfadgeometrie
//! eines Legs abgeleitet.

use super::flight_plan::LegDefinition;
use super::geo::{ga_from_meters, GeoPoint};
use anyhow::{anyhow, Result};

/// Kategorie eines Wegpunkts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointCategory {
    /// Flugplatz
    Airport,
    /// VOR-Drehfunkfeuer
    Vor,
    /// NDB-Funkfeuer
    Ndb,
    /// Kreuzungspunkt (Intersection)
    Intersection,
    /// Benutzerdefinierter Wegpunkt
    User,
    /// Landebahn
    Runway,
    /// Fix aus der Flugplan-Pfadgeometrie
    FlightPath,
    /// Synthetischer VNAV-Marker (TOD/BOD)
    VNav,
}

/// Art eines synthetischen VNAV-Wegpunkts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VNavWaypointKind {
    /// Top of Descent
    Tod,
    /// Bottom of Descent
    Bod,
}

impl VNavWaypointKind {
    /// Stabile Wegpunkt-ID.
    pub fn uid(&self) -> &'static str {
        match self {
            VNavWaypointKind::Tod => "vnav-tod",
            VNavWaypointKind::Bod => "vnav-bod",
        }
    }

    /// Anzeige-Label.
    pub fn label(&self) -> &'static str {
        match self {
            VNavWaypointKind::Tod => "TOD",
            VNavWaypointKind::Bod => "BOD",
        }
    }
}

/// Unveränderlicher Wegpunkt mit stabiler ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    /// Eindeutige, stabile ID
    pub uid: String,
    /// Anzeigename
    pub name: String,
    /// Geographische Position
    pub location: GeoPoint,
    /// Kategorie
    pub category: WaypointCategory,
}

impl Waypoint {
    /// Erstellt einen Wegpunkt.
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        location: GeoPoint,
        category: WaypointCategory,
    ) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            location,
            category,
        }
    }

    /// Synthetischer VNAV-Wegpunkt auf der Pfadgeometrie eines Legs,
    /// `distance_from_end_meters` vor dem Leg-Ende.
    ///
    /// Schlägt fehl, wenn das Leg keine aufgelöste Geometrie hat;
    /// der Aufrufer behandelt das als "kein Marker in diesem Zyklus".
    pub fn vnav(
        leg: &LegDefinition,
        distance_from_end_meters: f64,
        kind: VNavWaypointKind,
    ) -> Result<Self> {
        let calculated = leg
            .calculated
            .as_ref()
            .ok_or_else(|| anyhow!("Leg '{}' hat keine berechnete Geometrie", leg.name))?;

        if !distance_from_end_meters.is_finite() || distance_from_end_meters < 0.0 {
            return Err(anyhow!(
                "Ungültige VNAV-Distanz: {} m",
                distance_from_end_meters
            ));
        }

        let vectors: Vec<_> = calculated.all_vectors().copied().collect();
        if vectors.is_empty() {
            return Err(anyhow!("Leg '{}' hat leere Pfadgeometrie", leg.name));
        }

        let mut remaining = ga_from_meters(distance_from_end_meters);
        let mut location = None;
        for vector in vectors.iter().rev() {
            let length = vector.distance();
            if remaining <= length {
                // Rückwärts vom Vektor-Ende entlang des Großkreises
                let back_bearing = vector.end.initial_bearing(&vector.start);
                location = Some(vector.end.offset(back_bearing, remaining));
                break;
            }
            remaining -= length;
        }

        // Distanz länger als der Leg-Pfad → an den Pfadanfang klammern
        let location = location.unwrap_or_else(|| vectors[0].start);

        Ok(Waypoint::new(
            kind.uid(),
            kind.label(),
            location,
            WaypointCategory::VNav,
        ))
    }
}
