//! Flugplan-Datenmodell: Segmente, Legs, Flags und Pfadgeometrie.
//!
//! Der Plan ist ein reiner Datencontainer: Die Pfadgeometrie der Legs
//! (Großkreis-Vektoren) wird extern berechnet und hier nur gehalten.
//! Leg-Indizes sind global über alle Segmente; die Segment-Offsets
//! partitionieren die Leg-Folge lückenlos.

use super::geo::GeoPoint;

/// Leg-Typ nach ARINC-Vorbild (geschlossene, kleine Menge).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegType {
    /// Initial Fix (reiner Startpunkt, kein Pfad)
    InitialFix,
    /// Track to Fix (Großkreis zwischen zwei Fixen)
    TrackToFix,
    /// Course to Fix (fester Kurs zum Fix)
    CourseToFix,
    /// Direct to Fix (direkter Anflug aus aktueller Position)
    DirectToFix,
    /// Hold mit manueller Terminierung
    HoldManual,
    /// Hold mit Fix-Terminierung
    HoldToFix,
    /// Hold mit Höhen-Terminierung
    HoldToAltitude,
    /// Plan-Unterbrechung (Discontinuity)
    Discontinuity,
}

impl LegType {
    /// Ob der Leg-Typ eine Hold-Variante ist.
    pub fn is_hold(&self) -> bool {
        matches!(
            self,
            LegType::HoldManual | LegType::HoldToFix | LegType::HoldToAltitude
        )
    }
}

/// Bitmaske der Leg-Eigenschaften.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegFlags(pub u32);

impl LegFlags {
    /// Keine Flags gesetzt.
    pub const NONE: LegFlags = LegFlags(0);
    /// Leg gehört zu einer Direct-To-Sequenz.
    pub const DIRECT_TO: LegFlags = LegFlags(1);
    /// Leg gehört zu einer Vectors-to-Final-Sequenz.
    pub const VECTORS_TO_FINAL: LegFlags = LegFlags(1 << 1);
    /// Leg gehört zum Missed Approach.
    pub const MISSED_APPROACH: LegFlags = LegFlags(1 << 2);

    /// Ob mindestens eines der angegebenen Flags gesetzt ist.
    pub fn is_any(&self, flags: LegFlags) -> bool {
        self.0 & flags.0 != 0
    }

    /// Ob alle angegebenen Flags gesetzt sind.
    pub fn is_all(&self, flags: LegFlags) -> bool {
        self.0 & flags.0 == flags.0
    }

    /// Vereinigung zweier Flag-Mengen.
    pub fn union(&self, flags: LegFlags) -> LegFlags {
        LegFlags(self.0 | flags.0)
    }
}

/// Ein Großkreis-Vektor der berechneten Pfadgeometrie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPathVector {
    /// Startpunkt des Vektors
    pub start: GeoPoint,
    /// Endpunkt des Vektors
    pub end: GeoPoint,
}

impl FlightPathVector {
    /// Erstellt einen Vektor zwischen zwei Punkten.
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    /// Anfangskurs des Vektors in Grad.
    pub fn course(&self) -> f64 {
        self.start.initial_bearing(&self.end)
    }

    /// Großkreis-Länge des Vektors in Radiant.
    pub fn distance(&self) -> f64 {
        self.start.distance(&self.end)
    }
}

/// Extern berechnete Pfadgeometrie eines Legs.
///
/// `through` sind die Basis-Vektoren des Legs; `ingress`/`egress` die
/// Übergangs-Vektoren (Turn-Transitions) am Anfang bzw. Ende.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegCalculations {
    /// Terminator-Fix des Legs
    pub end: Option<GeoPoint>,
    /// Eingangs-Transition
    pub ingress: Vec<FlightPathVector>,
    /// Basis-Vektoren ohne Transitions
    pub through: Vec<FlightPathVector>,
    /// Ausgangs-Transition
    pub egress: Vec<FlightPathVector>,
}

impl LegCalculations {
    /// Geradlinige Geometrie aus einem einzelnen Through-Vektor.
    pub fn line(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            end: Some(end),
            ingress: Vec::new(),
            through: vec![FlightPathVector::new(start, end)],
            egress: Vec::new(),
        }
    }

    /// Alle Vektoren in Flugreihenfolge (ingress, through, egress).
    pub fn all_vectors(&self) -> impl Iterator<Item = &FlightPathVector> {
        self.ingress
            .iter()
            .chain(self.through.iter())
            .chain(self.egress.iter())
    }

    /// Gesamtlänge des Pfads über alle Vektoren in Radiant.
    pub fn path_distance(&self) -> f64 {
        self.all_vectors().map(|v| v.distance()).sum()
    }
}

/// Ein Leg des Flugplans.
#[derive(Debug, Clone, PartialEq)]
pub struct LegDefinition {
    /// Anzeigename (Fix-Ident)
    pub name: String,
    /// Leg-Typ
    pub leg_type: LegType,
    /// Leg-Flags
    pub flags: LegFlags,
    /// Extern berechnete Pfadgeometrie; `None` solange nicht aufgelöst
    pub calculated: Option<LegCalculations>,
}

impl LegDefinition {
    /// Erstellt ein Leg ohne berechnete Geometrie.
    pub fn new(name: impl Into<String>, leg_type: LegType, flags: LegFlags) -> Self {
        Self {
            name: name.into(),
            leg_type,
            flags,
            calculated: None,
        }
    }

    /// Hängt berechnete Geometrie an das Leg.
    pub fn with_calculated(mut self, calculated: LegCalculations) -> Self {
        self.calculated = Some(calculated);
        self
    }
}

/// Segmenttyp innerhalb des Flugplans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    /// Abflug-Segment (Origin/SID)
    Departure,
    /// Enroute-Segment
    Enroute,
    /// Anflug-Segment (STAR)
    Arrival,
    /// Approach-Segment
    Approach,
    /// Missed-Approach-Segment
    MissedApproach,
    /// Freies Direct-To ohne Plan-Kontext
    RandomDirectTo,
}

/// Ein Segment des Flugplans mit globalem Leg-Offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlanSegment {
    /// Segmenttyp
    pub segment_type: SegmentType,
    /// Globaler Index des ersten Legs dieses Segments
    pub offset: usize,
    /// Legs des Segments in Reihenfolge
    pub legs: Vec<LegDefinition>,
}

/// Flugplan als geordnete Segment-Folge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlightPlan {
    segments: Vec<FlightPlanSegment>,
}

impl FlightPlan {
    /// Erstellt einen leeren Flugplan.
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Hängt ein Segment an und hält die Offsets konsistent.
    pub fn push_segment(&mut self, segment_type: SegmentType, legs: Vec<LegDefinition>) {
        self.segments.push(FlightPlanSegment {
            segment_type,
            offset: 0,
            legs,
        });
        self.recompute_offsets();
    }

    /// Gesamtzahl der Legs über alle Segmente.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.legs.len()).sum()
    }

    /// Ob der Plan keine Legs enthält.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Anzahl der Segmente.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Segment nach Index.
    pub fn segment(&self, index: usize) -> Option<&FlightPlanSegment> {
        self.segments.get(index)
    }

    /// Iterator über alle Segmente.
    pub fn segments(&self) -> impl Iterator<Item = &FlightPlanSegment> {
        self.segments.iter()
    }

    /// Leg nach globalem Index.
    pub fn leg(&self, global_index: usize) -> Option<&LegDefinition> {
        let segment_index = self.segment_index_of(global_index)?;
        let segment = &self.segments[segment_index];
        segment.legs.get(global_index - segment.offset)
    }

    /// Mutable Leg-Referenz nach globalem Index.
    pub fn leg_mut(&mut self, global_index: usize) -> Option<&mut LegDefinition> {
        let segment_index = self.segment_index_of(global_index)?;
        let segment = &mut self.segments[segment_index];
        let offset = segment.offset;
        segment.legs.get_mut(global_index - offset)
    }

    /// Iterator über alle Legs in globaler Reihenfolge.
    pub fn legs(&self) -> impl Iterator<Item = &LegDefinition> {
        self.segments.iter().flat_map(|s| s.legs.iter())
    }

    /// Index des Segments, das den globalen Leg-Index enthält.
    pub fn segment_index_of(&self, global_index: usize) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| global_index >= s.offset && global_index < s.offset + s.legs.len())
    }

    /// Globaler Index des nominalen Ursprungs-Legs für den Leg an
    /// `global_index`: läuft rückwärts und überspringt Legs, die Teil
    /// einer Direct-To- oder Vectors-to-Final-Sequenz sind. Damit bleibt
    /// der Kontext unmittelbar vor einem mitten in einer Prozedur
    /// aktivierten Leg sichtbar.
    pub fn nominal_from_leg_index(&self, global_index: usize) -> Option<usize> {
        self.leg(global_index)?;

        let mut index = global_index.checked_sub(1)?;
        loop {
            let leg = self.leg(index)?;
            if !leg
                .flags
                .is_any(LegFlags::DIRECT_TO.union(LegFlags::VECTORS_TO_FINAL))
            {
                return Some(index);
            }
            index = index.checked_sub(1)?;
        }
    }

    /// Stellt die Offset-Invariante wieder her (lückenlose Partition).
    pub fn recompute_offsets(&mut self) {
        let mut offset = 0;
        for segment in &mut self.segments {
            segment.offset = offset;
            offset += segment.legs.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(name: &str) -> LegDefinition {
        LegDefinition::new(name, LegType::TrackToFix, LegFlags::NONE)
    }

    fn flagged_leg(name: &str, flags: LegFlags) -> LegDefinition {
        LegDefinition::new(name, LegType::CourseToFix, flags)
    }

    fn plan_two_segments() -> FlightPlan {
        let mut plan = FlightPlan::new();
        plan.push_segment(SegmentType::Enroute, vec![leg("A"), leg("B"), leg("C")]);
        plan.push_segment(SegmentType::Approach, vec![leg("D"), leg("E")]);
        plan
    }

    #[test]
    fn test_offsets_partition_contiguously() {
        let plan = plan_two_segments();
        assert_eq!(plan.len(), 5);
        assert_eq!(plan.segment(0).unwrap().offset, 0);
        assert_eq!(plan.segment(1).unwrap().offset, 3);
    }

    #[test]
    fn test_global_leg_lookup_across_segments() {
        let plan = plan_two_segments();
        assert_eq!(plan.leg(2).unwrap().name, "C");
        assert_eq!(plan.leg(3).unwrap().name, "D");
        assert!(plan.leg(5).is_none());

        assert_eq!(plan.segment_index_of(2), Some(0));
        assert_eq!(plan.segment_index_of(3), Some(1));
        assert_eq!(plan.segment_index_of(99), None);
    }

    #[test]
    fn test_nominal_from_skips_direct_to_sequence() {
        let mut plan = FlightPlan::new();
        plan.push_segment(
            SegmentType::Enroute,
            vec![
                leg("A"),
                flagged_leg("DTO1", LegFlags::DIRECT_TO),
                flagged_leg("DTO2", LegFlags::DIRECT_TO),
                leg("B"),
            ],
        );

        // Ursprung von "B" (Index 3) ist "A" (Index 0), nicht die DTO-Legs
        assert_eq!(plan.nominal_from_leg_index(3), Some(0));
        // Erster Leg hat keinen Ursprung
        assert_eq!(plan.nominal_from_leg_index(0), None);
        // Nur DTO-Legs davor → kein Ursprung
        assert_eq!(plan.nominal_from_leg_index(1), Some(0));
        assert_eq!(plan.nominal_from_leg_index(2), Some(0));
    }

    #[test]
    fn test_nominal_from_invalid_index() {
        let plan = plan_two_segments();
        assert_eq!(plan.nominal_from_leg_index(17), None);
    }

    #[test]
    fn test_leg_flags_operations() {
        let flags = LegFlags::DIRECT_TO.union(LegFlags::MISSED_APPROACH);
        assert!(flags.is_any(LegFlags::DIRECT_TO));
        assert!(flags.is_all(LegFlags::DIRECT_TO.union(LegFlags::MISSED_APPROACH)));
        assert!(!flags.is_all(LegFlags::VECTORS_TO_FINAL));
        assert!(!LegFlags::NONE.is_any(flags));
    }

    #[test]
    fn test_leg_calculations_vector_order_and_distance() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let c = GeoPoint::new(0.0, 2.0);
        let calculations = LegCalculations {
            end: Some(c),
            ingress: vec![FlightPathVector::new(a, b)],
            through: vec![FlightPathVector::new(b, c)],
            egress: Vec::new(),
        };

        let order: Vec<_> = calculations.all_vectors().map(|v| v.start.lon).collect();
        assert_eq!(order, vec![0.0, 1.0]);

        let expected = a.distance(&b) + b.distance(&c);
        assert!((calculations.path_distance() - expected).abs() < 1e-12);
    }
}
