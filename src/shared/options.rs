//! Zentrale Konfiguration für das Moving-Map-Subsystem.
//!
//! `MapOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten. Mehrere der
//! Konstanten (Target-Offsets, Pointer-Insets, Range-Faktoren) sind
//! empirisch auf das Display-Layout abgestimmt und werden bewusst als
//! benannte Werte geführt statt aus einer Formel abgeleitet.

use serde::{Deserialize, Serialize};

// ── Range-Steuerung ─────────────────────────────────────────────────

/// Nominale Map-Ranges in nautischen Meilen (diskrete Zoom-Stufen).
/// Die beiden kleinsten Stufen entsprechen 500 ft bzw. 750 ft.
pub const RANGE_TABLE_NM: [f64; 20] = [
    0.08, 0.12, 1.0, 1.5, 2.5, 4.0, 5.0, 7.5, 10.0, 15.0, 25.0, 40.0, 50.0, 75.0, 100.0, 150.0,
    250.0, 500.0, 1000.0, 2000.0,
];
/// Standard-Range-Index beim Start.
pub const DEFAULT_RANGE_INDEX: usize = 11;
/// Range-Skalierungsfaktor bei North-Up (Aircraft zentriert, Range = 1/4
/// der nutzbaren Display-Höhe).
pub const NORTH_UP_RANGE_FACTOR: f64 = 4.0;
/// Range-Skalierungsfaktor bei Heading-/Track-Up (mehr Vorausschau,
/// Range = 1/3 der nutzbaren Display-Höhe).
pub const TRACK_UP_RANGE_FACTOR: f64 = 3.0;
/// Relativer Target-Offset bei Heading-/Track-Up: Aircraft sitzt im
/// unteren Drittel der nutzbaren Fläche.
pub const TRACK_UP_TARGET_OFFSET_REL: [f64; 2] = [0.0, 1.0 / 6.0];
/// Oberhalb dieses Range-Index schaltet Auto-North-Up auf North-Up um.
pub const AUTO_NORTH_UP_RANGE_INDEX: usize = 14;

// ── Pointer ─────────────────────────────────────────────────────────

/// Inset-Anteile der Pointer-Bounds pro Kante [links, oben, rechts, unten],
/// relativ zur nutzbaren (Dead-Zone-bereinigten) Fläche.
pub const POINTER_BOUNDS_INSET: [f64; 4] = [0.1, 0.1, 0.1, 0.1];
/// Pointer-Schrittweite pro Eingabe-Event in Pixeln.
pub const POINTER_MOVE_INCREMENT_PX: f64 = 5.0;

// ── VNAV-Marker ─────────────────────────────────────────────────────

/// Mindestdistanz zum Top-of-Descent, unterhalb derer der TOD-Marker
/// nicht mehr angezeigt wird (Meter).
pub const TOD_DISTANCE_THRESHOLD_M: f64 = 100.0;

// ── Flugplan-Pfad-Rendering ─────────────────────────────────────────

/// Linienstärke der Base-Route (Kontext/Historie).
pub const PATH_BASE_STROKE_WIDTH: f32 = 2.0;
/// Farbe der Base-Route (RGBA: gedecktes Grau, halbtransparent).
pub const PATH_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 0.5];
/// Linienstärke des aktiven Legs.
pub const PATH_ACTIVE_STROKE_WIDTH: f32 = 4.0;
/// Farbe des aktiven Legs (RGBA: Magenta).
pub const PATH_ACTIVE_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
/// Linienstärke bereits abgeflogener Legs.
pub const PATH_PRIOR_STROKE_WIDTH: f32 = 2.0;
/// Farbe bereits abgeflogener Legs (RGBA: helles Grau, halbtransparent).
pub const PATH_PRIOR_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 0.5];
/// Linienstärke des Missed Approach, solange er nicht aktiv ist.
pub const PATH_MISSED_STROKE_WIDTH: f32 = 1.0;
/// Farbe des inaktiven Missed Approach (RGBA: Weiß).
pub const PATH_MISSED_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Linienstärke kommender Legs.
pub const PATH_UPCOMING_STROKE_WIDTH: f32 = 4.0;
/// Farbe kommender Legs (RGBA: Weiß).
pub const PATH_UPCOMING_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Länge des OBS-Strahls vor/nach dem Fix in nautischen Meilen.
pub const OBS_RAY_LENGTH_NM: f64 = 500.0;
/// Länge des Vectors-to-Final-Strahls bis zum Final Approach Fix (NM).
pub const VTF_RAY_LENGTH_NM: f64 = 30.0;
/// Länge des Direct-To-Kurs-Strahls vor dem Zielfix (NM).
pub const DTO_RAY_LENGTH_NM: f64 = 500.0;

// ── Wegpunkt-Icons ──────────────────────────────────────────────────

/// Icon-Größe normaler Wegpunkte in Pixeln.
pub const WAYPOINT_ICON_SIZE_NORMAL: f32 = 12.0;
/// Icon-Größe von Flugplan-Wegpunkten in Pixeln.
pub const WAYPOINT_ICON_SIZE_FLIGHT_PLAN: f32 = 16.0;
/// Icon-Größe des aktiven Wegpunkts in Pixeln.
pub const WAYPOINT_ICON_SIZE_ACTIVE: f32 = 18.0;
/// Icon-Größe der VNAV-Marker (TOD/BOD) in Pixeln.
pub const WAYPOINT_ICON_SIZE_VNAV: f32 = 14.0;
/// Schriftgröße der Wegpunkt-Labels in Pixeln.
pub const WAYPOINT_LABEL_FONT_SIZE: f32 = 14.0;

// ── Geodäsie-Resampling ─────────────────────────────────────────────

/// Großkreis-Winkeldistanz, ab der ein Segment unterteilt wird (Radiant).
pub const RESAMPLE_MIN_ANGULAR_DISTANCE: f64 = std::f64::consts::PI / 12.0;
/// Maximale Abweichung der projizierten Sehne in Pixeln.
pub const RESAMPLE_PIXEL_TOLERANCE: f64 = 0.25;
/// Maximale Rekursionstiefe der Unterteilung.
pub const RESAMPLE_MAX_DEPTH: u32 = 8;

/// Laufzeit-Optionen des Moving-Map-Subsystems.
///
/// Wird beim Start aus einer TOML-Datei neben der Binary geladen;
/// fehlende oder fehlerhafte Dateien fallen auf die Defaults zurück.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapOptions {
    /// Nominale Range-Stufen in NM
    pub range_table_nm: Vec<f64>,
    /// Range-Index beim Start
    pub default_range_index: usize,
    /// Range-Faktor bei North-Up
    pub north_up_range_factor: f64,
    /// Range-Faktor bei Heading-/Track-Up
    pub track_up_range_factor: f64,
    /// Relativer Target-Offset bei Heading-/Track-Up
    pub track_up_target_offset_rel: [f64; 2],
    /// Auto-North-Up: ab diesem Range-Index wird North-Up erzwungen
    pub auto_north_up_range_index: usize,
    /// Pointer-Bounds-Insets pro Kante (Anteile der nutzbaren Fläche)
    pub pointer_bounds_inset: [f64; 4],
    /// Pointer-Schrittweite pro Eingabe-Event (Pixel)
    pub pointer_move_increment_px: f64,
    /// TOD-Anzeigeschwelle (Meter)
    pub tod_distance_threshold_m: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            range_table_nm: RANGE_TABLE_NM.to_vec(),
            default_range_index: DEFAULT_RANGE_INDEX,
            north_up_range_factor: NORTH_UP_RANGE_FACTOR,
            track_up_range_factor: TRACK_UP_RANGE_FACTOR,
            track_up_target_offset_rel: TRACK_UP_TARGET_OFFSET_REL,
            auto_north_up_range_index: AUTO_NORTH_UP_RANGE_INDEX,
            pointer_bounds_inset: POINTER_BOUNDS_INSET,
            pointer_move_increment_px: POINTER_MOVE_INCREMENT_PX,
            tod_distance_threshold_m: TOD_DISTANCE_THRESHOLD_M,
        }
    }
}

impl MapOptions {
    /// Lädt Optionen aus einer TOML-Datei; bei Fehlern Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Map-Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!(
                        "Map-Optionen-Datei fehlerhaft, verwende Standardwerte: {}",
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Map-Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert die Optionen als TOML.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Map-Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Pfad der Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("efis_moving_map"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("efis_moving_map.toml")
    }
}
