//! Core-Domänentypen: Geodäsie, Projektion, Flugplan, Wegpunkte.

pub mod flight_plan;
pub mod geo;
pub mod geo_projection;
pub mod map_projection;
pub mod waypoint;

pub use flight_plan::{
    FlightPathVector, FlightPlan, FlightPlanSegment, LegCalculations, LegDefinition, LegFlags,
    LegType, SegmentType,
};
pub use geo::GeoPoint;
pub use geo_projection::MercatorProjection;
pub use map_projection::{MapProjection, ProjectionChanges, ProjectionParams};
pub use waypoint::{VNavWaypointKind, Waypoint, WaypointCategory};
