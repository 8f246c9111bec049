//! EFIS Moving Map Library.
//! Moving-Map-Kern als Library exportiert für Tests und Wiederverwendung:
//! Projektion, Range-Steuerung, Pointer, Wegpunkt-Arbiter und
//! Flugplan-Rendering.

pub mod core;
pub mod map;
pub mod render;
pub mod shared;

pub use core::{
    FlightPathVector, FlightPlan, FlightPlanSegment, GeoPoint, LegCalculations, LegDefinition,
    LegFlags, LegType, MapProjection, MercatorProjection, ProjectionChanges, ProjectionParams,
    SegmentType, VNavWaypointKind, Waypoint, WaypointCategory,
};
pub use map::{
    CurrentMapParameters, DeadZone, FlightPlanDataProvider, FlightPlanLayer,
    FlightPlanPathRenderer, LNavData, MapLayout, MapOrientation, MapPointerController, NavMap,
    OrientationSetting, PathStyles, PointerState, RangeTargetRotationController, RenderRole,
    TransitionMode, VNavPathMode, VNavState, WaypointRenderer, WaypointRoleStyle,
};
pub use render::{DisplayList, EguiSurface, MapSurface, Stroke};
pub use shared::{MapOptions, Subject, SubjectObserver};
