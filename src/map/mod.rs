//! Moving-Map-Subsystem: Steuerung, Pointer, Arbiter und Layer.

pub mod controller;
pub mod data_provider;
pub mod flight_plan_layer;
pub mod nav_map;
pub mod path_renderer;
pub mod pointer;
pub mod waypoint_records;
pub mod waypoint_renderer;

pub use controller::{
    CurrentMapParameters, DeadZone, MapLayout, MapOrientation, OrientationSetting,
    RangeTargetRotationController,
};
pub use data_provider::{
    FlightPlanDataProvider, LNavData, TransitionMode, VNavPathMode, VNavState,
};
pub use flight_plan_layer::FlightPlanLayer;
pub use nav_map::NavMap;
pub use path_renderer::{FlightPlanPathRenderer, GeodesicResampler, PathStyles};
pub use pointer::{MapPointerController, PointerState};
pub use waypoint_records::FlightPlanWaypointRecords;
pub use waypoint_renderer::{RenderRole, WaypointRenderer, WaypointRoleStyle};
