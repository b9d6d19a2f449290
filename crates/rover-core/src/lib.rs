//! Rover route planner core.
//!
//! Waypoint state, solver protocol types, route rendering, horizon
//! visibility and idle camera rotation for the planetary route planner.
//! Everything here is synchronous and single-owner; network access lives in
//! `rover-sdk`.

pub mod codec;
pub mod error;
pub mod grid;
pub mod idle;
pub mod models;
pub mod occlusion;
pub mod protocol;
pub mod render;
pub mod session;
pub mod spatial;
pub mod waypoints;

pub use codec::{export, import, read_document, write_document, ImportedRoute, RouteDocument};
pub use error::{ErrorKind, ExportError, FramingError, GeoError, ImportError, SolveError};
pub use grid::{estimate_grid_size, DEFAULT_GRID_SIZE, MAX_GRID_SIZE};
pub use idle::{CameraCommand, IdleEvent, IdleRotationController, IdleState, Interaction};
pub use models::{Cartesian3, CostMode, GeoPoint, Route};
pub use occlusion::{Ellipsoid, OcclusionEngine};
pub use protocol::{ParamRanges, SolveParams, SolveRequest, SolveResponse};
pub use render::{
    GeoRect, LineStyle, MarkerHandle, MemoryScene, PolylineHandle, RouteRenderer, SceneBackend,
    SceneEntity,
};
pub use session::{PlannerAction, PlannerSession, SolveOutcome, SolveTicket};
pub use waypoints::{Waypoint, WaypointStore};
