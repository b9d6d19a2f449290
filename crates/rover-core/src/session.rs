//! Planner session: the single owner of waypoints, the current route, the
//! camera state machine and the status line.
//!
//! All mutation goes through `&mut self` in event delivery order. The only
//! asynchronous step, the solve round trip, is split into
//! [`PlannerSession::begin_solve`] and [`PlannerSession::complete_solve`]; a
//! generation counter discards results that were superseded in between.

use crate::codec::{self, ImportedRoute, RouteDocument};
use crate::error::{ErrorKind, ExportError, ImportError, SolveError};
use crate::idle::{CameraCommand, IdleEvent, IdleRotationController, IdleState, Interaction};
use crate::models::{GeoPoint, Route};
use crate::occlusion::OcclusionEngine;
use crate::protocol::{ParamRanges, SolveParams, SolveRequest};
use crate::render::{RouteRenderer, SceneBackend};
use crate::waypoints::WaypointStore;
use std::path::Path;

/// Discrete user actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannerAction {
    /// Place a waypoint from a globe pick or programmatic input.
    AddWaypoint { lon: f64, lat: f64 },
    Undo,
    Clear,
    SetPreviewVisible(bool),
    HomeView,
    PointerDown,
    Wheel,
    TouchStart,
}

/// Proof that a solve was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveTicket {
    generation: u64,
}

impl SolveTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The route replaced the displayed one.
    Applied,
    /// The session moved on since the solve started; the result was dropped.
    Stale,
    /// The solve failed; prior state is unchanged.
    Failed(ErrorKind),
}

pub struct PlannerSession<B: SceneBackend> {
    scene: B,
    store: WaypointStore,
    renderer: RouteRenderer,
    route: Option<Route>,
    idle: IdleRotationController,
    occlusion: OcclusionEngine,
    ranges: ParamRanges,
    generation: u64,
    status: String,
}

impl<B: SceneBackend> PlannerSession<B> {
    pub fn new(scene: B, ranges: ParamRanges, now_ms: u64) -> Self {
        Self {
            scene,
            store: WaypointStore::new(),
            renderer: RouteRenderer::new(),
            route: None,
            idle: IdleRotationController::new(now_ms),
            occlusion: OcclusionEngine::default(),
            ranges,
            generation: 0,
            status: String::new(),
        }
    }

    pub fn with_occlusion(mut self, occlusion: OcclusionEngine) -> Self {
        self.occlusion = occlusion;
        self
    }

    pub fn scene(&self) -> &B {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut B {
        &mut self.scene
    }

    pub fn waypoints(&self) -> Vec<GeoPoint> {
        self.store.points()
    }

    pub fn roster(&self) -> Vec<String> {
        self.store.roster()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn renderer(&self) -> &RouteRenderer {
        &self.renderer
    }

    pub fn ranges(&self) -> &ParamRanges {
        &self.ranges
    }

    pub fn idle_state(&self) -> IdleState {
        self.idle.state()
    }

    /// Text of the single status channel.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn interact(&mut self, kind: Interaction, now_ms: u64) {
        if let Some(command) = self.idle.handle(IdleEvent::Interaction { kind, now_ms }) {
            self.scene.apply_camera(command);
        }
    }

    fn supersede(&mut self) {
        self.generation += 1;
    }

    fn redraw_preview(&mut self) {
        let points = self.store.points();
        self.renderer.redraw_preview(&mut self.scene, &points);
    }

    /// Apply one user action.
    pub fn dispatch(&mut self, action: PlannerAction, now_ms: u64) {
        match action {
            PlannerAction::AddWaypoint { lon, lat } => {
                self.interact(Interaction::PlaceWaypoint, now_ms);
                match GeoPoint::new(lon, lat) {
                    Ok(point) => {
                        self.store.add(&mut self.scene, point);
                        self.supersede();
                        self.redraw_preview();
                        self.set_status(format!("{} waypoint(s)", self.store.len()));
                    }
                    Err(err) => {
                        tracing::warn!("Rejected waypoint pick: {}", err);
                        self.set_status(format!("Invalid waypoint: {}", err));
                    }
                }
            }
            PlannerAction::Undo => {
                self.interact(Interaction::Undo, now_ms);
                if self.store.undo(&mut self.scene).is_some() {
                    self.supersede();
                    self.set_status(format!("{} waypoint(s)", self.store.len()));
                }
                self.redraw_preview();
            }
            PlannerAction::Clear => {
                self.interact(Interaction::Clear, now_ms);
                self.store.clear(&mut self.scene);
                self.renderer.clear(&mut self.scene);
                self.route = None;
                self.supersede();
                self.set_status("Cleared");
            }
            PlannerAction::SetPreviewVisible(visible) => {
                let points = self.store.points();
                self.renderer
                    .set_preview_enabled(&mut self.scene, visible, &points);
            }
            PlannerAction::HomeView => {
                self.interact(Interaction::HomeView, now_ms);
                self.scene.apply_camera(CameraCommand::FlyHome);
            }
            PlannerAction::PointerDown => self.interact(Interaction::PointerDown, now_ms),
            PlannerAction::Wheel => self.interact(Interaction::Wheel, now_ms),
            PlannerAction::TouchStart => self.interact(Interaction::TouchStart, now_ms),
        }
    }

    /// Per-frame update: idle rotation then label visibility.
    pub fn frame(&mut self, now_ms: u64) -> usize {
        if let Some(command) = self.idle.handle(IdleEvent::Tick { now_ms }) {
            self.scene.apply_camera(command);
        }
        let camera = self.scene.camera_position();
        self.occlusion.refresh(camera, self.scene.entities_mut())
    }

    /// Validate inputs and build the request for an async solve.
    ///
    /// Starting a solve supersedes any solve still in flight.
    pub fn begin_solve(
        &mut self,
        params: &SolveParams,
        now_ms: u64,
    ) -> Result<(SolveRequest, SolveTicket), SolveError> {
        self.interact(Interaction::Solve, now_ms);
        let request = match SolveRequest::build(&self.store.points(), params, &self.ranges) {
            Ok(request) => request,
            Err(err) => {
                self.set_status(err.to_string());
                return Err(err);
            }
        };
        self.supersede();
        self.set_status(format!("Solving with grid {}...", request.grid));
        tracing::info!(
            "Solve started: {} waypoints, grid {}, cost {}",
            request.positions.len(),
            request.grid,
            request.cost.as_str()
        );
        Ok((
            request,
            SolveTicket {
                generation: self.generation,
            },
        ))
    }

    /// Feed back the result of a solve started with [`Self::begin_solve`].
    pub fn complete_solve(
        &mut self,
        ticket: SolveTicket,
        result: Result<Route, SolveError>,
    ) -> SolveOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Dropping stale solve result (generation {} != {})",
                ticket.generation,
                self.generation
            );
            return SolveOutcome::Stale;
        }
        match result {
            Ok(route) => {
                tracing::info!(
                    "Solve finished: {} positions, {}",
                    route.positions.len(),
                    route.summary()
                );
                self.renderer.show_route(&mut self.scene, &route);
                self.set_status(route.summary());
                self.route = Some(route);
                SolveOutcome::Applied
            }
            Err(err) => {
                tracing::warn!("Solve failed: {}", err);
                self.set_status(format!("Solve failed: {}", err));
                SolveOutcome::Failed(err.kind())
            }
        }
    }

    /// Document for the last route and current waypoints.
    pub fn export(&mut self) -> Result<RouteDocument, ExportError> {
        match codec::export(self.route.as_ref(), &self.store.points()) {
            Ok(document) => Ok(document),
            Err(err) => {
                self.set_status(err.to_string());
                Err(err)
            }
        }
    }

    pub fn export_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        let path = path.as_ref();
        let document = self.export()?;
        if let Err(err) = codec::write_document(path, &document) {
            self.set_status(err.to_string());
            return Err(err);
        }
        tracing::info!("Exported route to {}", path.display());
        self.set_status(format!("Exported {}", path.display()));
        Ok(())
    }

    /// Replace waypoints and route with a document's content.
    pub fn import_str(&mut self, text: &str, now_ms: u64) -> Result<(), ImportError> {
        self.interact(Interaction::Import, now_ms);
        let imported = codec::import(text);
        self.finish_import(imported)
    }

    pub fn import_file(&mut self, path: impl AsRef<Path>, now_ms: u64) -> Result<(), ImportError> {
        self.interact(Interaction::Import, now_ms);
        let imported = codec::read_document(path);
        self.finish_import(imported)
    }

    fn finish_import(
        &mut self,
        imported: Result<ImportedRoute, ImportError>,
    ) -> Result<(), ImportError> {
        let imported = match imported {
            Ok(imported) => imported,
            Err(err) => {
                tracing::warn!("Import failed: {}", err);
                self.set_status(format!("Import failed: {}", err));
                return Err(err);
            }
        };

        self.store.clear(&mut self.scene);
        self.renderer.clear(&mut self.scene);
        for point in &imported.waypoints {
            self.store.add(&mut self.scene, *point);
        }
        self.supersede();
        self.redraw_preview();
        self.renderer.show_route(&mut self.scene, &imported.route);
        tracing::info!(
            "Imported route: {} positions, {} waypoints",
            imported.route.positions.len(),
            imported.waypoints.len()
        );
        self.set_status(format!("Imported: {}", imported.route.summary()));
        self.route = Some(imported.route);
        Ok(())
    }
}
