//! Route rendering against an abstract scene backend.
//!
//! The 3D engine is an external collaborator. The core only asks it to create
//! or remove markers and polylines, to move the camera, and to expose the
//! labeled entities for visibility updates.

mod memory;

pub use memory::{MemoryScene, Polyline};

use crate::error::FramingError;
use crate::idle::CameraCommand;
use crate::models::{Cartesian3, GeoPoint, Route};
use crate::spatial::densify_great_circle;

/// Max arc between solved-route samples, in degrees.
pub const ROUTE_MAX_STEP_DEG: f64 = 0.1;

/// Duration of the camera transition after drawing.
pub const FRAMING_DURATION_S: f64 = 1.2;

/// Padding added around framed point sets, as a fraction of the larger span.
const FRAMING_PAD_FRACTION: f64 = 0.15;

/// Opaque handle to a waypoint marker owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(raw: u64) -> Self {
        MarkerHandle(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque handle to a polyline owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolylineHandle(u64);

impl PolylineHandle {
    pub fn new(raw: u64) -> Self {
        PolylineHandle(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub width_px: f32,
    pub dashed: bool,
    pub color: [f32; 4],
}

impl LineStyle {
    /// Dashed line over the live waypoints.
    pub const PREVIEW: LineStyle = LineStyle {
        width_px: 2.0,
        dashed: true,
        color: [1.0, 0.85, 0.2, 0.9],
    };

    /// Solid line for the solved route.
    pub const ROUTE: LineStyle = LineStyle {
        width_px: 4.0,
        dashed: false,
        color: [0.2, 0.9, 1.0, 1.0],
    };
}

/// Lon/lat bounding rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRect {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoRect {
    /// Padded bounds of a point set, or `None` when empty.
    pub fn bounding(points: &[GeoPoint]) -> Option<GeoRect> {
        let first = points.first()?;
        let mut rect = GeoRect {
            west: first.lon(),
            south: first.lat(),
            east: first.lon(),
            north: first.lat(),
        };
        for point in &points[1..] {
            rect.west = rect.west.min(point.lon());
            rect.east = rect.east.max(point.lon());
            rect.south = rect.south.min(point.lat());
            rect.north = rect.north.max(point.lat());
        }

        let pad = rect.width().max(rect.height()) * FRAMING_PAD_FRACTION;
        Some(GeoRect {
            west: (rect.west - pad).max(-180.0),
            south: (rect.south - pad).max(-90.0),
            east: (rect.east + pad).min(180.0),
            north: (rect.north + pad).min(90.0),
        })
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 || self.height() > 0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Waypoint,
    Landmark,
}

/// A scene object that may carry a position, a label and a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub id: u64,
    pub kind: EntityKind,
    pub position: Option<GeoPoint>,
    pub height_m: f64,
    pub label: Option<String>,
    pub label_visible: bool,
    pub has_marker: bool,
    pub marker_visible: bool,
}

/// Operations the planner needs from the rendering engine.
pub trait SceneBackend {
    fn create_marker(&mut self, point: GeoPoint, label: &str) -> MarkerHandle;
    fn set_marker_label(&mut self, marker: MarkerHandle, label: &str);
    fn remove_marker(&mut self, marker: MarkerHandle);

    fn draw_polyline(&mut self, points: &[GeoPoint], style: LineStyle) -> PolylineHandle;
    fn remove_polyline(&mut self, line: PolylineHandle);

    /// Animate the camera to show `rect`.
    fn fly_to_rect(&mut self, rect: GeoRect, duration_s: f64) -> Result<(), FramingError>;
    fn camera_position(&self) -> Cartesian3;
    fn apply_camera(&mut self, command: CameraCommand);

    /// Every entity in the scene, for per-frame visibility updates.
    fn entities_mut(&mut self) -> &mut [SceneEntity];
}

/// Owns the preview and solved-route polylines.
#[derive(Debug)]
pub struct RouteRenderer {
    preview: Option<PolylineHandle>,
    route: Option<PolylineHandle>,
    preview_enabled: bool,
}

impl Default for RouteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRenderer {
    pub fn new() -> Self {
        Self {
            preview: None,
            route: None,
            preview_enabled: true,
        }
    }

    pub fn preview_enabled(&self) -> bool {
        self.preview_enabled
    }

    pub fn preview_line(&self) -> Option<PolylineHandle> {
        self.preview
    }

    pub fn route_line(&self) -> Option<PolylineHandle> {
        self.route
    }

    /// Redraw the dashed preview over `waypoints` and frame them.
    pub fn redraw_preview(&mut self, scene: &mut dyn SceneBackend, waypoints: &[GeoPoint]) {
        if let Some(line) = self.preview.take() {
            scene.remove_polyline(line);
        }
        if !self.preview_enabled || waypoints.len() < 2 {
            return;
        }
        self.preview = Some(scene.draw_polyline(waypoints, LineStyle::PREVIEW));
        frame_points(scene, waypoints);
    }

    pub fn set_preview_enabled(
        &mut self,
        scene: &mut dyn SceneBackend,
        enabled: bool,
        waypoints: &[GeoPoint],
    ) {
        self.preview_enabled = enabled;
        self.redraw_preview(scene, waypoints);
    }

    /// Replace the solved route line wholesale.
    pub fn show_route(&mut self, scene: &mut dyn SceneBackend, route: &Route) {
        self.clear_route(scene);
        let samples = densify_great_circle(&route.positions, ROUTE_MAX_STEP_DEG);
        self.route = Some(scene.draw_polyline(&samples, LineStyle::ROUTE));
        frame_points(scene, &route.positions);
    }

    pub fn clear_route(&mut self, scene: &mut dyn SceneBackend) {
        if let Some(line) = self.route.take() {
            scene.remove_polyline(line);
        }
    }

    /// Remove both lines.
    pub fn clear(&mut self, scene: &mut dyn SceneBackend) {
        if let Some(line) = self.preview.take() {
            scene.remove_polyline(line);
        }
        self.clear_route(scene);
    }
}

fn frame_points(scene: &mut dyn SceneBackend, points: &[GeoPoint]) {
    let Some(rect) = GeoRect::bounding(points) else {
        return;
    };
    if let Err(err) = scene.fly_to_rect(rect, FRAMING_DURATION_S) {
        tracing::debug!("Camera framing skipped: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CostMode;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .map(|&(lon, lat)| GeoPoint::new(lon, lat).unwrap())
            .collect()
    }

    fn route(coords: &[(f64, f64)]) -> Route {
        Route {
            positions: pts(coords),
            total_cost: 1.0,
            legs: vec![1.0],
            cost_mode: CostMode::Distance,
            energy_kwh: None,
        }
    }

    #[test]
    fn bounding_rect_pads_and_clamps() {
        let rect = GeoRect::bounding(&pts(&[(170.0, 80.0), (180.0, 90.0)])).unwrap();
        assert_eq!(rect.east, 180.0);
        assert_eq!(rect.north, 90.0);
        assert!((rect.west - 168.5).abs() < 1e-9);
        assert!(!rect.is_degenerate());

        let single = GeoRect::bounding(&pts(&[(5.0, 5.0), (5.0, 5.0)])).unwrap();
        assert!(single.is_degenerate());
        assert!(GeoRect::bounding(&[]).is_none());
    }

    #[test]
    fn preview_needs_two_waypoints() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();

        renderer.redraw_preview(&mut scene, &pts(&[(0.0, 0.0)]));
        assert!(renderer.preview_line().is_none());
        assert_eq!(scene.polyline_count(), 0);
        assert_eq!(scene.framing_count(), 0);

        renderer.redraw_preview(&mut scene, &pts(&[(0.0, 0.0), (1.0, 1.0)]));
        let line = renderer.preview_line().unwrap();
        assert_eq!(scene.polyline(line).unwrap().style, LineStyle::PREVIEW);
        assert_eq!(scene.framing_count(), 1);
    }

    #[test]
    fn preview_redraw_replaces_previous_line() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();
        renderer.redraw_preview(&mut scene, &pts(&[(0.0, 0.0), (1.0, 1.0)]));
        let first = renderer.preview_line().unwrap();
        renderer.redraw_preview(&mut scene, &pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]));
        assert!(scene.polyline(first).is_none());
        assert_eq!(scene.polyline_count(), 1);
    }

    #[test]
    fn disabling_preview_removes_it() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();
        let waypoints = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        renderer.redraw_preview(&mut scene, &waypoints);
        renderer.set_preview_enabled(&mut scene, false, &waypoints);
        assert!(renderer.preview_line().is_none());
        assert_eq!(scene.polyline_count(), 0);
        renderer.set_preview_enabled(&mut scene, true, &waypoints);
        assert!(renderer.preview_line().is_some());
    }

    #[test]
    fn route_is_densified_and_replaced_wholesale() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();

        renderer.show_route(&mut scene, &route(&[(0.0, 0.0), (1.0, 1.0)]));
        let first = renderer.route_line().unwrap();
        let line = scene.polyline(first).unwrap();
        assert_eq!(line.style, LineStyle::ROUTE);
        assert!(line.points.len() > 2);

        renderer.show_route(&mut scene, &route(&[(2.0, 2.0), (3.0, 3.0)]));
        assert!(scene.polyline(first).is_none());
        assert_eq!(scene.polyline_count(), 1);
    }

    #[test]
    fn framing_failure_does_not_affect_drawing() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();
        renderer.show_route(&mut scene, &route(&[(4.0, 4.0), (4.0, 4.0)]));
        assert!(renderer.route_line().is_some());
        assert_eq!(scene.framing_count(), 0);
    }

    #[test]
    fn clear_removes_both_lines() {
        let mut scene = MemoryScene::new();
        let mut renderer = RouteRenderer::new();
        renderer.redraw_preview(&mut scene, &pts(&[(0.0, 0.0), (1.0, 1.0)]));
        renderer.show_route(&mut scene, &route(&[(0.0, 0.0), (1.0, 1.0)]));
        assert_eq!(scene.polyline_count(), 2);
        renderer.clear(&mut scene);
        assert_eq!(scene.polyline_count(), 0);
    }
}
