//! Headless scene used by the CLI and by tests.

use super::{
    EntityKind, GeoRect, LineStyle, MarkerHandle, PolylineHandle, SceneBackend, SceneEntity,
};
use crate::error::FramingError;
use crate::idle::CameraCommand;
use crate::models::{Cartesian3, GeoPoint};
use crate::spatial::{to_unit_vector, MARS_RADIUS_M};
use std::collections::BTreeMap;

/// Minimum camera altitude used when framing small areas.
const MIN_FRAMING_ALTITUDE_M: f64 = 50_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
    pub style: LineStyle,
}

/// In-memory scene: markers, landmarks, polylines and a camera position.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    entities: Vec<SceneEntity>,
    polylines: BTreeMap<u64, Polyline>,
    camera: Cartesian3,
    home: Cartesian3,
    framed: Vec<GeoRect>,
    next_id: u64,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        let home = Cartesian3::new(3.0 * MARS_RADIUS_M, 0.0, 0.0);
        Self {
            entities: Vec::new(),
            polylines: BTreeMap::new(),
            camera: home,
            home,
            framed: Vec::new(),
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a labeled fixed pin. Returns its entity id.
    pub fn add_landmark(&mut self, point: GeoPoint, label: &str) -> u64 {
        let id = self.next_id();
        self.entities.push(SceneEntity {
            id,
            kind: EntityKind::Landmark,
            position: Some(point),
            height_m: 0.0,
            label: Some(label.to_string()),
            label_visible: true,
            has_marker: true,
            marker_visible: true,
        });
        id
    }

    pub fn entities(&self) -> &[SceneEntity] {
        &self.entities
    }

    pub fn entity(&self, id: u64) -> Option<&SceneEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Labels of waypoint markers in creation order.
    pub fn marker_labels(&self) -> Vec<String> {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Waypoint)
            .filter_map(|e| e.label.clone())
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Waypoint)
            .count()
    }

    pub fn polyline(&self, line: PolylineHandle) -> Option<&Polyline> {
        self.polylines.get(&line.raw())
    }

    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
        self.polylines.values()
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    /// Number of successful camera framings.
    pub fn framing_count(&self) -> usize {
        self.framed.len()
    }

    pub fn last_framed(&self) -> Option<GeoRect> {
        self.framed.last().copied()
    }

    pub fn set_camera_position(&mut self, position: Cartesian3) {
        self.camera = position;
    }

    pub fn camera_altitude_m(&self) -> f64 {
        self.camera.magnitude() - MARS_RADIUS_M
    }
}

impl SceneBackend for MemoryScene {
    fn create_marker(&mut self, point: GeoPoint, label: &str) -> MarkerHandle {
        let id = self.next_id();
        self.entities.push(SceneEntity {
            id,
            kind: EntityKind::Waypoint,
            position: Some(point),
            height_m: 0.0,
            label: Some(label.to_string()),
            label_visible: true,
            has_marker: true,
            marker_visible: true,
        });
        MarkerHandle::new(id)
    }

    fn set_marker_label(&mut self, marker: MarkerHandle, label: &str) {
        if let Some(entity) = self.entities.iter_mut().find(|e| e.id == marker.raw()) {
            entity.label = Some(label.to_string());
        }
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        self.entities.retain(|e| e.id != marker.raw());
    }

    fn draw_polyline(&mut self, points: &[GeoPoint], style: LineStyle) -> PolylineHandle {
        let id = self.next_id();
        self.polylines.insert(
            id,
            Polyline {
                points: points.to_vec(),
                style,
            },
        );
        PolylineHandle::new(id)
    }

    fn remove_polyline(&mut self, line: PolylineHandle) {
        self.polylines.remove(&line.raw());
    }

    fn fly_to_rect(&mut self, rect: GeoRect, _duration_s: f64) -> Result<(), FramingError> {
        if rect.is_degenerate() {
            return Err(FramingError::Degenerate);
        }
        let (lon, lat) = rect.center();
        let center = GeoPoint::new(lon, lat).map_err(|e| FramingError::Rejected(e.to_string()))?;
        let span_rad = rect.width().max(rect.height()).to_radians();
        let altitude = (span_rad * MARS_RADIUS_M * 1.5).max(MIN_FRAMING_ALTITUDE_M);
        self.camera = to_unit_vector(center).scale(MARS_RADIUS_M + altitude);
        self.framed.push(rect);
        Ok(())
    }

    fn camera_position(&self) -> Cartesian3 {
        self.camera
    }

    fn apply_camera(&mut self, command: CameraCommand) {
        match command {
            CameraCommand::FlyToAltitude { altitude_m } => {
                if let Some(direction) = self.camera.normalize() {
                    self.camera = direction.scale(MARS_RADIUS_M + altitude_m);
                }
            }
            CameraCommand::RotateAboutPole { radians } => {
                self.camera = self.camera.rotate_z(radians);
            }
            CameraCommand::FlyHome => {
                self.camera = self.home;
            }
        }
    }

    fn entities_mut(&mut self) -> &mut [SceneEntity] {
        &mut self.entities
    }
}
