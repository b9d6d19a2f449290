//! Ordered waypoint sequence and its scene markers.

use crate::models::GeoPoint;
use crate::render::{MarkerHandle, SceneBackend};

/// A placed waypoint and the marker the scene created for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    point: GeoPoint,
    marker: MarkerHandle,
}

impl Waypoint {
    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn marker(&self) -> MarkerHandle {
        self.marker
    }
}

/// Label for the waypoint at `index` in a sequence of `count`.
pub fn roster_label(index: usize, count: usize) -> String {
    if index == 0 {
        "Start".to_string()
    } else if index + 1 == count {
        "End".to_string()
    } else {
        format!("WP{}", index)
    }
}

/// Owns the waypoint list. Every marker is created and removed together with
/// its waypoint.
#[derive(Debug, Default)]
pub struct WaypointStore {
    waypoints: Vec<Waypoint>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn points(&self) -> Vec<GeoPoint> {
        self.waypoints.iter().map(|w| w.point).collect()
    }

    /// Append a waypoint and create its marker.
    pub fn add(&mut self, scene: &mut dyn SceneBackend, point: GeoPoint) {
        let label = roster_label(self.waypoints.len(), self.waypoints.len() + 1);
        let marker = scene.create_marker(point, &label);
        self.waypoints.push(Waypoint { point, marker });
        self.relabel(scene);
    }

    /// Remove the last waypoint. No-op on an empty store.
    pub fn undo(&mut self, scene: &mut dyn SceneBackend) -> Option<GeoPoint> {
        let removed = self.waypoints.pop()?;
        scene.remove_marker(removed.marker);
        self.relabel(scene);
        Some(removed.point)
    }

    /// Remove every waypoint. Returns how many were removed.
    pub fn clear(&mut self, scene: &mut dyn SceneBackend) -> usize {
        let count = self.waypoints.len();
        for waypoint in self.waypoints.drain(..) {
            scene.remove_marker(waypoint.marker);
        }
        count
    }

    /// One line per waypoint, e.g. `"Start: 10.0000, -4.5000"`.
    pub fn roster(&self) -> Vec<String> {
        let count = self.waypoints.len();
        self.waypoints
            .iter()
            .enumerate()
            .map(|(i, w)| format!("{}: {}", roster_label(i, count), w.point))
            .collect()
    }

    fn relabel(&self, scene: &mut dyn SceneBackend) {
        let count = self.waypoints.len();
        for (i, waypoint) in self.waypoints.iter().enumerate() {
            scene.set_marker_label(waypoint.marker, &roster_label(i, count));
        }
    }
}
