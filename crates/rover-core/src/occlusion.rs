//! Horizon occlusion for labeled scene entities.
//!
//! A point is hidden when the ellipsoid lies between it and the viewer. The
//! test runs in ellipsoid-scaled space, where the body is a unit sphere and
//! the horizon is a cone tangent to it.

use crate::models::{Cartesian3, GeoPoint};
use crate::render::SceneEntity;

/// Triaxial reference body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub radii: Cartesian3,
}

impl Ellipsoid {
    /// Mars IAU 2000 reference ellipsoid.
    pub const MARS: Ellipsoid = Ellipsoid {
        radii: Cartesian3::new(3_396_190.0, 3_396_190.0, 3_376_200.0),
    };

    pub const fn sphere(radius_m: f64) -> Self {
        Ellipsoid {
            radii: Cartesian3::new(radius_m, radius_m, radius_m),
        }
    }

    fn one_over_radii(&self) -> Cartesian3 {
        Cartesian3::new(1.0 / self.radii.x, 1.0 / self.radii.y, 1.0 / self.radii.z)
    }

    /// Body-fixed position of a geodetic point at `height_m` above the surface.
    pub fn to_cartesian(&self, point: GeoPoint, height_m: f64) -> Cartesian3 {
        let lon = point.lon().to_radians();
        let lat = point.lat().to_radians();
        let normal = Cartesian3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
        let radii_squared = self.radii.mul(self.radii);
        let k = radii_squared.mul(normal);
        let gamma = normal.dot(k).sqrt();
        let surface = k.scale(1.0 / gamma);
        let up = normal.scale(height_m);
        Cartesian3::new(surface.x + up.x, surface.y + up.y, surface.z + up.z)
    }
}

/// Per-frame label visibility from the current viewpoint.
#[derive(Debug, Clone)]
pub struct OcclusionEngine {
    ellipsoid: Ellipsoid,
}

impl Default for OcclusionEngine {
    fn default() -> Self {
        Self::new(Ellipsoid::MARS)
    }
}

impl OcclusionEngine {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Whether `position` can be seen from `camera` past the ellipsoid.
    pub fn is_visible(&self, camera: Cartesian3, position: Cartesian3) -> bool {
        let inv = self.ellipsoid.one_over_radii();
        let cv = camera.mul(inv);
        let vh_magnitude_squared = cv.magnitude_squared() - 1.0;

        let vt = position.mul(inv).sub(cv);
        let vt_dot_vc = -vt.dot(cv);

        let occluded = if vh_magnitude_squared < 0.0 {
            // Viewer below the surface: only points in front of it are visible.
            vt_dot_vc > 0.0
        } else {
            vt_dot_vc > vh_magnitude_squared
                && vt_dot_vc * vt_dot_vc / vt.magnitude_squared() > vh_magnitude_squared
        };
        !occluded
    }

    /// Update label and marker visibility of every entity that has both a
    /// position and a label. Returns the number of visible labels.
    pub fn refresh(&self, camera: Cartesian3, entities: &mut [SceneEntity]) -> usize {
        let mut visible_count = 0;
        for entity in entities.iter_mut() {
            let (Some(point), Some(_)) = (entity.position, entity.label.as_ref()) else {
                continue;
            };
            let position = self.ellipsoid.to_cartesian(point, entity.height_m);
            let visible = self.is_visible(camera, position);
            entity.label_visible = visible;
            if entity.has_marker {
                entity.marker_visible = visible;
            }
            if visible {
                visible_count += 1;
            }
        }
        visible_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EntityKind;

    fn entity(id: u64, lon: f64, lat: f64, label: Option<&str>) -> SceneEntity {
        SceneEntity {
            id,
            kind: EntityKind::Landmark,
            position: Some(GeoPoint::new(lon, lat).unwrap()),
            height_m: 0.0,
            label: label.map(str::to_string),
            label_visible: true,
            has_marker: true,
            marker_visible: true,
        }
    }

    fn camera_over(engine: &OcclusionEngine, lon: f64, lat: f64, altitude_m: f64) -> Cartesian3 {
        engine
            .ellipsoid()
            .to_cartesian(GeoPoint::new(lon, lat).unwrap(), altitude_m)
    }

    #[test]
    fn sub_camera_point_is_visible_and_antipode_is_not() {
        let engine = OcclusionEngine::default();
        let camera = camera_over(&engine, 30.0, 10.0, 5_000_000.0);
        let mut entities = vec![
            entity(1, 30.0, 10.0, Some("center")),
            entity(2, -150.0, -10.0, Some("antipode")),
        ];
        let visible = engine.refresh(camera, &mut entities);
        assert_eq!(visible, 1);
        assert!(entities[0].label_visible && entities[0].marker_visible);
        assert!(!entities[1].label_visible && !entities[1].marker_visible);
    }

    #[test]
    fn horizon_cuts_off_at_tangent_angle() {
        let engine = OcclusionEngine::new(Ellipsoid::sphere(1_000.0));
        // Camera at distance 2R: horizon at 60 degrees of arc.
        let camera = Cartesian3::new(2_000.0, 0.0, 0.0);
        let near = engine.ellipsoid().to_cartesian(GeoPoint::new(55.0, 0.0).unwrap(), 0.0);
        let far = engine.ellipsoid().to_cartesian(GeoPoint::new(65.0, 0.0).unwrap(), 0.0);
        assert!(engine.is_visible(camera, near));
        assert!(!engine.is_visible(camera, far));
    }

    #[test]
    fn entities_without_label_or_position_are_untouched() {
        let engine = OcclusionEngine::default();
        let camera = camera_over(&engine, 0.0, 0.0, 1_000_000.0);
        let mut unlabeled = entity(1, 180.0, 0.0, None);
        unlabeled.label_visible = true;
        let mut unplaced = entity(2, 0.0, 0.0, Some("nowhere"));
        unplaced.position = None;
        unplaced.label_visible = false;

        let mut entities = vec![unlabeled.clone(), unplaced.clone()];
        assert_eq!(engine.refresh(camera, &mut entities), 0);
        assert_eq!(entities, vec![unlabeled, unplaced]);
    }

    #[test]
    fn refresh_is_idempotent_and_keeps_entity_set() {
        let engine = OcclusionEngine::default();
        let camera = camera_over(&engine, 90.0, 45.0, 2_000_000.0);
        let mut entities: Vec<SceneEntity> = (0..12)
            .map(|i| entity(i, -180.0 + 30.0 * i as f64, 0.0, Some("pin")))
            .collect();
        engine.refresh(camera, &mut entities);
        let first = entities.clone();
        engine.refresh(camera, &mut entities);
        assert_eq!(entities, first);
        assert_eq!(entities.len(), 12);
    }

    #[test]
    fn marker_flag_follows_label_only_when_present() {
        let engine = OcclusionEngine::default();
        let camera = camera_over(&engine, 0.0, 0.0, 1_000_000.0);
        let mut label_only = entity(1, 180.0, 0.0, Some("far side"));
        label_only.has_marker = false;
        label_only.marker_visible = true;
        let mut entities = vec![label_only];
        engine.refresh(camera, &mut entities);
        assert!(!entities[0].label_visible);
        assert!(entities[0].marker_visible);
    }

    #[test]
    fn camera_inside_body_sees_only_forward_points() {
        let engine = OcclusionEngine::new(Ellipsoid::sphere(1_000.0));
        let camera = Cartesian3::new(500.0, 0.0, 0.0);
        assert!(engine.is_visible(camera, Cartesian3::new(1_000.0, 0.0, 0.0)));
        assert!(!engine.is_visible(camera, Cartesian3::new(-1_000.0, 0.0, 0.0)));
    }
}
