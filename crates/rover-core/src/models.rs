//! Core data models for the route planner.

use crate::error::GeoError;
use crate::spatial::haversine_distance;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost units per kWh-equivalent. A unit conversion, not a physical model.
pub const COST_UNITS_PER_KWH: f64 = 3.6e6;

/// A validated longitude/latitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLonLat")]
pub struct GeoPoint {
    lon: f64,
    lat: f64,
}

#[derive(Deserialize)]
struct RawLonLat {
    lon: f64,
    lat: f64,
}

impl TryFrom<RawLonLat> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawLonLat) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lon, raw.lat)
    }
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::Longitude(lon));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::Latitude(lat));
        }
        Ok(Self { lon, lat })
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lon, self.lat)
    }
}

/// Body-fixed Cartesian coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Cartesian3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn magnitude_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn magnitude(self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Component-wise product.
    pub fn mul(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    pub fn normalize(self) -> Option<Self> {
        let m = self.magnitude();
        if m > 0.0 && m.is_finite() {
            Some(self.scale(1.0 / m))
        } else {
            None
        }
    }

    /// Rotate about the polar (+Z) axis.
    pub fn rotate_z(self, angle_rad: f64) -> Self {
        let (s, c) = angle_rad.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c, self.z)
    }
}

/// How solver costs are interpreted and reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Slope-weighted distance in meters.
    #[default]
    Distance,
    /// Energy-like cost, reported in kWh-equivalent.
    Energy,
}

impl CostMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostMode::Distance => "distance",
            CostMode::Energy => "energy",
        }
    }
}

impl std::str::FromStr for CostMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(CostMode::Distance),
            "energy" => Ok(CostMode::Energy),
            other => Err(format!("unknown cost mode '{}'", other)),
        }
    }
}

/// A solved or imported route. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub positions: Vec<GeoPoint>,
    pub total_cost: f64,
    pub legs: Vec<f64>,
    pub cost_mode: CostMode,
    pub energy_kwh: Option<f64>,
}

impl Route {
    /// Status line shown after a solve or import.
    pub fn summary(&self) -> String {
        match (self.cost_mode, self.energy_kwh) {
            (CostMode::Energy, Some(kwh)) => format!("{:.3} kWh", kwh),
            _ => format!("{:.2} km", self.total_cost / 1000.0),
        }
    }

    /// Great-circle length of the path on the Mars mean sphere.
    pub fn path_length_m(&self) -> f64 {
        self.positions
            .windows(2)
            .map(|pair| {
                haversine_distance(pair[0].lat(), pair[0].lon(), pair[1].lat(), pair[1].lon())
            })
            .sum()
    }
}
