//! Portable route documents.
//!
//! A document carries the solved path and, optionally, the waypoints that
//! produced it. `positions` is the only mandatory field.

use crate::error::{ExportError, ImportError};
use crate::models::{CostMode, GeoPoint, Route, COST_UNITS_PER_KWH};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDocument {
    pub positions: Vec<GeoPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoints: Option<Vec<GeoPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legs_m: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostMode>,
    #[serde(
        default,
        rename = "total_energy_kWh",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_energy_kwh: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}

impl RouteDocument {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Waypoints and route recovered from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRoute {
    pub waypoints: Vec<GeoPoint>,
    pub route: Route,
}

/// Merge the last route with the current waypoints into a document.
pub fn export(route: Option<&Route>, waypoints: &[GeoPoint]) -> Result<RouteDocument, ExportError> {
    let route = route.ok_or(ExportError::NoRoute)?;
    Ok(RouteDocument {
        positions: route.positions.clone(),
        waypoints: (!waypoints.is_empty()).then(|| waypoints.to_vec()),
        total_cost_m: Some(route.total_cost),
        legs_m: Some(route.legs.clone()),
        cost: Some(route.cost_mode),
        total_energy_kwh: route.energy_kwh,
        exported_at: Some(Utc::now()),
    })
}

/// Parse and validate a document.
pub fn import(text: &str) -> Result<ImportedRoute, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_object() {
        match value.get("positions") {
            None | Some(Value::Null) => return Err(ImportError::MissingPositions),
            Some(Value::Array(items)) if items.is_empty() => {
                return Err(ImportError::EmptyPositions)
            }
            Some(Value::Array(_)) => {}
            Some(_) => return Err(ImportError::PositionsNotArray),
        }
    }
    let document: RouteDocument = serde_json::from_value(value)?;
    Ok(into_imported(document))
}

fn into_imported(document: RouteDocument) -> ImportedRoute {
    let RouteDocument {
        positions,
        waypoints,
        total_cost_m,
        legs_m,
        cost,
        total_energy_kwh,
        exported_at: _,
    } = document;

    let waypoints = match waypoints {
        Some(explicit) if !explicit.is_empty() => explicit,
        _ => synthesize_endpoints(&positions),
    };
    let legs = legs_m.unwrap_or_default();
    let total_cost = total_cost_m.unwrap_or_else(|| legs.iter().sum());
    let cost_mode = cost.unwrap_or_default();
    let energy_kwh = match cost_mode {
        CostMode::Distance => None,
        CostMode::Energy => Some(total_energy_kwh.unwrap_or(total_cost / COST_UNITS_PER_KWH)),
    };

    ImportedRoute {
        waypoints,
        route: Route {
            positions,
            total_cost,
            legs,
            cost_mode,
            energy_kwh,
        },
    }
}

fn synthesize_endpoints(positions: &[GeoPoint]) -> Vec<GeoPoint> {
    match (positions.first(), positions.last()) {
        (Some(first), Some(last)) if positions.len() > 1 => vec![*first, *last],
        (Some(only), _) => vec![*only],
        _ => Vec::new(),
    }
}

/// Write a document as indented JSON.
pub fn write_document(path: impl AsRef<Path>, document: &RouteDocument) -> Result<(), ExportError> {
    let text = document.to_json_pretty()?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Read and validate a document file.
pub fn read_document(path: impl AsRef<Path>) -> Result<ImportedRoute, ImportError> {
    let text = std::fs::read_to_string(path)?;
    import(&text)
}
