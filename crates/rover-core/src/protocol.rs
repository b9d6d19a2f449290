//! Solver wire protocol.
//!
//! Requests are built from validated waypoints and parameters; responses are
//! checked against a strict schema and turned into a [`Route`] at the
//! boundary. Partially valid payloads are rejected, never propagated.

use crate::error::SolveError;
use crate::grid::{estimate_grid_size, DEFAULT_GRID_SIZE, MAX_GRID_SIZE};
use crate::models::{CostMode, GeoPoint, Route, COST_UNITS_PER_KWH};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inclusive slider range with its initial value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Ranges exposed by the planner controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamRanges {
    pub margin_km: ParamRange,
    pub max_slope: ParamRange,
    pub slope_weight: ParamRange,
    pub grid_min: u32,
    pub grid_max: u32,
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            margin_km: ParamRange::new(1.0, 200.0, 40.0),
            max_slope: ParamRange::new(0.05, 1.5, 0.6),
            slope_weight: ParamRange::new(0.0, 10.0, 2.0),
            grid_min: DEFAULT_GRID_SIZE,
            grid_max: MAX_GRID_SIZE,
        }
    }
}

/// Optional search knobs understood by the solver. Omitted from the body when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTuning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beam_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<u64>,
}

/// User-selected solve parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveParams {
    /// Fixed grid resolution; `None` estimates it from the waypoints.
    pub grid: Option<u32>,
    pub margin_km: f64,
    pub max_slope: f64,
    pub slope_weight: f64,
    pub cost_mode: CostMode,
    pub tuning: SearchTuning,
}

impl SolveParams {
    /// Parameters at the slider defaults.
    pub fn from_ranges(ranges: &ParamRanges) -> Self {
        Self {
            grid: None,
            margin_km: ranges.margin_km.default,
            max_slope: ranges.max_slope.default,
            slope_weight: ranges.slope_weight.default,
            cost_mode: CostMode::default(),
            tuning: SearchTuning::default(),
        }
    }
}

impl Default for SolveParams {
    fn default() -> Self {
        Self::from_ranges(&ParamRanges::default())
    }
}

/// Body of `POST /astar/solve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveRequest {
    pub positions: Vec<GeoPoint>,
    pub grid: u32,
    pub margin_km: f64,
    pub max_slope: f64,
    pub slope_weight: f64,
    pub cost: CostMode,
    #[serde(flatten)]
    pub tuning: SearchTuning,
}

impl SolveRequest {
    /// Validate inputs and build the request body.
    pub fn build(
        waypoints: &[GeoPoint],
        params: &SolveParams,
        ranges: &ParamRanges,
    ) -> Result<Self, SolveError> {
        if waypoints.len() < 2 {
            return Err(SolveError::Validation(
                "Place at least 2 waypoints before solving".to_string(),
            ));
        }
        check_range("margin_km", params.margin_km, &ranges.margin_km)?;
        check_range("max_slope", params.max_slope, &ranges.max_slope)?;
        check_range("slope_weight", params.slope_weight, &ranges.slope_weight)?;

        let grid = params
            .grid
            .unwrap_or_else(|| estimate_grid_size(waypoints));
        if grid < ranges.grid_min || grid > ranges.grid_max {
            return Err(SolveError::Validation(format!(
                "grid {} outside [{}, {}]",
                grid, ranges.grid_min, ranges.grid_max
            )));
        }

        Ok(Self {
            positions: waypoints.to_vec(),
            grid,
            margin_km: params.margin_km,
            max_slope: params.max_slope,
            slope_weight: params.slope_weight,
            cost: params.cost_mode,
            tuning: params.tuning.clone(),
        })
    }
}

fn check_range(name: &str, value: f64, range: &ParamRange) -> Result<(), SolveError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(SolveError::Validation(format!(
            "{} {} outside [{}, {}]",
            name, value, range.min, range.max
        )))
    }
}

/// Successful solver payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveResponse {
    pub positions: Vec<GeoPoint>,
    #[serde(default)]
    pub total_cost_m: Option<f64>,
    #[serde(default)]
    pub legs_m: Option<Vec<f64>>,
    #[serde(default, rename = "total_energy_J")]
    pub total_energy_j: Option<f64>,
    #[serde(default, rename = "total_energy_Wh")]
    pub total_energy_wh: Option<f64>,
    #[serde(default, rename = "total_energy_kWh")]
    pub total_energy_kwh: Option<f64>,
    #[serde(default, rename = "legs_energy_J")]
    pub legs_energy_j: Option<Vec<f64>>,
}

impl SolveResponse {
    /// Normalize into a [`Route`] for the requested cost mode.
    pub fn into_route(self, cost_mode: CostMode) -> Result<Route, SolveError> {
        if self.positions.len() < 2 {
            return Err(SolveError::protocol("solver returned fewer than 2 positions"));
        }

        let total_cost = self
            .total_cost_m
            .or(self.total_energy_j)
            .ok_or_else(|| SolveError::protocol("solver response has no total cost"))?;
        if !total_cost.is_finite() || total_cost < 0.0 {
            return Err(SolveError::protocol(format!(
                "solver returned invalid total cost {}",
                total_cost
            )));
        }

        let legs = self.legs_m.or(self.legs_energy_j).unwrap_or_default();
        if legs.iter().any(|leg| !leg.is_finite()) {
            return Err(SolveError::protocol("solver returned a non-finite leg cost"));
        }

        let energy_kwh = match cost_mode {
            CostMode::Distance => None,
            CostMode::Energy => Some(
                self.total_energy_kwh
                    .or(self.total_energy_wh.map(|wh| wh / 1000.0))
                    .unwrap_or(total_cost / COST_UNITS_PER_KWH),
            ),
        };

        Ok(Route {
            positions: self.positions,
            total_cost,
            legs,
            cost_mode,
            energy_kwh,
        })
    }
}

/// Validate a raw solver reply and convert it into a [`Route`].
///
/// `success` is whether the HTTP status was 2xx. A non-empty top-level
/// `error` field fails the solve regardless of status.
pub fn parse_solve_response(
    success: bool,
    status_code: u16,
    body: &str,
    cost_mode: CostMode,
) -> Result<Route, SolveError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) if success => {
            return Err(SolveError::protocol(format!(
                "solver returned malformed JSON: {}",
                err
            )))
        }
        Err(_) => {
            return Err(SolveError::Transport(format!(
                "solver returned HTTP {}",
                status_code
            )))
        }
    };

    if let Some(message) = error_marker(&value) {
        let diag = value.get("diag").cloned();
        if let Some(diag) = &diag {
            tracing::debug!("Solver diagnostics: {}", diag);
        }
        return Err(if success {
            SolveError::Protocol { message, diag }
        } else {
            SolveError::Transport(message)
        });
    }

    if !success {
        return Err(SolveError::Transport(format!(
            "solver returned HTTP {}",
            status_code
        )));
    }

    match value.get("positions") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(SolveError::protocol("solver positions is not a list")),
        None => return Err(SolveError::protocol("solver response has no positions")),
    }

    let response: SolveResponse = serde_json::from_value(value)
        .map_err(|err| SolveError::protocol(format!("malformed solver response: {}", err)))?;
    response.into_route(cost_mode)
}

fn error_marker(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords
            .iter()
            .map(|&(lon, lat)| GeoPoint::new(lon, lat).unwrap())
            .collect()
    }

    fn params(grid: u32, margin_km: f64, max_slope: f64, slope_weight: f64) -> SolveParams {
        SolveParams {
            grid: Some(grid),
            margin_km,
            max_slope,
            slope_weight,
            cost_mode: CostMode::Distance,
            tuning: SearchTuning::default(),
        }
    }

    #[test]
    fn request_body_matches_protocol_exactly() {
        let request = SolveRequest::build(
            &pts(&[(0.0, 0.0), (1.0, 1.0)]),
            &params(16, 5.0, 0.3, 0.5),
            &ParamRanges::default(),
        )
        .unwrap();

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "positions": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 1.0}],
                "grid": 16,
                "margin_km": 5.0,
                "max_slope": 0.3,
                "slope_weight": 0.5,
                "cost": "distance"
            })
        );
    }

    #[test]
    fn tuning_knobs_are_sent_only_when_set() {
        let mut p = params(32, 5.0, 0.3, 0.5);
        p.tuning.beam_width = Some(64);
        let request =
            SolveRequest::build(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &p, &ParamRanges::default())
                .unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["beam_width"], json!(64));
        assert!(body.get("epsilon").is_none());
    }

    #[test]
    fn build_estimates_grid_when_not_fixed() {
        let mut p = params(16, 5.0, 0.3, 0.5);
        p.grid = None;
        let request =
            SolveRequest::build(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &p, &ParamRanges::default())
                .unwrap();
        assert_eq!(request.grid, 16);
    }

    #[test]
    fn build_rejects_single_waypoint() {
        let err = SolveRequest::build(
            &pts(&[(0.0, 0.0)]),
            &SolveParams::default(),
            &ParamRanges::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn build_rejects_out_of_range_parameters() {
        let ranges = ParamRanges::default();
        let waypoints = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        for bad in [
            params(16, 500.0, 0.3, 0.5),
            params(16, 5.0, f64::NAN, 0.5),
            params(16, 5.0, 0.3, -1.0),
            params(1024, 5.0, 0.3, 0.5),
        ] {
            let err = SolveRequest::build(&waypoints, &bad, &ranges).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn distance_response_becomes_route() {
        let body = json!({
            "positions": [
                {"lon": 0.0, "lat": 0.0},
                {"lon": 0.5, "lat": 0.5},
                {"lon": 1.0, "lat": 1.0}
            ],
            "total_cost_m": 15000.0
        })
        .to_string();
        let route = parse_solve_response(true, 200, &body, CostMode::Distance).unwrap();
        assert_eq!(route.positions.len(), 3);
        assert_eq!(route.total_cost, 15000.0);
        assert!(route.legs.is_empty());
        assert_eq!(route.summary(), "15.00 km");
    }

    #[test]
    fn energy_is_derived_when_server_omits_it() {
        let body = json!({
            "positions": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 1.0}],
            "total_cost_m": 7.2e6,
            "legs_m": [7.2e6]
        })
        .to_string();
        let route = parse_solve_response(true, 200, &body, CostMode::Energy).unwrap();
        assert_eq!(route.energy_kwh, Some(2.0));
        assert_eq!(route.summary(), "2.000 kWh");
    }

    #[test]
    fn server_energy_takes_precedence() {
        let body = json!({
            "positions": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 1.0}],
            "total_energy_J": 3.6e6,
            "total_energy_kWh": 1.25,
            "legs_energy_J": [3.6e6]
        })
        .to_string();
        let route = parse_solve_response(true, 200, &body, CostMode::Energy).unwrap();
        assert_eq!(route.total_cost, 3.6e6);
        assert_eq!(route.legs, vec![3.6e6]);
        assert_eq!(route.energy_kwh, Some(1.25));
    }

    #[test]
    fn error_field_fails_even_with_success_status() {
        let body = json!({
            "error": "No path for leg 1. Try bigger grid/margin or relax constraints.",
            "diag": {"leg": 1, "grid": 16}
        })
        .to_string();
        let err = parse_solve_response(true, 200, &body, CostMode::Distance).unwrap_err();
        match err {
            SolveError::Protocol { message, diag } => {
                assert!(message.starts_with("No path for leg 1"));
                assert_eq!(diag.unwrap()["grid"], json!(16));
            }
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn empty_error_field_is_ignored() {
        let body = json!({
            "error": "",
            "positions": [{"lon": 0.0, "lat": 0.0}, {"lon": 1.0, "lat": 1.0}],
            "total_cost_m": 10.0
        })
        .to_string();
        assert!(parse_solve_response(true, 200, &body, CostMode::Distance).is_ok());
    }

    #[test]
    fn non_success_status_carries_server_message() {
        let body = json!({"error": "Remote COG not reachable"}).to_string();
        let err = parse_solve_response(false, 502, &body, CostMode::Distance).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "solver unreachable: Remote COG not reachable");

        let err = parse_solve_response(false, 500, "<html>oops</html>", CostMode::Distance)
            .unwrap_err();
        assert_eq!(err.to_string(), "solver unreachable: solver returned HTTP 500");
    }

    #[test]
    fn schema_failures_are_protocol_errors() {
        let cases = [
            "not json".to_string(),
            json!({"total_cost_m": 1.0}).to_string(),
            json!({"positions": "nope", "total_cost_m": 1.0}).to_string(),
            json!({"positions": [{"lon": 0.0}], "total_cost_m": 1.0}).to_string(),
            json!({"positions": [], "total_cost_m": 1.0}).to_string(),
            json!({"positions": [{"lon": 0.0, "lat": 0.0}], "total_cost_m": 1.0}).to_string(),
            json!({"positions": [{"lon": 0.0, "lat": 0.0}]}).to_string(),
            json!({"positions": [{"lon": 999.0, "lat": 0.0}], "total_cost_m": 1.0}).to_string(),
        ];
        for body in cases {
            let err = parse_solve_response(true, 200, &body, CostMode::Distance).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Protocol, "body {body}");
        }
    }
}
