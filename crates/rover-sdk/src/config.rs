//! Solver configuration from environment.

use rover_core::ParamRanges;
use std::env;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub solver_url: String,
    pub timeout_secs: u64,
    pub ranges: ParamRanges,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver_url: "http://localhost:8081".to_string(),
            timeout_secs: 120,
            ranges: ParamRanges::default(),
        }
    }
}

impl SolverConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            solver_url: env::var("ROVER_SOLVER_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.solver_url),
            timeout_secs: env::var("ROVER_SOLVER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            ranges: defaults.ranges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_and_falls_back() {
        env::set_var("ROVER_SOLVER_URL", " http://solver:9000 ");
        env::set_var("ROVER_SOLVER_TIMEOUT_SECS", "not-a-number");
        let config = SolverConfig::from_env();
        assert_eq!(config.solver_url, "http://solver:9000");
        assert_eq!(config.timeout_secs, 120);

        env::remove_var("ROVER_SOLVER_URL");
        env::remove_var("ROVER_SOLVER_TIMEOUT_SECS");
        let config = SolverConfig::from_env();
        assert_eq!(config.solver_url, "http://localhost:8081");
        assert_eq!(config.ranges.margin_km.default, 40.0);
    }
}
