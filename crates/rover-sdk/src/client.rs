//! Solver client for route computation.

use anyhow::{Context, Result};
use reqwest::Client;
use rover_core::protocol::parse_solve_response;
use rover_core::{GeoPoint, ParamRanges, Route, SolveError, SolveParams, SolveRequest};
use serde::Deserialize;
use std::time::Duration;

use crate::config::SolverConfig;

/// Client for the remote path solver.
pub struct SolverClient {
    pub(crate) base_url: String,
    pub(crate) ranges: ParamRanges,
    pub(crate) client: Client,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    ok: bool,
}

impl SolverClient {
    /// Create a client with default parameter ranges and no request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ranges: ParamRanges::default(),
            client: Client::new(),
        }
    }

    /// Create a client from configuration, with its timeout applied.
    pub fn from_config(config: &SolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: config.solver_url.clone(),
            ranges: config.ranges.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ranges(&self) -> &ParamRanges {
        &self.ranges
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Validate inputs, send one solve request and return the normalized route.
    pub async fn solve(
        &self,
        waypoints: &[GeoPoint],
        params: &SolveParams,
    ) -> Result<Route, SolveError> {
        let request = SolveRequest::build(waypoints, params, &self.ranges)?;
        self.send(&request).await
    }

    /// Send an already-built request.
    pub async fn send(&self, request: &SolveRequest) -> Result<Route, SolveError> {
        let url = self.url("/astar/solve");
        tracing::debug!(
            "POST {} ({} positions, grid {})",
            url,
            request.positions.len(),
            request.grid
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| SolveError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SolveError::Transport(err.to_string()))?;

        parse_solve_response(status.is_success(), status.as_u16(), &body, request.cost)
    }

    /// Check that the solver answers on its root endpoint.
    pub async fn health(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .context("Solver health request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Solver health check failed: {}", response.status());
        }
        let health: HealthResponse = response.json().await?;
        Ok(health.ok)
    }
}
