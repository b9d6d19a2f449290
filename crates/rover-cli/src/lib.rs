//! Rover CLI - argument helpers shared by the `rover-plan` binary.

use anyhow::Result;
use chrono::Utc;
use rover_core::{GeoPoint, MemoryScene, PlannerSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a `lon,lat` pair in degrees.
pub fn parse_waypoint(s: &str) -> Result<GeoPoint, String> {
    let (lon, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'lon,lat', got '{}'", s))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    GeoPoint::new(lon, lat).map_err(|e| e.to_string())
}

/// Milliseconds since the Unix epoch, used as the session clock.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

pub fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rover_cli=info".parse()?),
        )
        .try_init()?;
    Ok(())
}

/// Status line followed by the waypoint roster, one entry per line.
pub fn report(session: &PlannerSession<MemoryScene>) -> String {
    let mut lines = vec![format!("Status: {}", session.status())];
    lines.extend(session.roster().into_iter().map(|entry| format!("  {}", entry)));
    if let Some(route) = session.route() {
        lines.push(format!(
            "Route: {} positions, {:.2} km along the surface",
            route.positions.len(),
            route.path_length_m() / 1000.0
        ));
    }
    lines.join("\n")
}
