use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rover_cli::{init_tracing, now_ms, parse_waypoint, report};
use rover_core::protocol::SearchTuning;
use rover_core::{
    estimate_grid_size, CostMode, GeoPoint, MemoryScene, ParamRanges, PlannerAction,
    PlannerSession, SolveOutcome, SolveParams,
};
use rover_sdk::{SolverClient, SolverConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plan rover routes against a remote path solver",
    long_about = None
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place waypoints, solve the route and optionally export it
    Solve {
        /// Solver URL (defaults to ROVER_SOLVER_URL or http://localhost:8081)
        #[arg(long)]
        url: Option<String>,

        /// Waypoint as lon,lat in degrees; repeat in route order
        #[arg(
            long = "waypoint",
            short = 'w',
            value_parser = parse_waypoint,
            allow_hyphen_values = true
        )]
        waypoints: Vec<GeoPoint>,

        /// Safety margin around the waypoints in km
        #[arg(long)]
        margin_km: Option<f64>,

        /// Maximum traversable slope (rise over run)
        #[arg(long)]
        max_slope: Option<f64>,

        /// Penalty weight applied to slope
        #[arg(long)]
        slope_weight: Option<f64>,

        /// Cost model: distance or energy
        #[arg(long, default_value = "distance")]
        cost: CostMode,

        /// Fixed grid resolution; estimated from the waypoints when omitted
        #[arg(long)]
        grid: Option<u32>,

        /// Heuristic weight forwarded to the solver
        #[arg(long)]
        weight: Option<f64>,

        /// Search time limit in seconds
        #[arg(long)]
        max_time_sec: Option<f64>,

        /// Write the solved route document here
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Print the grid resolution the planner would request
    Grid {
        #[arg(
            long = "waypoint",
            short = 'w',
            value_parser = parse_waypoint,
            allow_hyphen_values = true
        )]
        waypoints: Vec<GeoPoint>,
    },

    /// Import a route document and print its waypoints and summary
    Inspect {
        path: PathBuf,
    },

    /// Check that the solver is reachable
    Health {
        #[arg(long)]
        url: Option<String>,
    },
}

fn solver_config(url: Option<String>) -> SolverConfig {
    let mut config = SolverConfig::from_env();
    if let Some(url) = url {
        config.solver_url = url;
    }
    config
}

fn solve_params(
    ranges: &ParamRanges,
    margin_km: Option<f64>,
    max_slope: Option<f64>,
    slope_weight: Option<f64>,
    cost: CostMode,
    grid: Option<u32>,
    tuning: SearchTuning,
) -> SolveParams {
    let defaults = SolveParams::from_ranges(ranges);
    SolveParams {
        grid,
        margin_km: margin_km.unwrap_or(defaults.margin_km),
        max_slope: max_slope.unwrap_or(defaults.max_slope),
        slope_weight: slope_weight.unwrap_or(defaults.slope_weight),
        cost_mode: cost,
        tuning,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let args = Args::parse();

    match args.command {
        Command::Solve {
            url,
            waypoints,
            margin_km,
            max_slope,
            slope_weight,
            cost,
            grid,
            weight,
            max_time_sec,
            export,
        } => {
            let config = solver_config(url);
            let client = SolverClient::from_config(&config)?;
            let mut session =
                PlannerSession::new(MemoryScene::new(), config.ranges.clone(), now_ms());
            for point in &waypoints {
                session.dispatch(
                    PlannerAction::AddWaypoint {
                        lon: point.lon(),
                        lat: point.lat(),
                    },
                    now_ms(),
                );
            }

            let tuning = SearchTuning {
                weight,
                max_time_sec,
                ..SearchTuning::default()
            };
            let params = solve_params(
                &config.ranges,
                margin_km,
                max_slope,
                slope_weight,
                cost,
                grid,
                tuning,
            );

            let (request, ticket) = match session.begin_solve(&params, now_ms()) {
                Ok(started) => started,
                Err(_) => {
                    println!("{}", report(&session));
                    std::process::exit(2);
                }
            };
            tracing::info!("Solving against {} with grid {}", client.base_url(), request.grid);
            println!("{}", session.status());

            let result = client.send(&request).await;
            let outcome = session.complete_solve(ticket, result);
            println!("{}", report(&session));

            match outcome {
                SolveOutcome::Applied => {
                    if let Some(path) = export {
                        session
                            .export_to_file(&path)
                            .with_context(|| format!("Failed to export {}", path.display()))?;
                        println!("{}", session.status());
                    }
                }
                SolveOutcome::Failed(_) | SolveOutcome::Stale => std::process::exit(1),
            }
        }
        Command::Grid { waypoints } => {
            println!("{}", estimate_grid_size(&waypoints));
        }
        Command::Inspect { path } => {
            let mut session =
                PlannerSession::new(MemoryScene::new(), ParamRanges::default(), now_ms());
            let imported = session.import_file(&path, now_ms());
            println!("{}", report(&session));
            imported.with_context(|| format!("Failed to import {}", path.display()))?;
        }
        Command::Health { url } => {
            let config = solver_config(url);
            let client = SolverClient::from_config(&config)?;
            let ok = client.health().await?;
            println!("{}: {}", client.base_url(), if ok { "ok" } else { "not ok" });
        }
    }

    Ok(())
}
