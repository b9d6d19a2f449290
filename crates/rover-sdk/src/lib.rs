//! Rover SDK - remote solver integration
//!
//! Sends solve requests built by `rover-core` to the path solver and turns
//! its replies into validated routes.

pub mod client;
pub mod config;

pub use client::SolverClient;
pub use config::SolverConfig;
pub use rover_core::{Route, SolveError, SolveParams, SolveRequest};
