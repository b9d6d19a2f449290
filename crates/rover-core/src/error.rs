//! Error types for the planner core.
//!
//! Every error maps onto one [`ErrorKind`] so the session can report it on a
//! single status channel without losing the category.

use thiserror::Error;

/// Coarse error category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: too few waypoints, parameter out of range, malformed document.
    Validation,
    /// Network, HTTP status or file I/O failure.
    Transport,
    /// The solver answered with an error marker or an unusable payload.
    Protocol,
}

/// Invalid coordinate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
}

/// Failure of a solve round trip.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("{0}")]
    Validation(String),
    #[error("solver unreachable: {0}")]
    Transport(String),
    #[error("{message}")]
    Protocol {
        message: String,
        /// Diagnostics the solver attached to its error, if any.
        diag: Option<serde_json::Value>,
    },
}

impl SolveError {
    pub fn protocol(message: impl Into<String>) -> Self {
        SolveError::Protocol {
            message: message.into(),
            diag: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::Validation(_) => ErrorKind::Validation,
            SolveError::Transport(_) => ErrorKind::Transport,
            SolveError::Protocol { .. } => ErrorKind::Protocol,
        }
    }
}

/// Failure to read a route document.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("route document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("route document has no positions")]
    MissingPositions,
    #[error("route document positions is not a list")]
    PositionsNotArray,
    #[error("route document positions is empty")]
    EmptyPositions,
    #[error("could not read route document: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::Io(_) => ErrorKind::Transport,
            _ => ErrorKind::Validation,
        }
    }
}

/// Failure to produce or write a route document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no route to export, solve first")]
    NoRoute,
    #[error("could not encode route document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not write route document: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::NoRoute => ErrorKind::Validation,
            ExportError::Encode(_) => ErrorKind::Protocol,
            ExportError::Io(_) => ErrorKind::Transport,
        }
    }
}

/// Camera framing failure. Never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FramingError {
    #[error("bounding rectangle is degenerate")]
    Degenerate,
    #[error("camera flight rejected: {0}")]
    Rejected(String),
}
