//! Error type shared by the planner.
//!
//! Unallocated vehicles are not errors; they are reported in the allocation.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PlannerError {
    /// The integer-programming backend returned no optimal assignment.
    NoOptimalSolution(String),
    InvalidConfig(String),
    Io(io::Error),
    Json(serde_json::Error),
    Http(reqwest::Error),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::NoOptimalSolution(reason) => {
                write!(f, "the problem does not have an optimal solution: {}", reason)
            }
            PlannerError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
            PlannerError::Io(err) => write!(f, "i/o error: {}", err),
            PlannerError::Json(err) => write!(f, "json error: {}", err),
            PlannerError::Http(err) => write!(f, "http error: {}", err),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlannerError::Io(err) => Some(err),
            PlannerError::Json(err) => Some(err),
            PlannerError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PlannerError {
    fn from(err: io::Error) -> Self {
        PlannerError::Io(err)
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Json(err)
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        PlannerError::Http(err)
    }
}
