//! Run configuration, loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration describing a
//! hundred vehicles and a hundred posts around London, evaluated with every
//! strategy.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::generator::BoundingBox;
use crate::matcher::ConstraintSet;
use crate::solver::{SolveOptions, Strategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub size: usize,
    /// Percentage of drivers prepared to use a paid post.
    pub willing_to_pay_percent: f64,
    pub bounds: BoundingBox,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            size: 100,
            willing_to_pay_percent: 50.0,
            bounds: BoundingBox::LONDON_FLEET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    pub count: usize,
    /// Draw inventory statuses instead of starting with every post available.
    pub status_mix: bool,
    pub bounds: BoundingBox,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            count: 100,
            status_mix: false,
            bounds: BoundingBox::LONDON_POSTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed for fleet and post generation.
    pub seed: u64,
    pub fleet: FleetConfig,
    pub posts: PostConfig,
    pub constraints: ConstraintSet,
    pub options: SolveOptions,
    pub strategies: Vec<Strategy>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            fleet: FleetConfig::default(),
            posts: PostConfig::default(),
            constraints: ConstraintSet::default(),
            options: SolveOptions::default(),
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PlannerError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PlannerError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let invalid = |reason: String| Err(PlannerError::InvalidConfig(reason));

        if self.strategies.is_empty() {
            return invalid("no strategies selected".to_string());
        }
        if !(0.0..=100.0).contains(&self.fleet.willing_to_pay_percent) {
            return invalid(format!(
                "willing_to_pay_percent must be within 0..=100, got {}",
                self.fleet.willing_to_pay_percent
            ));
        }
        if !(self.options.speed_kmh.is_finite() && self.options.speed_kmh > 0.0) {
            return invalid(format!("speed_kmh must be positive, got {}", self.options.speed_kmh));
        }
        if !(self.options.request_time_minutes.is_finite() && self.options.request_time_minutes >= 0.0) {
            return invalid(format!(
                "request_time_minutes must be non-negative, got {}",
                self.options.request_time_minutes
            ));
        }
        if let Some(penalty) = self.options.unallocated_penalty {
            if !(penalty.is_finite() && penalty >= 0.0) {
                return invalid(format!("unallocated_penalty must be non-negative, got {penalty}"));
            }
        }
        for (name, bounds) in [("fleet", &self.fleet.bounds), ("posts", &self.posts.bounds)] {
            if !(bounds.latitude_span > 0.0 && bounds.longitude_span > 0.0) {
                return invalid(format!("{name} bounding box must have a positive extent"));
            }
        }
        Ok(())
    }
}
