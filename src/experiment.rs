//! Run driver: evaluates several strategies on one fleet and post inventory.
//!
//! The status map is reset before each strategy, so every strategy sees the
//! same inventory regardless of what ran before it.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::PlannerError;
use crate::generator::{FleetGenerator, PostGenerator};
use crate::haversine::HaversineMatrix;
use crate::matcher::ConstraintSet;
use crate::model::{ChargingPost, ElectricVehicle};
use crate::solver::{self, Allocation, SolveOptions, Strategy};
use crate::stats::Summary;
use crate::status::StatusMap;
use crate::traits::DistanceMatrixProvider;

/// Outcome of one strategy within an experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub vehicles: usize,
    pub allocated: usize,
    /// Allocated vehicles as a percentage of the fleet.
    pub allocation_rate: f64,
    pub elapsed_ms: f64,
    /// Destination-to-post distances of the allocated vehicles.
    pub distance: Option<Summary>,
    /// Effective waits; dynamic scheduling only.
    pub wait: Option<Summary>,
    pub allocation: Allocation,
    /// Set when the strategy failed, e.g. no optimal assignment exists.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    pub vehicles: usize,
    pub posts: usize,
    pub constraints: ConstraintSet,
    pub strategies: Vec<StrategyReport>,
}

impl ExperimentReport {
    pub fn report_for(&self, strategy: Strategy) -> Option<&StrategyReport> {
        self.strategies.iter().find(|report| report.strategy == strategy)
    }

    pub fn to_json(&self) -> Result<String, PlannerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PlannerError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

pub struct Experiment<M = HaversineMatrix> {
    vehicles: Vec<ElectricVehicle>,
    posts: Vec<ChargingPost>,
    status: StatusMap,
    constraints: ConstraintSet,
    options: SolveOptions,
    matrix_provider: M,
}

impl Experiment<HaversineMatrix> {
    pub fn new(
        vehicles: Vec<ElectricVehicle>,
        posts: Vec<ChargingPost>,
        constraints: ConstraintSet,
        options: SolveOptions,
    ) -> Self {
        let status = StatusMap::snapshot(&posts);
        Self {
            vehicles,
            posts,
            status,
            constraints,
            options,
            matrix_provider: HaversineMatrix,
        }
    }

    /// Generates the fleet and posts described by `config`.
    pub fn from_config(config: &RunConfig) -> Result<Self, PlannerError> {
        config.validate()?;

        let vehicles = FleetGenerator::new(config.seed)
            .with_bounds(config.fleet.bounds)
            .with_willing_to_pay_percent(config.fleet.willing_to_pay_percent)
            .generate(config.fleet.size);
        let posts = PostGenerator::new(config.seed.wrapping_add(1))
            .with_bounds(config.posts.bounds)
            .with_status_mix(config.posts.status_mix)
            .generate(config.posts.count);

        Ok(Self::new(vehicles, posts, config.constraints, config.options.clone()))
    }
}

impl<M: DistanceMatrixProvider> Experiment<M> {
    pub fn with_matrix_provider<N: DistanceMatrixProvider>(self, matrix_provider: N) -> Experiment<N> {
        Experiment {
            vehicles: self.vehicles,
            posts: self.posts,
            status: self.status,
            constraints: self.constraints,
            options: self.options,
            matrix_provider,
        }
    }

    pub fn vehicles(&self) -> &[ElectricVehicle] {
        &self.vehicles
    }

    pub fn posts(&self) -> &[ChargingPost] {
        &self.posts
    }

    /// Occupancy left behind by the most recent strategy.
    pub fn status(&self) -> &StatusMap {
        &self.status
    }

    pub fn run(&mut self, strategies: &[Strategy]) -> ExperimentReport {
        let reports = strategies
            .iter()
            .map(|&strategy| self.run_one(strategy))
            .collect();

        ExperimentReport {
            vehicles: self.vehicles.len(),
            posts: self.posts.len(),
            constraints: self.constraints,
            strategies: reports,
        }
    }

    fn run_one(&mut self, strategy: Strategy) -> StrategyReport {
        self.status.reset();

        let started = Instant::now();
        let outcome = solver::solve(
            strategy,
            &self.vehicles,
            &self.posts,
            &mut self.status,
            &self.constraints,
            &self.matrix_provider,
            &self.options,
        );
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

        let fleet = self.vehicles.len();
        match outcome {
            Ok(result) => {
                let allocated = result.allocation.allocated_count();
                let report = StrategyReport {
                    strategy,
                    vehicles: fleet,
                    allocated,
                    allocation_rate: allocation_rate(allocated, fleet),
                    elapsed_ms,
                    distance: Summary::of(&result.allocation.distances()),
                    wait: Summary::of(&result.wait_times),
                    allocation: result.allocation,
                    error: None,
                };
                info!(
                    strategy = %strategy,
                    allocated,
                    rate = report.allocation_rate,
                    elapsed_ms,
                    "strategy evaluated"
                );
                report
            }
            Err(err) => {
                warn!(strategy = %strategy, error = %err, "strategy failed");
                StrategyReport {
                    strategy,
                    vehicles: fleet,
                    allocated: 0,
                    allocation_rate: 0.0,
                    elapsed_ms,
                    distance: None,
                    wait: None,
                    allocation: Allocation::default(),
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

fn allocation_rate(allocated: usize, fleet: usize) -> f64 {
    if fleet == 0 {
        return 0.0;
    }
    (allocated as f64 / fleet as f64 * 10_000.0).round() / 100.0
}
