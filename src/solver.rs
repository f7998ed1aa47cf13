//! Allocation strategies and their shared dispatch.
//!
//! Every strategy receives the same inputs (fleet, posts, occupancy,
//! constraints) and returns a possibly partial vehicle→post assignment.
//! Callers reset the [`StatusMap`] between strategies.

use std::collections::BTreeMap;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dynamic;
use crate::error::PlannerError;
use crate::haversine::{DEFAULT_SPEED_KMH, HaversineMatrix};
use crate::matcher::{ConstraintSet, Matcher};
use crate::model::{ChargingPost, ElectricVehicle, Geolocation, PostId, VehicleId};
use crate::optimal;
use crate::status::StatusMap;
use crate::traits::DistanceMatrixProvider;

/// Allocation strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniform pick among matching posts, vehicle by vehicle.
    Random,
    /// Nearest matching post, vehicle by vehicle.
    Greedy,
    /// Greedy followed by pairwise-swap refinement.
    LocalSearch,
    /// Minimum total distance via integer programming.
    Optimal,
    /// Online scheduling over earliest start times.
    Dynamic,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Random,
        Strategy::Greedy,
        Strategy::LocalSearch,
        Strategy::Optimal,
        Strategy::Dynamic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::LocalSearch => "local_search",
            Strategy::Optimal => "optimal",
            Strategy::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Seed for the random allocator.
    pub seed: u64,
    /// Passes of the pairwise-swap refinement.
    pub local_search_passes: usize,
    /// Average driving speed used to turn distances into travel minutes.
    pub speed_kmh: f64,
    /// Time (minutes) at which the dynamic scheduler receives the requests.
    pub request_time_minutes: f64,
    /// When set, the optimal solver may leave vehicles unallocated at this
    /// cost each instead of requiring every vehicle to be placed.
    pub unallocated_penalty: Option<f64>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            local_search_passes: 3,
            speed_kmh: DEFAULT_SPEED_KMH,
            request_time_minutes: 0.0,
            unallocated_penalty: None,
        }
    }
}

/// One committed vehicle→post pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub vehicle: VehicleId,
    pub post: PostId,
    /// Great-circle distance between the vehicle's destination and the post.
    pub distance_km: f64,
}

/// Outcome of one strategy: assignments in commitment order plus the vehicles left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Allocation {
    pub assignments: Vec<Assignment>,
    pub unallocated: Vec<VehicleId>,
}

impl Allocation {
    pub fn post_for(&self, vehicle: VehicleId) -> Option<PostId> {
        self.assignments
            .iter()
            .find(|assignment| assignment.vehicle == vehicle)
            .map(|assignment| assignment.post)
    }

    pub fn as_map(&self) -> BTreeMap<VehicleId, PostId> {
        self.assignments
            .iter()
            .map(|assignment| (assignment.vehicle, assignment.post))
            .collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.assignments.iter().map(|assignment| assignment.distance_km).collect()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.assignments.iter().map(|assignment| assignment.distance_km).sum()
    }

    pub fn allocated_count(&self) -> usize {
        self.assignments.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannerResult {
    pub strategy: Strategy,
    pub allocation: Allocation,
    /// Effective wait per admission; only the dynamic scheduler fills this.
    pub wait_times: Vec<f64>,
}

/// Inputs of one allocator call with distance tables resolved.
pub(crate) struct Instance<'a> {
    pub vehicles: &'a [ElectricVehicle],
    pub posts: &'a [ChargingPost],
    pub matcher: Matcher,
    /// `[vehicle][post]` destination→post distance in km.
    dest_km: Vec<Vec<f64>>,
    /// `[vehicle][post]` origin→post distance in km; empty unless requested.
    origin_km: Vec<Vec<f64>>,
}

impl<'a> Instance<'a> {
    pub fn new<M>(
        vehicles: &'a [ElectricVehicle],
        posts: &'a [ChargingPost],
        constraints: &ConstraintSet,
        matrix_provider: &M,
        with_origins: bool,
    ) -> Self
    where
        M: DistanceMatrixProvider + ?Sized,
    {
        let post_locations: Vec<Geolocation> = posts.iter().map(|post| post.location).collect();
        let destinations: Vec<Geolocation> = vehicles.iter().map(|ev| ev.destination).collect();
        let dest_km = distance_table(matrix_provider, &destinations, &post_locations);
        let origin_km = if with_origins {
            let origins: Vec<Geolocation> = vehicles.iter().map(|ev| ev.origin).collect();
            distance_table(matrix_provider, &origins, &post_locations)
        } else {
            Vec::new()
        };

        Self {
            vehicles,
            posts,
            matcher: Matcher::new(*constraints),
            dest_km,
            origin_km,
        }
    }

    pub fn distance(&self, vehicle: usize, post: usize) -> f64 {
        self.dest_km[vehicle][post]
    }

    pub fn origin_distance(&self, vehicle: usize, post: usize) -> f64 {
        self.origin_km[vehicle][post]
    }

    /// Predicate against the post's current status.
    pub fn matches_now(&self, vehicle: usize, post: usize, status: &StatusMap) -> bool {
        let target = &self.posts[post];
        self.matcher.admits(
            target,
            &self.vehicles[vehicle],
            status.current(target.id),
            self.distance(vehicle, post),
        )
    }

    /// Predicate against the post's status before the run started.
    pub fn matches_at_baseline(&self, vehicle: usize, post: usize, status: &StatusMap) -> bool {
        let target = &self.posts[post];
        self.matcher.admits(
            target,
            &self.vehicles[vehicle],
            status.baseline(target.id),
            self.distance(vehicle, post),
        )
    }

    /// Builds the allocation from `(vehicle, post)` index pairs in commitment order.
    pub fn allocation(&self, pairs: &[(usize, usize)]) -> Allocation {
        let mut allocated = vec![false; self.vehicles.len()];
        let mut assignments = Vec::with_capacity(pairs.len());
        for &(vehicle, post) in pairs {
            assert!(!allocated[vehicle], "{} allocated twice", self.vehicles[vehicle].id);
            allocated[vehicle] = true;
            assignments.push(Assignment {
                vehicle: self.vehicles[vehicle].id,
                post: self.posts[post].id,
                distance_km: self.distance(vehicle, post),
            });
        }

        let unallocated = self
            .vehicles
            .iter()
            .zip(allocated)
            .filter(|(_, allocated)| !allocated)
            .map(|(vehicle, _)| vehicle.id)
            .collect();

        Allocation {
            assignments,
            unallocated,
        }
    }
}

/// Ask the provider for a table, falling back to great-circle distances when
/// the provider returns something of the wrong shape.
fn distance_table<M>(provider: &M, from: &[Geolocation], to: &[Geolocation]) -> Vec<Vec<f64>>
where
    M: DistanceMatrixProvider + ?Sized,
{
    let table = provider.matrix_for(from, to);
    let well_formed = table.len() == from.len() && table.iter().all(|row| row.len() == to.len());
    if well_formed {
        return table;
    }

    warn!(
        rows = table.len(),
        expected_rows = from.len(),
        expected_cols = to.len(),
        "distance provider returned a malformed table, using great-circle distances"
    );
    HaversineMatrix.matrix_for(from, to)
}

/// Run one allocation strategy.
///
/// Commits go to `status`; the caller resets it before the next strategy.
/// Only [`Strategy::Optimal`] can fail, with [`PlannerError::NoOptimalSolution`].
pub fn solve<M>(
    strategy: Strategy,
    vehicles: &[ElectricVehicle],
    posts: &[ChargingPost],
    status: &mut StatusMap,
    constraints: &ConstraintSet,
    matrix_provider: &M,
    options: &SolveOptions,
) -> Result<PlannerResult, PlannerError>
where
    M: DistanceMatrixProvider + ?Sized,
{
    let instance = Instance::new(
        vehicles,
        posts,
        constraints,
        matrix_provider,
        strategy == Strategy::Dynamic,
    );
    let input_order: Vec<usize> = (0..vehicles.len()).collect();

    let (allocation, wait_times) = match strategy {
        Strategy::Random => {
            let mut rng = StdRng::seed_from_u64(options.seed);
            let pairs = random_pass(&instance, status, &mut rng);
            (instance.allocation(&pairs), Vec::new())
        }
        Strategy::Greedy => {
            let pairs = greedy_pass(&instance, status, &input_order);
            (instance.allocation(&pairs), Vec::new())
        }
        Strategy::LocalSearch => {
            let mut pairs = greedy_pass(&instance, status, &input_order);
            refine(&instance, status, &input_order, &mut pairs, options.local_search_passes);
            (instance.allocation(&pairs), Vec::new())
        }
        Strategy::Optimal => {
            let pairs = optimal::assign(&instance, status, options.unallocated_penalty)?;
            (instance.allocation(&pairs), Vec::new())
        }
        Strategy::Dynamic => {
            let schedule = dynamic::DynamicScheduler::new(&instance, options).run(status);
            let wait_times = schedule.wait_times();
            (schedule.allocation, wait_times)
        }
    };

    info!(
        strategy = %strategy,
        vehicles = vehicles.len(),
        posts = posts.len(),
        allocated = allocation.allocated_count(),
        unallocated = allocation.unallocated.len(),
        total_km = allocation.total_distance_km(),
        "allocation finished"
    );

    Ok(PlannerResult {
        strategy,
        allocation,
        wait_times,
    })
}

/// Random allocation: each vehicle in input order takes a uniformly drawn matching post.
pub(crate) fn random_pass<R: Rng + ?Sized>(
    instance: &Instance<'_>,
    status: &mut StatusMap,
    rng: &mut R,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for vehicle in 0..instance.vehicles.len() {
        let candidates: Vec<usize> = (0..instance.posts.len())
            .filter(|&post| instance.matches_now(vehicle, post, status))
            .collect();

        match candidates.choose(rng) {
            Some(&post) => {
                status.commit(instance.posts[post].id);
                pairs.push((vehicle, post));
            }
            None => debug!(vehicle = %instance.vehicles[vehicle].id, "no matching post"),
        }
    }
    pairs
}

/// Greedy allocation over `order`: each vehicle takes its nearest matching post.
pub(crate) fn greedy_pass(
    instance: &Instance<'_>,
    status: &mut StatusMap,
    order: &[usize],
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for &vehicle in order {
        match nearest_match(instance, status, vehicle) {
            Some(post) => {
                status.commit(instance.posts[post].id);
                pairs.push((vehicle, post));
            }
            None => debug!(vehicle = %instance.vehicles[vehicle].id, "no matching post"),
        }
    }
    pairs
}

/// Nearest matching post; ties go to the first post in input order.
fn nearest_match(instance: &Instance<'_>, status: &StatusMap, vehicle: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for post in 0..instance.posts.len() {
        if !instance.matches_now(vehicle, post, status) {
            continue;
        }
        let distance = instance.distance(vehicle, post);
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((post, distance));
        }
    }
    best.map(|(post, _)| post)
}

/// Pairwise-swap refinement of a completed assignment.
///
/// For every ordered pair of allocated vehicles `(i, j)` with `i` before `j`
/// in `order`, swap their posts if both still match under the baseline
/// statuses and the summed distance strictly drops; then move on to the next
/// `i`. The set of allocated vehicles and of occupied posts never changes.
/// Returns the number of swaps performed.
pub(crate) fn refine(
    instance: &Instance<'_>,
    status: &StatusMap,
    order: &[usize],
    pairs: &mut [(usize, usize)],
    passes: usize,
) -> usize {
    let mut assigned: Vec<Option<usize>> = vec![None; instance.vehicles.len()];
    for &(vehicle, post) in pairs.iter() {
        assigned[vehicle] = Some(post);
    }

    let mut swaps = 0;
    for pass in 0..passes {
        let mut swapped_this_pass = 0;

        for (position, &first) in order.iter().enumerate() {
            let Some(first_post) = assigned[first] else {
                continue;
            };

            for &second in &order[position + 1..] {
                let Some(second_post) = assigned[second] else {
                    continue;
                };

                let current = instance.distance(first, first_post) + instance.distance(second, second_post);
                let swapped = instance.distance(first, second_post) + instance.distance(second, first_post);

                if swapped < current
                    && instance.matches_at_baseline(first, second_post, status)
                    && instance.matches_at_baseline(second, first_post, status)
                {
                    assigned[first] = Some(second_post);
                    assigned[second] = Some(first_post);
                    swapped_this_pass += 1;
                    break;
                }
            }
        }

        debug!(pass, swaps = swapped_this_pass, "refinement pass");
        swaps += swapped_this_pass;
        // An unchanged pass would repeat identically.
        if swapped_this_pass == 0 {
            break;
        }
    }

    for (vehicle, post) in pairs.iter_mut() {
        if let Some(refined) = assigned[*vehicle] {
            *post = refined;
        }
    }
    swaps
}
