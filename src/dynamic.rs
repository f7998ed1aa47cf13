//! Online scheduling over an evolving earliest-start-time forecast.
//!
//! The scheduler moves through four states:
//!
//! - `Initializing`: orders vehicles by ascending wait tolerance and builds
//!   the [`EstMatrix`] from arrival times of statically matching pairs.
//! - `Seeding`: commits a greedy assignment refined by pairwise swaps.
//! - `Admitting`: repeatedly commits the pending pair with the smallest
//!   forecast start (then distance, then input order).
//! - `Terminal`: no feasible pair remains; pending vehicles are unallocated.
//!
//! Each commitment reserves its post until the vehicle finishes charging:
//! every other pending vehicle compatible with that post has its forecast
//! pushed to `max(completion, own arrival)`. A post can therefore serve
//! several vehicles one after another, never two at once.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::est::EstMatrix;
use crate::haversine::TravelModel;
use crate::matcher::ConstraintSet;
use crate::model::{ChargingPost, ElectricVehicle, PostId, VehicleId};
use crate::solver::{self, Allocation, Instance, SolveOptions};
use crate::status::StatusMap;
use crate::traits::DistanceMatrixProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Initializing,
    Seeding,
    Admitting,
    Terminal,
}

/// One committed charging slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admission {
    pub vehicle: VehicleId,
    pub post: PostId,
    /// Forecast start of charging, in minutes.
    pub start_minutes: f64,
    /// Minutes between arrival at the post and the start of charging.
    pub wait_minutes: f64,
    /// Whether the slot came from the greedy seed rather than the admission loop.
    pub seeded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub allocation: Allocation,
    pub admissions: Vec<Admission>,
}

impl Schedule {
    pub fn wait_times(&self) -> Vec<f64> {
        self.admissions.iter().map(|admission| admission.wait_minutes).collect()
    }
}

/// Run the dynamic scheduler on its own.
///
/// Equivalent to [`solver::solve`] with [`solver::Strategy::Dynamic`], but
/// returns the full admission records.
pub fn schedule<M>(
    vehicles: &[ElectricVehicle],
    posts: &[ChargingPost],
    status: &mut StatusMap,
    constraints: &ConstraintSet,
    matrix_provider: &M,
    options: &SolveOptions,
) -> Schedule
where
    M: DistanceMatrixProvider + ?Sized,
{
    let instance = Instance::new(vehicles, posts, constraints, matrix_provider, true);
    DynamicScheduler::new(&instance, options).run(status)
}

/// A feasible pair considered for admission.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    vehicle: usize,
    post: usize,
    start: f64,
    distance: f64,
}

impl Candidate {
    /// Smallest start, then smallest distance, then input order.
    fn precedence(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then(self.distance.total_cmp(&other.distance))
            .then(self.vehicle.cmp(&other.vehicle))
            .then(self.post.cmp(&other.post))
    }
}

pub(crate) struct DynamicScheduler<'i, 'a> {
    instance: &'i Instance<'a>,
    travel: TravelModel,
    request_time: f64,
    passes: usize,
    state: SchedulerState,
    /// Vehicle indices by ascending wait tolerance (stable).
    order: Vec<usize>,
    est: Option<EstMatrix>,
    pending: Vec<bool>,
    pairs: Vec<(usize, usize)>,
    admissions: Vec<Admission>,
}

impl<'i, 'a> DynamicScheduler<'i, 'a> {
    pub fn new(instance: &'i Instance<'a>, options: &SolveOptions) -> Self {
        Self {
            instance,
            travel: TravelModel::new(options.speed_kmh),
            request_time: options.request_time_minutes,
            passes: options.local_search_passes,
            state: SchedulerState::Initializing,
            order: Vec::new(),
            est: None,
            pending: vec![true; instance.vehicles.len()],
            pairs: Vec::new(),
            admissions: Vec::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn est(&self) -> Option<&EstMatrix> {
        self.est.as_ref()
    }

    pub fn run(mut self, status: &mut StatusMap) -> Schedule {
        while self.state() != SchedulerState::Terminal {
            self.step(status);
        }
        self.finish()
    }

    /// Advance by one transition (one admission while `Admitting`).
    pub fn step(&mut self, status: &mut StatusMap) {
        self.state = match self.state {
            SchedulerState::Initializing => {
                self.initialise(status);
                SchedulerState::Seeding
            }
            SchedulerState::Seeding => {
                self.seed(status);
                SchedulerState::Admitting
            }
            SchedulerState::Admitting => {
                if self.admit_next(status) {
                    SchedulerState::Admitting
                } else {
                    SchedulerState::Terminal
                }
            }
            SchedulerState::Terminal => SchedulerState::Terminal,
        };
    }

    pub fn finish(self) -> Schedule {
        let allocation = self.instance.allocation(&self.pairs);
        info!(
            admitted = self.admissions.len(),
            feasible_cells = self.est().map_or(0, EstMatrix::feasible_count),
            seeded = self.admissions.iter().filter(|admission| admission.seeded).count(),
            unallocated = allocation.unallocated.len(),
            "dynamic schedule finished"
        );
        Schedule {
            allocation,
            admissions: self.admissions,
        }
    }

    fn initialise(&mut self, status: &StatusMap) {
        let instance = self.instance;
        let vehicles = instance.vehicles;

        self.order = (0..vehicles.len()).collect();
        self.order.sort_by(|&a, &b| {
            vehicles[a]
                .wait_tolerance_minutes
                .total_cmp(&vehicles[b].wait_tolerance_minutes)
        });

        let arrival: Vec<Vec<f64>> = (0..vehicles.len())
            .map(|vehicle| {
                (0..instance.posts.len())
                    .map(|post| {
                        self.request_time
                            + self.travel.km_to_minutes(instance.origin_distance(vehicle, post))
                    })
                    .collect()
            })
            .collect();

        let est = EstMatrix::new(arrival, instance.posts.len(), |vehicle, post| {
            instance.matches_now(vehicle, post, status)
        });
        debug!(feasible = est.feasible_count(), "EST matrix initialised");
        self.est = Some(est);
    }

    fn seed(&mut self, status: &mut StatusMap) {
        let mut seeded = solver::greedy_pass(self.instance, status, &self.order);
        solver::refine(self.instance, status, &self.order, &mut seeded, self.passes);

        // Seeded vehicles leave the pending set before any reservation so
        // that only vehicles still waiting for a slot are postponed.
        for &(vehicle, _) in &seeded {
            self.pending[vehicle] = false;
        }
        for (vehicle, post) in seeded {
            self.commit(vehicle, post, true);
        }
    }

    /// Admit the best pending pair. Returns false when none is eligible.
    fn admit_next(&mut self, status: &mut StatusMap) -> bool {
        let Some(candidate) = self.best_candidate() else {
            return false;
        };

        assert!(
            self.pending[candidate.vehicle],
            "{} admitted twice",
            self.instance.vehicles[candidate.vehicle].id
        );
        self.pending[candidate.vehicle] = false;

        let post_id = self.instance.posts[candidate.post].id;
        if status.is_available(post_id) {
            status.commit(post_id);
        }
        self.commit(candidate.vehicle, candidate.post, false);
        true
    }

    fn best_candidate(&self) -> Option<Candidate> {
        let est = self.est.as_ref()?;
        let instance = self.instance;
        let pending = &self.pending;
        let enforce_wait = instance.matcher.constraints().wait_time;

        (0..instance.vehicles.len())
            .into_par_iter()
            .filter(|&vehicle| pending[vehicle])
            .filter_map(|vehicle| {
                let tolerance = instance.vehicles[vehicle].wait_tolerance_minutes;
                est.row(vehicle)
                    .iter()
                    .enumerate()
                    .filter_map(|(post, cell)| {
                        let start = (*cell)?;
                        let wait = start - est.arrival(vehicle, post);
                        if enforce_wait && wait > tolerance {
                            return None;
                        }
                        Some(Candidate {
                            vehicle,
                            post,
                            start,
                            distance: instance.distance(vehicle, post),
                        })
                    })
                    .min_by(Candidate::precedence)
            })
            .min_by(Candidate::precedence)
    }

    /// Record `(vehicle, post)` and reserve the post for the rest of the pending fleet.
    fn commit(&mut self, vehicle: usize, post: usize, seeded: bool) {
        let charge_minutes = self.instance.vehicles[vehicle].time_to_charge_minutes();
        let Some(est) = self.est.as_mut() else {
            return;
        };

        let arrival = est.arrival(vehicle, post);
        let start = est.est(vehicle, post).unwrap_or(arrival);
        let completion = start + charge_minutes;

        est.occupy(post, completion, &self.pending);
        est.retire_vehicle(vehicle);

        let admission = Admission {
            vehicle: self.instance.vehicles[vehicle].id,
            post: self.instance.posts[post].id,
            start_minutes: start,
            wait_minutes: start - arrival,
            seeded,
        };
        debug!(
            vehicle = %admission.vehicle,
            post = %admission.post,
            start = admission.start_minutes,
            wait = admission.wait_minutes,
            seeded,
            "slot committed"
        );
        self.pairs.push((vehicle, post));
        self.admissions.push(admission);
    }
}
