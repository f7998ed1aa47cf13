//! Earliest-start-time forecast per (vehicle, post) pair.
//!
//! Dense row-major table. A cell is `None` when the pair is infeasible,
//! otherwise the minute at which the vehicle could start charging at the
//! post given the commitments made so far. Arrival times never change after
//! construction; start times only move forward.

use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct EstMatrix {
    posts: usize,
    arrival: Vec<f64>,
    est: Vec<Option<f64>>,
}

impl EstMatrix {
    /// Builds the matrix from per-pair arrival minutes.
    ///
    /// Pairs for which `feasible(vehicle, post)` is false start infeasible;
    /// the others start at their arrival time.
    pub fn new<F>(arrival: Vec<Vec<f64>>, posts: usize, feasible: F) -> Self
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        let vehicles = arrival.len();
        let arrival: Vec<f64> = arrival.into_iter().flatten().collect();
        assert_eq!(arrival.len(), vehicles * posts, "arrival table is not {vehicles}x{posts}");

        let mut est = vec![None; arrival.len()];
        if posts > 0 {
            est.par_chunks_mut(posts)
                .zip(arrival.par_chunks(posts))
                .enumerate()
                .for_each(|(vehicle, (row, arrivals))| {
                    for (post, (cell, &arrives)) in row.iter_mut().zip(arrivals).enumerate() {
                        if feasible(vehicle, post) {
                            *cell = Some(arrives);
                        }
                    }
                });
        }

        Self { posts, arrival, est }
    }

    pub fn vehicles(&self) -> usize {
        if self.posts == 0 { 0 } else { self.est.len() / self.posts }
    }

    pub fn est(&self, vehicle: usize, post: usize) -> Option<f64> {
        self.est[vehicle * self.posts + post]
    }

    pub fn arrival(&self, vehicle: usize, post: usize) -> f64 {
        self.arrival[vehicle * self.posts + post]
    }

    /// Minutes between arrival and forecast start, for feasible pairs.
    pub fn wait(&self, vehicle: usize, post: usize) -> Option<f64> {
        self.est(vehicle, post)
            .map(|start| start - self.arrival(vehicle, post))
    }

    pub fn is_feasible(&self, vehicle: usize, post: usize) -> bool {
        self.est(vehicle, post).is_some()
    }

    pub fn row(&self, vehicle: usize) -> &[Option<f64>] {
        &self.est[vehicle * self.posts..(vehicle + 1) * self.posts]
    }

    /// Drop every cell of `vehicle`; it can no longer be scheduled.
    pub fn retire_vehicle(&mut self, vehicle: usize) {
        let start = vehicle * self.posts;
        self.est[start..start + self.posts].fill(None);
    }

    /// Reserve `post` until `available_from`.
    ///
    /// Every feasible cell of `post` whose row is still `pending` is pushed to
    /// `max(available_from, arrival)`. Infeasible cells stay infeasible.
    pub fn occupy(&mut self, post: usize, available_from: f64, pending: &[bool]) {
        for (vehicle, _) in pending.iter().enumerate().filter(|(_, pending)| **pending) {
            let index = vehicle * self.posts + post;
            if self.est[index].is_some() {
                self.est[index] = Some(available_from.max(self.arrival[index]));
            }
        }
    }

    pub fn feasible_count(&self) -> usize {
        self.est.iter().filter(|cell| cell.is_some()).count()
    }
}
