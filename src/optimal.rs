//! Minimum-total-distance assignment via integer programming.
//!
//! One binary variable per compatible (vehicle, post) pair; incompatible
//! pairs get no variable, which pins them to zero. Each vehicle takes
//! exactly one post (or at most one, when an unallocated penalty is set)
//! and each post takes at most one vehicle. Solving is delegated to
//! `good_lp`; this module only builds the model and reads the result.

use good_lp::{Expression, Solution, SolverModel, Variable, constraint, default_solver, variable, variables};
use tracing::{debug, warn};

use crate::error::PlannerError;
use crate::solver::Instance;
use crate::status::StatusMap;

/// Solve the assignment problem and commit the chosen posts to `status`.
///
/// Returns `(vehicle, post)` index pairs in vehicle input order. Never falls
/// back to a heuristic: any non-optimal outcome is
/// [`PlannerError::NoOptimalSolution`].
pub(crate) fn assign(
    instance: &Instance<'_>,
    status: &mut StatusMap,
    unallocated_penalty: Option<f64>,
) -> Result<Vec<(usize, usize)>, PlannerError> {
    let candidates = compatible_pairs(instance, status);

    if instance.vehicles.is_empty() {
        return Ok(Vec::new());
    }
    if unallocated_penalty.is_none() {
        let mut covered = vec![false; instance.vehicles.len()];
        for &(vehicle, _) in &candidates {
            covered[vehicle] = true;
        }
        if let Some(stranded) = covered.iter().position(|covered| !covered) {
            let reason = format!("{} has no compatible post", instance.vehicles[stranded].id);
            warn!(%reason, "optimal assignment infeasible");
            return Err(PlannerError::NoOptimalSolution(reason));
        }
    }
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let chosen = solve_model(instance, &candidates, unallocated_penalty)?;

    let mut pairs: Vec<(usize, usize)> = chosen.into_iter().map(|index| candidates[index]).collect();
    pairs.sort_unstable();
    for &(_, post) in &pairs {
        status.commit(instance.posts[post].id);
    }
    debug!(pairs = pairs.len(), variables = candidates.len(), "optimal assignment extracted");
    Ok(pairs)
}

/// All (vehicle, post) pairs matching under the current statuses, row-major.
fn compatible_pairs(instance: &Instance<'_>, status: &StatusMap) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for vehicle in 0..instance.vehicles.len() {
        for post in 0..instance.posts.len() {
            if instance.matches_now(vehicle, post, status) {
                pairs.push((vehicle, post));
            }
        }
    }
    pairs
}

/// Builds and solves the model; returns indices into `candidates` set to one.
fn solve_model(
    instance: &Instance<'_>,
    candidates: &[(usize, usize)],
    unallocated_penalty: Option<f64>,
) -> Result<Vec<usize>, PlannerError> {
    let mut vars = variables!();
    let xs: Vec<Variable> = candidates
        .iter()
        .map(|(vehicle, post)| vars.add(variable().binary().name(format!("x_{vehicle}_{post}"))))
        .collect();

    // The constant penalty × |fleet| is dropped; rewarding each placement by
    // the penalty is equivalent.
    let reward = unallocated_penalty.unwrap_or(0.0);
    let objective = candidates
        .iter()
        .zip(&xs)
        .fold(Expression::from(0.0), |acc, (&(vehicle, post), x)| {
            acc + (instance.distance(vehicle, post) - reward) * *x
        });

    let mut by_vehicle: Vec<Vec<usize>> = vec![Vec::new(); instance.vehicles.len()];
    let mut by_post: Vec<Vec<usize>> = vec![Vec::new(); instance.posts.len()];
    for (index, &(vehicle, post)) in candidates.iter().enumerate() {
        by_vehicle[vehicle].push(index);
        by_post[post].push(index);
    }

    let mut problem = vars.minimise(objective).using(default_solver);

    for group in by_vehicle.iter().filter(|group| !group.is_empty()) {
        let placed = sum_of(&xs, group);
        problem = if unallocated_penalty.is_some() {
            problem.with(constraint!(placed <= 1.0))
        } else {
            problem.with(constraint!(placed == 1.0))
        };
    }

    for group in by_post.iter().filter(|group| group.len() > 1) {
        let occupants = sum_of(&xs, group);
        problem = problem.with(constraint!(occupants <= 1.0));
    }

    let solution = problem.solve().map_err(|err| {
        warn!(error = %err, "optimal assignment failed");
        PlannerError::NoOptimalSolution(err.to_string())
    })?;

    Ok(xs
        .iter()
        .enumerate()
        .filter(|(_, x)| solution.value(**x) > 0.5)
        .map(|(index, _)| index)
        .collect())
}

fn sum_of(xs: &[Variable], indices: &[usize]) -> Expression {
    indices
        .iter()
        .fold(Expression::from(0.0), |acc, &index| acc + xs[index])
}
