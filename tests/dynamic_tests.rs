//! Dynamic scheduler tests
//!
//! Queueing on shared posts, wait-time eligibility, ordering and
//! reproducibility. Most scenarios use the planar matrix so that a vehicle
//! `n` units from a post arrives after exactly `1.2 × n` minutes at 50 km/h.

mod fixtures;

use std::collections::BTreeMap;

use charge_planner::dynamic::{Schedule, schedule};
use charge_planner::generator::{FleetGenerator, PostGenerator};
use charge_planner::haversine::HaversineMatrix;
use charge_planner::matcher::{ConstraintSet, Matcher};
use charge_planner::model::{ChargerType, PostId, PostStatus, SocketType, VehicleId};
use charge_planner::solver::{SolveOptions, Strategy, solve};
use charge_planner::status::StatusMap;

use fixtures::{Location, PlanarMatrix, TestPost, TestVehicle};

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
}

/// One post at the origin and three half-charged fast vehicles 1, 2 and 3
/// units away. The farthest-but-least-patient vehicle is considered first.
fn one_post_three_vehicles() -> (Vec<charge_planner::ElectricVehicle>, Vec<charge_planner::ChargingPost>) {
    let posts = vec![TestPost::new(0).coords(0.0, 0.0).build()];
    let vehicles = vec![
        TestVehicle::new(0).coords(0.0, 1.0).wait_tolerance(500.0).build(),
        TestVehicle::new(1).coords(0.0, 2.0).wait_tolerance(0.0).build(),
        TestVehicle::new(2).coords(0.0, 3.0).wait_tolerance(10.0).build(),
    ];
    (vehicles, posts)
}

fn run_planar(
    vehicles: &[charge_planner::ElectricVehicle],
    posts: &[charge_planner::ChargingPost],
    constraints: &ConstraintSet,
    options: &SolveOptions,
) -> (Schedule, StatusMap) {
    let mut status = StatusMap::snapshot(posts);
    let schedule = schedule(vehicles, posts, &mut status, constraints, &PlanarMatrix, options);
    (schedule, status)
}

#[test]
fn test_vehicles_queue_on_a_shared_post() {
    let (vehicles, posts) = one_post_three_vehicles();
    let (schedule, status) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &SolveOptions::default());

    let order: Vec<VehicleId> = schedule.admissions.iter().map(|admission| admission.vehicle).collect();
    assert_eq!(order, vec![VehicleId(1), VehicleId(0), VehicleId(2)]);
    assert!(schedule.admissions[0].seeded);
    assert!(!schedule.admissions[1].seeded && !schedule.admissions[2].seeded);

    // Half a 5 h charge = 150 minutes per vehicle.
    assert_close(schedule.admissions[0].start_minutes, 2.4);
    assert_close(schedule.admissions[0].wait_minutes, 0.0);
    assert_close(schedule.admissions[1].start_minutes, 152.4);
    assert_close(schedule.admissions[1].wait_minutes, 151.2);
    assert_close(schedule.admissions[2].start_minutes, 302.4);
    assert_close(schedule.admissions[2].wait_minutes, 298.8);

    assert!(schedule.allocation.unallocated.is_empty());
    assert_eq!(status.occupied(), vec![PostId(0)]);
    assert_eq!(schedule.wait_times().len(), 3);
}

#[test]
fn test_wait_time_constraint_excludes_impatient_vehicles() {
    let (vehicles, posts) = one_post_three_vehicles();
    let constraints = ConstraintSet::default().with_wait_time();
    let (schedule, _) = run_planar(&vehicles, &posts, &constraints, &SolveOptions::default());

    let admitted: Vec<VehicleId> = schedule.admissions.iter().map(|admission| admission.vehicle).collect();
    assert_eq!(admitted, vec![VehicleId(1), VehicleId(0)]);
    assert_eq!(schedule.allocation.unallocated, vec![VehicleId(2)]);
    for (admission, vehicle) in schedule.admissions.iter().map(|a| (a, &vehicles[a.vehicle.0])) {
        assert!(admission.wait_minutes <= vehicle.wait_tolerance_minutes + EPS);
    }
}

#[test]
fn test_equal_start_prefers_shorter_distance() {
    // Both queued vehicles become startable when the seeded one finishes;
    // the one whose destination is nearer the post goes first even though it
    // comes later in input order.
    let posts = vec![TestPost::new(0).coords(0.0, 0.0).build()];
    let vehicles = vec![
        TestVehicle::new(0).coords(0.0, 0.5).wait_tolerance(0.0).build(),
        TestVehicle::new(1).coords(0.0, 4.0).wait_tolerance(30.0).build(),
        TestVehicle::new(2).coords(0.0, 2.0).wait_tolerance(30.0).build(),
    ];
    let (schedule, _) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &SolveOptions::default());

    let order: Vec<VehicleId> = schedule.admissions.iter().map(|admission| admission.vehicle).collect();
    assert_eq!(order, vec![VehicleId(0), VehicleId(2), VehicleId(1)]);
}

#[test]
fn test_start_uses_origin_and_distance_uses_destination() {
    let posts = vec![TestPost::new(0).coords(0.0, 0.0).build()];
    let vehicles = vec![
        // Drives 10 km to reach the post, then it is on the doorstep of the destination.
        TestVehicle::new(0)
            .departs(&Location::new("depot", 0.0, 10.0))
            .heading_to(&Location::new("office", 0.0, 0.0))
            .wait_tolerance(0.0)
            .build(),
        // Starts on the post but its destination is beyond the 3 km detour budget.
        TestVehicle::new(1)
            .departs(&Location::new("forecourt", 0.0, 0.0))
            .heading_to(&Location::new("suburb", 0.0, 5.0))
            .build(),
        TestVehicle::new(2)
            .departs(&Location::new("flat", 0.0, 1.0))
            .heading_to(&Location::new("shop", 0.0, 2.0))
            .wait_tolerance(500.0)
            .build(),
    ];
    let constraints = ConstraintSet::default().with_distance();
    let (schedule, _) = run_planar(&vehicles, &posts, &constraints, &SolveOptions::default());

    assert_eq!(schedule.allocation.unallocated, vec![VehicleId(1)]);

    let seeded = &schedule.admissions[0];
    assert_eq!(seeded.vehicle, VehicleId(0));
    assert!(seeded.seeded);
    assert_close(seeded.start_minutes, 12.0);
    assert_close(seeded.wait_minutes, 0.0);

    // 150 minutes of charging after the seeded start at 12.
    let queued = &schedule.admissions[1];
    assert_eq!(queued.vehicle, VehicleId(2));
    assert_close(queued.start_minutes, 162.0);
    assert_close(queued.wait_minutes, 160.8);

    let distances: Vec<(VehicleId, f64)> = schedule
        .allocation
        .assignments
        .iter()
        .map(|assignment| (assignment.vehicle, assignment.distance_km))
        .collect();
    assert_eq!(distances, vec![(VehicleId(0), 0.0), (VehicleId(2), 2.0)]);
}

#[test]
fn test_incompatible_vehicle_is_unallocated_without_error() {
    let posts = vec![TestPost::new(0).coords(0.0, 0.0).build()];
    let vehicles = vec![
        TestVehicle::new(0).coords(0.0, 1.0).build(),
        TestVehicle::new(1)
            .coords(0.0, 1.0)
            .needs(SocketType::Chademo, ChargerType::Rapid)
            .build(),
    ];
    let (schedule, _) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &SolveOptions::default());

    assert_eq!(schedule.allocation.post_for(VehicleId(0)), Some(PostId(0)));
    assert_eq!(schedule.allocation.unallocated, vec![VehicleId(1)]);
}

#[test]
fn test_out_of_order_posts_never_scheduled() {
    let posts = vec![
        TestPost::new(0).coords(0.0, 0.0).status(PostStatus::OutOfOrder).build(),
        TestPost::new(1).coords(0.0, 5.0).build(),
    ];
    let vehicles = vec![
        TestVehicle::new(0).coords(0.0, 0.0).build(),
        TestVehicle::new(1).coords(0.0, 0.0).build(),
    ];
    let (schedule, status) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &SolveOptions::default());

    assert!(schedule.admissions.iter().all(|admission| admission.post == PostId(1)));
    assert_eq!(schedule.allocation.allocated_count(), 2);
    assert_eq!(status.current(PostId(0)), PostStatus::OutOfOrder);
}

#[test]
fn test_request_time_shifts_starts_not_waits() {
    let (vehicles, posts) = one_post_three_vehicles();
    let later = SolveOptions {
        request_time_minutes: 30.0,
        ..SolveOptions::default()
    };

    let (now, _) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &SolveOptions::default());
    let (shifted, _) = run_planar(&vehicles, &posts, &ConstraintSet::default(), &later);

    assert_eq!(now.allocation, shifted.allocation);
    for (a, b) in now.admissions.iter().zip(&shifted.admissions) {
        assert_close(b.start_minutes, a.start_minutes + 30.0);
        assert_close(b.wait_minutes, a.wait_minutes);
    }
}

#[test]
fn test_generated_schedule_respects_slots_and_compatibility() {
    let vehicles = FleetGenerator::new(31).generate(80);
    let posts = PostGenerator::new(32).generate(15);
    let constraints = ConstraintSet::default();
    let matcher = Matcher::new(constraints);
    let mut status = StatusMap::snapshot(&posts);

    let schedule = schedule(
        &vehicles,
        &posts,
        &mut status,
        &constraints,
        &HaversineMatrix,
        &SolveOptions::default(),
    );

    let mut slots: BTreeMap<PostId, Vec<(f64, f64)>> = BTreeMap::new();
    for admission in &schedule.admissions {
        let vehicle = &vehicles[admission.vehicle.0];
        let post = &posts[admission.post.0];
        assert!(
            matcher.matches(post, vehicle, &StatusMap::snapshot(&posts)),
            "{} cannot use {}",
            vehicle.id,
            post.id
        );
        assert!(admission.wait_minutes >= -EPS);
        slots
            .entry(post.id)
            .or_default()
            .push((admission.start_minutes, admission.start_minutes + vehicle.time_to_charge_minutes()));
    }

    for (post, mut slots) in slots {
        slots.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in slots.windows(2) {
            assert!(pair[1].0 >= pair[0].1 - 1e-6, "{post}: overlapping slots {pair:?}");
        }
    }

    assert_eq!(
        schedule.allocation.allocated_count() + schedule.allocation.unallocated.len(),
        vehicles.len()
    );
}

#[test]
fn test_schedule_is_reproducible() {
    let vehicles = FleetGenerator::new(41).generate(40);
    let posts = PostGenerator::new(42).generate(10);

    let runs: Vec<Schedule> = (0..2)
        .map(|_| {
            let mut status = StatusMap::snapshot(&posts);
            schedule(
                &vehicles,
                &posts,
                &mut status,
                &ConstraintSet::default(),
                &HaversineMatrix,
                &SolveOptions::default(),
            )
        })
        .collect();

    assert_eq!(runs[0], runs[1]);
}

#[test]
fn test_solve_dispatch_reports_wait_times() {
    let (vehicles, posts) = one_post_three_vehicles();
    let mut status = StatusMap::snapshot(&posts);

    let result = solve(
        Strategy::Dynamic,
        &vehicles,
        &posts,
        &mut status,
        &ConstraintSet::default(),
        &PlanarMatrix,
        &SolveOptions::default(),
    )
    .unwrap();

    assert_eq!(result.strategy, Strategy::Dynamic);
    assert_eq!(result.wait_times.len(), result.allocation.allocated_count());
    assert_close(result.wait_times[0], 0.0);
    assert_close(result.wait_times[2], 298.8);
}
