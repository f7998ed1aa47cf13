//! Compatibility predicate between charging posts and vehicles.

use serde::{Deserialize, Serialize};

use crate::haversine::great_circle_km;
use crate::model::{ChargingPost, ElectricVehicle, PostStatus};
use crate::status::StatusMap;

/// Which constraints are enforced for a run. Post availability is always enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintSet {
    pub socket: bool,
    pub charger: bool,
    pub price: bool,
    /// Destination-to-post distance must not exceed the vehicle's detour budget.
    pub distance: bool,
    /// Dynamic scheduling only: waits must stay within the vehicle's tolerance.
    pub wait_time: bool,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            socket: false,
            charger: true,
            price: true,
            distance: false,
            wait_time: false,
        }
    }
}

impl ConstraintSet {
    pub fn with_socket(mut self) -> Self {
        self.socket = true;
        self
    }

    pub fn with_distance(mut self) -> Self {
        self.distance = true;
        self
    }

    pub fn with_wait_time(mut self) -> Self {
        self.wait_time = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    constraints: ConstraintSet,
}

impl Matcher {
    pub fn new(constraints: ConstraintSet) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    /// True if `post` can take `vehicle` given the post's current status in `status`.
    ///
    /// The distance constraint is checked against the great-circle distance.
    /// Allocators run with a custom [`DistanceMatrixProvider`] check it
    /// against that provider's table instead, so this can reject a pair such
    /// an allocator returned. Use [`Matcher::admits`] with the table distance
    /// to reproduce an allocator's decision.
    ///
    /// [`DistanceMatrixProvider`]: crate::traits::DistanceMatrixProvider
    pub fn matches(&self, post: &ChargingPost, vehicle: &ElectricVehicle, status: &StatusMap) -> bool {
        self.admits(
            post,
            vehicle,
            status.current(post.id),
            great_circle_km(vehicle.destination, post.location),
        )
    }

    /// Predicate with the post status and destination distance already resolved.
    ///
    /// Allocators call this with values from their distance table so the
    /// distance constraint and the objective agree.
    pub fn admits(
        &self,
        post: &ChargingPost,
        vehicle: &ElectricVehicle,
        post_status: PostStatus,
        distance_km: f64,
    ) -> bool {
        if post_status != PostStatus::Available {
            return false;
        }
        if self.constraints.charger && !post.charger.serves(vehicle.charger) {
            return false;
        }
        if self.constraints.socket && post.socket != vehicle.socket {
            return false;
        }
        if self.constraints.price && !(post.is_free() || vehicle.willing_to_pay) {
            return false;
        }
        if self.constraints.distance && distance_km > vehicle.max_detour_km {
            return false;
        }
        true
    }
}
