//! Great-circle distances and the travel-time model.
//!
//! Distances ignore roads; travel time assumes a constant average speed.

use rayon::prelude::*;

use crate::model::Geolocation;
use crate::traits::DistanceMatrixProvider;

/// Average driving speed assumption for travel time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn great_circle_km(from: Geolocation, to: Geolocation) -> f64 {
    if from == to {
        return 0.0;
    }

    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Constant-speed travel model.
#[derive(Debug, Clone, Copy)]
pub struct TravelModel {
    pub speed_kmh: f64,
}

impl Default for TravelModel {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl TravelModel {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Convert a distance in km to travel time in minutes.
    pub fn km_to_minutes(&self, km: f64) -> f64 {
        km / self.speed_kmh * 60.0
    }
}

/// Haversine-based distance table provider.
///
/// Rows are computed in parallel; each cell is a pure function of its
/// endpoints so the result does not depend on scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineMatrix;

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, from: &[Geolocation], to: &[Geolocation]) -> Vec<Vec<f64>> {
        from.par_iter()
            .map(|origin| to.iter().map(|target| great_circle_km(*origin, *target)).collect())
            .collect()
    }
}
