//! Seams between the allocation core and its collaborators.
//!
//! The core only needs distances and, optionally, postcodes. Both are
//! supplied through these traits so alternative metrics or geocoders can be
//! plugged in without touching the allocators.

use crate::error::PlannerError;
use crate::model::Geolocation;

/// Provides a distance table (kilometres) between two sets of locations.
///
/// The table is indexed `[from][to]` in the order of the provided slices.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, from: &[Geolocation], to: &[Geolocation]) -> Vec<Vec<f64>>;
}

/// Reverse geocoding of coordinates to postal codes.
pub trait PostcodeLookup {
    /// Full postcode nearest to `location`, if the service knows one.
    fn postcode_for(&self, location: Geolocation) -> Result<Option<String>, PlannerError>;

    /// Outward area letters (e.g. "SW", "E") of the district containing `location`.
    fn outward_area_for(&self, location: Geolocation) -> Result<Option<String>, PlannerError>;
}
