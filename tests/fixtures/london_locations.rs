//! Real London locations for realistic test fixtures.
//!
//! Coordinates of well-known landmarks and public car parks, taken from
//! OpenStreetMap. They all fall inside the generators' Greater London box.

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

// ============================================================================
// Central London (trip destinations)
// ============================================================================

pub const CENTRAL: &[Location] = &[
    Location::new("Trafalgar Square", 51.5080, -0.1281),
    Location::new("King's Cross", 51.5308, -0.1238),
    Location::new("Waterloo", 51.5031, -0.1132),
    Location::new("Tower of London", 51.5081, -0.0759),
    Location::new("British Museum", 51.5194, -0.1270),
    Location::new("Paddington", 51.5154, -0.1755),
    Location::new("London Bridge", 51.5050, -0.0865),
    Location::new("Victoria", 51.4952, -0.1441),
];

// ============================================================================
// Charging sites (supermarket and public car parks)
// ============================================================================

pub const CHARGING_SITES: &[Location] = &[
    Location::new("Brewer Street Car Park", 51.5114, -0.1360),
    Location::new("Q-Park Oxford Street", 51.5146, -0.1540),
    Location::new("Southbank Centre Car Park", 51.5058, -0.1160),
    Location::new("Tower Hill Coach Park", 51.5098, -0.0766),
    Location::new("Bloomsbury Square Car Park", 51.5189, -0.1228),
    Location::new("Paddington Central", 51.5188, -0.1790),
    Location::new("Canary Wharf Car Park", 51.5050, -0.0200),
    Location::new("Battersea Power Station", 51.4817, -0.1443),
    Location::new("Westfield Stratford", 51.5432, -0.0067),
    Location::new("Westfield White City", 51.5072, -0.2213),
];

// ============================================================================
// Outer London (trip origins)
// ============================================================================

pub const OUTER: &[Location] = &[
    Location::new("Wimbledon", 51.4214, -0.2064),
    Location::new("Croydon", 51.3762, -0.0982),
    Location::new("Ealing Broadway", 51.5149, -0.3017),
    Location::new("Walthamstow", 51.5830, -0.0199),
    Location::new("Greenwich", 51.4826, -0.0077),
    Location::new("Hampstead", 51.5567, -0.1780),
];

/// Returns all locations as a single slice.
pub fn all_locations() -> Vec<Location> {
    let mut all = Vec::with_capacity(CENTRAL.len() + CHARGING_SITES.len() + OUTER.len());
    all.extend_from_slice(CENTRAL);
    all.extend_from_slice(CHARGING_SITES);
    all.extend_from_slice(OUTER);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_london_area() {
        for loc in all_locations() {
            assert!(loc.lat > 51.25 && loc.lat < 51.70, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(loc.lng > -0.50 && loc.lng < 0.25, "{} lng out of range: {}", loc.name, loc.lng);
        }
    }
}
