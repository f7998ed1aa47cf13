//! Test fixtures for charge-planner.
//!
//! Provides realistic test data including:
//! - Real London locations (from OpenStreetMap)
//! - Builders for vehicles and posts with permissive defaults
//! - A planar distance matrix with predictable values

#![allow(dead_code)]

pub mod london_locations;

pub use london_locations::*;

use charge_planner::model::{
    ChargerType, ChargingPost, ElectricVehicle, Geolocation, PostId, PostStatus, SocketType, VehicleId,
};
use charge_planner::traits::DistanceMatrixProvider;

/// Builder for test vehicles. Defaults: Type 2 / fast, half charged,
/// willing to pay, 3 km detour budget, 10 minute wait tolerance.
#[derive(Clone, Debug)]
pub struct TestVehicle(ElectricVehicle);

impl TestVehicle {
    pub fn new(id: usize) -> Self {
        let here = Geolocation::new(51.5080, -0.1281);
        Self(ElectricVehicle {
            id: VehicleId(id),
            origin: here,
            destination: here,
            socket: SocketType::Type2,
            charger: ChargerType::Fast,
            battery_level: 50,
            max_detour_km: 3.0,
            willing_to_pay: true,
            wait_tolerance_minutes: 10.0,
            model: "NISSAN_LEAF".to_string(),
        })
    }

    /// Origin and destination both at `location`.
    pub fn at(mut self, location: &Location) -> Self {
        self.0.origin = geolocation(location);
        self.0.destination = self.0.origin;
        self
    }

    pub fn departs(mut self, location: &Location) -> Self {
        self.0.origin = geolocation(location);
        self
    }

    pub fn heading_to(mut self, location: &Location) -> Self {
        self.0.destination = geolocation(location);
        self
    }

    pub fn coords(mut self, lat: f64, lng: f64) -> Self {
        self.0.origin = Geolocation::new(lat, lng);
        self.0.destination = self.0.origin;
        self
    }

    pub fn needs(mut self, socket: SocketType, charger: ChargerType) -> Self {
        self.0.socket = socket;
        self.0.charger = charger;
        self
    }

    pub fn battery(mut self, level: u8) -> Self {
        self.0.battery_level = level;
        self
    }

    pub fn detour_km(mut self, km: f64) -> Self {
        self.0.max_detour_km = km;
        self
    }

    pub fn wait_tolerance(mut self, minutes: f64) -> Self {
        self.0.wait_tolerance_minutes = minutes;
        self
    }

    pub fn unwilling_to_pay(mut self) -> Self {
        self.0.willing_to_pay = false;
        self
    }

    pub fn build(self) -> ElectricVehicle {
        self.0
    }
}

/// Builder for test posts. Defaults: Type 2 / fast, free, available.
#[derive(Clone, Debug)]
pub struct TestPost(ChargingPost);

impl TestPost {
    pub fn new(id: usize) -> Self {
        Self(ChargingPost::new(
            PostId(id),
            Geolocation::new(51.5114, -0.1360),
            SocketType::Type2,
            ChargerType::Fast,
        ))
    }

    pub fn at(mut self, location: &Location) -> Self {
        self.0.location = geolocation(location);
        self
    }

    pub fn coords(mut self, lat: f64, lng: f64) -> Self {
        self.0.location = Geolocation::new(lat, lng);
        self
    }

    pub fn offers(mut self, socket: SocketType, charger: ChargerType) -> Self {
        self.0.socket = socket;
        self.0.charger = charger;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.0.price = price;
        self
    }

    pub fn status(mut self, status: PostStatus) -> Self {
        self.0.status = status;
        self
    }

    pub fn build(self) -> ChargingPost {
        self.0
    }
}

/// Euclidean distance on raw coordinates, one unit per kilometre.
///
/// Keeps expected distances readable in tests: a vehicle at (0, 3) is
/// exactly 3 km from a post at (0, 0).
pub struct PlanarMatrix;

impl DistanceMatrixProvider for PlanarMatrix {
    fn matrix_for(&self, from: &[Geolocation], to: &[Geolocation]) -> Vec<Vec<f64>> {
        from.iter()
            .map(|a| {
                to.iter()
                    .map(|b| (a.latitude - b.latitude).hypot(a.longitude - b.longitude))
                    .collect()
            })
            .collect()
    }
}

fn geolocation(location: &Location) -> Geolocation {
    let (lat, lng) = location.coords();
    Geolocation::new(lat, lng)
}

pub fn location_named(name: &str) -> Location {
    all_locations()
        .into_iter()
        .find(|loc| loc.name == name)
        .unwrap_or_else(|| panic!("no fixture location named {name}"))
}
