//! Seeded synthetic fleets and post inventories.
//!
//! Draws follow the London charging survey figures: socket and charger
//! mixes, battery bands, detour budgets and wait tolerances. A generator
//! numbers its output from zero; build a fresh one to restart numbering.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::model::{
    ChargerType, ChargingPost, ElectricVehicle, Geolocation, PostId, PostStatus, SocketType, VehicleId,
    detour_minutes_to_km,
};

/// Rectangular sampling area: `min + U[0, span)` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub latitude_span: f64,
    pub min_longitude: f64,
    pub longitude_span: f64,
}

impl BoundingBox {
    /// Inner London, where trips start and end.
    pub const LONDON_FLEET: BoundingBox = BoundingBox {
        min_latitude: 51.41,
        latitude_span: 0.23,
        min_longitude: -0.29,
        longitude_span: 0.34,
    };

    /// Greater London, where posts are placed.
    pub const LONDON_POSTS: BoundingBox = BoundingBox {
        min_latitude: 51.25,
        latitude_span: 0.45,
        min_longitude: -0.50,
        longitude_span: 0.75,
    };

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Geolocation {
        Geolocation::new(
            self.min_latitude + rng.gen_range(0.0..1.0) * self.latitude_span,
            self.min_longitude + rng.gen_range(0.0..1.0) * self.longitude_span,
        )
    }

    pub fn contains(&self, location: Geolocation) -> bool {
        (self.min_latitude..=self.min_latitude + self.latitude_span).contains(&location.latitude)
            && (self.min_longitude..=self.min_longitude + self.longitude_span).contains(&location.longitude)
    }
}

/// Cumulative percentage bands; the last value covers the remainder.
fn banded<R: Rng + ?Sized, T: Copy>(rng: &mut R, bands: &[(f64, T)], rest: T) -> T {
    let draw = rng.gen_range(0.0..100.0);
    let mut upper = 0.0;
    for &(share, value) in bands {
        upper += share;
        if draw < upper {
            return value;
        }
    }
    rest
}

const SOCKET_MIX: [(f64, SocketType); 5] = [
    (30.0, SocketType::Type1),
    (59.46, SocketType::Type2),
    (1.69, SocketType::ThreePinSquare),
    (3.64, SocketType::DcComboType2),
    (3.77, SocketType::Chademo),
];

const CHARGER_MIX: [(f64, ChargerType); 2] = [(29.76, ChargerType::Slow), (67.85, ChargerType::Fast)];

/// Battery percentage bands as (share, lowest, highest).
const BATTERY_BANDS: [(f64, (u8, u8)); 4] = [(9.66, (1, 5)), (46.21, (6, 25)), (29.66, (26, 50)), (6.90, (51, 75))];

const DETOUR_MINUTES: [(f64, f64); 2] = [(29.56, 5.0), (60.0, 15.0)];

/// Tolerances in minutes; anything past half an hour is modelled as 500.
const WAIT_TOLERANCE: [(f64, f64); 5] = [(7.56, 0.0), (23.53, 5.0), (32.77, 10.0), (12.61, 15.0), (5.88, 30.0)];

const CAR_MODELS: [&str; 10] = [
    "NISSAN_LEAF",
    "TESLA_MODEL_3",
    "TESLA_MODEL_S",
    "RENAULT_ZOE",
    "BMW_I3",
    "KIA_E_NIRO",
    "HYUNDAI_KONA",
    "JAGUAR_I_PACE",
    "VW_E_GOLF",
    "MG_ZS_EV",
];

pub fn random_socket<R: Rng + ?Sized>(rng: &mut R) -> SocketType {
    banded(rng, &SOCKET_MIX, SocketType::Ccs)
}

pub fn random_charger<R: Rng + ?Sized>(rng: &mut R) -> ChargerType {
    banded(rng, &CHARGER_MIX, ChargerType::Rapid)
}

pub fn random_battery_level<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let (low, high) = banded(rng, &BATTERY_BANDS, (75, 79));
    rng.gen_range(low..=high)
}

pub fn random_detour_km<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    detour_minutes_to_km(banded(rng, &DETOUR_MINUTES, 30.0))
}

pub fn random_wait_tolerance<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    banded(rng, &WAIT_TOLERANCE, 500.0)
}

#[derive(Debug, Clone)]
pub struct FleetGenerator {
    rng: StdRng,
    next_id: usize,
    bounds: BoundingBox,
    willing_to_pay_percent: f64,
}

impl FleetGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            bounds: BoundingBox::LONDON_FLEET,
            willing_to_pay_percent: 50.0,
        }
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Share of drivers, in percent, prepared to use a paid post.
    pub fn with_willing_to_pay_percent(mut self, percent: f64) -> Self {
        self.willing_to_pay_percent = percent.clamp(0.0, 100.0);
        self
    }

    pub fn next_vehicle(&mut self) -> ElectricVehicle {
        let rng = &mut self.rng;
        let vehicle = ElectricVehicle {
            id: VehicleId(self.next_id),
            origin: self.bounds.sample(rng),
            destination: self.bounds.sample(rng),
            socket: random_socket(rng),
            charger: random_charger(rng),
            battery_level: random_battery_level(rng),
            max_detour_km: random_detour_km(rng),
            willing_to_pay: rng.gen_range(0.0..100.0) < self.willing_to_pay_percent,
            wait_tolerance_minutes: random_wait_tolerance(rng),
            model: CAR_MODELS[rng.gen_range(0..CAR_MODELS.len())].to_string(),
        };
        self.next_id += 1;
        vehicle
    }

    pub fn generate(&mut self, count: usize) -> Vec<ElectricVehicle> {
        (0..count).map(|_| self.next_vehicle()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PostGenerator {
    rng: StdRng,
    next_id: usize,
    bounds: BoundingBox,
    status_mix: bool,
}

impl PostGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            bounds: BoundingBox::LONDON_POSTS,
            status_mix: false,
        }
    }

    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Draw statuses uniformly instead of reporting every post available.
    pub fn with_status_mix(mut self, enabled: bool) -> Self {
        self.status_mix = enabled;
        self
    }

    pub fn next_post(&mut self) -> ChargingPost {
        let rng = &mut self.rng;
        let location = self.bounds.sample(rng);
        let socket = SocketType::ALL[rng.gen_range(0..SocketType::ALL.len())];
        let charger = random_charger(rng);
        let mut post = ChargingPost::new(PostId(self.next_id), location, socket, charger);
        // Free or the 5-unit tier.
        post.price = if rng.gen_bool(0.5) { 0.0 } else { 5.0 };
        if self.status_mix {
            post.status = match rng.gen_range(0..3) {
                0 => PostStatus::Available,
                1 => PostStatus::Unavailable,
                _ => PostStatus::OutOfOrder,
            };
        }
        self.next_id += 1;
        post
    }

    pub fn generate(&mut self, count: usize) -> Vec<ChargingPost> {
        (0..count).map(|_| self.next_post()).collect()
    }
}
