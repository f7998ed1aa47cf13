//! Fleet and charging infrastructure data model.
//!
//! Posts and vehicles are plain values built once per experiment. Identities
//! are stable for the duration of an allocator call; occupancy lives in
//! [`crate::status::StatusMap`], not here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a charging post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub usize);

/// Identity of an electric vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub usize);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "post#{}", self.0)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ev#{}", self.0)
    }
}

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl Geolocation {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Physical connector type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SocketType {
    Type1,
    Type2,
    ThreePinSquare,
    DcComboType2,
    Chademo,
    Ccs,
}

impl SocketType {
    pub const ALL: [SocketType; 6] = [
        SocketType::Type1,
        SocketType::Type2,
        SocketType::ThreePinSquare,
        SocketType::DcComboType2,
        SocketType::Chademo,
        SocketType::Ccs,
    ];
}

/// Charger power class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargerType {
    Slow,
    Fast,
    Rapid,
}

impl ChargerType {
    /// Nominal duration of a charge from empty to full, in hours.
    pub fn full_charge_hours(self) -> f64 {
        match self {
            ChargerType::Slow => 8.0,
            ChargerType::Fast => 5.0,
            ChargerType::Rapid => 2.0,
        }
    }

    /// Whether a post with this charger can serve a vehicle requiring `required`.
    pub fn serves(self, required: ChargerType) -> bool {
        self == required
    }
}

/// Occupancy status of a charging post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    Available,
    Unavailable,
    OutOfOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingPost {
    pub id: PostId,
    pub location: Geolocation,
    pub socket: SocketType,
    pub charger: ChargerType,
    /// Price tier; zero means free.
    pub price: f64,
    /// Status reported by the inventory, used as the baseline of a run.
    pub status: PostStatus,
    #[serde(default)]
    pub postcode: Option<String>,
}

impl ChargingPost {
    pub fn new(id: PostId, location: Geolocation, socket: SocketType, charger: ChargerType) -> Self {
        Self {
            id,
            location,
            socket,
            charger,
            price: 0.0,
            status: PostStatus::Available,
            postcode: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectricVehicle {
    pub id: VehicleId,
    pub origin: Geolocation,
    pub destination: Geolocation,
    pub socket: SocketType,
    pub charger: ChargerType,
    /// Battery level as a percentage.
    pub battery_level: u8,
    /// Largest acceptable distance between destination and post, in km.
    pub max_detour_km: f64,
    pub willing_to_pay: bool,
    /// Minutes the driver accepts to wait for a post (dynamic scheduling only).
    pub wait_tolerance_minutes: f64,
    #[serde(default)]
    pub model: String,
}

impl ElectricVehicle {
    /// Hours needed to charge from the current level to full on this vehicle's charger type.
    pub fn time_to_charge_hours(&self) -> f64 {
        let missing = 100.0 - f64::from(self.battery_level.min(100));
        missing / 100.0 * self.charger.full_charge_hours()
    }

    pub fn time_to_charge_minutes(&self) -> f64 {
        self.time_to_charge_hours() * 60.0
    }
}

/// Converts a detour budget in minutes to a distance in kilometres.
pub fn detour_minutes_to_km(minutes: f64) -> f64 {
    minutes / 10.0
}
