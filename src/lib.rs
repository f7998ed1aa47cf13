//! charge-planner core
//!
//! Allocation of electric vehicles to charging posts: static strategies
//! (random, greedy, local search, optimal) and a dynamic scheduler that
//! queues vehicles on earliest forecast start times.

pub mod traits;
pub mod model;
pub mod error;
pub mod haversine;
pub mod matcher;
pub mod status;
pub mod solver;
pub mod optimal;
pub mod est;
pub mod dynamic;
pub mod stats;
pub mod generator;
pub mod postcodes;
pub mod config;
pub mod experiment;

pub use error::PlannerError;
pub use matcher::{ConstraintSet, Matcher};
pub use model::{ChargerType, ChargingPost, ElectricVehicle, Geolocation, PostId, PostStatus, SocketType, VehicleId};
pub use solver::{Allocation, Assignment, PlannerResult, SolveOptions, Strategy, solve};
pub use status::StatusMap;
