//! Light-phase controller for a single four-way intersection.
//!
//! Car arrivals come in through [`IntersectionController::arrive`]. The controller drives
//! the timed yellow/red/green sequence and reports completion through a [`Completion`].

pub mod communication;
pub mod config;
pub mod control_system;
pub mod error;
pub mod global_variables;
pub mod models;
pub mod monitoring;
pub mod shared_data;

pub use communication::messages::{Arrival, IntersectionEvent, SnapshotKind};
pub use config::TimingConfig;
pub use control_system::traffic_light_controller::{
    ArrivalOutcome, Completion, IntersectionController,
};
pub use error::{ArrivalError, ConfigError};
pub use models::intersection::{
    Axis, Direction, DirectionLights, IntersectionState, Lane, Light, Phase,
};
