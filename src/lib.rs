pub use cgmath;
pub use config::SimulationConfig;
pub use error::ConfigError;
pub use history::{History, Snapshot, TrajectoryPoint};
pub use model::Model;
pub use noise::NoiseSource;
pub use simulation::{Simulation, MIN_GAP, MIN_SPACING, MIN_SPEED, VEHICLE_LENGTH};
pub use state::SimulationState;
pub use track::Track;
pub use util::Interval;

mod config;
mod debug;
mod error;
mod history;
pub mod math;
mod model;
mod noise;
mod simulation;
mod state;
mod track;
mod util;
