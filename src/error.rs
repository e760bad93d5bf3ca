use thiserror::Error;

/// An invalid simulation configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// At least one vehicle is needed to form a ring.
    #[error("vehicle count must be at least 1, got {0}")]
    InvalidVehicleCount(usize),
    #[error("circuit length must be a positive finite number, got {0}")]
    InvalidCircuitLength(f64),
    #[error("time step must be a positive finite number, got {0}")]
    InvalidTimeStep(f64),
    #[error("noise scale must be a non-negative finite number, got {0}")]
    InvalidNoiseScale(f64),
    /// The name does not match any of the car-following models.
    #[error("unknown car-following model {0:?}")]
    UnknownModel(String),
}
