use crate::{ConfigError, Model};

/// The parameters of a ring road simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    /// The number of vehicles on the ring.
    pub vehicle_count: usize,
    /// The circumference of the ring in m.
    pub circuit_length: f64,
    /// The time step in s.
    pub dt: f64,
    /// The car-following model.
    pub model: Model,
    /// The intensity of the speed noise in m/s^(3/2).
    pub noise_scale: f64,
    /// The seed of the noise.
    pub seed: u64,
}

impl Default for SimulationConfig {
    /// The classic ring road experiment: 22 vehicles on a 231 m circuit.
    fn default() -> Self {
        Self {
            vehicle_count: 22,
            circuit_length: 231.0,
            dt: 0.05,
            model: Model::Satg,
            noise_scale: 0.6,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    /// Checks that the parameters describe a valid simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vehicle_count < 1 {
            return Err(ConfigError::InvalidVehicleCount(self.vehicle_count));
        }
        if !(self.circuit_length.is_finite() && self.circuit_length > 0.0) {
            return Err(ConfigError::InvalidCircuitLength(self.circuit_length));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::InvalidTimeStep(self.dt));
        }
        validate_noise_scale(self.noise_scale)
    }
}

pub(crate) fn validate_noise_scale(noise_scale: f64) -> Result<(), ConfigError> {
    if noise_scale.is_finite() && noise_scale >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidNoiseScale(noise_scale))
    }
}
