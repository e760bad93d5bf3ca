//! The car-following models.

use crate::math::{desired_speed, noise_gate, ramp_positive, smooth_extremum};
use crate::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A car-following model, which maps a vehicle's net gap, speed and speed relative
/// to the vehicle ahead onto an acceleration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Model {
    /// Stochastic optimal velocity model.
    Sovm,
    /// [Model::Sovm] with a slower relaxation time.
    SovmUnstable,
    /// Stochastic full velocity difference model.
    Sfvdm,
    /// [Model::Sfvdm] with a weaker response to the speed difference.
    SfvdmUnstable,
    /// The model of Tomer et al.
    Tomer,
    /// [Model::Tomer] with a weaker gap response.
    TomerUnstable,
    /// Stochastic intelligent driver model.
    Sidm,
    /// [Model::Sidm] with a weaker response to the speed difference.
    SidmUnstable,
    /// Stochastic action-point time gap model.
    #[default]
    Satg,
}

impl Model {
    /// All of the models, in display order.
    pub const ALL: [Model; 9] = [
        Model::Sovm,
        Model::SovmUnstable,
        Model::Sfvdm,
        Model::SfvdmUnstable,
        Model::Tomer,
        Model::TomerUnstable,
        Model::Sidm,
        Model::SidmUnstable,
        Model::Satg,
    ];

    /// The display name of the model, which is also the name accepted by [Model::from_str].
    pub fn name(self) -> &'static str {
        match self {
            Model::Sovm => "SOVM",
            Model::SovmUnstable => "SOVM unstable",
            Model::Sfvdm => "SFVDM",
            Model::SfvdmUnstable => "SFVDM unstable",
            Model::Tomer => "Tomer et al.",
            Model::TomerUnstable => "Tomer et al. unstable",
            Model::Sidm => "SIDM",
            Model::SidmUnstable => "SIDM unstable",
            Model::Satg => "SATG",
        }
    }

    /// Computes the deterministic part of a vehicle's acceleration.
    ///
    /// # Parameters
    /// * `gap` - The net distance to the vehicle ahead in m.
    /// * `speed` - The speed of the vehicle in m/s.
    /// * `rel_speed` - The speed of the vehicle ahead minus the vehicle's own speed, in m/s.
    pub fn acceleration(self, gap: f64, speed: f64, rel_speed: f64) -> f64 {
        match self {
            Model::Sovm => optimal_velocity(gap, speed, 0.5),
            Model::SovmUnstable => optimal_velocity(gap, speed, 1.0),
            Model::Sfvdm => full_velocity_difference(gap, speed, rel_speed, 2.0),
            Model::SfvdmUnstable => full_velocity_difference(gap, speed, rel_speed, 2.7),
            Model::Tomer => tomer(gap, speed, rel_speed, 7.0),
            Model::TomerUnstable => tomer(gap, speed, rel_speed, 3.0),
            Model::Sidm => intelligent_driver(gap, speed, rel_speed, 4.0),
            Model::SidmUnstable => intelligent_driver(gap, speed, rel_speed, 5.0),
            Model::Satg => action_point_time_gap(gap, speed, rel_speed),
        }
    }

    /// The intensity of the speed noise applied to a vehicle travelling at `speed`.
    pub fn noise_intensity(self, speed: f64, noise_scale: f64) -> f64 {
        noise_gate(speed, noise_scale)
    }
}

/// Relaxes towards the desired speed over `tau` seconds.
fn optimal_velocity(gap: f64, speed: f64, tau: f64) -> f64 {
    (desired_speed(gap) - speed) / tau
}

fn full_velocity_difference(gap: f64, speed: f64, rel_speed: f64, lambda: f64) -> f64 {
    (desired_speed(gap) - speed) / 2.5 + rel_speed / lambda
}

fn tomer(gap: f64, speed: f64, rel_speed: f64, gain: f64) -> f64 {
    gain * (1.0 - (2.0 * speed + 5.0) / (gap + 5.0))
        - ramp_positive(-rel_speed).powi(2) / (2.0 * gap)
        - 2.0 * ramp_positive(speed - 20.0)
}

fn intelligent_driver(gap: f64, speed: f64, rel_speed: f64, approach: f64) -> f64 {
    let desired_gap = 2.0 + speed - speed * rel_speed / approach;
    2.0 * (1.0 - (desired_gap / gap).powi(2) - (speed / 20.0).powi(4))
}

fn action_point_time_gap(gap: f64, speed: f64, rel_speed: f64) -> f64 {
    let positive_speed = smooth_extremum(speed, 1e-10, 0.01);
    let time_gap = smooth_extremum(gap / positive_speed, 4.0, -0.01);
    let time_gap = smooth_extremum(time_gap, 0.1, 0.01);
    (0.2 * (gap - speed) + rel_speed) / time_gap
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.name() == s)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_owned()))
    }
}

impl TryFrom<String> for Model {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.name().to_owned()
    }
}
