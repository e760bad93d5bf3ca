use crate::Track;

/// The initial speed of every vehicle in m/s.
pub(crate) const INITIAL_SPEED: f64 = 5.0; // m/s

/// The state of every vehicle on the ring, stored as parallel buffers indexed by vehicle.
///
/// Vehicle `i` always follows vehicle `(i + 1) % n`, whatever their positions on the track.
#[derive(Clone, Debug)]
pub struct SimulationState {
    /// Positions along the track in m, in `[0, L)`.
    pub(crate) position: Vec<f64>,
    /// Speeds in m/s.
    pub(crate) speed: Vec<f64>,
    /// The accelerations computed in the last step, in m/s^2.
    pub(crate) acceleration: Vec<f64>,
    /// The net gaps computed in the last step, in m.
    pub(crate) gap: Vec<f64>,
    /// Scratch buffers reused by every step.
    pub(crate) scratch: StepBuffers,
}

/// Per-step working buffers, kept around so a step does not allocate.
#[derive(Clone, Debug, Default)]
pub(crate) struct StepBuffers {
    pub rel_speed: Vec<f64>,
    pub noise: Vec<f64>,
    pub wiener: Vec<f64>,
    pub next_speed: Vec<f64>,
    pub next_position: Vec<f64>,
}

impl SimulationState {
    /// Creates the initial state: `count` vehicles evenly spaced around the track,
    /// all travelling at the initial speed.
    pub(crate) fn new(track: &Track, count: usize) -> Self {
        let zeros = vec![0.0; count];
        Self {
            position: track.even_spacing(count).collect(),
            speed: vec![INITIAL_SPEED; count],
            acceleration: zeros.clone(),
            gap: zeros.clone(),
            scratch: StepBuffers {
                rel_speed: zeros.clone(),
                noise: zeros.clone(),
                wiener: zeros.clone(),
                next_speed: zeros.clone(),
                next_position: zeros,
            },
        }
    }

    /// The number of vehicles.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether there are no vehicles.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// The index of the vehicle ahead of vehicle `idx`.
    #[inline]
    pub fn leader(&self, idx: usize) -> usize {
        let next = idx + 1;
        if next == self.len() {
            0
        } else {
            next
        }
    }

    pub fn positions(&self) -> &[f64] {
        &self.position
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speed
    }

    pub fn accelerations(&self) -> &[f64] {
        &self.acceleration
    }

    pub fn gaps(&self) -> &[f64] {
        &self.gap
    }

    /// The mean speed of all vehicles in m/s.
    pub fn mean_speed(&self) -> f64 {
        mean(&self.speed)
    }

    /// The population standard deviation of the gaps in m.
    pub fn gap_std_dev(&self) -> f64 {
        std_dev(&self.gap)
    }
}

/// The arithmetic mean of the values.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// The population standard deviation of the values.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn initial_state() {
        let track = Track::new(100.0).unwrap();
        let state = SimulationState::new(&track, 4);
        assert_eq!(state.positions(), &[0.0, 25.0, 50.0, 75.0]);
        assert_eq!(state.speeds(), &[5.0; 4]);
        assert_eq!(state.gaps(), &[0.0; 4]);
        assert_eq!(state.mean_speed(), 5.0);
        assert_eq!(state.gap_std_dev(), 0.0);
    }

    #[test]
    fn leaders_form_a_ring() {
        let track = Track::new(100.0).unwrap();
        let state = SimulationState::new(&track, 3);
        assert_eq!(state.leader(0), 1);
        assert_eq!(state.leader(1), 2);
        assert_eq!(state.leader(2), 0);

        let single = SimulationState::new(&track, 1);
        assert_eq!(single.leader(0), 0);
    }

    #[test]
    fn population_std_dev() {
        assert_approx_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
        assert_eq!(std_dev(&[3.0]), 0.0);
    }
}
