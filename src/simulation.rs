use crate::config::validate_noise_scale;
#[cfg(feature = "debug")]
use crate::debug::take_debug_frame;
use crate::debug::{debug_instability, debug_spacing};
use crate::history::{History, Snapshot};
use crate::math::Point2d;
use crate::noise::NoiseSource;
use crate::state::SimulationState;
use crate::{ConfigError, Model, SimulationConfig, Track};
use itertools::izip;

/// The length of every vehicle in m.
pub const VEHICLE_LENGTH: f64 = 5.0; // m

/// The minimum distance between the positions of consecutive vehicles in m.
pub const MIN_SPACING: f64 = 5.0; // m

/// The smallest net gap used by the car-following models in m.
pub const MIN_GAP: f64 = 0.1; // m

/// The minimum speed of every vehicle in m/s.
pub const MIN_SPEED: f64 = 0.1; // m/s

/// Accelerations at or above this magnitude are treated as numerical blow-ups.
const MAX_ACCELERATION: f64 = 1e5; // m/s^2

/// The factor applied to the perturbed vehicle's speed by [Simulation::apply_perturbation].
const PERTURBATION_FACTOR: f64 = 0.2;

/// A simulation of vehicles following each other around a ring road.
///
/// Vehicle `i` follows vehicle `(i + 1) % n`. Each step computes the gaps and speed
/// differences, evaluates the car-following model, integrates the speeds with an
/// Euler–Maruyama scheme, then pushes apart vehicles which ended up too close.
pub struct Simulation {
    /// The parameters the simulation was created with, updated by the setters.
    config: SimulationConfig,
    /// The ring road.
    track: Track,
    /// The vehicle states.
    state: SimulationState,
    /// The source of the speed noise.
    noise: NoiseSource,
    /// The current simulation time in s.
    time: f64,
    /// The recorded snapshots.
    history: History,
    /// Debugging information from the previously simulated frame.
    #[cfg(feature = "debug")]
    debug: serde_json::Value,
}

impl Simulation {
    /// Creates a new simulation with the vehicles evenly spaced around the track.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let track = Track::new(config.circuit_length)?;
        let mut sim = Self {
            track,
            state: SimulationState::new(&track, config.vehicle_count),
            noise: NoiseSource::new(config.seed),
            time: 0.0,
            history: History::new(),
            config,
            #[cfg(feature = "debug")]
            debug: serde_json::Value::Null,
        };
        sim.reset();
        Ok(sim)
    }

    /// Creates a new simulation, looking the car-following model up by name.
    ///
    /// # Parameters
    /// * `vehicle_count` - The number of vehicles, at least 1.
    /// * `circuit_length` - The circumference of the ring in m.
    /// * `dt` - The time step in s.
    /// * `model_name` - The name of the car-following model, e.g. `"SATG"`.
    /// * `noise_scale` - The intensity of the speed noise.
    /// * `seed` - The seed of the speed noise.
    pub fn from_params(
        vehicle_count: usize,
        circuit_length: f64,
        dt: f64,
        model_name: &str,
        noise_scale: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(SimulationConfig {
            vehicle_count,
            circuit_length,
            dt,
            model: model_name.parse()?,
            noise_scale,
            seed,
        })
    }

    /// Returns the vehicles to their initial, evenly spaced state and clears the history.
    ///
    /// The noise stream carries on from where it was; use [Simulation::reseed] to restart it.
    pub fn reset(&mut self) {
        self.state = SimulationState::new(&self.track, self.config.vehicle_count);
        self.time = 0.0;
        self.history.clear();
        self.record();
        log::debug!(
            "reset ring of {} vehicles on {} m using {}",
            self.config.vehicle_count,
            self.track.length(),
            self.config.model
        );
    }

    /// Restarts the noise stream from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.noise = NoiseSource::new(seed);
    }

    /// Brakes the last vehicle sharply, reducing its speed to a fifth.
    pub fn apply_perturbation(&mut self) {
        if let Some(speed) = self.state.speed.last_mut() {
            *speed *= PERTURBATION_FACTOR;
        }
    }

    /// Advances the simulation by one time step.
    pub fn step(&mut self) {
        self.compute_gaps();
        self.compute_accelerations();
        self.integrate();
        self.enforce_spacing();
        self.commit();

        #[cfg(feature = "debug")]
        {
            self.debug = take_debug_frame();
        }
    }

    /// Advances the simulation by `steps` time steps.
    pub fn run(&mut self, steps: usize) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Sets the car-following model used from the next step onwards.
    pub fn set_model(&mut self, model: Model) {
        if model != self.config.model {
            log::debug!("switching model from {} to {}", self.config.model, model);
        }
        self.config.model = model;
    }

    /// Sets the car-following model by name. Unknown names leave the model unchanged.
    pub fn set_model_name(&mut self, name: &str) -> Result<(), ConfigError> {
        self.set_model(name.parse()?);
        Ok(())
    }

    /// Sets the noise intensity used from the next step onwards.
    pub fn set_noise_scale(&mut self, noise_scale: f64) -> Result<(), ConfigError> {
        validate_noise_scale(noise_scale)?;
        self.config.noise_scale = noise_scale;
        Ok(())
    }

    /// Overrides the simulation time, e.g. when a display window rolls over.
    pub fn set_sim_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Restarts the clock at zero and replaces the history with a snapshot of the
    /// current state, leaving the vehicles where they are.
    pub fn roll_over_window(&mut self) {
        self.time = 0.0;
        self.history.clear();
        self.record();
    }

    /// The parameters of the simulation.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The ring road.
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// The number of vehicles.
    pub fn vehicle_count(&self) -> usize {
        self.state.len()
    }

    /// The time step in s.
    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// The current car-following model.
    pub fn model(&self) -> Model {
        self.config.model
    }

    /// The current noise intensity.
    pub fn noise_scale(&self) -> f64 {
        self.config.noise_scale
    }

    /// The seed the noise stream was last started from.
    pub fn seed(&self) -> u64 {
        self.noise.seed()
    }

    /// The current simulation time in s.
    pub fn sim_time(&self) -> f64 {
        self.time
    }

    /// The vehicle states.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The vehicle positions along the track in m.
    pub fn positions(&self) -> &[f64] {
        self.state.positions()
    }

    /// The vehicle speeds in m/s.
    pub fn speeds(&self) -> &[f64] {
        self.state.speeds()
    }

    /// The accelerations computed by the last step in m/s^2.
    pub fn accelerations(&self) -> &[f64] {
        self.state.accelerations()
    }

    /// The net gaps computed by the last step in m.
    pub fn gaps(&self) -> &[f64] {
        self.state.gaps()
    }

    /// Returns an iterator over the vehicle positions as points on the drawn circle.
    pub fn world_positions(&self) -> impl Iterator<Item = Point2d> + '_ {
        self.positions().iter().map(|pos| self.track.world_coords(*pos))
    }

    /// The recorded snapshots.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable access to the history, for trimming it between steps.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Gets the debugging information for the previously simulated frame as JSON array.
    #[cfg(feature = "debug")]
    pub fn debug(&mut self) -> serde_json::Value {
        self.debug.clone()
    }

    /// Computes each vehicle's net gap to the vehicle ahead and its speed relative to it.
    fn compute_gaps(&mut self) {
        let state = &mut self.state;
        for i in 0..state.len() {
            let next = state.leader(i);
            let dist = self
                .track
                .forward_distance(state.position[i], state.position[next]);
            state.gap[i] = f64::max(dist - VEHICLE_LENGTH, MIN_GAP);
            state.scratch.rel_speed[i] = state.speed[next] - state.speed[i];
        }
    }

    /// Evaluates the car-following model and the noise intensity for every vehicle.
    fn compute_accelerations(&mut self) {
        let model = self.config.model;
        let noise_scale = self.config.noise_scale;
        let state = &mut self.state;
        for (acc, noise, &gap, &speed, &rel_speed) in izip!(
            &mut state.acceleration,
            &mut state.scratch.noise,
            &state.gap,
            &state.speed,
            &state.scratch.rel_speed,
        ) {
            *acc = model.acceleration(gap, speed, rel_speed);
            *noise = model.noise_intensity(speed, noise_scale);
        }
    }

    /// Integrates the speeds and positions of all vehicles into the scratch buffers.
    fn integrate(&mut self) {
        let dt = self.config.dt;
        let sqrt_dt = dt.sqrt();
        let state = &mut self.state;
        let scratch = &mut state.scratch;
        self.noise.fill(&mut scratch.wiener);

        for (i, (next_speed, next_pos, &pos, &speed, &acc, &noise, &dw)) in izip!(
            &mut scratch.next_speed,
            &mut scratch.next_position,
            &state.position,
            &state.speed,
            &state.acceleration,
            &scratch.noise,
            &scratch.wiener,
        )
        .enumerate()
        {
            let speed = if acc.abs() < MAX_ACCELERATION {
                speed + dt * acc + sqrt_dt * noise * dw
            } else {
                log::debug!("vehicle {i} skipped speed update, acceleration {acc}");
                debug_instability(i, acc);
                speed
            };
            *next_speed = f64::max(speed, MIN_SPEED);
            *next_pos = pos + *next_speed * dt;
        }
    }

    /// Pushes each vehicle's leader forward if the two are closer than the minimum spacing.
    ///
    /// This is a single forward sweep over the ring. A vehicle pushed forward is checked
    /// against its own leader on the next iteration, but the last correction of the
    /// sweep is never rechecked, so a violation can remain until the next step.
    fn enforce_spacing(&mut self) {
        let length = self.track.length();
        let positions = &mut self.state.scratch.next_position;
        let count = positions.len();
        for i in 0..count {
            let next = (i + 1) % count;
            let dist = self.track.forward_distance(positions[i], positions[next]);
            if dist < MIN_SPACING {
                let mut pos = positions[i] + MIN_SPACING;
                if pos >= length {
                    pos -= length;
                }
                log::trace!("vehicle {next} pushed from {} to {pos}", positions[next]);
                debug_spacing(next, positions[next], pos);
                positions[next] = pos;
            }
        }
    }

    /// Wraps the new positions onto the track, commits them and records a snapshot.
    fn commit(&mut self) {
        let state = &mut self.state;
        for pos in &mut state.scratch.next_position {
            *pos = self.track.wrap(*pos);
        }
        std::mem::swap(&mut state.position, &mut state.scratch.next_position);
        std::mem::swap(&mut state.speed, &mut state.scratch.next_speed);
        self.time += self.config.dt;
        self.record();
    }

    /// Appends a snapshot of the current state to the history.
    fn record(&mut self) {
        self.history.push(Snapshot::capture(&self.state, self.time));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn quiet(model: Model, vehicle_count: usize, circuit_length: f64) -> Simulation {
        Simulation::new(SimulationConfig {
            vehicle_count,
            circuit_length,
            model,
            noise_scale: 0.0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn gaps_subtract_vehicle_length() {
        let mut sim = quiet(Model::Sovm, 4, 100.0);
        sim.step();
        assert_eq!(sim.gaps(), &[20.0; 4]);
    }

    #[test]
    fn gap_floor_applies_to_overlapping_vehicles() {
        let mut sim = quiet(Model::Sovm, 3, 100.0);
        sim.state.position = vec![10.0, 12.0, 50.0];
        sim.step();
        assert_eq!(sim.gaps()[0], MIN_GAP);
        assert_eq!(sim.gaps()[1], 33.0);
        assert_eq!(sim.gaps()[2], 55.0);
    }

    #[test]
    fn noiseless_uniform_flow_is_exact() {
        // A 10 m gap puts the desired speed at exactly 6.3 m/s.
        let mut sim = quiet(Model::Sovm, 4, 60.0);
        sim.step();
        let acc = (6.3 - 5.0) / 0.5;
        for i in 0..4 {
            assert_approx_eq!(sim.accelerations()[i], acc);
            assert_approx_eq!(sim.speeds()[i], 5.0 + 0.05 * acc);
        }
        assert_approx_eq!(sim.positions()[1], 15.0 + 0.05 * sim.speeds()[1]);
    }

    #[test]
    fn runaway_acceleration_keeps_old_speed() {
        // A gap of 0.1 m at 30 m/s gives SIDM an acceleration far beyond the guard.
        let mut sim = quiet(Model::Sidm, 2, 100.0);
        sim.state.position = vec![0.0, 5.05];
        sim.state.speed = vec![30.0, 30.0];
        sim.step();
        assert!(sim.accelerations()[0].abs() >= MAX_ACCELERATION);
        assert_eq!(sim.speeds()[0], 30.0);
        assert!(sim.accelerations()[1].abs() < MAX_ACCELERATION);
    }

    #[test]
    fn speed_floor() {
        // Vehicle 0 is right behind a much slower vehicle and brakes hard.
        let mut sim = quiet(Model::Tomer, 2, 30.0);
        sim.state.position = vec![0.0, 5.1];
        sim.state.speed = vec![20.0, 0.1];
        sim.step();
        assert_eq!(sim.speeds()[0], MIN_SPEED);
        assert!(sim.speeds().iter().all(|v| *v >= MIN_SPEED));
    }

    #[test]
    fn spacing_sweep_is_single_pass() {
        // Vehicle 2 ends up too close behind vehicle 0 and pushes it forward, which
        // leaves vehicle 0 too close to vehicle 1. The sweep does not go round again.
        let mut sim = quiet(Model::Sovm, 3, 100.0);
        sim.state.position = vec![0.0, 6.0, 97.0];
        sim.state.speed = vec![0.1; 3];
        sim.step();
        let p = sim.positions().to_vec();
        let track = *sim.track();
        assert_approx_eq!(p[0], 2.005);
        assert_approx_eq!(track.forward_distance(p[2], p[0]), MIN_SPACING);
        assert!(track.forward_distance(p[0], p[1]) < MIN_SPACING);
    }

    #[test]
    fn too_close_leader_is_pushed_to_min_spacing() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.state.position[1] = 4.0;
        sim.step();
        let p = sim.positions();
        assert_approx_eq!(sim.track().forward_distance(p[0], p[1]), MIN_SPACING);
        assert_approx_eq!(p[1], p[0] + MIN_SPACING);
    }

    #[test]
    fn setters_take_effect_next_step() {
        let mut sim = quiet(Model::Sovm, 4, 60.0);
        sim.set_model_name("SOVM unstable").unwrap();
        assert_eq!(
            sim.set_model_name("OVM"),
            Err(ConfigError::UnknownModel("OVM".into()))
        );
        assert_eq!(sim.model(), Model::SovmUnstable);
        assert!(sim.set_noise_scale(-1.0).is_err());
        assert_eq!(sim.noise_scale(), 0.0);
        sim.step();
        assert_approx_eq!(sim.accelerations()[0], 6.3 - 5.0);
    }

    #[test]
    fn roll_over_keeps_vehicles() {
        let mut sim = quiet(Model::Satg, 5, 100.0);
        sim.run(10);
        let positions = sim.positions().to_vec();
        sim.roll_over_window();
        assert_eq!(sim.sim_time(), 0.0);
        assert_eq!(sim.history().len(), 1);
        assert_eq!(sim.history().last().unwrap().positions, positions);
        assert_eq!(sim.positions(), positions.as_slice());
    }

    #[test]
    fn reseed_restarts_noise() {
        let config = SimulationConfig::default();
        let mut a = Simulation::new(config.clone()).unwrap();
        a.run(5);
        a.reset();
        a.reseed(config.seed);
        a.run(5);
        let mut b = Simulation::new(config).unwrap();
        b.run(5);
        assert_eq!(a.positions(), b.positions());
    }
}
