//! The record of past simulation states, used to draw trajectories and time series.

use crate::state::SimulationState;
use crate::util::Interval;

/// The state of the ring at one instant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// The vehicle positions in m.
    pub positions: Vec<f64>,
    /// The vehicle speeds in m/s.
    pub speeds: Vec<f64>,
    /// The vehicle net gaps in m.
    pub gaps: Vec<f64>,
    /// The mean speed in m/s.
    pub mean_speed: f64,
    /// The population standard deviation of the gaps in m.
    pub gap_std_dev: f64,
    /// The simulation time in s.
    pub time: f64,
}

impl Snapshot {
    /// Captures the current vehicle state.
    pub(crate) fn capture(state: &SimulationState, time: f64) -> Self {
        Self {
            positions: state.positions().to_vec(),
            speeds: state.speeds().to_vec(),
            gaps: state.gaps().to_vec(),
            mean_speed: state.mean_speed(),
            gap_std_dev: state.gap_std_dev(),
            time,
        }
    }
}

/// A point on a vehicle's space-time trajectory: `(centred position, time)`.
pub type TrajectoryPoint = (f64, f64);

/// An ordered log of snapshots.
///
/// The simulation only ever appends to the history. Display code may truncate or
/// clear it between steps.
#[derive(Clone, Debug, Default)]
pub struct History {
    snapshots: Vec<Snapshot>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a snapshot.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Removes every snapshot.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Keeps only the first `len` snapshots.
    pub fn truncate(&mut self, len: usize) {
        self.snapshots.truncate(len);
    }

    /// Discards all snapshots recorded before `time`.
    pub fn discard_before(&mut self, time: f64) {
        self.snapshots.retain(|s| s.time >= time);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The most recent snapshot.
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Returns an iterator over the snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// The time of each snapshot.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|s| s.time)
    }

    /// The mean speed at each snapshot.
    pub fn mean_speeds(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|s| s.mean_speed)
    }

    /// The gap standard deviation at each snapshot.
    pub fn gap_std_devs(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|s| s.gap_std_dev)
    }

    /// Returns the snapshots whose time lies within the closed interval `window`.
    pub fn window(&self, window: Interval<f64>) -> impl Iterator<Item = &Snapshot> {
        self.iter().filter(move |s| window.contains(s.time))
    }

    /// The time interval spanning the last `span` seconds of history, clamped at zero.
    pub fn latest_window(&self, span: f64) -> Option<Interval<f64>> {
        self.last().map(|s| Interval::new(f64::max(0.0, s.time - span), s.time))
    }

    /// Computes the space-time trajectory of a vehicle for drawing.
    ///
    /// Positions are centred on the track (shifted by `-L/2`). The trajectory is broken
    /// into a new segment whenever the vehicle crosses the seam of the track, which
    /// shows up as a jump of at least half a lap between consecutive snapshots.
    ///
    /// # Parameters
    /// * `vehicle` - The index of the vehicle.
    /// * `circuit_length` - The circumference of the track in m.
    pub fn trajectory(&self, vehicle: usize, circuit_length: f64) -> Vec<Vec<TrajectoryPoint>> {
        let half = 0.5 * circuit_length;
        let mut segments: Vec<Vec<TrajectoryPoint>> = vec![];
        for snapshot in self {
            let Some(pos) = snapshot.positions.get(vehicle) else {
                continue;
            };
            let point = (pos - half, snapshot.time);
            let prev = segments.last_mut().filter(|segment| {
                segment
                    .last()
                    .map_or(false, |prev| (point.0 - prev.0).abs() < half)
            });
            match prev {
                Some(segment) => segment.push(point),
                None => segments.push(vec![point]),
            }
        }
        segments
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot(time: f64, positions: &[f64]) -> Snapshot {
        Snapshot {
            positions: positions.to_vec(),
            speeds: vec![5.0; positions.len()],
            gaps: vec![0.0; positions.len()],
            mean_speed: 5.0,
            gap_std_dev: 0.0,
            time,
        }
    }

    fn history(points: &[(f64, f64)]) -> History {
        let mut history = History::new();
        for (time, pos) in points {
            history.push(snapshot(*time, &[*pos]));
        }
        history
    }

    #[test]
    fn trajectory_splits_at_seam() {
        let history = history(&[(0.0, 90.0), (1.0, 95.0), (2.0, 2.0), (3.0, 8.0)]);
        let segments = history.trajectory(0, 100.0);
        assert_eq!(
            segments,
            vec![
                vec![(40.0, 0.0), (45.0, 1.0)],
                vec![(-48.0, 2.0), (-42.0, 3.0)]
            ]
        );
    }

    #[test]
    fn trajectory_of_missing_vehicle_is_empty() {
        let history = history(&[(0.0, 10.0)]);
        assert!(history.trajectory(3, 100.0).is_empty());
        assert!(History::new().trajectory(0, 100.0).is_empty());
    }

    #[test]
    fn windowed_series() {
        let history = history(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0), (250.0, 0.0)]);
        let window = history.latest_window(200.0).unwrap();
        assert_eq!(window, Interval::new(50.0, 250.0));
        let times: Vec<_> = history.window(window).map(|s| s.time).collect();
        assert_eq!(times, vec![100.0, 200.0, 250.0]);

        let window = history.latest_window(1000.0).unwrap();
        assert_eq!(window.min, 0.0);
        assert_eq!(history.window(window).count(), 4);
    }

    #[test]
    fn truncation() {
        let mut history = history(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        history.discard_before(1.0);
        assert_eq!(history.times().collect::<Vec<_>>(), vec![1.0, 2.0]);
        history.truncate(1);
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest_window(10.0).is_none());
    }
}
