use crate::math::Point2d;
use crate::ConfigError;
use std::f64::consts::TAU;

/// A closed circular track. Positions are arc lengths in `[0, length)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    length: f64,
}

impl Track {
    /// Creates a track with the given circumference in m.
    pub fn new(length: f64) -> Result<Self, ConfigError> {
        if length.is_finite() && length > 0.0 {
            Ok(Self { length })
        } else {
            Err(ConfigError::InvalidCircuitLength(length))
        }
    }

    /// The circumference of the track in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The radius of the track when drawn as a circle.
    pub fn radius(&self) -> f64 {
        self.length / TAU
    }

    /// The distance travelled forwards from `from` to reach `to`.
    ///
    /// Only a single lap is added, so inputs should lie within one lap of each other.
    #[inline]
    pub fn forward_distance(&self, from: f64, to: f64) -> f64 {
        let dist = to - from;
        if dist < 0.0 {
            dist + self.length
        } else {
            dist
        }
    }

    /// Maps any position onto the interval `[0, length)`.
    #[inline]
    pub fn wrap(&self, pos: f64) -> f64 {
        let pos = pos.rem_euclid(self.length);
        // `rem_euclid` rounds tiny negative inputs up to `length`
        if pos >= self.length {
            0.0
        } else {
            pos
        }
    }

    /// The positions of `count` vehicles spread evenly around the track, starting from zero.
    pub fn even_spacing(&self, count: usize) -> impl Iterator<Item = f64> + '_ {
        let step = self.length / count as f64;
        (0..count).map(move |i| i as f64 * step)
    }

    /// The coordinates of a position on the track when drawn as a circle centred on the origin.
    pub fn world_coords(&self, pos: f64) -> Point2d {
        let angle = TAU * pos / self.length;
        let radius = self.radius();
        Point2d::new(radius * angle.cos(), radius * angle.sin())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn invalid_lengths() {
        assert!(Track::new(0.0).is_err());
        assert!(Track::new(-5.0).is_err());
        assert!(Track::new(f64::NAN).is_err());
        assert!(Track::new(f64::INFINITY).is_err());
    }

    #[test]
    fn forward_distance_wraps() {
        let track = Track::new(100.0).unwrap();
        assert_eq!(track.forward_distance(10.0, 30.0), 20.0);
        assert_eq!(track.forward_distance(95.0, 3.0), 8.0);
        assert_eq!(track.forward_distance(40.0, 40.0), 0.0);
    }

    #[test]
    fn wrap_into_range() {
        let track = Track::new(100.0).unwrap();
        assert_eq!(track.wrap(105.0), 5.0);
        assert_eq!(track.wrap(100.0), 0.0);
        assert_eq!(track.wrap(-5.0), 95.0);
        assert_eq!(track.wrap(-1e-18), 0.0);
        assert_eq!(track.wrap(42.0), 42.0);
    }

    #[test]
    fn even_spacing() {
        let track = Track::new(231.0).unwrap();
        let positions: Vec<_> = track.even_spacing(22).collect();
        assert_eq!(positions.len(), 22);
        assert_eq!(positions[0], 0.0);
        assert_approx_eq!(positions[1], 10.5);
        assert_approx_eq!(positions[21], 220.5);
    }

    #[test]
    fn world_coords_on_circle() {
        let track = Track::new(100.0).unwrap();
        let p = track.world_coords(0.0);
        assert_approx_eq!(p.x, track.radius());
        assert_approx_eq!(p.y, 0.0);
        let p = track.world_coords(25.0);
        assert_approx_eq!(p.x, 0.0);
        assert_approx_eq!(p.y, track.radius());
    }
}
