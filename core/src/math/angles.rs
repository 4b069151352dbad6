//! Angle helpers and the takeoff-angle transforms.
//!
//! All angles are degrees. Pitch is positive bow up, roll positive port up,
//! receive pointing angles positive to port. Azimuths are measured clockwise
//! from forward, so starboard is +90 and port is -90.

use serde::{Deserialize, Serialize};

/// Horizontal direction cosines below this are treated as straight down.
const HORIZONTAL_EPSILON: f64 = 1e-12;

/// Ray launch direction: angle from vertical plus horizontal azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Takeoff {
    pub theta: f64,
    pub azimuth: f64,
}

/// Wraps an angle into [-180, 180].
pub fn wrap_180(angle: f64) -> f64 {
    let mut wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped -= 360.0;
    } else if wrapped < -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// Wraps an angle into [0, 360).
pub fn wrap_360(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation taking `from` onto `to`.
pub fn angular_difference(from: f64, to: f64) -> f64 {
    wrap_180(to - from)
}

/// Converts array-relative angles into a takeoff direction.
///
/// `alpha` is the fore-aft tilt of the transmit fan (positive forward) and
/// `beta` the complement of the across-track angle (90 points straight down,
/// smaller values lean to port).
pub fn rollpitch_to_takeoff(alpha: f64, beta: f64) -> Takeoff {
    let (sa, ca) = alpha.to_radians().sin_cos();
    let (sb, cb) = beta.to_radians().sin_cos();
    let forward = sa;
    let port = ca * cb;
    let down = ca * sb;

    let theta = down.clamp(-1.0, 1.0).acos().to_degrees();
    let azimuth = if forward.hypot(port) < HORIZONTAL_EPSILON {
        0.0
    } else {
        (-port).atan2(forward).to_degrees()
    };
    Takeoff { theta, azimuth }
}

/// Takeoff direction of the straight line from the transducer to a sounding.
pub fn xyz_to_takeoff(starboard: f64, forward: f64, down: f64) -> Takeoff {
    let range = (starboard * starboard + forward * forward + down * down).sqrt();
    if range == 0.0 {
        return Takeoff::default();
    }
    let theta = (down / range).clamp(-1.0, 1.0).acos().to_degrees();
    let azimuth = if starboard.hypot(forward) < HORIZONTAL_EPSILON * range {
        0.0
    } else {
        starboard.atan2(forward).to_degrees()
    };
    Takeoff { theta, azimuth }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_angles_in_range() {
        assert_eq!(wrap_180(190.0), -170.0);
        assert_eq!(wrap_180(-190.0), 170.0);
        assert_eq!(wrap_180(540.0), 180.0);
        assert_eq!(wrap_360(-10.0), 350.0);
        assert_eq!(wrap_360(720.0), 0.0);
        assert_eq!(angular_difference(350.0, 10.0), 20.0);
    }

    #[test]
    fn vertical_beam_has_zero_takeoff() {
        let takeoff = rollpitch_to_takeoff(0.0, 90.0);
        assert!(takeoff.theta.abs() < 1e-9);
        assert_eq!(takeoff.azimuth, 0.0);
    }

    #[test]
    fn port_beam_points_to_port() {
        let takeoff = rollpitch_to_takeoff(0.0, 60.0);
        assert!((takeoff.theta - 30.0).abs() < 1e-9);
        assert!((takeoff.azimuth + 90.0).abs() < 1e-9);
    }

    #[test]
    fn forward_tilt_points_forward() {
        let takeoff = rollpitch_to_takeoff(5.0, 90.0);
        assert!((takeoff.theta - 5.0).abs() < 1e-9);
        assert!(takeoff.azimuth.abs() < 1e-9);
    }

    #[test]
    fn sounding_direction_matches_array_direction() {
        let from_array = rollpitch_to_takeoff(0.0, 120.0);
        let down = 30f64.to_radians().cos();
        let starboard = 30f64.to_radians().sin();
        let from_sounding = xyz_to_takeoff(starboard, 0.0, down);
        assert!((from_array.theta - from_sounding.theta).abs() < 1e-9);
        assert!((from_array.azimuth - from_sounding.azimuth).abs() < 1e-9);
    }
}
