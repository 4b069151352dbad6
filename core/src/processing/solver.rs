use crate::prelude::StageConfig;
use crate::processing::raytrace::{RayLimit, RayPoint, Raytracer};

/// Steepest takeoff angle tried, degrees. At 90 the source layer itself is
/// post-critical and the ray goes nowhere.
pub const MAX_TAKEOFF_DEG: f64 = 89.99;

/// Bracket width below which the solve stops, degrees.
const MIN_BRACKET_DEG: f64 = 1.0e-9;

/// Quantity the solver matches at a fixed one-way travel time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveTarget {
    /// Horizontal distance from the source, metres.
    Distance(f64),
    /// Absolute depth, metres.
    Depth(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// Takeoff angle from vertical, degrees, in [0, MAX_TAKEOFF_DEG].
    pub angle: f64,
    /// Signed mismatch of the matched quantity, metres.
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
    pub ray: RayPoint,
}

/// Recovers the takeoff angle that reproduces an observed distance or depth.
///
/// Starts from an initial guess, takes one small step downhill, then iterates
/// secant updates inside a bracket on [0, 90] that shrinks after every
/// evaluation. Secant steps that leave the bracket are replaced by bisection
/// toward its far side, so flat stretches of the residual are stepped across. The best angle seen is returned when the iteration cap
/// is reached.
pub struct AngleSolver<'a> {
    raytracer: &'a Raytracer,
    precision: f64,
    max_iterations: usize,
    initial_step: f64,
}

impl<'a> AngleSolver<'a> {
    pub fn new(raytracer: &'a Raytracer, config: &StageConfig) -> Self {
        Self {
            raytracer,
            precision: config.precision,
            max_iterations: config.max_iterations.max(1),
            initial_step: config.initial_step_deg,
        }
    }

    /// Residual oriented so that it grows with the takeoff angle.
    fn evaluate(
        &self,
        angle: f64,
        one_way_time: f64,
        source_depth: f64,
        target: SolveTarget,
    ) -> (RayPoint, f64) {
        let ray = self
            .raytracer
            .trace(angle, RayLimit::TravelTime(one_way_time), source_depth);
        let residual = match target {
            SolveTarget::Distance(distance) => ray.distance - distance,
            SolveTarget::Depth(depth) => depth - ray.depth,
        };
        (ray, residual)
    }

    pub fn solve(
        &self,
        initial_angle: f64,
        one_way_time: f64,
        source_depth: f64,
        target: SolveTarget,
    ) -> Solution {
        let mut lower = 0.0_f64;
        let mut upper = MAX_TAKEOFF_DEG;
        let tighten = |angle: f64, residual: f64, lower: &mut f64, upper: &mut f64| {
            if residual > 0.0 {
                *upper = upper.min(angle);
            } else {
                *lower = lower.max(angle);
            }
        };

        let mut previous_angle = initial_angle.abs().min(MAX_TAKEOFF_DEG);
        let (ray, mut previous_residual) =
            self.evaluate(previous_angle, one_way_time, source_depth, target);
        let mut best = (previous_angle, previous_residual, ray);
        let mut iterations = 1;
        tighten(previous_angle, previous_residual, &mut lower, &mut upper);

        let toward_far_side = |angle: f64, residual: f64, lower: f64, upper: f64| {
            if residual > 0.0 {
                0.5 * (angle + lower)
            } else {
                0.5 * (angle + upper)
            }
        };

        let first = previous_angle - self.initial_step.copysign(previous_residual);
        let mut angle = if first > lower && first < upper {
            first
        } else {
            toward_far_side(previous_angle, previous_residual, lower, upper)
        };

        while best.1.abs() >= self.precision && iterations < self.max_iterations {
            let (ray, residual) = self.evaluate(angle, one_way_time, source_depth, target);
            iterations += 1;
            if residual.abs() < best.1.abs() {
                best = (angle, residual, ray);
            }
            if residual.abs() < self.precision {
                break;
            }
            tighten(angle, residual, &mut lower, &mut upper);
            if upper - lower < MIN_BRACKET_DEG {
                break;
            }

            let secant = angle - residual * (angle - previous_angle) / (residual - previous_residual);
            let next = if secant.is_finite() && secant > lower && secant < upper {
                secant
            } else {
                toward_far_side(angle, residual, lower, upper)
            };
            previous_angle = angle;
            previous_residual = residual;
            angle = next;
        }

        let (angle, residual, ray) = best;
        Solution {
            angle,
            residual,
            iterations,
            converged: residual.abs() < self.precision,
            ray,
        }
    }
}

/// Blends the distance- and depth-matched angles, favouring the distance
/// solution near nadir where depth is insensitive to the angle.
pub fn blend_angles(distance_angle: f64, depth_angle: f64) -> f64 {
    let weight = distance_angle.to_radians().cos().powi(2);
    weight * distance_angle + (1.0 - weight) * depth_angle
}
