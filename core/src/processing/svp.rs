use crate::prelude::{StageError, StageResult};
use crate::processing::table::parse_two_column;

/// Depth every profile is extended to, metres.
pub const MAX_MODEL_DEPTH: f64 = 12_000.0;
pub const DEFAULT_HALF_SPACE_VELOCITY: f64 = 1500.0;

/// Depth/velocity knot table.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundVelocityProfile {
    original: Vec<(f64, f64)>,
    depths: Vec<f64>,
    velocities: Vec<f64>,
}

impl SoundVelocityProfile {
    pub fn from_knots(knots: &[(f64, f64)]) -> StageResult<Self> {
        if knots.len() < 2 {
            return Err(StageError::BadArgument(format!(
                "sound velocity profile needs at least 2 knots, got {}",
                knots.len()
            )));
        }
        for (index, &(depth, velocity)) in knots.iter().enumerate() {
            if !depth.is_finite() || !velocity.is_finite() || velocity <= 0.0 {
                return Err(StageError::BadArgument(format!(
                    "sound velocity knot {} ({}, {}) is not a valid depth/velocity",
                    index, depth, velocity
                )));
            }
        }
        if let Some(index) = knots.windows(2).position(|pair| pair[1].0 <= pair[0].0) {
            return Err(StageError::BadArgument(format!(
                "sound velocity profile depths must increase strictly (knot {})",
                index + 1
            )));
        }

        let mut depths: Vec<f64> = knots.iter().map(|knot| knot.0).collect();
        let mut velocities: Vec<f64> = knots.iter().map(|knot| knot.1).collect();
        let last_depth = depths[depths.len() - 1];
        let last_velocity = velocities[velocities.len() - 1];
        if last_depth < MAX_MODEL_DEPTH {
            depths.push(MAX_MODEL_DEPTH);
            velocities.push(last_velocity);
        }

        Ok(Self {
            original: knots.to_vec(),
            depths,
            velocities,
        })
    }

    pub fn half_space(velocity: f64) -> StageResult<Self> {
        Self::from_knots(&[(0.0, velocity), (MAX_MODEL_DEPTH, velocity)])
    }

    /// Parses a two-column `depth velocity` table.
    pub fn parse(text: &str) -> StageResult<Self> {
        Self::from_knots(&parse_two_column(text, "sound velocity profile")?)
    }

    /// Knots as supplied, before extension.
    pub fn original_knots(&self) -> &[(f64, f64)] {
        &self.original
    }

    /// Knots after extension to the model depth.
    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.depths.iter().copied().zip(self.velocities.iter().copied())
    }

    pub fn shallowest_depth(&self) -> f64 {
        self.depths[0]
    }

    pub fn layered_model(&self) -> LayeredModel {
        let count = self.velocities.len();
        let velocities = (0..count)
            .map(|i| {
                if i + 1 < count {
                    0.5 * (self.velocities[i] + self.velocities[i + 1])
                } else {
                    self.velocities[i]
                }
            })
            .collect();
        LayeredModel {
            boundaries: self.depths.clone(),
            velocities,
        }
    }
}

impl Default for SoundVelocityProfile {
    fn default() -> Self {
        Self {
            original: vec![
                (0.0, DEFAULT_HALF_SPACE_VELOCITY),
                (MAX_MODEL_DEPTH, DEFAULT_HALF_SPACE_VELOCITY),
            ],
            depths: vec![0.0, MAX_MODEL_DEPTH],
            velocities: vec![DEFAULT_HALF_SPACE_VELOCITY; 2],
        }
    }
}

/// Constant-velocity layers derived from a profile.
///
/// Layer `i` spans `boundaries[i]..boundaries[i + 1]`; the last layer is a
/// half-space below the deepest knot.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredModel {
    boundaries: Vec<f64>,
    velocities: Vec<f64>,
}

impl LayeredModel {
    pub fn layer_count(&self) -> usize {
        self.velocities.len()
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    pub fn top(&self) -> f64 {
        self.boundaries[0]
    }

    pub fn bottom_of(&self, layer: usize) -> f64 {
        self.boundaries
            .get(layer + 1)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Layer containing `depth`; `None` above the model top.
    pub fn layer_index(&self, depth: f64) -> Option<usize> {
        if depth < self.top() {
            return None;
        }
        Some(
            self.boundaries
                .partition_point(|&boundary| boundary <= depth)
                .saturating_sub(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_extended_to_model_depth() {
        let profile = SoundVelocityProfile::from_knots(&[(0.0, 1500.0), (1000.0, 1520.0)]).unwrap();
        let knots: Vec<(f64, f64)> = profile.knots().collect();
        assert_eq!(knots.last(), Some(&(MAX_MODEL_DEPTH, 1520.0)));
        assert_eq!(profile.original_knots().len(), 2);
    }

    #[test]
    fn deep_profile_is_not_extended() {
        let profile =
            SoundVelocityProfile::from_knots(&[(0.0, 1500.0), (MAX_MODEL_DEPTH, 1540.0)]).unwrap();
        assert_eq!(profile.knots().count(), 2);
    }

    #[test]
    fn degenerate_profiles_are_rejected() {
        assert!(SoundVelocityProfile::from_knots(&[(0.0, 1500.0)]).is_err());
        assert!(SoundVelocityProfile::from_knots(&[(10.0, 1500.0), (10.0, 1501.0)]).is_err());
        assert!(SoundVelocityProfile::from_knots(&[(10.0, 1500.0), (5.0, 1501.0)]).is_err());
        assert!(SoundVelocityProfile::from_knots(&[(0.0, 1500.0), (5.0, 0.0)]).is_err());
        assert!(SoundVelocityProfile::half_space(f64::NAN).is_err());
    }

    #[test]
    fn layers_average_bounding_knots() {
        let profile = SoundVelocityProfile::from_knots(&[
            (0.0, 1500.0),
            (1000.0, 1520.0),
            (MAX_MODEL_DEPTH, 1520.0),
        ])
        .unwrap();
        let model = profile.layered_model();
        assert_eq!(model.velocities(), &[1510.0, 1520.0, 1520.0]);
        assert_eq!(model.layer_index(0.0), Some(0));
        assert_eq!(model.layer_index(999.0), Some(0));
        assert_eq!(model.layer_index(1000.0), Some(1));
        assert_eq!(model.layer_index(20_000.0), Some(2));
        assert_eq!(model.layer_index(-1.0), None);
        assert_eq!(model.bottom_of(2), f64::INFINITY);
    }

    #[test]
    fn parse_reads_commented_table() {
        let profile = SoundVelocityProfile::parse("# svp\n5 1490\n50 1485\n").unwrap();
        assert_eq!(profile.shallowest_depth(), 5.0);
        assert_eq!(profile.layered_model().velocities()[0], 1487.5);
    }

    #[test]
    fn default_is_half_space() {
        let model = SoundVelocityProfile::default().layered_model();
        assert!(model
            .velocities()
            .iter()
            .all(|&v| v == DEFAULT_HALF_SPACE_VELOCITY));
    }
}
