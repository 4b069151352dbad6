use serde::{Deserialize, Serialize};

use crate::math::MatrixHelper;

/// Mounting point in the vessel frame: starboard, forward, down (metres).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeverArm {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LeverArm {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    fn minus(&self, other: &LeverArm) -> [f64; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }
}

/// Static sensor mounting geometry of the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorOffsetGeometry {
    pub sonar: LeverArm,
    pub position: LeverArm,
    /// Motion reference unit, the centre of rotation for roll and pitch.
    pub motion: LeverArm,
    pub roll_bias: f64,
    pub pitch_bias: f64,
    pub heading_bias: f64,
}

impl SensorOffsetGeometry {
    /// Sonar position relative to the position sensor in the level frame.
    ///
    /// `x` and `y` are the horizontal offsets including the displacement caused
    /// by rotating the sonar about the motion sensor. `z` is only that induced
    /// vertical displacement, positive down.
    pub fn sonar_offset(&self, roll: f64, pitch: f64) -> LeverArm {
        let arm = self.sonar.minus(&self.motion);
        let rotation =
            MatrixHelper::attitude_rotation(roll - self.roll_bias, pitch - self.pitch_bias);
        let rotated = MatrixHelper::apply(rotation.view(), arm);
        let [static_x, static_y, _] = self.sonar.minus(&self.position);
        LeverArm {
            x: static_x + rotated[0] - arm[0],
            y: static_y + rotated[1] - arm[1],
            z: rotated[2] - arm[2],
        }
    }
}
