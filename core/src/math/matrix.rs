use ndarray::{arr1, arr2, Array1, Array2, ArrayView2};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Multiply two 2D arrays.
    pub fn multiply(lhs: ArrayView2<f64>, rhs: ArrayView2<f64>) -> Array2<f64> {
        lhs.dot(&rhs)
    }

    /// Body-to-level rotation in the (starboard, forward, down) frame.
    ///
    /// Roll positive lifts the port side, pitch positive lifts the bow.
    pub fn attitude_rotation(roll_deg: f64, pitch_deg: f64) -> Array2<f64> {
        let (sr, cr) = roll_deg.to_radians().sin_cos();
        let (sp, cp) = pitch_deg.to_radians().sin_cos();
        let roll = arr2(&[[cr, 0.0, -sr], [0.0, 1.0, 0.0], [sr, 0.0, cr]]);
        let pitch = arr2(&[[1.0, 0.0, 0.0], [0.0, cp, sp], [0.0, -sp, cp]]);
        Self::multiply(pitch.view(), roll.view())
    }

    pub fn apply(rotation: ArrayView2<f64>, vector: [f64; 3]) -> [f64; 3] {
        let rotated: Array1<f64> = rotation.dot(&arr1(&vector));
        [rotated[0], rotated[1], rotated[2]]
    }
}
