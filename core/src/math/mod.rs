pub mod angles;
pub mod matrix;
pub mod stats;

pub use angles::Takeoff;
pub use matrix::MatrixHelper;
pub use stats::StatsHelper;
