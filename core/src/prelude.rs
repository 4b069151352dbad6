use serde::{Deserialize, Serialize};

/// Which azimuth is reported for a corrected beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AzimuthSource {
    /// Azimuth from transmit/receive attitude, yaw-corrected to the ping heading.
    #[default]
    Attitude,
    /// Azimuth implied by the instrument-reported sounding position.
    Soundings,
}

/// Shared configuration for the ping-correction stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Residual precision of the angle solver, metres.
    pub precision: f64,
    pub max_iterations: usize,
    /// First perturbation of the takeoff angle, degrees.
    pub initial_step_deg: f64,
    pub azimuth_source: AzimuthSource,
    /// Number of corrected-beam buffers that may be checked out at once.
    pub pool_size: usize,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            precision: 0.001,
            max_iterations: 50,
            initial_step_deg: 0.01,
            azimuth_source: AzimuthSource::Attitude,
            pool_size: 8,
        }
    }
}

/// Common error type for stage execution.
///
/// Only fatal conditions live here. Convergence failures, ray terminations
/// and sensor gaps are reported through beam flags and telemetry counters.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("bad argument: {0}")]
    BadArgument(String),
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing stateful per-record processing stages.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}
