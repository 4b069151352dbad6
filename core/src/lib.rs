//! Beam-geometry recalculation core for swath-sonar preprocessing.
//!
//! Asynchronous navigation, heading and attitude streams are materialized in a
//! first pass, then each ping is corrected in a second pass: sensors are
//! synchronized to transmit and receive time, a per-ping heave offset is
//! calibrated on the nadir beam, and every beam's takeoff angle is recovered by
//! ray tracing through a layered sound-speed model.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod telemetry;

pub use prelude::{ProcessingStage, StageConfig, StageError, StageResult};
