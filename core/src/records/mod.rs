pub mod geometry;
pub mod ping;
pub mod sensor;

pub use geometry::{LeverArm, SensorOffsetGeometry};
pub use ping::{Beam, CorrectedBeam, CorrectedPing, Ping, TransmitSector};
pub use sensor::{AxisKind, SensorChannel, SensorSample, SensorValue, MAX_AXES};
