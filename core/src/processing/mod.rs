pub mod ancillary;
pub mod beam;
pub mod buffer_pool;
pub mod latency;
pub mod ping;
pub mod raytrace;
pub mod sensors;
pub mod solver;
pub mod svp;
pub mod table;
pub mod timeseries;

pub use beam::{BeamGeometryCorrector, PingFrame, PreparedBeam};
pub use buffer_pool::BufferPool;
pub use latency::TimeLatencyModel;
pub use ping::{PingProcessor, PingState, SynchronousRecord};
pub use raytrace::{RayLimit, RayPoint, RayStatus, RayTable, Raytracer, TableHit};
pub use sensors::{Attitude, FilterWindows, SensorSet, SensorSetBuilder, SensorSetOptions};
pub use solver::{blend_angles, AngleSolver, Solution, SolveTarget};
pub use svp::{LayeredModel, SoundVelocityProfile};
pub use timeseries::{Reading, SensorTimeSeries};
