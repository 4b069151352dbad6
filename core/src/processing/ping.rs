use serde::{Deserialize, Serialize};

use crate::math::angles::wrap_360;
use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingStage, StageConfig, StageError, StageResult};
use crate::processing::beam::{BeamGeometryCorrector, PingFrame, PreparedBeam};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::raytrace::Raytracer;
use crate::processing::sensors::{Attitude, SensorSet};
use crate::records::{CorrectedBeam, CorrectedPing, Ping, SensorOffsetGeometry};
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingState {
    Init,
    Sync,
    NadirCalibrate,
    BeamLoop,
    Emit,
}

/// Sensor values synchronized to one ping's timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SynchronousRecord {
    pub time: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
    pub transducer_depth: f64,
}

/// Second-pass stage turning raw pings into corrected pings.
pub struct PingProcessor {
    raytracer: Raytracer,
    geometry: SensorOffsetGeometry,
    sensors: SensorSet,
    config: Option<StageConfig>,
    pool: BufferPool<CorrectedBeam>,
    state: PingState,
    synchronous: Vec<SynchronousRecord>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

fn enter(state: &mut PingState, logger: &LogManager, next: PingState) {
    logger.trace(&format!("ping state {:?} -> {:?}", state, next));
    *state = next;
}

impl PingProcessor {
    pub fn new(raytracer: Raytracer, geometry: SensorOffsetGeometry, sensors: SensorSet) -> Self {
        Self {
            raytracer,
            geometry,
            sensors,
            config: None,
            pool: BufferPool::with_capacity(0),
            state: PingState::Init,
            synchronous: Vec::new(),
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn state(&self) -> PingState {
        self.state
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn sensors(&self) -> &SensorSet {
        &self.sensors
    }

    /// Rows recorded at every processed ping, in processing order.
    pub fn synchronous_records(&self) -> &[SynchronousRecord] {
        &self.synchronous
    }

    /// Hands a corrected ping's beam buffer back once it has been written.
    pub fn recycle(&mut self, ping: CorrectedPing) {
        self.pool.release(ping.beams);
    }

    fn synchronize(&mut self, ping: &Ping) -> (PingFrame, CorrectedPing) {
        let sensors = &mut self.sensors;
        let (longitude, latitude) = sensors
            .position_at(ping.time)
            .unwrap_or((ping.longitude, ping.latitude));
        let heading = wrap_360(
            sensors.heading_at(ping.time).unwrap_or(ping.heading) + self.geometry.heading_bias,
        );
        let attitude = sensors.attitude_at(ping.time).unwrap_or(Attitude {
            roll: ping.roll,
            pitch: ping.pitch,
            heave: ping.heave,
        });
        let transducer_depth = sensors
            .sensor_depth_at(ping.time)
            .unwrap_or(ping.transducer_depth);
        let altitude = sensors.altitude_at(ping.time);

        self.synchronous.push(SynchronousRecord {
            time: ping.time,
            roll: attitude.roll,
            pitch: attitude.pitch,
            heading,
            transducer_depth,
        });

        let frame = PingFrame {
            heading,
            transducer_depth,
            attitude,
        };
        let header = CorrectedPing {
            time: ping.time,
            longitude,
            latitude,
            heading,
            roll: attitude.roll,
            pitch: attitude.pitch,
            heave: attitude.heave,
            transducer_depth,
            altitude,
            ..Default::default()
        };
        (frame, header)
    }
}

impl ProcessingStage for PingProcessor {
    type Input = Ping;
    type Output = CorrectedPing;

    fn initialize(&mut self, config: &StageConfig) -> StageResult<()> {
        if config.precision.is_nan() || config.precision <= 0.0 || config.max_iterations == 0 {
            return Err(StageError::BadArgument(format!(
                "solver precision {} and iteration cap {} must be positive",
                config.precision, config.max_iterations
            )));
        }
        self.config = Some(config.clone());
        self.pool = BufferPool::with_capacity(config.pool_size.max(1));
        self.state = PingState::Init;
        self.logger.record(&format!(
            "ping processor ready: {} layers, precision {} m, {} iterations",
            self.raytracer.model().layer_count(),
            config.precision,
            config.max_iterations
        ));
        Ok(())
    }

    fn execute(&mut self, ping: Ping) -> StageResult<CorrectedPing> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| StageError::Internal("ping processor not initialized".into()))?;

        enter(&mut self.state, &self.logger, PingState::Sync);
        let (frame, mut corrected) = self.synchronize(&ping);

        enter(&mut self.state, &self.logger, PingState::NadirCalibrate);
        let corrector = BeamGeometryCorrector::new(&self.raytracer, &self.geometry, &config);
        let prepared: Vec<Option<PreparedBeam>> = (0..ping.beams.len())
            .map(|index| corrector.prepare(&ping, index, &frame, &mut self.sensors))
            .collect();

        let nadir = prepared
            .iter()
            .flatten()
            .min_by(|a, b| a.takeoff.theta.total_cmp(&b.takeoff.theta));
        let heave_offset = match nadir {
            Some(beam) => {
                let (offset, solution) = corrector.heave_offset(beam);
                if !solution.converged {
                    self.logger.trace(&format!(
                        "nadir beam {} unconverged after {} iterations",
                        beam.index, solution.iterations
                    ));
                }
                corrected.nadir_beam = Some(beam.index);
                offset
            }
            None => 0.0,
        };

        enter(&mut self.state, &self.logger, PingState::BeamLoop);
        let mut beams = self.pool.checkout(ping.beams.len())?;
        let mut residuals = Vec::with_capacity(beams.len());
        for (slot, prepared) in beams.iter_mut().zip(&prepared) {
            *slot = match prepared {
                Some(beam) => {
                    let result = corrector.correct(beam, heave_offset);
                    self.metrics.record_solved();
                    if !result.converged {
                        self.metrics.record_convergence_failure();
                    }
                    if result.ray_terminated {
                        self.metrics.record_ray_termination();
                    }
                    residuals.push(beam.target_depth - beam.transducer_depth - result.depth);
                    result
                }
                None => {
                    self.metrics.record_invalid();
                    CorrectedBeam::invalid()
                }
            };
        }
        self.metrics.record_sensor_gaps(self.sensors.take_gaps());

        enter(&mut self.state, &self.logger, PingState::Emit);
        corrected.heave_offset = heave_offset;
        corrected.beams = beams;
        corrected.notes.push(format!("heave offset {:.3} m", heave_offset));
        if !residuals.is_empty() {
            corrected.notes.push(format!(
                "depth residual RMS {:.4} m",
                StatsHelper::rms(&residuals)
            ));
        }
        self.metrics.record_ping();
        self.logger.trace(&format!(
            "ping {:.6}: {} of {} beams valid",
            ping.time,
            corrected.valid_beam_count(),
            corrected.beams.len()
        ));
        Ok(corrected)
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.config = None;
        self.state = PingState::Init;
        self.sensors.rewind();
        self.logger.record(&format!(
            "ping processor finished: {}",
            self.metrics.snapshot().to_json()
        ));
    }
}
