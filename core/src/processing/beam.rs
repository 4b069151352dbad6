use crate::math::angles::{
    angular_difference, rollpitch_to_takeoff, wrap_180, xyz_to_takeoff, Takeoff,
};
use crate::prelude::{AzimuthSource, StageConfig};
use crate::processing::raytrace::{RayLimit, Raytracer};
use crate::processing::sensors::{Attitude, SensorSet};
use crate::processing::solver::{blend_angles, AngleSolver, Solution, SolveTarget};
use crate::records::{CorrectedBeam, Ping, SensorOffsetGeometry};

/// Ping-level values every beam of a ping is corrected against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingFrame {
    /// Synchronized heading at ping time, degrees.
    pub heading: f64,
    /// Synchronized transducer depth, metres.
    pub transducer_depth: f64,
    /// Attitude used when the attitude channel is empty.
    pub attitude: Attitude,
}

/// Beam geometry resolved from the sensors, ready for the angle solves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreparedBeam {
    pub index: usize,
    /// Takeoff from the transmit and receive attitude, yaw-corrected.
    pub takeoff: Takeoff,
    pub one_way_time: f64,
    /// Ray source depth before the per-ping heave offset.
    pub source_depth: f64,
    pub target_distance: f64,
    /// Reported sounding depth below the surface.
    pub target_depth: f64,
    pub transducer_depth: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub sounding_azimuth: f64,
}

/// Recomputes takeoff angle, azimuth and sounding position for single beams.
pub struct BeamGeometryCorrector<'a> {
    raytracer: &'a Raytracer,
    geometry: &'a SensorOffsetGeometry,
    config: &'a StageConfig,
}

impl<'a> BeamGeometryCorrector<'a> {
    pub fn new(
        raytracer: &'a Raytracer,
        geometry: &'a SensorOffsetGeometry,
        config: &'a StageConfig,
    ) -> Self {
        Self {
            raytracer,
            geometry,
            config,
        }
    }

    fn solver(&self) -> AngleSolver<'a> {
        AngleSolver::new(self.raytracer, self.config)
    }

    /// Synchronizes the sensors to the beam's transmit and receive times.
    ///
    /// Returns `None` for beams that must not be solved: unusable travel time,
    /// cleared validity flag, failed detection mask or an unknown sector.
    pub fn prepare(
        &self,
        ping: &Ping,
        index: usize,
        frame: &PingFrame,
        sensors: &mut SensorSet,
    ) -> Option<PreparedBeam> {
        let beam = ping.beams.get(index)?;
        if !beam.is_usable() {
            return None;
        }
        let sector = ping.sector_of(beam)?;

        let transmit_time = ping.time + sector.offset;
        let receive_time = transmit_time + beam.travel_time;
        let transmit_heading = sensors
            .heading_at(transmit_time)
            .map(|heading| heading + self.geometry.heading_bias)
            .unwrap_or(frame.heading);
        let transmit = sensors.attitude_at(transmit_time).unwrap_or(frame.attitude);
        let receive = sensors.attitude_at(receive_time).unwrap_or(frame.attitude);

        let differential_heave = receive.heave - transmit.heave;
        let transmit_lever = self.geometry.sonar_offset(transmit.roll, transmit.pitch);
        let receive_lever = self.geometry.sonar_offset(receive.roll, receive.pitch);
        let source_depth = frame.transducer_depth - differential_heave
            + (receive_lever.z - transmit_lever.z);

        let alpha = sector.tilt_deg - transmit.pitch + self.geometry.pitch_bias;
        let beta = 90.0 - (beam.pointing_deg + receive.roll - self.geometry.roll_bias);
        let mut takeoff = rollpitch_to_takeoff(alpha, beta);
        takeoff.azimuth = wrap_180(
            takeoff.azimuth - angular_difference(frame.heading, transmit_heading),
        );

        let beam_lever = self.geometry.sonar_offset(receive.roll, transmit.pitch);
        let transmit_alongtrack = ping.speed * sector.offset;
        let offset_x = beam_lever.x;
        let offset_y = beam_lever.y + transmit_alongtrack;
        let across = beam.acrosstrack - offset_x;
        let along = beam.alongtrack - offset_y;

        Some(PreparedBeam {
            index,
            takeoff,
            one_way_time: 0.5 * beam.travel_time,
            source_depth,
            target_distance: across.hypot(along),
            target_depth: beam.depth + frame.transducer_depth,
            transducer_depth: frame.transducer_depth,
            offset_x,
            offset_y,
            sounding_azimuth: xyz_to_takeoff(across, along, beam.depth).azimuth,
        })
    }

    /// Distance-matched solve from the attitude takeoff angle.
    pub fn solve_distance(&self, prepared: &PreparedBeam, heave_offset: f64) -> Solution {
        self.solver().solve(
            prepared.takeoff.theta,
            prepared.one_way_time,
            prepared.source_depth + heave_offset,
            SolveTarget::Distance(prepared.target_distance),
        )
    }

    /// Reported minus raytraced depth of a distance-matched beam.
    pub fn heave_offset(&self, prepared: &PreparedBeam) -> (f64, Solution) {
        let solution = self.solve_distance(prepared, 0.0);
        (prepared.target_depth - solution.ray.depth, solution)
    }

    pub fn correct(&self, prepared: &PreparedBeam, heave_offset: f64) -> CorrectedBeam {
        let source_depth = prepared.source_depth + heave_offset;
        let by_distance = self.solve_distance(prepared, heave_offset);
        let by_depth = self.solver().solve(
            by_distance.angle,
            prepared.one_way_time,
            source_depth,
            SolveTarget::Depth(prepared.target_depth),
        );
        let depression = blend_angles(by_distance.angle, by_depth.angle);
        let ray = self.raytracer.trace(
            depression,
            RayLimit::TravelTime(prepared.one_way_time),
            source_depth,
        );

        let azimuth = match self.config.azimuth_source {
            AzimuthSource::Attitude => prepared.takeoff.azimuth,
            AzimuthSource::Soundings => prepared.sounding_azimuth,
        };
        let (sin_az, cos_az) = azimuth.to_radians().sin_cos();

        CorrectedBeam {
            depression,
            azimuth,
            range: 2.0 * prepared.one_way_time,
            depth: ray.depth - prepared.transducer_depth,
            acrosstrack: prepared.offset_x + ray.distance * sin_az,
            alongtrack: prepared.offset_y + ray.distance * cos_az,
            valid: true,
            converged: by_distance.converged && by_depth.converged,
            ray_terminated: by_distance.ray.status.is_terminated()
                || by_depth.ray.status.is_terminated()
                || ray.status.is_terminated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::svp::SoundVelocityProfile;
    use crate::records::{Beam, TransmitSector};

    fn frame() -> PingFrame {
        PingFrame {
            heading: 90.0,
            transducer_depth: 5.0,
            attitude: Attitude::default(),
        }
    }

    fn ping_with(beam: Beam) -> Ping {
        Ping {
            time: 100.0,
            heading: 90.0,
            transducer_depth: 5.0,
            sectors: vec![TransmitSector::default()],
            beams: vec![beam],
            ..Default::default()
        }
    }

    /// Beam whose reported position is exactly what the half-space predicts.
    fn consistent_beam(pointing: f64, travel_time: f64) -> Beam {
        let distance = 1500.0 * 0.5 * travel_time;
        let theta = pointing.to_radians();
        Beam {
            sector: 0,
            pointing_deg: pointing,
            travel_time,
            valid: true,
            detection: 0,
            acrosstrack: -distance * theta.sin(),
            alongtrack: 0.0,
            depth: distance * theta.cos(),
        }
    }

    #[test]
    fn non_positive_range_is_not_prepared() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::default());
        let geometry = SensorOffsetGeometry::default();
        let config = StageConfig::default();
        let corrector = BeamGeometryCorrector::new(&raytracer, &geometry, &config);
        let mut sensors = SensorSet::default();

        let ping = ping_with(consistent_beam(30.0, 0.0));
        assert!(corrector.prepare(&ping, 0, &frame(), &mut sensors).is_none());
        let flagged = Beam {
            detection: 0x80,
            ..consistent_beam(30.0, 0.2)
        };
        let ping = ping_with(flagged);
        assert!(corrector.prepare(&ping, 0, &frame(), &mut sensors).is_none());
    }

    #[test]
    fn unknown_sector_is_not_prepared() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::default());
        let geometry = SensorOffsetGeometry::default();
        let config = StageConfig::default();
        let corrector = BeamGeometryCorrector::new(&raytracer, &geometry, &config);
        let mut ping = ping_with(consistent_beam(30.0, 0.2));
        ping.sectors.clear();
        assert!(corrector
            .prepare(&ping, 0, &frame(), &mut SensorSet::default())
            .is_none());
    }

    #[test]
    fn consistent_beam_is_reproduced() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::default());
        let geometry = SensorOffsetGeometry::default();
        let config = StageConfig::default();
        let corrector = BeamGeometryCorrector::new(&raytracer, &geometry, &config);
        let beam = consistent_beam(40.0, 0.4);
        let ping = ping_with(beam);

        let prepared = corrector
            .prepare(&ping, 0, &frame(), &mut SensorSet::default())
            .unwrap();
        assert!((prepared.takeoff.theta - 40.0).abs() < 1e-9);
        assert!((prepared.takeoff.azimuth + 90.0).abs() < 1e-9);

        let corrected = corrector.correct(&prepared, 0.0);
        assert!(corrected.valid);
        assert!(corrected.converged);
        assert!((corrected.depression - 40.0).abs() < 0.001);
        assert!((corrected.depth - beam.depth).abs() < 0.01);
        assert!((corrected.acrosstrack - beam.acrosstrack).abs() < 0.01);
        assert!(corrected.alongtrack.abs() < 0.01);
        assert_eq!(corrected.range, beam.travel_time);
    }

    #[test]
    fn sounding_azimuth_follows_reported_position() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::default());
        let geometry = SensorOffsetGeometry::default();
        let config = StageConfig {
            azimuth_source: AzimuthSource::Soundings,
            ..Default::default()
        };
        let corrector = BeamGeometryCorrector::new(&raytracer, &geometry, &config);
        let mut beam = consistent_beam(-35.0, 0.3);
        beam.alongtrack = 2.0;
        let ping = ping_with(beam);

        let prepared = corrector
            .prepare(&ping, 0, &frame(), &mut SensorSet::default())
            .unwrap();
        let corrected = corrector.correct(&prepared, 0.0);
        let expected = beam.acrosstrack.atan2(beam.alongtrack).to_degrees();
        assert!((corrected.azimuth - expected).abs() < 1e-9);
    }

    #[test]
    fn heading_change_rotates_azimuth() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::default());
        let geometry = SensorOffsetGeometry::default();
        let config = StageConfig::default();
        let corrector = BeamGeometryCorrector::new(&raytracer, &geometry, &config);
        let mut builder = crate::processing::sensors::SensorSetBuilder::new();
        builder.push(crate::records::SensorSample::heading(99.0, 92.0));
        builder.push(crate::records::SensorSample::heading(101.0, 92.0));
        let mut sensors = builder.freeze(&Default::default());

        let ping = ping_with(consistent_beam(30.0, 0.2));
        let prepared = corrector.prepare(&ping, 0, &frame(), &mut sensors).unwrap();
        assert!((prepared.takeoff.azimuth + 92.0).abs() < 1e-9);
    }
}
