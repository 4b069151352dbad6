use crate::generator::template::{sine_wave, swell};
use crate::workflow::survey::SurveyRecord;
use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use swathcore::math::angles::{rollpitch_to_takeoff, wrap_360};
use swathcore::processing::{RayLimit, Raytracer, SoundVelocityProfile};
use swathcore::records::{Beam, Ping, SensorSample, TransmitSector};

/// Configuration for generating a synthetic flat-seafloor survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub pings: usize,
    pub beams: usize,
    /// Full swath opening, degrees.
    pub swath_deg: f64,
    /// Seconds between pings.
    pub ping_interval: f64,
    /// Asynchronous sensor rate, hertz.
    pub sensor_rate: f64,
    pub water_depth: f64,
    pub transducer_depth: f64,
    pub speed: f64,
    pub heading: f64,
    pub roll_amplitude: f64,
    pub pitch_amplitude: f64,
    pub heave_amplitude: f64,
    /// Swell period shared by the motion channels, seconds.
    pub motion_period: f64,
    /// Transmit delay of the starboard sector, seconds.
    pub sector_offset: f64,
    /// Standard travel-time jitter, seconds.
    pub noise: f64,
    /// Fraction of beams carrying a rejected detection.
    pub rejected_fraction: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pings: 50,
            beams: 64,
            swath_deg: 120.0,
            ping_interval: 1.0,
            sensor_rate: 10.0,
            water_depth: 200.0,
            transducer_depth: 4.0,
            speed: 4.0,
            heading: 30.0,
            roll_amplitude: 3.0,
            pitch_amplitude: 1.5,
            heave_amplitude: 0.5,
            motion_period: 8.0,
            sector_offset: 0.002,
            noise: 0.00002,
            rejected_fraction: 0.02,
            seed: 0,
        }
    }
}

struct Motion<'a> {
    config: &'a GeneratorConfig,
}

impl Motion<'_> {
    fn roll(&self, time: f64) -> f64 {
        swell(time, self.config.roll_amplitude, self.config.motion_period, 0.0)
    }

    fn pitch(&self, time: f64) -> f64 {
        swell(time, self.config.pitch_amplitude, 0.7 * self.config.motion_period, 0.0)
    }

    fn heave(&self, time: f64) -> f64 {
        swell(time, self.config.heave_amplitude, 1.3 * self.config.motion_period, 0.0)
    }

    fn heading(&self, time: f64) -> f64 {
        wrap_360(self.config.heading + swell(time, 0.5, 3.0 * self.config.motion_period, 0.0))
    }

    /// Dead-reckoned longitude and latitude, degrees.
    fn position(&self, time: f64) -> (f64, f64) {
        const METRES_PER_DEGREE: f64 = 111_120.0;
        let distance = self.config.speed * time;
        let (sin_h, cos_h) = self.config.heading.to_radians().sin_cos();
        let latitude = 45.0 + distance * cos_h / METRES_PER_DEGREE;
        let longitude =
            -70.0 + distance * sin_h / (METRES_PER_DEGREE * latitude.to_radians().cos());
        (longitude, latitude)
    }
}

fn sensor_records(config: &GeneratorConfig, end_time: f64) -> Vec<SurveyRecord> {
    let motion = Motion { config };
    let interval = 1.0 / config.sensor_rate.max(0.1);
    let start = -2.0;
    let count = ((end_time - start + 2.0) / interval).ceil() as usize + 1;

    let rolls = sine_wave(start, interval, count, config.roll_amplitude, config.motion_period);
    let mut records = Vec::with_capacity(count * 4);
    for (time, roll) in rolls {
        let (longitude, latitude) = motion.position(time);
        records.push(SurveyRecord::Sensor(SensorSample::attitude(
            time,
            roll,
            motion.pitch(time),
            motion.heave(time),
        )));
        records.push(SurveyRecord::Sensor(SensorSample::heading(time, motion.heading(time))));
        records.push(SurveyRecord::Sensor(SensorSample::position(time, longitude, latitude)));
        records.push(SurveyRecord::Sensor(SensorSample::sensor_depth(
            time,
            config.transducer_depth - motion.heave(time),
        )));
    }
    records
}

fn build_ping(
    config: &GeneratorConfig,
    raytracer: &mut Raytracer,
    rng: &mut StdRng,
    time: f64,
) -> Ping {
    let motion = Motion { config };
    let beams = config.beams.max(1);
    let half_swath = 0.5 * config.swath_deg.clamp(0.0, 170.0);
    let step = if beams > 1 {
        2.0 * half_swath / (beams - 1) as f64
    } else {
        0.0
    };
    let roll = motion.roll(time);
    let pitch = motion.pitch(time);
    let transducer_depth = config.transducer_depth - motion.heave(time);

    let beams = (0..beams)
        .map(|index| {
            let pointing = half_swath - index as f64 * step;
            let sector = usize::from(pointing < 0.0);
            let takeoff = rollpitch_to_takeoff(-pitch, 90.0 - (pointing + roll));
            let ray = raytracer.trace(
                takeoff.theta,
                RayLimit::Depth(config.water_depth),
                transducer_depth,
            );
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            let travel_time = 2.0 * ray.travel_time + jitter;

            // The instrument solves its soundings with a cached surface ray table.
            let nominal = (takeoff.theta * 100.0).round() / 100.0;
            let hit = raytracer.table(nominal).lookup(travel_time);
            let (sin_az, cos_az) = takeoff.azimuth.to_radians().sin_cos();
            let detection = if rng.gen_bool(config.rejected_fraction.clamp(0.0, 1.0)) {
                0x80
            } else {
                0
            };

            Beam {
                sector,
                pointing_deg: pointing,
                travel_time,
                valid: !ray.status.is_terminated(),
                detection,
                acrosstrack: hit.distance * sin_az,
                alongtrack: hit.distance * cos_az,
                depth: hit.depth,
            }
        })
        .collect();

    let (longitude, latitude) = motion.position(time);
    Ping {
        time,
        longitude,
        latitude,
        heading: motion.heading(time),
        roll,
        pitch,
        heave: motion.heave(time),
        speed: config.speed,
        transducer_depth,
        sectors: vec![
            TransmitSector::default(),
            TransmitSector {
                offset: config.sector_offset,
                tilt_deg: 0.0,
            },
        ],
        beams,
    }
}

/// Builds the sensor streams followed by the pings of a synthetic survey.
pub fn build_survey(
    config: &GeneratorConfig,
    profile: &SoundVelocityProfile,
) -> anyhow::Result<Vec<SurveyRecord>> {
    let end_time = (config.pings as f64) * config.ping_interval;
    if !end_time.is_finite() || config.ping_interval <= 0.0 {
        anyhow::bail!("ping interval {} is not positive", config.ping_interval);
    }
    let capacity = config
        .pings
        .checked_mul(config.beams.max(1))
        .context("overflow computing survey size")?;
    log::info!(
        "generating {} pings with {} beams ({} soundings)",
        config.pings,
        config.beams,
        capacity
    );

    let mut raytracer = Raytracer::from_profile(profile);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = sensor_records(config, end_time);
    for index in 0..config.pings {
        let time = index as f64 * config.ping_interval;
        records.push(SurveyRecord::Ping(build_ping(
            config,
            &mut raytracer,
            &mut rng,
            time,
        )));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GeneratorConfig {
        GeneratorConfig {
            pings: 5,
            beams: 9,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn generator_builds_expected_record_counts() {
        let records = build_survey(&small(), &SoundVelocityProfile::default()).unwrap();
        let pings: Vec<&Ping> = records
            .iter()
            .filter_map(|record| match record {
                SurveyRecord::Ping(ping) => Some(ping),
                SurveyRecord::Sensor(_) => None,
            })
            .collect();
        assert_eq!(pings.len(), 5);
        assert!(pings.iter().all(|ping| ping.beams.len() == 9));
        assert!(records.len() > 5 * 4);
    }

    #[test]
    fn soundings_reach_the_seafloor() {
        let config = GeneratorConfig {
            noise: 0.0,
            roll_amplitude: 0.0,
            pitch_amplitude: 0.0,
            heave_amplitude: 0.0,
            ..small()
        };
        let records = build_survey(&config, &SoundVelocityProfile::default()).unwrap();
        let ping = records
            .iter()
            .find_map(|record| match record {
                SurveyRecord::Ping(ping) => Some(ping),
                SurveyRecord::Sensor(_) => None,
            })
            .unwrap();
        let nadir = &ping.beams[4];
        assert_eq!(nadir.pointing_deg, 0.0);
        assert!((nadir.travel_time - 2.0 * (200.0 - 4.0) / 1500.0).abs() < 1e-9);
        assert!(ping.beams[0].acrosstrack < 0.0);
        assert!(ping.beams[8].acrosstrack > 0.0);
        assert_eq!(ping.beams[8].sector, 1);
    }

    #[test]
    fn same_seed_repeats_the_survey() {
        let a = build_survey(&small(), &SoundVelocityProfile::default()).unwrap();
        let b = build_survey(&small(), &SoundVelocityProfile::default()).unwrap();
        assert_eq!(a, b);
    }
}
