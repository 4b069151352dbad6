use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use swathcore::prelude::StageConfig;
use swathcore::processing::{
    FilterWindows, SensorSetOptions, SoundVelocityProfile, TimeLatencyModel,
};
use swathcore::records::{SensorChannel, SensorOffsetGeometry};

/// Where the sound velocity profile comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvpSource {
    /// Half-space of the given velocity, metres per second.
    Constant(f64),
    /// Two-column `depth velocity` table.
    File(PathBuf),
}

/// Where the sensor time latency comes from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencySource {
    #[default]
    None,
    Constant(f64),
    /// Two-column `time latency` table.
    File(PathBuf),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub svp: SvpSource,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub latency: LatencySource,
    pub latency_channels: Vec<SensorChannel>,
    pub filters: FilterWindows,
    pub geometry: SensorOffsetGeometry,
    pub stage: StageConfig,
    pub generator: GeneratorConfig,
    /// Outputs are written to `<prefix>.json`, `<prefix>.sta` and so on.
    pub output_prefix: PathBuf,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            svp: SvpSource::Constant(1500.0),
            latency: LatencySource::None,
            latency_channels: SensorChannel::ALL.to_vec(),
            filters: FilterWindows::default(),
            geometry: SensorOffsetGeometry::default(),
            stage: StageConfig::default(),
            generator: GeneratorConfig::default(),
            output_prefix: PathBuf::from("swath"),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        sound_velocity: f64,
        svp_file: Option<PathBuf>,
        latency: Option<f64>,
        output_prefix: PathBuf,
    ) -> Self {
        Self {
            svp: svp_file.map_or(SvpSource::Constant(sound_velocity), SvpSource::File),
            latency: latency.map_or(LatencySource::None, LatencySource::Constant),
            output_prefix,
            ..Default::default()
        }
    }

    pub fn to_stage_config(&self) -> StageConfig {
        self.stage.clone()
    }

    pub fn sound_velocity_profile(&self) -> anyhow::Result<SoundVelocityProfile> {
        match &self.svp {
            SvpSource::Constant(velocity) => SoundVelocityProfile::half_space(*velocity)
                .context("building half-space sound velocity profile"),
            SvpSource::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading sound velocity profile {}", path.display()))?;
                SoundVelocityProfile::parse(&text)
                    .with_context(|| format!("parsing sound velocity profile {}", path.display()))
            }
        }
    }

    pub fn sensor_options(&self) -> anyhow::Result<SensorSetOptions> {
        let latency = match &self.latency {
            LatencySource::None => TimeLatencyModel::None,
            LatencySource::Constant(latency) => TimeLatencyModel::constant(*latency),
            LatencySource::File(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading time latency model {}", path.display()))?;
                TimeLatencyModel::parse(&text)
                    .with_context(|| format!("parsing time latency model {}", path.display()))?
            }
        };
        Ok(SensorSetOptions {
            latency,
            latency_channels: self.latency_channels.clone(),
            filters: self.filters,
        })
    }

    /// Output path for the given extension.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        let mut name = self.output_prefix.clone().into_os_string();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_stage_config() {
        let cfg = WorkflowConfig::from_args(1490.0, None, Some(0.02), PathBuf::from("out/run"));
        assert_eq!(cfg.to_stage_config().max_iterations, 50);
        assert_eq!(cfg.svp, SvpSource::Constant(1490.0));
        assert_eq!(cfg.output_path("sta"), PathBuf::from("out/run.sta"));
        let options = cfg.sensor_options().unwrap();
        assert_eq!(options.latency.latency_at(10.0), 0.02);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"svp:\n  constant: 1480.0\nlatency:\n  constant: 0.01\nfilters:\n  heading: 0.5\nstage:\n  precision: 0.0005\n  azimuth_source: soundings\ngeometry:\n  sonar: { x: 0.5, y: 1.0, z: 2.0 }\n  roll_bias: 0.1\noutput_prefix: survey\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.svp, SvpSource::Constant(1480.0));
        assert_eq!(cfg.stage.precision, 0.0005);
        assert_eq!(cfg.stage.max_iterations, 50);
        assert_eq!(cfg.filters.heading, 0.5);
        assert_eq!(cfg.geometry.sonar.y, 1.0);
        assert_eq!(cfg.latency_channels.len(), SensorChannel::ALL.len());
    }

    #[test]
    fn svp_and_latency_tables_are_read_from_files() {
        let mut svp = NamedTempFile::new().unwrap();
        svp.write_all(b"# depth velocity\n0 1500\n500 1490\n").unwrap();
        let mut latency = NamedTempFile::new().unwrap();
        latency.write_all(b"0 0.1\n100 0.2\n").unwrap();

        let cfg = WorkflowConfig {
            svp: SvpSource::File(svp.path().to_path_buf()),
            latency: LatencySource::File(latency.path().to_path_buf()),
            ..Default::default()
        };
        let profile = cfg.sound_velocity_profile().unwrap();
        assert_eq!(profile.original_knots().len(), 2);
        let options = cfg.sensor_options().unwrap();
        assert!((options.latency.latency_at(50.0) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn missing_svp_file_is_an_error() {
        let cfg = WorkflowConfig {
            svp: SvpSource::File(PathBuf::from("/nonexistent/profile.svp")),
            ..Default::default()
        };
        assert!(cfg.sound_velocity_profile().is_err());
    }
}
