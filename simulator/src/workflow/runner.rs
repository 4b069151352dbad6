use crate::workflow::config::WorkflowConfig;
use crate::workflow::survey::{read_survey, SurveyRecord};
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use swathcore::prelude::ProcessingStage;
use swathcore::processing::ancillary::{
    write_async_attitude, write_async_heading, write_sonar_depth, write_synchronous_attitude,
};
use swathcore::processing::{PingProcessor, Raytracer, SensorSetBuilder};
use swathcore::records::SensorChannel;
use swathcore::telemetry::{LogManager, MetricsSnapshot};

pub struct WorkflowResult {
    pub pings: usize,
    pub valid_beams: usize,
    pub metrics: MetricsSnapshot,
    pub outputs: Vec<PathBuf>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Runs both passes over the survey at `input` and writes every output.
    pub fn execute(&self, input: &Path) -> anyhow::Result<WorkflowResult> {
        let logger = LogManager::for_component("swathsim");
        let stage_config = self.config.to_stage_config();

        let mut builder = SensorSetBuilder::new();
        let mut span: Option<(f64, f64)> = None;
        let mut ping_count = 0;
        for record in read_survey(input)? {
            match record? {
                SurveyRecord::Sensor(sample) => builder.push(sample),
                SurveyRecord::Ping(ping) => {
                    ping_count += 1;
                    span = Some(match span {
                        Some((start, end)) => (start.min(ping.time), end.max(ping.time)),
                        None => (ping.time, ping.time),
                    });
                }
            }
        }
        logger.record(&format!(
            "first pass: {} pings, {} attitude and {} heading samples",
            ping_count,
            builder.len(SensorChannel::Attitude),
            builder.len(SensorChannel::Heading)
        ));

        let sensors = builder.freeze(
            &self
                .config
                .sensor_options()
                .context("preparing sensor series")?,
        );
        let profile = self
            .config
            .sound_velocity_profile()
            .context("preparing sound velocity profile")?;
        let mut processor = PingProcessor::new(
            Raytracer::from_profile(&profile),
            self.config.geometry,
            sensors,
        );
        processor
            .initialize(&stage_config)
            .context("initializing ping processor")?;

        let json_path = self.config.output_path("json");
        let mut out = create(&json_path)?;
        let mut pings = 0;
        let mut valid_beams = 0;
        let mut previous: Option<f64> = None;
        for record in read_survey(input)? {
            let ping = match record? {
                SurveyRecord::Ping(ping) => ping,
                SurveyRecord::Sensor(_) => continue,
            };
            if previous.map_or(false, |time| ping.time < time) {
                logger.warn(&format!("ping {} is out of time order", pings));
            }
            previous = Some(ping.time);

            let corrected = processor
                .execute(ping)
                .with_context(|| format!("correcting ping {}", pings))?;
            serde_json::to_writer(&mut out, &corrected).context("serializing corrected ping")?;
            out.write_all(b"\n")?;
            valid_beams += corrected.valid_beam_count();
            pings += 1;
            processor.recycle(corrected);
        }
        out.flush()
            .with_context(|| format!("flushing {}", json_path.display()))?;

        let mut outputs = vec![json_path];
        outputs.extend(self.write_ancillary(&processor, span)?);
        let metrics = processor.metrics();
        processor.cleanup();
        logger.record(&format!("second pass: {}", metrics.to_json()));

        Ok(WorkflowResult {
            pings,
            valid_beams,
            metrics,
            outputs,
        })
    }

    fn write_ancillary(
        &self,
        processor: &PingProcessor,
        span: Option<(f64, f64)>,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        let records = processor.synchronous_records();

        let path = self.config.output_path("sta");
        let mut out = create(&path)?;
        write_synchronous_attitude(&mut out, records)
            .with_context(|| format!("writing {}", path.display()))?;
        out.flush()?;
        written.push(path);

        let path = self.config.output_path("ats");
        let mut out = create(&path)?;
        write_sonar_depth(&mut out, records)
            .with_context(|| format!("writing {}", path.display()))?;
        out.flush()?;
        written.push(path);

        let Some((start, end)) = span else {
            return Ok(written);
        };
        let sensors = processor.sensors();
        if !sensors.series(SensorChannel::Heading).is_empty() {
            let path = self.config.output_path("ath");
            let mut out = create(&path)?;
            write_async_heading(&mut out, sensors.series(SensorChannel::Heading), start, end)
                .with_context(|| format!("writing {}", path.display()))?;
            out.flush()?;
            written.push(path);
        }
        if !sensors.series(SensorChannel::Attitude).is_empty() {
            let path = self.config.output_path("ata");
            let mut out = create(&path)?;
            write_async_attitude(&mut out, sensors.series(SensorChannel::Attitude), start, end)
                .with_context(|| format!("writing {}", path.display()))?;
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}
