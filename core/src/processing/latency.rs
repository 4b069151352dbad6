use serde::{Deserialize, Serialize};

use crate::prelude::{StageError, StageResult};
use crate::processing::table::parse_two_column;

/// Sensor time latency subtracted from asynchronous timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeLatencyModel {
    #[default]
    None,
    Constant(f64),
    /// Piecewise-linear latency, clamped to the end values outside its span.
    Series { times: Vec<f64>, latencies: Vec<f64> },
}

impl TimeLatencyModel {
    pub fn constant(latency: f64) -> Self {
        TimeLatencyModel::Constant(latency)
    }

    pub fn series(points: Vec<(f64, f64)>) -> StageResult<Self> {
        if points.is_empty() {
            return Err(StageError::BadArgument(
                "time latency model has no entries".into(),
            ));
        }
        if points.windows(2).any(|pair| pair[1].0 < pair[0].0) {
            return Err(StageError::BadArgument(
                "time latency model times must be non-decreasing".into(),
            ));
        }
        let (times, latencies) = points.into_iter().unzip();
        Ok(TimeLatencyModel::Series { times, latencies })
    }

    /// Parses a two-column `time latency` table.
    pub fn parse(text: &str) -> StageResult<Self> {
        Self::series(parse_two_column(text, "time latency model")?)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TimeLatencyModel::None)
    }

    pub fn latency_at(&self, time: f64) -> f64 {
        match self {
            TimeLatencyModel::None => 0.0,
            TimeLatencyModel::Constant(latency) => *latency,
            TimeLatencyModel::Series { times, latencies } => {
                let upper = times.partition_point(|&t| t <= time);
                if upper == 0 {
                    return latencies[0];
                }
                if upper >= times.len() {
                    return latencies[times.len() - 1];
                }
                let (t0, t1) = (times[upper - 1], times[upper]);
                let (l0, l1) = (latencies[upper - 1], latencies[upper]);
                if t1 > t0 {
                    let fraction = (time - t0) / (t1 - t0);
                    l0 * (1.0 - fraction) + l1 * fraction
                } else {
                    l0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_interpolates_and_clamps() {
        let model = TimeLatencyModel::series(vec![(0.0, 0.1), (100.0, 0.3)]).unwrap();
        assert!((model.latency_at(50.0) - 0.2).abs() < 1e-12);
        assert_eq!(model.latency_at(-5.0), 0.1);
        assert_eq!(model.latency_at(500.0), 0.3);
    }

    #[test]
    fn parse_reads_table() {
        let model = TimeLatencyModel::parse("# time latency\n10 0.05\n20 0.07\n").unwrap();
        assert!((model.latency_at(15.0) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn empty_table_is_bad_argument() {
        assert!(matches!(
            TimeLatencyModel::parse("# nothing\n"),
            Err(StageError::BadArgument(_))
        ));
    }
}
