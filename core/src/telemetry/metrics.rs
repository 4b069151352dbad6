use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Counters for the non-fatal events of a processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub pings: usize,
    pub beams_solved: usize,
    pub beams_invalid: usize,
    pub convergence_failures: usize,
    pub ray_terminations: usize,
    pub sensor_gaps: usize,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_ping(&self) {
        self.update(|m| m.pings += 1);
    }

    pub fn record_solved(&self) {
        self.update(|m| m.beams_solved += 1);
    }

    pub fn record_invalid(&self) {
        self.update(|m| m.beams_invalid += 1);
    }

    pub fn record_convergence_failure(&self) {
        self.update(|m| m.convergence_failures += 1);
    }

    pub fn record_ray_termination(&self) {
        self.update(|m| m.ray_terminations += 1);
    }

    pub fn record_sensor_gaps(&self, count: usize) {
        self.update(|m| m.sensor_gaps += count);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    pub fn reset(&self) {
        self.update(|m| *m = MetricsSnapshot::default());
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_events() {
        let recorder = MetricsRecorder::new();
        recorder.record_ping();
        recorder.record_solved();
        recorder.record_solved();
        recorder.record_convergence_failure();
        recorder.record_sensor_gaps(3);

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.pings, 1);
        assert_eq!(snapshot.beams_solved, 2);
        assert_eq!(snapshot.convergence_failures, 1);
        assert_eq!(snapshot.sensor_gaps, 3);
        assert!(snapshot.to_json().contains("\"beams_solved\":2"));

        recorder.reset();
        assert_eq!(recorder.snapshot(), MetricsSnapshot::default());
    }
}
