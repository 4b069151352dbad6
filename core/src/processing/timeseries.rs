use crate::math::angles::{angular_difference, wrap_180, wrap_360};
use crate::processing::latency::TimeLatencyModel;
use crate::records::{AxisKind, SensorChannel, SensorValue, MAX_AXES};

/// Gaussian support in multiples of the filter window.
const FILTER_SUPPORT: f64 = 4.0;

/// Value returned by a time series query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: SensorValue,
    /// Set when the series is empty or the query lies outside its samples.
    pub gap: bool,
}

impl Reading {
    fn neutral() -> Self {
        Self {
            value: [0.0; MAX_AXES],
            gap: true,
        }
    }
}

/// Samples of one asynchronous channel in arrival order.
///
/// Queries keep a search cursor, so a pass issuing non-decreasing query times
/// walks the series once. Earlier queries re-seek by bisection; this assumes
/// samples were appended in time order, which is not checked.
#[derive(Debug, Clone)]
pub struct SensorTimeSeries {
    channel: SensorChannel,
    times: Vec<f64>,
    values: Vec<SensorValue>,
    cursor: usize,
}

impl SensorTimeSeries {
    pub fn new(channel: SensorChannel) -> Self {
        Self {
            channel,
            times: Vec::new(),
            values: Vec::new(),
            cursor: 0,
        }
    }

    pub fn channel(&self) -> SensorChannel {
        self.channel
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn append(&mut self, time: f64, value: SensorValue) {
        self.times.push(time);
        self.values.push(value);
    }

    pub fn samples(&self) -> impl Iterator<Item = (f64, &SensorValue)> + '_ {
        self.times.iter().copied().zip(self.values.iter())
    }

    /// Samples with `start <= time <= end`.
    pub fn window(&self, start: f64, end: f64) -> impl Iterator<Item = (f64, &SensorValue)> + '_ {
        self.samples()
            .filter(move |(time, _)| *time >= start && *time <= end)
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    pub fn apply_time_latency(&mut self, model: &TimeLatencyModel) {
        match model {
            TimeLatencyModel::None => {}
            TimeLatencyModel::Constant(latency) => {
                for time in &mut self.times {
                    *time -= latency;
                }
            }
            TimeLatencyModel::Series { .. } => {
                for time in &mut self.times {
                    *time -= model.latency_at(*time);
                }
            }
        }
        self.cursor = 0;
    }

    /// Smooths every axis with a Gaussian of the given width in seconds.
    ///
    /// Weights come from the actual time separation of neighbouring samples,
    /// so irregular sampling is handled without resampling.
    pub fn apply_gaussian_filter(&mut self, window_seconds: f64) {
        if window_seconds <= 0.0 || self.times.len() < 2 {
            return;
        }
        let support = FILTER_SUPPORT * window_seconds;
        let count = self.times.len();
        let mut filtered = self.values.clone();

        for i in 0..count {
            let center_time = self.times[i];
            let mut lo = i;
            while lo > 0 && center_time - self.times[lo - 1] <= support {
                lo -= 1;
            }
            let mut hi = i;
            while hi + 1 < count && self.times[hi + 1] - center_time <= support {
                hi += 1;
            }

            for (axis, kind) in self.channel.axes().iter().enumerate() {
                let center = self.values[i][axis];
                let mut sum = 0.0;
                let mut weight_sum = 0.0;
                for j in lo..=hi {
                    let scaled = (self.times[j] - center_time) / window_seconds;
                    let weight = (-scaled * scaled).exp();
                    sum += weight * axis_difference(*kind, center, self.values[j][axis]);
                    weight_sum += weight;
                }
                if weight_sum > 0.0 {
                    filtered[i][axis] = normalize(*kind, center + sum / weight_sum);
                }
            }
        }
        self.values = filtered;
    }

    /// Interpolates the channel at `time`.
    pub fn interpolate(&mut self, time: f64) -> Reading {
        let count = self.times.len();
        if count == 0 {
            return Reading::neutral();
        }
        let outside = time < self.times[0] || time > self.times[count - 1];
        if count == 1 {
            return Reading {
                value: self.values[0],
                gap: outside,
            };
        }

        let lower = self.seek(time);
        let (t0, t1) = (self.times[lower], self.times[lower + 1]);
        let fraction = if t1 > t0 {
            ((time - t0) / (t1 - t0)).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut value = [0.0; MAX_AXES];
        for (axis, kind) in self.channel.axes().iter().enumerate() {
            value[axis] = interpolate_axis(
                *kind,
                self.values[lower][axis],
                self.values[lower + 1][axis],
                fraction,
            );
        }
        Reading {
            value,
            gap: outside,
        }
    }

    /// Index of the lower bracketing sample, in `0..len - 1`.
    fn seek(&mut self, time: f64) -> usize {
        let last = self.times.len() - 2;
        let mut lower = self.cursor.min(last);
        if time < self.times[lower] {
            lower = self.times[..=last]
                .partition_point(|&t| t <= time)
                .saturating_sub(1);
        } else {
            while lower < last && self.times[lower + 1] <= time {
                lower += 1;
            }
        }
        self.cursor = lower;
        lower
    }
}

fn axis_difference(kind: AxisKind, from: f64, to: f64) -> f64 {
    match kind {
        AxisKind::Linear => to - from,
        AxisKind::Heading | AxisKind::Longitude => angular_difference(from, to),
    }
}

fn normalize(kind: AxisKind, value: f64) -> f64 {
    match kind {
        AxisKind::Linear => value,
        AxisKind::Heading => wrap_360(value),
        AxisKind::Longitude => wrap_180(value),
    }
}

fn interpolate_axis(kind: AxisKind, v0: f64, v1: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return v0;
    }
    if fraction >= 1.0 {
        return v1;
    }
    match kind {
        AxisKind::Linear => v0 * (1.0 - fraction) + v1 * fraction,
        _ => normalize(kind, v0 + fraction * axis_difference(kind, v0, v1)),
    }
}
