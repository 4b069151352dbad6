use serde::{Deserialize, Serialize};

use crate::math::angles::wrap_360;
use crate::processing::latency::TimeLatencyModel;
use crate::processing::timeseries::{Reading, SensorTimeSeries};
use crate::records::{SensorChannel, SensorSample};
use crate::telemetry::log::LogManager;

/// Gaussian smoothing widths in seconds; zero disables a channel's filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterWindows {
    pub heading: f64,
    pub attitude: f64,
    pub sensor_depth: f64,
}

/// Adjustments applied when the first pass is frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSetOptions {
    pub latency: TimeLatencyModel,
    /// Channels whose timestamps the latency model is subtracted from.
    pub latency_channels: Vec<SensorChannel>,
    pub filters: FilterWindows,
}

impl Default for SensorSetOptions {
    fn default() -> Self {
        Self {
            latency: TimeLatencyModel::None,
            latency_channels: SensorChannel::ALL.to_vec(),
            filters: FilterWindows::default(),
        }
    }
}

/// Roll and pitch in degrees, heave in metres positive up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub heave: f64,
}

#[derive(Debug, Clone)]
struct Channels {
    position: SensorTimeSeries,
    heading: SensorTimeSeries,
    attitude: SensorTimeSeries,
    sensor_depth: SensorTimeSeries,
    altitude: SensorTimeSeries,
}

impl Channels {
    fn new() -> Self {
        Self {
            position: SensorTimeSeries::new(SensorChannel::Position),
            heading: SensorTimeSeries::new(SensorChannel::Heading),
            attitude: SensorTimeSeries::new(SensorChannel::Attitude),
            sensor_depth: SensorTimeSeries::new(SensorChannel::SensorDepth),
            altitude: SensorTimeSeries::new(SensorChannel::Altitude),
        }
    }

    fn get(&self, channel: SensorChannel) -> &SensorTimeSeries {
        match channel {
            SensorChannel::Position => &self.position,
            SensorChannel::Heading => &self.heading,
            SensorChannel::Attitude => &self.attitude,
            SensorChannel::SensorDepth => &self.sensor_depth,
            SensorChannel::Altitude => &self.altitude,
        }
    }

    fn get_mut(&mut self, channel: SensorChannel) -> &mut SensorTimeSeries {
        match channel {
            SensorChannel::Position => &mut self.position,
            SensorChannel::Heading => &mut self.heading,
            SensorChannel::Attitude => &mut self.attitude,
            SensorChannel::SensorDepth => &mut self.sensor_depth,
            SensorChannel::Altitude => &mut self.altitude,
        }
    }
}

/// First-pass accumulator for every asynchronous channel.
#[derive(Debug, Clone)]
pub struct SensorSetBuilder {
    channels: Channels,
}

impl SensorSetBuilder {
    pub fn new() -> Self {
        Self {
            channels: Channels::new(),
        }
    }

    pub fn push(&mut self, sample: SensorSample) {
        self.channels
            .get_mut(sample.channel)
            .append(sample.time, sample.value);
    }

    pub fn len(&self, channel: SensorChannel) -> usize {
        self.channels.get(channel).len()
    }

    /// Applies latency and smoothing and hands the series over for querying.
    pub fn freeze(mut self, options: &SensorSetOptions) -> SensorSet {
        let logger = LogManager::new();
        if !options.latency.is_none() {
            for channel in &options.latency_channels {
                self.channels
                    .get_mut(*channel)
                    .apply_time_latency(&options.latency);
            }
        }
        let filters = &options.filters;
        self.channels.heading.apply_gaussian_filter(filters.heading);
        self.channels.attitude.apply_gaussian_filter(filters.attitude);
        self.channels
            .sensor_depth
            .apply_gaussian_filter(filters.sensor_depth);

        for channel in SensorChannel::ALL {
            logger.record(&format!(
                "{} series frozen with {} samples",
                channel.name(),
                self.channels.get(channel).len()
            ));
        }
        SensorSet {
            channels: self.channels,
            gaps: 0,
        }
    }
}

impl Default for SensorSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen second-pass view of the asynchronous channels.
///
/// Every query returns `None` when its channel has no samples so callers can
/// fall back to the ping's own snapshot. Queries outside a channel's span are
/// clamped and tallied as sensor gaps.
#[derive(Debug, Clone)]
pub struct SensorSet {
    channels: Channels,
    gaps: usize,
}

impl SensorSet {
    fn query(&mut self, channel: SensorChannel, time: f64) -> Option<Reading> {
        let series = self.channels.get_mut(channel);
        if series.is_empty() {
            return None;
        }
        let reading = series.interpolate(time);
        if reading.gap {
            self.gaps += 1;
        }
        Some(reading)
    }

    /// Longitude and latitude in degrees.
    pub fn position_at(&mut self, time: f64) -> Option<(f64, f64)> {
        self.query(SensorChannel::Position, time)
            .map(|reading| (reading.value[0], reading.value[1]))
    }

    pub fn heading_at(&mut self, time: f64) -> Option<f64> {
        self.query(SensorChannel::Heading, time)
            .map(|reading| wrap_360(reading.value[0]))
    }

    pub fn attitude_at(&mut self, time: f64) -> Option<Attitude> {
        self.query(SensorChannel::Attitude, time).map(|reading| Attitude {
            roll: reading.value[0],
            pitch: reading.value[1],
            heave: reading.value[2],
        })
    }

    pub fn sensor_depth_at(&mut self, time: f64) -> Option<f64> {
        self.query(SensorChannel::SensorDepth, time)
            .map(|reading| reading.value[0])
    }

    pub fn altitude_at(&mut self, time: f64) -> Option<f64> {
        self.query(SensorChannel::Altitude, time)
            .map(|reading| reading.value[0])
    }

    pub fn series(&self, channel: SensorChannel) -> &SensorTimeSeries {
        self.channels.get(channel)
    }

    /// Returns and clears the number of gap queries since the last call.
    pub fn take_gaps(&mut self) -> usize {
        std::mem::take(&mut self.gaps)
    }

    pub fn rewind(&mut self) {
        for channel in SensorChannel::ALL {
            self.channels.get_mut(channel).rewind();
        }
    }
}

impl Default for SensorSet {
    fn default() -> Self {
        SensorSetBuilder::new().freeze(&SensorSetOptions::default())
    }
}
