use serde::{Deserialize, Serialize};

/// Widest value tuple carried by any channel.
pub const MAX_AXES: usize = 3;

/// Value tuple of one sample; unused trailing axes stay zero.
pub type SensorValue = [f64; MAX_AXES];

/// How a single axis is interpolated and smoothed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    Linear,
    /// Compass angle on [0, 360).
    Heading,
    /// Longitude on [-180, 180).
    Longitude,
}

/// Asynchronous sensor channel tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    /// Longitude, latitude in degrees.
    Position,
    /// Heading in degrees clockwise from north.
    Heading,
    /// Roll, pitch (degrees) and heave (metres, positive up).
    Attitude,
    /// Sonar depth below the surface, metres.
    SensorDepth,
    /// Altitude above the seafloor, metres.
    Altitude,
}

impl SensorChannel {
    pub const ALL: [SensorChannel; 5] = [
        SensorChannel::Position,
        SensorChannel::Heading,
        SensorChannel::Attitude,
        SensorChannel::SensorDepth,
        SensorChannel::Altitude,
    ];

    pub fn axes(&self) -> &'static [AxisKind] {
        match self {
            SensorChannel::Position => &[AxisKind::Longitude, AxisKind::Linear],
            SensorChannel::Heading => &[AxisKind::Heading],
            SensorChannel::Attitude => &[AxisKind::Linear, AxisKind::Linear, AxisKind::Linear],
            SensorChannel::SensorDepth | SensorChannel::Altitude => &[AxisKind::Linear],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensorChannel::Position => "position",
            SensorChannel::Heading => "heading",
            SensorChannel::Attitude => "attitude",
            SensorChannel::SensorDepth => "sensor-depth",
            SensorChannel::Altitude => "altitude",
        }
    }
}

/// One timestamped reading from an asynchronous channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub channel: SensorChannel,
    pub time: f64,
    pub value: SensorValue,
}

impl SensorSample {
    pub fn position(time: f64, longitude: f64, latitude: f64) -> Self {
        Self {
            channel: SensorChannel::Position,
            time,
            value: [longitude, latitude, 0.0],
        }
    }

    pub fn heading(time: f64, heading: f64) -> Self {
        Self {
            channel: SensorChannel::Heading,
            time,
            value: [heading, 0.0, 0.0],
        }
    }

    pub fn attitude(time: f64, roll: f64, pitch: f64, heave: f64) -> Self {
        Self {
            channel: SensorChannel::Attitude,
            time,
            value: [roll, pitch, heave],
        }
    }

    pub fn sensor_depth(time: f64, depth: f64) -> Self {
        Self {
            channel: SensorChannel::SensorDepth,
            time,
            value: [depth, 0.0, 0.0],
        }
    }

    pub fn altitude(time: f64, altitude: f64) -> Self {
        Self {
            channel: SensorChannel::Altitude,
            time,
            value: [altitude, 0.0, 0.0],
        }
    }
}
