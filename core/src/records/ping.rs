use serde::{Deserialize, Serialize};

/// Detection flagged by the instrument.
const DETECTION_FLAGGED: u8 = 0x80;
/// Flagged detection the instrument still considers usable.
const DETECTION_RECOVERED: u8 = 0x20;
/// Both bits set mark a flagged detection with a valid range estimate.
const DETECTION_RANGE_VALID: u8 = 0x18;

/// Transmit timing and steering for one sector of a ping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmitSector {
    /// Transmit delay after the ping timestamp, seconds.
    pub offset: f64,
    /// Fore-aft steering angle, degrees, positive forward.
    pub tilt_deg: f64,
}

/// Raw per-beam observation as decoded from the instrument stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    pub sector: usize,
    /// Receive pointing angle relative to the array, degrees, positive to port.
    pub pointing_deg: f64,
    /// Two-way travel time, seconds.
    pub travel_time: f64,
    pub valid: bool,
    pub detection: u8,
    /// Instrument-computed position, metres (starboard positive).
    pub acrosstrack: f64,
    pub alongtrack: f64,
    /// Instrument-computed depth below the transducer, metres.
    pub depth: f64,
}

impl Beam {
    /// Applies the instrument's own detection-quality bitmask.
    pub fn detection_ok(&self) -> bool {
        if self.detection & DETECTION_FLAGGED == 0 {
            return true;
        }
        self.detection & DETECTION_RECOVERED != 0
            || self.detection & DETECTION_RANGE_VALID == DETECTION_RANGE_VALID
    }

    pub fn is_usable(&self) -> bool {
        self.valid && self.travel_time > 0.0 && self.detection_ok()
    }
}

/// One transmission event with the instrument's navigation snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ping {
    pub time: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heave: f64,
    /// Speed over ground, metres per second.
    pub speed: f64,
    /// Transducer depth below the surface, metres.
    pub transducer_depth: f64,
    pub sectors: Vec<TransmitSector>,
    pub beams: Vec<Beam>,
}

impl Ping {
    pub fn sector_of(&self, beam: &Beam) -> Option<&TransmitSector> {
        self.sectors.get(beam.sector)
    }
}

/// Recomputed beam geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectedBeam {
    /// Takeoff angle from vertical, degrees.
    pub depression: f64,
    pub azimuth: f64,
    /// Two-way travel time, seconds.
    pub range: f64,
    /// Depth below the transducer, metres.
    pub depth: f64,
    pub acrosstrack: f64,
    pub alongtrack: f64,
    pub valid: bool,
    pub converged: bool,
    pub ray_terminated: bool,
}

impl CorrectedBeam {
    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Corrected ping handed to the output writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectedPing {
    pub time: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heave: f64,
    pub transducer_depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    pub heave_offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nadir_beam: Option<usize>,
    pub beams: Vec<CorrectedBeam>,
    pub notes: Vec<String>,
}

impl CorrectedPing {
    pub fn valid_beam_count(&self) -> usize {
        self.beams.iter().filter(|beam| beam.valid).count()
    }
}
