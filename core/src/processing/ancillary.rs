//! Tab-separated ancillary tables written next to the corrected output.

use std::io::{self, Write};

use crate::processing::ping::SynchronousRecord;
use crate::processing::timeseries::SensorTimeSeries;

/// Asynchronous rows are kept this many seconds beyond the ping span.
pub const ANCILLARY_MARGIN: f64 = 120.0;

/// `time roll pitch` at every ping.
pub fn write_synchronous_attitude<W: Write>(
    out: &mut W,
    records: &[SynchronousRecord],
) -> io::Result<usize> {
    for record in records {
        writeln!(out, "{:.6}\t{:.3}\t{:.3}", record.time, record.roll, record.pitch)?;
    }
    Ok(records.len())
}

/// `time depth` of the transducer at every ping.
pub fn write_sonar_depth<W: Write>(out: &mut W, records: &[SynchronousRecord]) -> io::Result<usize> {
    for record in records {
        writeln!(out, "{:.6}\t{:.3}", record.time, record.transducer_depth)?;
    }
    Ok(records.len())
}

/// `time heading` for heading samples within the margin of `start..=end`.
pub fn write_async_heading<W: Write>(
    out: &mut W,
    series: &SensorTimeSeries,
    start: f64,
    end: f64,
) -> io::Result<usize> {
    let mut rows = 0;
    for (time, value) in series.window(start - ANCILLARY_MARGIN, end + ANCILLARY_MARGIN) {
        writeln!(out, "{:.6}\t{:7.3}", time, value[0])?;
        rows += 1;
    }
    Ok(rows)
}

/// `time roll pitch` for attitude samples within the margin of `start..=end`.
pub fn write_async_attitude<W: Write>(
    out: &mut W,
    series: &SensorTimeSeries,
    start: f64,
    end: f64,
) -> io::Result<usize> {
    let mut rows = 0;
    for (time, value) in series.window(start - ANCILLARY_MARGIN, end + ANCILLARY_MARGIN) {
        writeln!(out, "{:.6}\t{:.3}\t{:.3}", time, value[0], value[1])?;
        rows += 1;
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SensorChannel;

    #[test]
    fn synchronous_rows_use_fixed_precision() {
        let records = [SynchronousRecord {
            time: 12.5,
            roll: 1.23456,
            pitch: -0.5,
            heading: 10.0,
            transducer_depth: 4.25,
        }];
        let mut out = Vec::new();
        assert_eq!(write_synchronous_attitude(&mut out, &records).unwrap(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "12.500000\t1.235\t-0.500\n");

        let mut out = Vec::new();
        write_sonar_depth(&mut out, &records).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "12.500000\t4.250\n");
    }

    #[test]
    fn asynchronous_rows_are_limited_to_the_margin() {
        let mut heading = SensorTimeSeries::new(SensorChannel::Heading);
        for &time in &[0.0, 79.0, 80.0, 300.0, 320.0, 321.0] {
            heading.append(time, [5.5, 0.0, 0.0]);
        }
        let mut out = Vec::new();
        let rows = write_async_heading(&mut out, &heading, 200.0, 200.0).unwrap();
        assert_eq!(rows, 3);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("80.000000\t  5.500\n"));
        assert!(!text.contains("321.000000"));
    }

    #[test]
    fn asynchronous_attitude_has_roll_and_pitch() {
        let mut attitude = SensorTimeSeries::new(SensorChannel::Attitude);
        attitude.append(1.0, [2.0, -3.0, 0.4]);
        let mut out = Vec::new();
        write_async_attitude(&mut out, &attitude, 0.0, 10.0).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1.000000\t2.000\t-3.000\n");
    }
}
