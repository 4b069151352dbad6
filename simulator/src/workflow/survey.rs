use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use swathcore::records::{Ping, SensorSample};

/// One line of a survey file: an asynchronous sensor sample or a ping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyRecord {
    Sensor(SensorSample),
    Ping(Ping),
}

/// Streams the records of a JSON-lines survey file, skipping blank lines.
pub fn read_survey(
    path: &Path,
) -> anyhow::Result<impl Iterator<Item = anyhow::Result<SurveyRecord>>> {
    let file =
        File::open(path).with_context(|| format!("opening survey {}", path.display()))?;
    let display = path.display().to_string();
    let records = BufReader::new(file)
        .lines()
        .enumerate()
        .filter_map(move |(index, line)| {
            let parsed: anyhow::Result<Option<SurveyRecord>> = line
                .with_context(|| format!("reading {} line {}", display, index + 1))
                .and_then(|line| {
                    if line.trim().is_empty() {
                        return Ok(None);
                    }
                    serde_json::from_str::<SurveyRecord>(&line)
                        .map(Some)
                        .with_context(|| format!("parsing {} line {}", display, index + 1))
                });
            parsed.transpose()
        });
    Ok(records)
}

pub fn write_survey(path: &Path, records: &[SurveyRecord]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating survey {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut out, record).context("serializing survey record")?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("flushing survey {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn survey_lines_are_read_back_in_order() {
        let records = vec![
            SurveyRecord::Sensor(SensorSample::heading(1.0, 90.0)),
            SurveyRecord::Ping(Ping {
                time: 1.5,
                ..Default::default()
            }),
        ];
        let temp = NamedTempFile::new().unwrap();
        write_survey(temp.path(), &records).unwrap();

        let read: Vec<SurveyRecord> = read_survey(temp.path())
            .unwrap()
            .collect::<anyhow::Result<_>>()
            .unwrap();
        assert_eq!(read, records);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"\n{\"sensor\": 3}\n").unwrap();
        let error = read_survey(temp.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap_err();
        assert!(format!("{:#}", error).contains("line 2"));
    }
}
