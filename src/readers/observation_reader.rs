use crate::error::{ProcessingError, Result};
use crate::models::{Observation, ObservationTable};
use crate::utils::constants::{
    COLUMN_LATITUDE, COLUMN_LONGITUDE, COLUMN_STATION, COLUMN_TEMPERATURE, COLUMN_VALID,
    COMMENT_CHAR, DEFAULT_BUFFER_SIZE, MISSING_SENTINEL,
};
use crate::utils::time::parse_observation_time;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Positions of the required columns within a header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    station: usize,
    valid: usize,
    longitude: usize,
    latitude: usize,
    temperature: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| ProcessingError::MissingColumn {
                    column: name.to_string(),
                })
        };

        Ok(Self {
            station: find(COLUMN_STATION)?,
            valid: find(COLUMN_VALID)?,
            longitude: find(COLUMN_LONGITUDE)?,
            latitude: find(COLUMN_LATITUDE)?,
            temperature: find(COLUMN_TEMPERATURE)?,
        })
    }
}

/// Reads IEM ASOS/AWOS comma separated downloads
pub struct ObservationReader {
    skip_repeated_headers: bool,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            skip_repeated_headers: true,
        }
    }

    pub fn with_skip_repeated_headers(skip_repeated_headers: bool) -> Self {
        Self {
            skip_repeated_headers,
        }
    }

    /// Read all observations from a file
    pub fn read_observations(&self, path: &Path) -> Result<ObservationTable> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        let table = self.read_from(reader)?;

        debug!(
            path = %path.display(),
            rows = table.len(),
            skipped_headers = table.skipped_header_rows(),
            "read observation file"
        );

        Ok(table)
    }

    /// Read all observations from any byte source
    pub fn read_from<R: Read>(&self, source: R) -> Result<ObservationTable> {
        let mut reader = ReaderBuilder::new()
            .comment(Some(COMMENT_CHAR))
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let columns = ColumnIndex::from_headers(reader.headers()?)?;
        let mut observations = Vec::new();
        let mut skipped = 0;

        for record_result in reader.records() {
            let record = record_result?;

            if self.skip_repeated_headers && Self::is_header_row(&record, &columns) {
                skipped += 1;
                continue;
            }

            observations.push(Self::parse_record(&record, &columns));
        }

        Ok(ObservationTable::new(observations).with_skipped_header_rows(skipped))
    }

    /// Concatenated per-station downloads repeat the header line
    fn is_header_row(record: &StringRecord, columns: &ColumnIndex) -> bool {
        record.get(columns.station) == Some(COLUMN_STATION)
            && record.get(columns.valid) == Some(COLUMN_VALID)
    }

    /// Bad fields become `None`; a row is never rejected
    fn parse_record(record: &StringRecord, columns: &ColumnIndex) -> Observation {
        let field = |index: usize| record.get(index).unwrap_or("");

        Observation::new(
            field(columns.station),
            parse_observation_time(field(columns.valid)),
            parse_measurement(field(columns.longitude)),
            parse_measurement(field(columns.latitude)),
            parse_measurement(field(columns.temperature)),
        )
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric field, `None` for the missing sentinel or anything non-numeric
pub fn parse_measurement(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == MISSING_SENTINEL {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
#DEBUG: Format Typ    -> comma
#DEBUG: Time Period   -> 2017-08-21 00:00:00+00:00 2017-08-22 00:00:00+00:00
station,valid,lon,lat,tmpf, dwpf, relh
BNA,2017-08-21 18:53,-86.6847,36.1244,91.90,70.00,48.69
BNA,2017-08-21 19:53,-86.6847,36.1244,M,M,M
station,valid,lon,lat,tmpf, dwpf, relh
HOP,2017-08-21 18:56,-87.4962,36.6686,90.00,73.40,58.07
HOP,not a time,-87.4962,36.6686,89.60,73.40,58.07
";

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement(" 91.90 "), Some(91.9));
        assert_eq!(parse_measurement("-86.6847"), Some(-86.6847));
        assert_eq!(parse_measurement("M"), None);
        assert_eq!(parse_measurement(""), None);
        assert_eq!(parse_measurement("T"), None);
        assert_eq!(parse_measurement("NaN"), None);
    }

    #[test]
    fn test_read_sample() -> Result<()> {
        let reader = ObservationReader::new();
        let table = reader.read_from(SAMPLE.as_bytes())?;

        assert_eq!(table.len(), 4);
        assert_eq!(table.skipped_header_rows(), 1);

        let first = &table.observations()[0];
        assert_eq!(first.station, "BNA");
        assert_eq!(
            first.valid,
            NaiveDate::from_ymd_opt(2017, 8, 21)
                .unwrap()
                .and_hms_opt(18, 53, 0)
        );
        assert_eq!(first.longitude, Some(-86.6847));
        assert_eq!(first.latitude, Some(36.1244));
        assert_eq!(first.temperature, Some(91.9));

        // Missing sentinel
        assert_eq!(table.observations()[1].temperature, None);

        // Unparseable timestamp is kept with no time
        let last = &table.observations()[3];
        assert_eq!(last.station, "HOP");
        assert_eq!(last.valid, None);
        assert_eq!(last.temperature, Some(89.6));

        Ok(())
    }

    #[test]
    fn test_repeated_headers_kept_when_not_skipping() -> Result<()> {
        let reader = ObservationReader::with_skip_repeated_headers(false);
        let table = reader.read_from(SAMPLE.as_bytes())?;

        assert_eq!(table.len(), 5);
        let header_row = &table.observations()[2];
        assert_eq!(header_row.station, "station");
        assert_eq!(header_row.valid, None);
        assert_eq!(header_row.temperature, None);

        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let reader = ObservationReader::new();
        let result = reader.read_from("station,valid,lon,lat\nBNA,2017-08-21 18:53,1,2\n".as_bytes());

        match result {
            Err(ProcessingError::MissingColumn { column }) => assert_eq!(column, "tmpf"),
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_observation_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        write!(temp_file, "{}", SAMPLE)?;

        let reader = ObservationReader::new();
        let table = reader.read_observations(temp_file.path())?;

        assert_eq!(table.len(), 4);
        assert_eq!(table.observations()[2].station, "HOP");

        Ok(())
    }
}
