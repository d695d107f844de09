use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One surface reading at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Observation {
    #[validate(length(min = 1))]
    pub station: String,

    pub valid: Option<NaiveDateTime>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    /// Air temperature in °F
    pub temperature: Option<f64>,
}

impl Observation {
    pub fn new(
        station: impl Into<String>,
        valid: Option<NaiveDateTime>,
        longitude: Option<f64>,
        latitude: Option<f64>,
        temperature: Option<f64>,
    ) -> Self {
        Self {
            station: station.into(),
            valid,
            longitude,
            latitude,
            temperature,
        }
    }

    pub fn has_location(&self) -> bool {
        self.longitude.is_some() && self.latitude.is_some()
    }

    /// Location and temperature all present, ready for a scatter layer
    pub fn is_plottable(&self) -> bool {
        self.has_location() && self.temperature.is_some()
    }
}

/// Observations in arrival order, read-only once loaded
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    observations: Vec<Observation>,
    skipped_header_rows: usize,
}

impl ObservationTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            skipped_header_rows: 0,
        }
    }

    pub fn with_skipped_header_rows(mut self, skipped: usize) -> Self {
        self.skipped_header_rows = skipped;
        self
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn skipped_header_rows(&self) -> usize {
        self.skipped_header_rows
    }

    /// Restrict the table to a single station
    pub fn for_station(&self, station: &str) -> Self {
        Self {
            observations: self
                .observations
                .iter()
                .filter(|o| o.station == station)
                .cloned()
                .collect(),
            skipped_header_rows: self.skipped_header_rows,
        }
    }

    /// Concatenate tables, keeping the order they are given in
    pub fn concat(tables: impl IntoIterator<Item = ObservationTable>) -> Self {
        let mut merged = Self::default();
        for table in tables {
            merged.observations.extend(table.observations);
            merged.skipped_header_rows += table.skipped_header_rows;
        }
        merged
    }
}

impl From<Vec<Observation>> for ObservationTable {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_validation() {
        let obs = Observation::new("MSP", None, Some(-93.22), Some(44.88), Some(72.0));
        assert!(obs.validate().is_ok());
        assert!(obs.is_plottable());

        let bad = Observation::new("MSP", None, Some(-93.22), Some(94.0), Some(72.0));
        assert!(bad.validate().is_err());

        let missing = Observation::new("MSP", None, None, None, None);
        assert!(missing.validate().is_ok());
        assert!(!missing.is_plottable());
    }

    #[test]
    fn test_table_concat_keeps_order() {
        let a = ObservationTable::new(vec![Observation::new("AAA", None, None, None, None)])
            .with_skipped_header_rows(1);
        let b = ObservationTable::new(vec![
            Observation::new("BBB", None, None, None, None),
            Observation::new("CCC", None, None, None, None),
        ])
        .with_skipped_header_rows(2);

        let merged = ObservationTable::concat([a, b]);
        let stations: Vec<&str> = merged
            .observations()
            .iter()
            .map(|o| o.station.as_str())
            .collect();

        assert_eq!(stations, ["AAA", "BBB", "CCC"]);
        assert_eq!(merged.skipped_header_rows(), 3);
    }

    #[test]
    fn test_for_station() {
        let table = ObservationTable::new(vec![
            Observation::new("AAA", None, None, None, Some(1.0)),
            Observation::new("BBB", None, None, None, Some(2.0)),
            Observation::new("AAA", None, None, None, Some(3.0)),
        ]);

        let filtered = table.for_station("AAA");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.observations().iter().all(|o| o.station == "AAA"));
    }
}
