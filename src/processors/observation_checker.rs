use crate::models::ObservationTable;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ObservationReport {
    pub total_rows: usize,
    pub station_count: usize,
    pub missing_timestamps: usize,
    pub missing_temperatures: usize,
    pub missing_coordinates: usize,
    pub invalid_rows: usize,
    pub skipped_header_rows: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
    pub duplicate_keys: Vec<DuplicateKey>,
}

/// A (station, timestamp) pair that occurs more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub station: String,
    pub valid: NaiveDateTime,
    pub count: usize,
}

impl ObservationReport {
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_keys.iter().map(|d| d.count - 1).sum()
    }
}

pub struct ObservationChecker {
    max_listed_duplicates: usize,
}

impl ObservationChecker {
    pub fn new() -> Self {
        Self {
            max_listed_duplicates: 10,
        }
    }

    pub fn with_max_listed_duplicates(max_listed_duplicates: usize) -> Self {
        Self {
            max_listed_duplicates,
        }
    }

    /// Data-quality report over a loaded table
    pub fn check(&self, table: &ObservationTable) -> ObservationReport {
        let mut report = ObservationReport {
            total_rows: table.len(),
            skipped_header_rows: table.skipped_header_rows(),
            ..Default::default()
        };

        let mut stations: HashSet<&str> = HashSet::new();
        let mut keys: HashMap<(&str, NaiveDateTime), usize> = HashMap::new();

        for obs in table.observations() {
            stations.insert(obs.station.as_str());

            if obs.temperature.is_none() {
                report.missing_temperatures += 1;
            }
            if !obs.has_location() {
                report.missing_coordinates += 1;
            }
            if obs.validate().is_err() {
                report.invalid_rows += 1;
            }

            match obs.valid {
                Some(valid) => {
                    report.earliest = Some(report.earliest.map_or(valid, |t| t.min(valid)));
                    report.latest = Some(report.latest.map_or(valid, |t| t.max(valid)));
                    *keys.entry((obs.station.as_str(), valid)).or_default() += 1;
                }
                None => report.missing_timestamps += 1,
            }
        }

        report.station_count = stations.len();

        let mut duplicates: Vec<DuplicateKey> = keys
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|((station, valid), count)| DuplicateKey {
                station: station.to_string(),
                valid,
                count,
            })
            .collect();
        duplicates.sort_by(|a, b| {
            a.station
                .cmp(&b.station)
                .then_with(|| a.valid.cmp(&b.valid))
        });
        report.duplicate_keys = duplicates;

        if !report.duplicate_keys.is_empty() {
            warn!(
                keys = report.duplicate_keys.len(),
                rows = report.duplicate_rows(),
                "duplicate station/timestamp rows will multiply cartesian join results"
            );
        }

        report
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &ObservationReport) -> String {
        let mut summary = String::new();
        let percent = |count: usize| {
            if report.total_rows == 0 {
                0.0
            } else {
                100.0 * count as f64 / report.total_rows as f64
            }
        };

        summary.push_str("=== Observation Check Report ===\n");
        summary.push_str(&format!("Total Rows: {}\n", report.total_rows));
        summary.push_str(&format!("Stations: {}\n", report.station_count));
        match (report.earliest, report.latest) {
            (Some(earliest), Some(latest)) => {
                summary.push_str(&format!("Time Range: {} to {}\n", earliest, latest));
            }
            _ => summary.push_str("Time Range: none\n"),
        }
        summary.push_str(&format!(
            "Missing Timestamps: {} ({:.1}%)\n",
            report.missing_timestamps,
            percent(report.missing_timestamps)
        ));
        summary.push_str(&format!(
            "Missing Temperatures: {} ({:.1}%)\n",
            report.missing_temperatures,
            percent(report.missing_temperatures)
        ));
        summary.push_str(&format!(
            "Missing Coordinates: {} ({:.1}%)\n",
            report.missing_coordinates,
            percent(report.missing_coordinates)
        ));
        summary.push_str(&format!("Out-of-range Rows: {}\n", report.invalid_rows));
        summary.push_str(&format!(
            "Repeated Header Rows Skipped: {}\n",
            report.skipped_header_rows
        ));
        summary.push_str(&format!(
            "\nDuplicate Station/Time Keys: {} ({} extra rows)\n",
            report.duplicate_keys.len(),
            report.duplicate_rows()
        ));

        if !report.duplicate_keys.is_empty() {
            summary.push_str(&format!("\nTop {} Duplicates:\n", self.max_listed_duplicates));
            for (i, dup) in report
                .duplicate_keys
                .iter()
                .take(self.max_listed_duplicates)
                .enumerate()
            {
                summary.push_str(&format!(
                    "  {}. Station {} at {}: {} rows\n",
                    i + 1,
                    dup.station,
                    dup.valid,
                    dup.count
                ));
            }
        }

        summary
    }
}

impl Default for ObservationChecker {
    fn default() -> Self {
        Self::new()
    }
}
