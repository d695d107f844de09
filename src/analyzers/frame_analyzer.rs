use crate::error::{ProcessingError, Result};
use crate::writers::{DeltaRow, ParquetWriter};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct FrameStatistics {
    pub frame_index: u32,
    pub frame_time: NaiveDateTime,
    pub rows: usize,
    pub plottable_rows: usize,
    pub min_change: Option<f64>,
    pub max_change: Option<f64>,
    pub mean_change: Option<f64>,
}

/// The single largest temperature drop in a file
#[derive(Debug, Clone, Serialize)]
pub struct ExtremeChange {
    pub station: String,
    pub frame_time: NaiveDateTime,
    pub change: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeltaStatistics {
    pub total_rows: usize,
    pub plottable_rows: usize,
    pub unique_stations: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub largest_drop: Option<ExtremeChange>,
    pub largest_rise: Option<ExtremeChange>,
    pub frames: Vec<FrameStatistics>,
}

#[derive(Default)]
struct ChangeAccumulator {
    rows: usize,
    plottable: usize,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: usize,
}

impl ChangeAccumulator {
    fn add(&mut self, row: &DeltaRow) {
        self.rows += 1;
        if let Some(change) = row.temp_change {
            self.min = Some(self.min.map_or(change, |m| m.min(change)));
            self.max = Some(self.max.map_or(change, |m| m.max(change)));
            self.sum += change;
            self.count += 1;

            if row.longitude.is_some() && row.latitude.is_some() {
                self.plottable += 1;
            }
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

pub struct FrameAnalyzer;

impl FrameAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_parquet(&self, path: &Path) -> Result<DeltaStatistics> {
        self.analyze_parquet_with_limit(path, 0)
    }

    /// `limit == 0` reads every row
    pub fn analyze_parquet_with_limit(&self, path: &Path, limit: usize) -> Result<DeltaStatistics> {
        let rows = ParquetWriter::new().read_delta_rows(path, limit)?;
        self.analyze_rows(&rows)
    }

    pub fn analyze_rows(&self, rows: &[DeltaRow]) -> Result<DeltaStatistics> {
        let first = rows.first().ok_or_else(|| {
            ProcessingError::InvalidFormat("No temperature change rows to analyze".to_string())
        })?;

        let mut stations = HashSet::new();
        let mut frames: BTreeMap<u32, (NaiveDateTime, ChangeAccumulator)> = BTreeMap::new();
        let mut overall = ChangeAccumulator::default();
        let mut time_range = (first.frame_time, first.frame_time);
        let mut largest_drop: Option<ExtremeChange> = None;
        let mut largest_rise: Option<ExtremeChange> = None;

        for row in rows {
            stations.insert(row.station.as_str());
            time_range.0 = time_range.0.min(row.frame_time);
            time_range.1 = time_range.1.max(row.frame_time);

            overall.add(row);
            frames
                .entry(row.frame_index)
                .or_insert_with(|| (row.frame_time, ChangeAccumulator::default()))
                .1
                .add(row);

            if let Some(change) = row.temp_change {
                let extreme = || ExtremeChange {
                    station: row.station.clone(),
                    frame_time: row.frame_time,
                    change,
                };
                if largest_drop.as_ref().map_or(true, |d| change < d.change) {
                    largest_drop = Some(extreme());
                }
                if largest_rise.as_ref().map_or(true, |r| change > r.change) {
                    largest_rise = Some(extreme());
                }
            }
        }

        let frames = frames
            .into_iter()
            .map(|(frame_index, (frame_time, acc))| FrameStatistics {
                frame_index,
                frame_time,
                rows: acc.rows,
                plottable_rows: acc.plottable,
                min_change: acc.min,
                max_change: acc.max,
                mean_change: acc.mean(),
            })
            .collect();

        Ok(DeltaStatistics {
            total_rows: overall.rows,
            plottable_rows: overall.plottable,
            unique_stations: stations.len(),
            time_range,
            largest_drop,
            largest_rise,
            frames,
        })
    }
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn format_change(change: Option<f64>) -> String {
    change
        .map(|c| format!("{:+.1}°F", c))
        .unwrap_or_else(|| "n/a".to_string())
}

impl DeltaStatistics {
    pub fn summary(&self) -> String {
        let extreme = |e: &Option<ExtremeChange>| {
            e.as_ref()
                .map(|e| format!("{:+.1}°F at {} ({})", e.change, e.station, e.frame_time))
                .unwrap_or_else(|| "No valid measurements".to_string())
        };

        format!(
            "Temperature Change Frames\n\
            Frames: {}\n\
            Stations: {}\n\
            Time Range: {} to {}\n\
            Rows: {} total, {} plottable\n\
            Largest Drop: {}\n\
            Largest Rise: {}",
            self.frames.len(),
            self.unique_stations,
            self.time_range.0,
            self.time_range.1,
            self.total_rows,
            self.plottable_rows,
            extreme(&self.largest_drop),
            extreme(&self.largest_rise),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();
        out.push_str("\n\nPer Frame:\n");

        for frame in &self.frames {
            out.push_str(&format!(
                "  {:>3}. {}  rows={:<5} plottable={:<5} min={:>8} mean={:>8} max={:>8}\n",
                frame.frame_index,
                frame.frame_time.format("%d %B %Y %H:%MZ"),
                frame.rows,
                frame.plottable_rows,
                format_change(frame.min_change),
                format_change(frame.mean_change),
                format_change(frame.max_change),
            ));
        }

        out
    }
}
