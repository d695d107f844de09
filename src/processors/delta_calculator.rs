use crate::error::{ProcessingError, Result};
use crate::models::{Observation, TemperatureDelta};
use crate::processors::TimeWindow;
use crate::utils::time::ensure_non_negative;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// How rows of the same station are paired across the two windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JoinMode {
    /// Every lookback row pairs with every target row of the station
    #[default]
    Cartesian,
    /// Only the latest row per station in each window takes part
    LatestPerStation,
}

impl FromStr for JoinMode {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cartesian" => Ok(JoinMode::Cartesian),
            "latest-per-station" | "latest" => Ok(JoinMode::LatestPerStation),
            _ => Err(ProcessingError::Config(format!(
                "Unsupported join mode: {} (expected 'cartesian' or 'latest-per-station')",
                s
            ))),
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMode::Cartesian => write!(f, "cartesian"),
            JoinMode::LatestPerStation => write!(f, "latest-per-station"),
        }
    }
}

/// Station temperature change between `time - span` and `time`
#[derive(Debug, Clone)]
pub struct DeltaCalculator {
    span: Duration,
    tolerance: Duration,
    join_mode: JoinMode,
}

impl DeltaCalculator {
    pub fn new(span: Duration, tolerance: Duration) -> Result<Self> {
        ensure_non_negative("span", span)?;
        ensure_non_negative("tolerance", tolerance)?;

        if tolerance * 2 >= span {
            warn!(
                span_minutes = span.num_minutes(),
                tolerance_minutes = tolerance.num_minutes(),
                "lookback and target windows overlap"
            );
        }

        Ok(Self {
            span,
            tolerance,
            join_mode: JoinMode::default(),
        })
    }

    pub fn with_join_mode(mut self, join_mode: JoinMode) -> Self {
        self.join_mode = join_mode;
        self
    }

    pub fn span(&self) -> Duration {
        self.span
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    pub fn join_mode(&self) -> JoinMode {
        self.join_mode
    }

    /// `None` when `time - span` falls before the earliest representable instant
    pub fn lookback_window(&self, time: NaiveDateTime) -> Option<TimeWindow> {
        time.checked_sub_signed(self.span)
            .map(|center| TimeWindow::from_validated(center, self.tolerance))
    }

    pub fn target_window(&self, time: NaiveDateTime) -> TimeWindow {
        TimeWindow::from_validated(time, self.tolerance)
    }

    /// One record per joined (lookback, target) pair, in lookback row order
    pub fn compute(&self, observations: &[Observation], time: NaiveDateTime) -> Vec<TemperatureDelta> {
        let mut early = self
            .lookback_window(time)
            .map(|window| window.select(observations))
            .unwrap_or_default();
        let mut late = self.target_window(time).select(observations);

        if self.join_mode == JoinMode::LatestPerStation {
            early = latest_per_station(early);
            late = latest_per_station(late);
        }

        let mut late_by_station: HashMap<&str, Vec<&Observation>> = HashMap::new();
        for obs in late {
            late_by_station
                .entry(obs.station.as_str())
                .or_default()
                .push(obs);
        }

        early
            .into_iter()
            .flat_map(|before| {
                late_by_station
                    .get(before.station.as_str())
                    .into_iter()
                    .flatten()
                    .map(move |after| TemperatureDelta::from_pair(before, after))
            })
            .collect()
    }
}

/// Compute temperature deltas with the default (cartesian) join
pub fn compute_deltas(
    observations: &[Observation],
    time: NaiveDateTime,
    span: Duration,
    tolerance: Duration,
) -> Result<Vec<TemperatureDelta>> {
    Ok(DeltaCalculator::new(span, tolerance)?.compute(observations, time))
}

/// Keep the latest row of each station, ties going to the later row.
/// Stations stay in order of first appearance.
fn latest_per_station(rows: Vec<&Observation>) -> Vec<&Observation> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut kept: Vec<&Observation> = Vec::with_capacity(rows.len());

    for obs in rows {
        match position.get(obs.station.as_str()) {
            Some(&i) => {
                if obs.valid >= kept[i].valid {
                    kept[i] = obs;
                }
            }
            None => {
                position.insert(obs.station.as_str(), kept.len());
                kept.push(obs);
            }
        }
    }

    kept
}
