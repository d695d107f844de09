use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Observation;

/// Temperature change at one station between a lookback and a target window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureDelta {
    pub station: String,
    /// Location of the lookback observation
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    /// Target minus lookback, °F
    pub temperature_change: Option<f64>,
    pub early_valid: Option<NaiveDateTime>,
    pub late_valid: Option<NaiveDateTime>,
}

impl TemperatureDelta {
    /// Pair two observations of the same station
    pub fn from_pair(early: &Observation, late: &Observation) -> Self {
        let temperature_change = match (early.temperature, late.temperature) {
            (Some(before), Some(after)) => Some(after - before),
            _ => None,
        };

        Self {
            station: early.station.clone(),
            longitude: early.longitude,
            latitude: early.latitude,
            temperature_change,
            early_valid: early.valid,
            late_valid: late.valid,
        }
    }

    pub fn is_plottable(&self) -> bool {
        self.longitude.is_some() && self.latitude.is_some() && self.temperature_change.is_some()
    }
}
