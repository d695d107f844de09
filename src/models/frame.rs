use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Observation, TemperatureDelta};

/// Temperature-change rows computed for one animation instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaFrame {
    pub index: u32,
    pub time: NaiveDateTime,
    pub deltas: Vec<TemperatureDelta>,
}

impl DeltaFrame {
    pub fn plottable(&self) -> impl Iterator<Item = &TemperatureDelta> {
        self.deltas.iter().filter(|d| d.is_plottable())
    }

    /// Keep only rows a renderer can draw
    pub fn retain_plottable(&mut self) {
        self.deltas.retain(TemperatureDelta::is_plottable);
    }
}

/// Observations near one animation instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotFrame {
    pub index: u32,
    pub time: NaiveDateTime,
    pub observations: Vec<Observation>,
}

impl SnapshotFrame {
    pub fn plottable(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| o.is_plottable())
    }

    pub fn retain_plottable(&mut self) {
        self.observations.retain(Observation::is_plottable);
    }
}
