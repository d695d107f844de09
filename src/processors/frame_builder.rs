use crate::error::{ProcessingError, Result};
use crate::models::{DeltaFrame, ObservationTable, SnapshotFrame};
use crate::processors::{DeltaCalculator, FrameSequence, TimeWindow};
use crate::utils::progress::ProgressReporter;
use crate::utils::time::ensure_non_negative;
use chrono::{Duration, NaiveDateTime};
use rayon::prelude::*;
use tracing::{debug, info};

/// Turns a frame sequence into per-instant tables, in instant order
pub struct FrameBuilder {
    sequence: FrameSequence,
    max_workers: usize,
}

impl FrameBuilder {
    pub fn new(sequence: FrameSequence) -> Self {
        Self {
            sequence,
            max_workers: 1,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    /// Temperature-change frames
    pub fn build_delta_frames(
        &self,
        table: &ObservationTable,
        calculator: &DeltaCalculator,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<DeltaFrame>> {
        info!(
            frames = self.sequence.len(),
            span_minutes = calculator.span().num_minutes(),
            tolerance_minutes = calculator.tolerance().num_minutes(),
            join_mode = %calculator.join_mode(),
            "building temperature change frames"
        );

        self.build(
            |index, time| {
                let deltas = calculator.compute(table.observations(), time);
                debug!(frame = index, %time, rows = deltas.len(), "delta frame");
                DeltaFrame {
                    index,
                    time,
                    deltas,
                }
            },
            progress,
        )
    }

    /// Observations within `tolerance` of each instant
    pub fn build_snapshot_frames(
        &self,
        table: &ObservationTable,
        tolerance: Duration,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<SnapshotFrame>> {
        ensure_non_negative("tolerance", tolerance)?;
        info!(
            frames = self.sequence.len(),
            tolerance_minutes = tolerance.num_minutes(),
            "building temperature snapshot frames"
        );

        self.build(
            |index, time| {
                let observations: Vec<_> = TimeWindow::from_validated(time, tolerance)
                    .select(table.observations())
                    .into_iter()
                    .cloned()
                    .collect();
                debug!(frame = index, %time, rows = observations.len(), "snapshot frame");
                SnapshotFrame {
                    index,
                    time,
                    observations,
                }
            },
            progress,
        )
    }

    fn build<T, F>(&self, make_frame: F, progress: Option<&ProgressReporter>) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(u32, NaiveDateTime) -> T + Sync + Send,
    {
        let instants = self
            .sequence
            .instants()
            .into_iter()
            .enumerate()
            .map(|(i, time)| {
                u32::try_from(i).map(|index| (index, time)).map_err(|_| {
                    ProcessingError::InvalidFormat(format!("Too many frames: {}", i))
                })
            })
            .collect::<Result<Vec<(u32, NaiveDateTime)>>>()?;

        let make = |&(index, time): &(u32, NaiveDateTime)| {
            let frame = make_frame(index, time);
            if let Some(p) = progress {
                p.increment(1);
            }
            frame
        };

        if self.max_workers == 1 {
            return Ok(instants.iter().map(make).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        // Indexed collect keeps instant order
        Ok(pool.install(|| instants.par_iter().map(make).collect()))
    }
}
